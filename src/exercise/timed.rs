use std::time::Instant;

use crate::render::NEUTRAL_COLOR;

/// 時間計測のみの種目（ランニング、ジャンピングジャック等）
///
/// ポーズからの判定は行わず、開始からの経過秒数だけを報告する。
pub struct TimedActivity {
    started: Instant,
}

impl TimedActivity {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    /// 経過時間を計り直す
    pub fn reset(&mut self) {
        self.started = Instant::now();
    }

    pub(crate) fn overlay_color(&self) -> u32 {
        NEUTRAL_COLOR
    }
}

impl Default for TimedActivity {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_zero() {
        let activity = TimedActivity::new();
        assert_eq!(activity.elapsed_secs(), 0);
    }

    #[test]
    fn test_reset_restarts_clock() {
        let mut activity = TimedActivity::new();
        activity.reset();
        assert_eq!(activity.elapsed_secs(), 0);
    }
}
