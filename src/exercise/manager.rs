use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::CoachError;
use crate::exercise::{
    GluteBridgeCounter, LungeCounter, PushupCounter, PushupStyle, SitupCounter, SquatCounter,
    SupermanCounter, TimedActivity,
};
use crate::pose::PoseEstimate;
use crate::render::FrameBuffer;

/// 対応している種目
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExerciseKind {
    Squat,
    Situp,
    Lunge,
    Pushup,
    VPushup,
    GluteBridge,
    Superman,
    Running,
    JumpingJacks,
}

impl ExerciseKind {
    /// 種目名をパースする。大文字小文字・空白・ハイフンは無視する
    pub fn parse(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "squat" | "squats" => Some(Self::Squat),
            "situp" | "situps" => Some(Self::Situp),
            "lunge" | "lunges" => Some(Self::Lunge),
            "pushup" | "pushups" => Some(Self::Pushup),
            "vpushup" | "vpushups" => Some(Self::VPushup),
            "glutebridge" | "glutebridges" => Some(Self::GluteBridge),
            "superman" | "supermans" => Some(Self::Superman),
            "running" | "jogginginplace" => Some(Self::Running),
            "jumpingjack" | "jumpingjacks" => Some(Self::JumpingJacks),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Squat => "Squats",
            Self::Situp => "Sit-ups",
            Self::Lunge => "Lunges",
            Self::Pushup => "Push-ups",
            Self::VPushup => "V pushups",
            Self::GluteBridge => "Glute Bridges",
            Self::Superman => "Supermans",
            Self::Running => "Running",
            Self::JumpingJacks => "Jumping Jacks",
        }
    }
}

/// 種目ごとのカウンタ実装のディスパッチ
pub enum RepCounter {
    Squat(SquatCounter),
    Situp(SitupCounter),
    Lunge(LungeCounter),
    Pushup(PushupCounter),
    GluteBridge(GluteBridgeCounter),
    Superman(SupermanCounter),
    Timed(TimedActivity),
}

impl RepCounter {
    pub fn new_for(kind: ExerciseKind, visibility_threshold: f32) -> Self {
        match kind {
            ExerciseKind::Squat => Self::Squat(SquatCounter::new()),
            ExerciseKind::Situp => Self::Situp(SitupCounter::new()),
            ExerciseKind::Lunge => Self::Lunge(LungeCounter::new()),
            ExerciseKind::Pushup => Self::Pushup(PushupCounter::new(
                PushupStyle::Standard,
                visibility_threshold,
            )),
            ExerciseKind::VPushup => {
                Self::Pushup(PushupCounter::new(PushupStyle::Pike, visibility_threshold))
            }
            ExerciseKind::GluteBridge => Self::GluteBridge(GluteBridgeCounter::new()),
            ExerciseKind::Superman => Self::Superman(SupermanCounter::new()),
            ExerciseKind::Running | ExerciseKind::JumpingJacks => {
                Self::Timed(TimedActivity::new())
            }
        }
    }

    pub fn update(&mut self, estimate: &PoseEstimate) {
        match self {
            Self::Squat(c) => c.update(estimate),
            Self::Situp(c) => c.update(estimate),
            Self::Lunge(c) => c.update(estimate),
            Self::Pushup(c) => c.update(estimate),
            Self::GluteBridge(c) => c.update(estimate),
            Self::Superman(c) => c.update(estimate),
            Self::Timed(_) => {}
        }
    }

    pub fn count(&self) -> u32 {
        match self {
            Self::Squat(c) => c.count(),
            Self::Situp(c) => c.count(),
            Self::Lunge(c) => c.count(),
            Self::Pushup(c) => c.count(),
            Self::GluteBridge(c) => c.count(),
            Self::Superman(c) => c.count(),
            Self::Timed(_) => 0,
        }
    }

    pub fn state_label(&self) -> &'static str {
        match self {
            Self::Squat(c) => c.state_label(),
            Self::Situp(c) => c.state_label(),
            Self::Lunge(c) => c.state_label(),
            Self::Pushup(c) => c.state_label(),
            Self::GluteBridge(c) => c.state_label(),
            Self::Superman(c) => c.state_label(),
            Self::Timed(_) => "timed",
        }
    }

    /// 表示用の状態文字列。時間計測種目は経過秒を含む
    pub fn state_text(&self) -> String {
        match self {
            Self::Timed(t) => format!("timed {}s", t.elapsed_secs()),
            other => other.state_label().to_string(),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Self::Squat(c) => c.reset(),
            Self::Situp(c) => c.reset(),
            Self::Lunge(c) => c.reset(),
            Self::Pushup(c) => c.reset(),
            Self::GluteBridge(c) => c.reset(),
            Self::Superman(c) => c.reset(),
            Self::Timed(t) => t.reset(),
        }
    }

    /// 骨格オーバーレイをフォーム状態に応じた色で描く
    pub fn render(
        &self,
        frame: &mut FrameBuffer,
        estimate: &PoseEstimate,
        visibility_threshold: f32,
    ) {
        let Some(pose) = estimate.first_person() else {
            return;
        };
        frame.draw_pose(pose, self.overlay_color(), visibility_threshold);
    }

    fn overlay_color(&self) -> u32 {
        match self {
            Self::Squat(c) => c.overlay_color(),
            Self::Situp(c) => c.overlay_color(),
            Self::Lunge(c) => c.overlay_color(),
            Self::Pushup(c) => c.overlay_color(),
            Self::GluteBridge(c) => c.overlay_color(),
            Self::Superman(c) => c.overlay_color(),
            Self::Timed(t) => t.overlay_color(),
        }
    }
}

/// アクティブ種目のカウント状況
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerSnapshot {
    pub exercise: String,
    pub count: u32,
    pub state: String,
}

/// 1回のワークアウトで行う種目系列とアクティブ種目を管理する
pub struct ExerciseManager {
    entries: Vec<(ExerciseKind, RepCounter)>,
    active: Option<usize>,
}

impl ExerciseManager {
    /// 種目名のリストからマネージャを作る
    ///
    /// 未対応の名前は警告を出して読み飛ばす。重複は1つにまとめ、
    /// 最初の種目をアクティブにする。可視性の閾値は計測側の選択に
    /// 使う種目のカウンタへ渡される。
    pub fn new<I, S>(names: I, visibility_threshold: f32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries: Vec<(ExerciseKind, RepCounter)> = Vec::new();
        for name in names {
            let name = name.as_ref();
            match ExerciseKind::parse(name) {
                Some(kind) => {
                    if !entries.iter().any(|(k, _)| *k == kind) {
                        entries.push((kind, RepCounter::new_for(kind, visibility_threshold)));
                    }
                }
                None => warn!(exercise = name, "unknown exercise name, skipping"),
            }
        }
        let active = if entries.is_empty() { None } else { Some(0) };
        Self { entries, active }
    }

    /// アクティブ種目を切り替える。カウントは種目ごとに保持される
    pub fn switch(&mut self, name: &str) -> Result<(), CoachError> {
        let kind =
            ExerciseKind::parse(name).ok_or_else(|| CoachError::unknown_exercise(name))?;
        let index = self
            .entries
            .iter()
            .position(|(k, _)| *k == kind)
            .ok_or_else(|| CoachError::unknown_exercise(name))?;
        self.active = Some(index);
        Ok(())
    }

    pub fn update(&mut self, estimate: &PoseEstimate) {
        if let Some(index) = self.active {
            self.entries[index].1.update(estimate);
        }
    }

    pub fn render(
        &self,
        frame: &mut FrameBuffer,
        estimate: &PoseEstimate,
        visibility_threshold: f32,
    ) {
        if let Some(index) = self.active {
            self.entries[index]
                .1
                .render(frame, estimate, visibility_threshold);
        }
    }

    /// アクティブ種目のカウントをゼロに戻す
    pub fn reset_active(&mut self) {
        if let Some(index) = self.active {
            self.entries[index].1.reset();
        }
    }

    pub fn snapshot(&self) -> Option<ManagerSnapshot> {
        self.active.map(|index| {
            let (kind, counter) = &self.entries[index];
            ManagerSnapshot {
                exercise: kind.display_name().to_string(),
                count: counter.count(),
                state: counter.state_text(),
            }
        })
    }

    pub fn active_kind(&self) -> Option<ExerciseKind> {
        self.active.map(|index| self.entries[index].0)
    }

    pub fn exercise_names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(k, _)| k.display_name()).collect()
    }
}
