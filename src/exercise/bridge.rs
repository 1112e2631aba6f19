use crate::geometry::joint_angle;
use crate::pose::{LandmarkIndex, PoseEstimate};
use crate::render::{BAD_FORM_COLOR, GOOD_FORM_COLOR, NEUTRAL_COLOR};

/// 仰臥時に膝が立っているとみなす上限角（腰-膝-踵）
const KNEE_PLANTED_LIMIT: f32 = 135.0;
/// 腰が上がりきったとみなす股関節角（肩-腰-膝）
const HIP_EXTENDED_ANGLE: f32 = 165.0;
/// 腰が下りたとみなす股関節角
const HIP_LOWERED_ANGLE: f32 = 140.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BridgeState {
    Idle,
    Up,
}

/// グルートブリッジの回数カウンタ
///
/// 仰臥（肩→腰がほぼ水平）かつ膝を立てた姿勢からの挙上のみ数える。
/// 立位で股関節を伸ばしても反応しない。
pub struct GluteBridgeCounter {
    state: BridgeState,
    count: u32,
    form_ok: bool,
}

impl GluteBridgeCounter {
    pub fn new() -> Self {
        Self {
            state: BridgeState::Idle,
            count: 0,
            form_ok: true,
        }
    }

    pub fn update(&mut self, estimate: &PoseEstimate) {
        let Some(pose) = estimate.first_person() else {
            return;
        };
        let (w, h) = (estimate.width, estimate.height);

        let shoulder = pose.pixel(LandmarkIndex::LeftShoulder, w, h);
        let hip = pose.pixel(LandmarkIndex::LeftHip, w, h);
        let knee = pose.pixel(LandmarkIndex::LeftKnee, w, h);
        let heel = pose.pixel(LandmarkIndex::LeftHeel, w, h);

        let Some(hip_angle) = joint_angle(shoulder, hip, knee) else {
            return;
        };
        let Some(knee_angle) = joint_angle(hip, knee, heel) else {
            return;
        };

        match self.state {
            BridgeState::Idle => {
                let lying = (hip.0 - shoulder.0).abs() > (hip.1 - shoulder.1).abs();
                self.form_ok = lying && knee_angle <= KNEE_PLANTED_LIMIT;
                if self.form_ok && hip_angle > HIP_EXTENDED_ANGLE {
                    self.state = BridgeState::Up;
                }
            }
            BridgeState::Up => {
                if hip_angle < HIP_LOWERED_ANGLE {
                    self.count += 1;
                    self.state = BridgeState::Idle;
                }
            }
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn state_label(&self) -> &'static str {
        match self.state {
            BridgeState::Idle => "idle",
            BridgeState::Up => "up",
        }
    }

    pub fn reset(&mut self) {
        self.state = BridgeState::Idle;
        self.count = 0;
        self.form_ok = true;
    }

    pub(crate) fn overlay_color(&self) -> u32 {
        if !self.form_ok {
            BAD_FORM_COLOR
        } else if self.state == BridgeState::Idle {
            NEUTRAL_COLOR
        } else {
            GOOD_FORM_COLOR
        }
    }
}

impl Default for GluteBridgeCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{Landmark, Pose};

    fn lm(px: f32, py: f32) -> Landmark {
        Landmark::new(px / 640.0, py / 480.0, 0.9)
    }

    /// 仰臥で膝を立てたポーズ。腰の高さだけを動かす
    fn bridge_pose(hip_y: f32) -> PoseEstimate {
        let mut landmarks = [Landmark::default(); LandmarkIndex::COUNT];
        landmarks[LandmarkIndex::LeftShoulder as usize] = lm(200.0, 380.0);
        landmarks[LandmarkIndex::LeftHip as usize] = lm(300.0, hip_y);
        landmarks[LandmarkIndex::LeftKnee as usize] = lm(360.0, 300.0);
        landmarks[LandmarkIndex::LeftHeel as usize] = lm(390.0, 380.0);
        PoseEstimate::new(vec![Pose::new(landmarks)], 640, 480)
    }

    /// 直立ポーズ（股関節はほぼ伸展）
    fn standing_pose() -> PoseEstimate {
        let mut landmarks = [Landmark::default(); LandmarkIndex::COUNT];
        landmarks[LandmarkIndex::LeftShoulder as usize] = lm(300.0, 100.0);
        landmarks[LandmarkIndex::LeftHip as usize] = lm(310.0, 300.0);
        landmarks[LandmarkIndex::LeftKnee as usize] = lm(315.0, 400.0);
        landmarks[LandmarkIndex::LeftHeel as usize] = lm(315.0, 470.0);
        PoseEstimate::new(vec![Pose::new(landmarks)], 640, 480)
    }

    #[test]
    fn test_full_rep_counts_once() {
        let mut counter = GluteBridgeCounter::new();
        counter.update(&bridge_pose(370.0));
        assert_eq!(counter.state_label(), "idle");
        counter.update(&bridge_pose(330.0));
        assert_eq!(counter.state_label(), "up");
        counter.update(&bridge_pose(370.0));
        assert_eq!(counter.count(), 1);
        assert_eq!(counter.state_label(), "idle");
    }

    #[test]
    fn test_standing_hip_extension_ignored() {
        let mut counter = GluteBridgeCounter::new();
        // 立位は股関節が伸びていても仰臥条件を満たさない
        for _ in 0..3 {
            counter.update(&standing_pose());
            assert_eq!(counter.state_label(), "idle");
        }
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn test_partial_raise_does_not_count() {
        let mut counter = GluteBridgeCounter::new();
        counter.update(&bridge_pose(370.0));
        // 腰を少し上げただけ（165°未達）では UP に入らない
        counter.update(&bridge_pose(355.0));
        assert_eq!(counter.state_label(), "idle");
        counter.update(&bridge_pose(370.0));
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn test_reset_zeroes_count() {
        let mut counter = GluteBridgeCounter::new();
        counter.update(&bridge_pose(330.0));
        counter.update(&bridge_pose(370.0));
        assert_eq!(counter.count(), 1);
        counter.reset();
        assert_eq!(counter.count(), 0);
        assert_eq!(counter.state_label(), "idle");
    }
}
