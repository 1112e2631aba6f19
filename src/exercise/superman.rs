use crate::geometry::joint_angle;
use crate::pose::{LandmarkIndex, PoseEstimate};
use crate::render::{GOOD_FORM_COLOR, NEUTRAL_COLOR};

/// 反り上がったとみなす背面角（肩-腰-膝）
const BACK_ARCHED_ANGLE: f32 = 165.0;
/// 床に戻ったとみなす背面角
const BACK_FLAT_ANGLE: f32 = 175.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SupermanState {
    Idle,
    Up,
}

/// スーパーマン（伏臥上体反らし）の回数カウンタ
///
/// うつ伏せで手足を浮かせると肩-腰-膝の直線が崩れるので、
/// その角度の往復だけで数える。
pub struct SupermanCounter {
    state: SupermanState,
    count: u32,
}

impl SupermanCounter {
    pub fn new() -> Self {
        Self {
            state: SupermanState::Idle,
            count: 0,
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

        let Some(back_angle) = joint_angle(shoulder, hip, knee) else {
            return;
        };

        match self.state {
            SupermanState::Idle => {
                if back_angle < BACK_ARCHED_ANGLE {
                    self.state = SupermanState::Up;
                }
            }
            SupermanState::Up => {
                if back_angle > BACK_FLAT_ANGLE {
                    self.count += 1;
                    self.state = SupermanState::Idle;
                }
            }
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn state_label(&self) -> &'static str {
        match self.state {
            SupermanState::Idle => "idle",
            SupermanState::Up => "up",
        }
    }

    pub fn reset(&mut self) {
        self.state = SupermanState::Idle;
        self.count = 0;
    }

    pub(crate) fn overlay_color(&self) -> u32 {
        match self.state {
            SupermanState::Idle => NEUTRAL_COLOR,
            SupermanState::Up => GOOD_FORM_COLOR,
        }
    }
}

impl Default for SupermanCounter {
    fn default() -> Self {
        Self::new()
    }
}
