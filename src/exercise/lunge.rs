use tracing::debug;

use crate::exercise::Side;
use crate::geometry::{distance, joint_angle, slope};
use crate::pose::{LandmarkIndex, PoseEstimate};
use crate::render::{BAD_FORM_COLOR, GOOD_FORM_COLOR, NEUTRAL_COLOR};

/// 踏み込みとみなす踵間距離（右ふくらはぎ長に対する倍率）
const STRIDE_RATIO: f32 = 1.3;
/// 前脚の膝がボトムに達したとみなす角度
const FRONT_KNEE_DOWN_ANGLE: f32 = 110.0;
/// 直立復帰とみなす膝角度
const STAND_KNEE_ANGLE: f32 = 140.0;
/// 前脚とみなすふくらはぎ傾き（|Δy/Δx|）の上限
const FRONT_CALF_SLOPE_LIMIT: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LungeState {
    Idle,
    Descending,
    Down,
    Ascending,
}

/// ランジの回数カウンタ
///
/// 踏み込み幅は右ふくらはぎ長（右膝-右踵）を体格スケールとして判定する。
/// 前脚はふくらはぎがより水平に近い側。鉛直なふくらはぎ（傾き未定義）は
/// 後脚なので前脚の候補にしない。
pub struct LungeCounter {
    state: LungeState,
    count: u32,
    standing_hip_y: Option<i32>,
    form_ok: bool,
}

impl LungeCounter {
    pub fn new() -> Self {
        Self {
            state: LungeState::Idle,
            count: 0,
            standing_hip_y: None,
            form_ok: true,
        }
    }

    pub fn update(&mut self, estimate: &PoseEstimate) {
        let Some(pose) = estimate.first_person() else {
            return;
        };
        let (w, h) = (estimate.width, estimate.height);

        let left_hip = pose.pixel(LandmarkIndex::LeftHip, w, h);
        let left_knee = pose.pixel(LandmarkIndex::LeftKnee, w, h);
        let left_heel = pose.pixel(LandmarkIndex::LeftHeel, w, h);
        let right_hip = pose.pixel(LandmarkIndex::RightHip, w, h);
        let right_knee = pose.pixel(LandmarkIndex::RightKnee, w, h);
        let right_heel = pose.pixel(LandmarkIndex::RightHeel, w, h);

        let calf_len = distance(right_knee, right_heel);
        if calf_len < 1.0 {
            return;
        }
        let stride_limit = STRIDE_RATIO * calf_len;
        let separation = distance(left_heel, right_heel);

        let Some(left_angle) = joint_angle(left_hip, left_knee, left_heel) else {
            return;
        };
        let Some(right_angle) = joint_angle(right_hip, right_knee, right_heel) else {
            return;
        };

        match self.state {
            LungeState::Idle => {
                self.form_ok = true;
                if separation > stride_limit {
                    let drop = self.standing_hip_y.map(|base| left_hip.1 - base).unwrap_or(0);
                    debug!(hip_drop = drop, "lunge stride detected");
                    self.state = LungeState::Descending;
                } else {
                    self.standing_hip_y = Some(left_hip.1);
                }
            }
            LungeState::Descending => {
                if separation <= stride_limit {
                    self.state = LungeState::Idle;
                    return;
                }
                let front = front_leg(
                    slope(left_knee, left_heel),
                    slope(right_knee, right_heel),
                );
                let front_angle = match front {
                    Some(Side::Left) => left_angle,
                    Some(Side::Right) => right_angle,
                    None => return,
                };
                if front_angle < FRONT_KNEE_DOWN_ANGLE {
                    self.state = LungeState::Down;
                }
            }
            LungeState::Down => {
                if separation < stride_limit {
                    self.count += 1;
                    self.state = LungeState::Ascending;
                }
            }
            LungeState::Ascending => {
                if left_angle > STAND_KNEE_ANGLE && right_angle > STAND_KNEE_ANGLE {
                    self.state = LungeState::Idle;
                }
            }
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn state_label(&self) -> &'static str {
        match self.state {
            LungeState::Idle => "idle",
            LungeState::Descending => "descending",
            LungeState::Down => "down",
            LungeState::Ascending => "ascending",
        }
    }

    pub fn reset(&mut self) {
        self.state = LungeState::Idle;
        self.count = 0;
        self.standing_hip_y = None;
        self.form_ok = true;
    }

    pub(crate) fn overlay_color(&self) -> u32 {
        if !self.form_ok {
            BAD_FORM_COLOR
        } else if self.state == LungeState::Idle {
            NEUTRAL_COLOR
        } else {
            GOOD_FORM_COLOR
        }
    }
}

impl Default for LungeCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// ふくらはぎの傾きから前脚を選ぶ
fn front_leg(left_calf_slope: Option<f32>, right_calf_slope: Option<f32>) -> Option<Side> {
    let flat = |s: Option<f32>| s.map(f32::abs).filter(|a| *a < FRONT_CALF_SLOPE_LIMIT);
    match (flat(left_calf_slope), flat(right_calf_slope)) {
        (Some(left), Some(right)) => Some(if left <= right { Side::Left } else { Side::Right }),
        (Some(_), None) => Some(Side::Left),
        (None, Some(_)) => Some(Side::Right),
        (None, None) => None,
    }
}
