use std::time::Instant;

use tracing::debug;

use crate::geometry::{distance, is_roughly_vertical, joint_angle, PixelPoint};
use crate::pose::{LandmarkIndex, PoseEstimate};
use crate::render::{BAD_FORM_COLOR, GOOD_FORM_COLOR, NEUTRAL_COLOR};

/// 直立とみなす膝角度（踵アンカー記録の条件）
const STAND_KNEE_ANGLE: f32 = 140.0;
/// 沈み始めの膝角度
const BEGIN_KNEE_ANGLE: f32 = 120.0;
/// ボトム到達の膝角度
const BOTTOM_KNEE_ANGLE: f32 = 80.0;
/// 立ち上がり開始の膝角度
const RISE_KNEE_ANGLE: f32 = 100.0;
/// 1回完了とみなす膝角度
const COMPLETE_KNEE_ANGLE: f32 = 160.0;
/// 踵アンカーからの許容ドリフト（ピクセル）
const HEEL_DRIFT_LIMIT: f32 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SquatState {
    Idle,
    Begin,
    Down,
    Rise,
}

/// スクワットの回数カウンタ
///
/// 直立時に左踵の位置をアンカーとして記録し、動作中に踵が
/// 大きく動いた場合（足踏みや位置ずれ）はカウントせずIDLEへ戻る。
pub struct SquatCounter {
    state: SquatState,
    count: u32,
    heel_anchor: Option<PixelPoint>,
    descended_at: Option<Instant>,
    form_ok: bool,
}

impl SquatCounter {
    pub fn new() -> Self {
        Self {
            state: SquatState::Idle,
            count: 0,
            heel_anchor: None,
            descended_at: None,
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

        // 角度が定義できないフレームはスキップ
        let Some(left_angle) = joint_angle(left_hip, left_knee, left_heel) else {
            return;
        };
        let Some(right_angle) = joint_angle(right_hip, right_knee, right_heel) else {
            return;
        };

        match self.state {
            SquatState::Idle => {
                // 腰→踵がほぼ鉛直な直立時のみアンカーを更新
                // （座位・寝た姿勢での膝屈伸をスクワットと誤認しない）
                self.form_ok = is_roughly_vertical(left_hip, left_heel);
                if self.form_ok
                    && left_angle > STAND_KNEE_ANGLE
                    && right_angle > STAND_KNEE_ANGLE
                {
                    self.heel_anchor = Some(left_heel);
                }
                if left_angle < BEGIN_KNEE_ANGLE && right_angle < BEGIN_KNEE_ANGLE {
                    self.state = SquatState::Begin;
                }
            }
            SquatState::Begin => {
                let Some(anchor) = self.heel_anchor else {
                    self.state = SquatState::Idle;
                    return;
                };
                if distance(left_heel, anchor) > HEEL_DRIFT_LIMIT {
                    self.heel_anchor = None;
                    self.form_ok = false;
                    self.state = SquatState::Idle;
                    return;
                }
                self.form_ok = true;
                if left_angle < BOTTOM_KNEE_ANGLE && right_angle < BOTTOM_KNEE_ANGLE {
                    self.descended_at = Some(Instant::now());
                    self.state = SquatState::Down;
                }
            }
            SquatState::Down => {
                if left_angle > RISE_KNEE_ANGLE || right_angle > RISE_KNEE_ANGLE {
                    if let Some(at) = self.descended_at.take() {
                        debug!(hold_ms = at.elapsed().as_millis() as u64, "squat bottom hold");
                    }
                    self.state = SquatState::Rise;
                }
            }
            SquatState::Rise => {
                if left_angle > COMPLETE_KNEE_ANGLE && right_angle > COMPLETE_KNEE_ANGLE {
                    self.count += 1;
                    self.state = SquatState::Idle;
                }
            }
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn state_label(&self) -> &'static str {
        match self.state {
            SquatState::Idle => "idle",
            SquatState::Begin => "begin",
            SquatState::Down => "down",
            SquatState::Rise => "rise",
        }
    }

    pub fn reset(&mut self) {
        self.state = SquatState::Idle;
        self.count = 0;
        self.heel_anchor = None;
        self.descended_at = None;
        self.form_ok = true;
    }

    pub(crate) fn overlay_color(&self) -> u32 {
        if !self.form_ok {
            BAD_FORM_COLOR
        } else if self.state == SquatState::Idle {
            NEUTRAL_COLOR
        } else {
            GOOD_FORM_COLOR
        }
    }
}

impl Default for SquatCounter {
    fn default() -> Self {
        Self::new()
    }
}
