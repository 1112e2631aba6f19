use crate::geometry::{distance, joint_angle, PixelPoint};
use crate::pose::{LandmarkIndex, PoseEstimate};
use crate::render::{BAD_FORM_COLOR, GOOD_FORM_COLOR, NEUTRAL_COLOR};

/// 起き上がり開始とみなす体幹折り角（肩-腰-踵）
const FOLD_BEGIN_ANGLE: f32 = 165.0;
/// 上体が起きたとみなす体幹折り角
const FOLD_TOP_ANGLE: f32 = 110.0;
/// 膝を曲げているとみなす上限角（腰-膝-踵）
const KNEE_BENT_LIMIT: f32 = 110.0;
/// 踵アンカーからの許容ドリフト（ピクセル）
const HEEL_DRIFT_LIMIT: f32 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SitupState {
    Idle,
    Rising,
    Top,
}

/// シットアップの回数カウンタ
///
/// 仰臥位では毎フレーム踵アンカーを取り直す。動作中に膝が開く、
/// または踵がずれた場合は脚の反動とみなしてIDLEへ戻す。
pub struct SitupCounter {
    state: SitupState,
    count: u32,
    heel_anchor: Option<PixelPoint>,
    form_ok: bool,
}

impl SitupCounter {
    pub fn new() -> Self {
        Self {
            state: SitupState::Idle,
            count: 0,
            heel_anchor: None,
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

        let Some(fold_angle) = joint_angle(shoulder, hip, heel) else {
            return;
        };
        let Some(knee_angle) = joint_angle(hip, knee, heel) else {
            return;
        };

        match self.state {
            SitupState::Idle => {
                // 仰臥中は踵位置を取り直し続ける
                self.heel_anchor = Some(heel);
                self.form_ok = true;
                if fold_angle < FOLD_BEGIN_ANGLE && knee_angle < KNEE_BENT_LIMIT {
                    self.state = SitupState::Rising;
                }
            }
            SitupState::Rising => {
                let Some(anchor) = self.heel_anchor else {
                    self.state = SitupState::Idle;
                    return;
                };
                if knee_angle > KNEE_BENT_LIMIT || distance(heel, anchor) > HEEL_DRIFT_LIMIT {
                    self.form_ok = false;
                    self.state = SitupState::Idle;
                    return;
                }
                self.form_ok = true;
                if fold_angle < FOLD_TOP_ANGLE {
                    self.state = SitupState::Top;
                }
            }
            SitupState::Top => {
                if knee_angle > KNEE_BENT_LIMIT {
                    self.form_ok = false;
                    self.state = SitupState::Idle;
                    return;
                }
                if fold_angle > FOLD_BEGIN_ANGLE {
                    self.count += 1;
                    self.state = SitupState::Idle;
                }
            }
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn state_label(&self) -> &'static str {
        match self.state {
            SitupState::Idle => "idle",
            SitupState::Rising => "rising",
            SitupState::Top => "top",
        }
    }

    pub fn reset(&mut self) {
        self.state = SitupState::Idle;
        self.count = 0;
        self.heel_anchor = None;
        self.form_ok = true;
    }

    pub(crate) fn overlay_color(&self) -> u32 {
        if !self.form_ok {
            BAD_FORM_COLOR
        } else if self.state == SitupState::Idle {
            NEUTRAL_COLOR
        } else {
            GOOD_FORM_COLOR
        }
    }
}

impl Default for SitupCounter {
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

    /// 体幹折り角と膝の屈伸を指定して仰臥ポーズを生成
    /// 腰(200,300)と踵(420,300)は床上に固定、肩は腰から
    /// 指定角度の方向へ160px
    fn situp_pose_shifted(fold_deg: f32, knee_bent: bool, heel_shift_px: f32) -> PoseEstimate {
        let mut landmarks = [Landmark::default(); LandmarkIndex::COUNT];
        let rad = fold_deg.to_radians();
        landmarks[LandmarkIndex::LeftShoulder as usize] =
            lm(200.0 + 160.0 * rad.cos(), 300.0 - 160.0 * rad.sin());
        landmarks[LandmarkIndex::LeftHip as usize] = lm(200.0, 300.0);
        landmarks[LandmarkIndex::LeftKnee as usize] = if knee_bent {
            lm(310.0, 170.0)
        } else {
            lm(310.0, 260.0)
        };
        landmarks[LandmarkIndex::LeftHeel as usize] = lm(420.0 + heel_shift_px, 300.0);
        PoseEstimate::new(vec![Pose::new(landmarks)], 640, 480)
    }

    fn situp_pose(fold_deg: f32, knee_bent: bool) -> PoseEstimate {
        situp_pose_shifted(fold_deg, knee_bent, 0.0)
    }

    #[test]
    fn test_full_rep_counts_once() {
        let mut counter = SitupCounter::new();
        counter.update(&situp_pose(170.0, true));
        assert_eq!(counter.state_label(), "idle");
        counter.update(&situp_pose(150.0, true));
        assert_eq!(counter.state_label(), "rising");
        counter.update(&situp_pose(100.0, true));
        assert_eq!(counter.state_label(), "top");
        counter.update(&situp_pose(170.0, true));
        assert_eq!(counter.count(), 1);
        assert_eq!(counter.state_label(), "idle");
    }

    #[test]
    fn test_knee_opening_aborts_rep() {
        let mut counter = SitupCounter::new();
        counter.update(&situp_pose(170.0, true));
        counter.update(&situp_pose(150.0, true));
        assert_eq!(counter.state_label(), "rising");
        // 膝が開く（約140° > 110°）→ 反動とみなして中断
        counter.update(&situp_pose(150.0, false));
        assert_eq!(counter.state_label(), "idle");
        counter.update(&situp_pose(100.0, true));
        counter.update(&situp_pose(170.0, true));
        assert_eq!(counter.count(), 0, "aborted rep must not count");
    }

    #[test]
    fn test_heel_drift_aborts_rep() {
        let mut counter = SitupCounter::new();
        counter.update(&situp_pose(170.0, true));
        counter.update(&situp_pose(150.0, true));
        assert_eq!(counter.state_label(), "rising");
        // 踵が120pxずれる
        counter.update(&situp_pose_shifted(150.0, true, 120.0));
        assert_eq!(counter.state_label(), "idle");
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn test_straight_legs_never_start() {
        let mut counter = SitupCounter::new();
        // 膝が開いたまま（レッグレイズ等）では開始しない
        for _ in 0..3 {
            counter.update(&situp_pose(150.0, false));
            assert_eq!(counter.state_label(), "idle");
        }
    }

    #[test]
    fn test_idle_reanchors_every_frame() {
        let mut counter = SitupCounter::new();
        counter.update(&situp_pose(170.0, true));
        let first = counter.heel_anchor;
        counter.update(&situp_pose_shifted(170.0, true, 40.0));
        let second = counter.heel_anchor;
        assert_ne!(first, second, "idle must track the latest heel position");
    }

    #[test]
    fn test_no_person_is_noop() {
        let mut counter = SitupCounter::new();
        counter.update(&situp_pose(170.0, true));
        counter.update(&situp_pose(150.0, true));
        counter.update(&PoseEstimate::empty(640, 480));
        assert_eq!(counter.state_label(), "rising");
    }
}
