use crate::exercise::Side;
use crate::geometry::{joint_angle, PixelPoint};
use crate::pose::{LandmarkIndex, Pose, PoseEstimate};
use crate::render::{BAD_FORM_COLOR, GOOD_FORM_COLOR, NEUTRAL_COLOR};

/// 沈み始めとみなす肘角度（肩-肘-手首）
const ELBOW_DESCEND_ANGLE: f32 = 140.0;
/// ボトム到達とみなす肘角度
const ELBOW_BOTTOM_ANGLE: f32 = 90.0;
/// 肘が伸びきったとみなす角度
const ELBOW_LOCKOUT_ANGLE: f32 = 165.0;

/// 通常プッシュアップ: 体線（肩-腰-足首）がほぼ直線
const PLANK_BODY_ANGLE: f32 = 165.0;
/// 通常プッシュアップ: 肩と腰の高さの許容差（ピクセル）
const PLANK_LEVEL_LIMIT: i32 = 35;

/// パイク: 体線の折り角の許容範囲
const PIKE_BODY_ANGLE_MIN: f32 = 70.0;
const PIKE_BODY_ANGLE_MAX: f32 = 120.0;
/// パイク: 腰が肩より高くあるべき最小差（ピクセル）
const PIKE_HIP_RAISE: i32 = 10;

/// プッシュアップの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushupStyle {
    /// 体をまっすぐ保つ通常フォーム
    Standard,
    /// 腰を高く上げた逆V字フォーム
    Pike,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PushupState {
    Idle,
    Down,
    Up,
}

/// プッシュアップの回数カウンタ
///
/// 横向きの撮影を想定し、肘の可視性が閾値に達した最初のフレームで
/// 可視性の高い側を計測側として固定する。状態遷移の瞬間ごとに
/// フォームを検査し、崩れている間は遷移させない。
pub struct PushupCounter {
    style: PushupStyle,
    state: PushupState,
    count: u32,
    side: Option<Side>,
    visibility_threshold: f32,
    form_ok: bool,
}

impl PushupCounter {
    pub fn new(style: PushupStyle, visibility_threshold: f32) -> Self {
        Self {
            style,
            state: PushupState::Idle,
            count: 0,
            side: None,
            visibility_threshold,
            form_ok: true,
        }
    }

    pub fn update(&mut self, estimate: &PoseEstimate) {
        let Some(pose) = estimate.first_person() else {
            return;
        };
        let (w, h) = (estimate.width, estimate.height);

        if self.side.is_none() {
            self.side = choose_side(pose, self.visibility_threshold);
        }
        let Some(side) = self.side else {
            return;
        };
        let (shoulder_idx, elbow_idx, wrist_idx, hip_idx, ankle_idx) = match side {
            Side::Left => (
                LandmarkIndex::LeftShoulder,
                LandmarkIndex::LeftElbow,
                LandmarkIndex::LeftWrist,
                LandmarkIndex::LeftHip,
                LandmarkIndex::LeftAnkle,
            ),
            Side::Right => (
                LandmarkIndex::RightShoulder,
                LandmarkIndex::RightElbow,
                LandmarkIndex::RightWrist,
                LandmarkIndex::RightHip,
                LandmarkIndex::RightAnkle,
            ),
        };

        let shoulder = pose.pixel(shoulder_idx, w, h);
        let elbow = pose.pixel(elbow_idx, w, h);
        let wrist = pose.pixel(wrist_idx, w, h);
        let hip = pose.pixel(hip_idx, w, h);
        let ankle = pose.pixel(ankle_idx, w, h);

        let Some(elbow_angle) = joint_angle(shoulder, elbow, wrist) else {
            return;
        };
        let form = self.good_form(shoulder, hip, ankle);
        self.form_ok = form;

        match self.state {
            PushupState::Idle => {
                if elbow_angle < ELBOW_DESCEND_ANGLE && form {
                    self.state = PushupState::Down;
                }
            }
            PushupState::Down => {
                if elbow_angle < ELBOW_BOTTOM_ANGLE && form {
                    self.state = PushupState::Up;
                }
            }
            PushupState::Up => {
                if elbow_angle > ELBOW_LOCKOUT_ANGLE && form {
                    self.count += 1;
                    self.state = PushupState::Idle;
                }
            }
        }
    }

    /// フォーム検査: 種別ごとの体線条件
    fn good_form(&self, shoulder: PixelPoint, hip: PixelPoint, ankle: PixelPoint) -> bool {
        let Some(body_angle) = joint_angle(shoulder, hip, ankle) else {
            return false;
        };
        match self.style {
            PushupStyle::Standard => {
                body_angle >= PLANK_BODY_ANGLE && (shoulder.1 - hip.1).abs() <= PLANK_LEVEL_LIMIT
            }
            PushupStyle::Pike => {
                body_angle >= PIKE_BODY_ANGLE_MIN
                    && body_angle <= PIKE_BODY_ANGLE_MAX
                    && hip.1 <= shoulder.1 - PIKE_HIP_RAISE
            }
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn state_label(&self) -> &'static str {
        match self.state {
            PushupState::Idle => "idle",
            PushupState::Down => "down",
            PushupState::Up => "up",
        }
    }

    pub fn side(&self) -> Option<Side> {
        self.side
    }

    /// カウントと状態を初期化する。計測側の選択は維持する
    pub fn reset(&mut self) {
        self.state = PushupState::Idle;
        self.count = 0;
        self.form_ok = true;
    }

    pub(crate) fn overlay_color(&self) -> u32 {
        if !self.form_ok {
            BAD_FORM_COLOR
        } else if self.state == PushupState::Idle {
            NEUTRAL_COLOR
        } else {
            GOOD_FORM_COLOR
        }
    }
}

/// 肘の可視性が高い側を計測側に選ぶ。どちらの肘も閾値未満なら選ばない
fn choose_side(pose: &Pose, visibility_threshold: f32) -> Option<Side> {
    let left = pose.get(LandmarkIndex::LeftElbow).visibility;
    let right = pose.get(LandmarkIndex::RightElbow).visibility;
    if left.max(right) < visibility_threshold {
        return None;
    }
    Some(if left >= right { Side::Left } else { Side::Right })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::Landmark;

    fn lm(px: f32, py: f32) -> Landmark {
        Landmark::new(px / 640.0, py / 480.0, 0.9)
    }

    fn faint(px: f32, py: f32) -> Landmark {
        Landmark::new(px / 640.0, py / 480.0, 0.2)
    }

    /// 左向きプランク。肘角度と腰の沈み量を指定
    fn plank_pose(elbow_deg: f32, hip_sag_px: f32) -> PoseEstimate {
        let mut landmarks = [Landmark::default(); LandmarkIndex::COUNT];
        let rad = elbow_deg.to_radians();
        landmarks[LandmarkIndex::LeftShoulder as usize] = lm(150.0, 300.0);
        landmarks[LandmarkIndex::LeftElbow as usize] = lm(150.0, 380.0);
        landmarks[LandmarkIndex::LeftWrist as usize] =
            lm(150.0 + 80.0 * rad.sin(), 380.0 - 80.0 * rad.cos());
        landmarks[LandmarkIndex::LeftHip as usize] = lm(300.0, 300.0 + hip_sag_px);
        landmarks[LandmarkIndex::LeftAnkle as usize] = lm(450.0, 300.0);
        landmarks[LandmarkIndex::RightElbow as usize] = faint(150.0, 380.0);
        PoseEstimate::new(vec![Pose::new(landmarks)], 640, 480)
    }

    /// 右向きプランク。左側のランドマークは検出されていない想定
    fn right_plank_pose(elbow_deg: f32, hip_sag_px: f32) -> PoseEstimate {
        let mut landmarks = [Landmark::default(); LandmarkIndex::COUNT];
        let rad = elbow_deg.to_radians();
        landmarks[LandmarkIndex::RightShoulder as usize] = lm(150.0, 300.0);
        landmarks[LandmarkIndex::RightElbow as usize] = lm(150.0, 380.0);
        landmarks[LandmarkIndex::RightWrist as usize] =
            lm(150.0 + 80.0 * rad.sin(), 380.0 - 80.0 * rad.cos());
        landmarks[LandmarkIndex::RightHip as usize] = lm(300.0, 300.0 + hip_sag_px);
        landmarks[LandmarkIndex::RightAnkle as usize] = lm(450.0, 300.0);
        PoseEstimate::new(vec![Pose::new(landmarks)], 640, 480)
    }

    /// 逆V字ポーズ。腰は肩より60px高い
    fn pike_pose(elbow_deg: f32) -> PoseEstimate {
        let mut landmarks = [Landmark::default(); LandmarkIndex::COUNT];
        let rad = elbow_deg.to_radians();
        landmarks[LandmarkIndex::LeftShoulder as usize] = lm(200.0, 300.0);
        landmarks[LandmarkIndex::LeftElbow as usize] = lm(200.0, 380.0);
        landmarks[LandmarkIndex::LeftWrist as usize] =
            lm(200.0 + 80.0 * rad.sin(), 380.0 - 80.0 * rad.cos());
        landmarks[LandmarkIndex::LeftHip as usize] = lm(320.0, 240.0);
        landmarks[LandmarkIndex::LeftAnkle as usize] = lm(440.0, 330.0);
        landmarks[LandmarkIndex::RightElbow as usize] = faint(200.0, 380.0);
        PoseEstimate::new(vec![Pose::new(landmarks)], 640, 480)
    }

    #[test]
    fn test_standard_full_rep() {
        let mut counter = PushupCounter::new(PushupStyle::Standard, 0.5);
        counter.update(&plank_pose(170.0, 10.0));
        assert_eq!(counter.state_label(), "idle");
        counter.update(&plank_pose(120.0, 10.0));
        assert_eq!(counter.state_label(), "down");
        counter.update(&plank_pose(80.0, 10.0));
        assert_eq!(counter.state_label(), "up");
        counter.update(&plank_pose(170.0, 10.0));
        assert_eq!(counter.count(), 1);
        assert_eq!(counter.state_label(), "idle");
    }

    #[test]
    fn test_sagging_hips_block_transition() {
        let mut counter = PushupCounter::new(PushupStyle::Standard, 0.5);
        // 腰が50px落ちている: 体線もレベル差も不合格
        counter.update(&plank_pose(120.0, 50.0));
        assert_eq!(counter.state_label(), "idle");
        // フォームを直せば同じ肘角度で遷移する
        counter.update(&plank_pose(120.0, 10.0));
        assert_eq!(counter.state_label(), "down");
    }

    #[test]
    fn test_lockout_with_bad_form_does_not_count() {
        let mut counter = PushupCounter::new(PushupStyle::Standard, 0.5);
        counter.update(&plank_pose(120.0, 10.0));
        counter.update(&plank_pose(80.0, 10.0));
        assert_eq!(counter.state_label(), "up");
        // 腰を落としたまま肘を伸ばしてもカウントしない
        counter.update(&plank_pose(170.0, 50.0));
        assert_eq!(counter.count(), 0);
        assert_eq!(counter.state_label(), "up");
        counter.update(&plank_pose(170.0, 10.0));
        assert_eq!(counter.count(), 1);
    }

    #[test]
    fn test_pike_full_rep() {
        let mut counter = PushupCounter::new(PushupStyle::Pike, 0.5);
        counter.update(&pike_pose(170.0));
        counter.update(&pike_pose(120.0));
        assert_eq!(counter.state_label(), "down");
        counter.update(&pike_pose(80.0));
        counter.update(&pike_pose(170.0));
        assert_eq!(counter.count(), 1);
    }

    #[test]
    fn test_pike_rejects_flat_body() {
        let mut counter = PushupCounter::new(PushupStyle::Pike, 0.5);
        // まっすぐなプランク姿勢は逆V字の条件を満たさない
        counter.update(&plank_pose(120.0, 10.0));
        assert_eq!(counter.state_label(), "idle");
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn test_side_selection_waits_for_confident_elbow() {
        let mut counter = PushupCounter::new(PushupStyle::Standard, 0.5);
        // どちらの肘も可視性ゼロのフレームでは計測側を決めない
        counter.update(&PoseEstimate::new(vec![Pose::default()], 640, 480));
        assert_eq!(counter.side(), None);

        // その後に右側がはっきり写れば右側を選び、通常どおりカウントする
        counter.update(&right_plank_pose(170.0, 10.0));
        assert_eq!(counter.side(), Some(Side::Right));
        counter.update(&right_plank_pose(120.0, 10.0));
        counter.update(&right_plank_pose(80.0, 10.0));
        counter.update(&right_plank_pose(170.0, 10.0));
        assert_eq!(counter.count(), 1);
    }

    #[test]
    fn test_side_chosen_by_elbow_visibility() {
        let mut counter = PushupCounter::new(PushupStyle::Standard, 0.5);
        counter.update(&plank_pose(170.0, 10.0));
        assert_eq!(counter.side(), Some(Side::Left));

        // 右肘の可視性が高いポーズでは右側を選ぶ
        let mut landmarks = [Landmark::default(); LandmarkIndex::COUNT];
        landmarks[LandmarkIndex::LeftElbow as usize] = faint(150.0, 380.0);
        landmarks[LandmarkIndex::RightElbow as usize] = lm(150.0, 380.0);
        let mut other = PushupCounter::new(PushupStyle::Standard, 0.5);
        other.update(&PoseEstimate::new(vec![Pose::new(landmarks)], 640, 480));
        assert_eq!(other.side(), Some(Side::Right));
    }

    #[test]
    fn test_reset_keeps_side() {
        let mut counter = PushupCounter::new(PushupStyle::Standard, 0.5);
        counter.update(&plank_pose(170.0, 10.0));
        counter.update(&plank_pose(120.0, 10.0));
        counter.reset();
        assert_eq!(counter.count(), 0);
        assert_eq!(counter.state_label(), "idle");
        assert_eq!(counter.side(), Some(Side::Left));
    }
}
