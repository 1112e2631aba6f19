use thiserror::Error;

/// ドメイン操作のエラー型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoachError {
    /// 登録されていない種目名が指定された
    #[error("unknown exercise: {0}")]
    UnknownExercise(String),

    /// 存在しないセッションIDが指定された
    #[error("unknown session: {0}")]
    UnknownSession(String),

    /// ワークアウト開始前にカウンタ操作が要求された
    #[error("no active workout")]
    NoActiveWorkout,

    /// フレーム寸法が描画バッファの画素上限を超えている
    #[error("frame dimensions {width}x{height} exceed the pixel budget")]
    OversizedFrame { width: u32, height: u32 },
}

impl CoachError {
    pub fn unknown_exercise(name: impl Into<String>) -> Self {
        Self::UnknownExercise(name.into())
    }

    pub fn unknown_session(id: impl Into<String>) -> Self {
        Self::UnknownSession(id.into())
    }

    /// 接続を維持したまま処理を続行できるエラーか
    /// （全variantがリクエスト単位の失敗なので現状は常にtrue）
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnknownExercise(_)
                | Self::UnknownSession(_)
                | Self::NoActiveWorkout
                | Self::OversizedFrame { .. }
        )
    }
}
