use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::CoachError;
use crate::exercise::{ExerciseManager, ManagerSnapshot};
use crate::pose::PoseEstimate;
use crate::render::FrameBuffer;

/// 注釈フレームの画素数上限。ワイヤの16MiBフレーム上限を
/// 4バイト画素で割った値で、これを超える寸法のキャンバスは確保しない。
const MAX_FRAME_PIXELS: u64 = 4 * 1024 * 1024;

/// 1フレーム処理の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameReport {
    /// アクティブ種目のカウント状況。ワークアウト未開始ならNone
    pub snapshot: Option<ManagerSnapshot>,
    /// フレームに複数人が写っていたか（先頭の1人のみ計測対象）
    pub multiple_people: bool,
}

/// 1ユーザ分のセッション状態
struct UserSession {
    manager: Option<ExerciseManager>,
    latest_frame: Option<FrameBuffer>,
    /// 直近の人が写っていたフレームで複数人を検出したか
    multiple_people: bool,
}

impl UserSession {
    fn new() -> Self {
        Self {
            manager: None,
            latest_frame: None,
            multiple_people: false,
        }
    }
}

struct RegistryInner {
    sessions: RwLock<HashMap<String, Arc<Mutex<UserSession>>>>,
    visibility_threshold: f32,
}

/// セッションの台帳
///
/// 接続タスク間で共有するためクローンは安価（Arc共有）。
/// セッションごとのMutexでフレーム更新とリセットを直列化する。
#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<RegistryInner>,
}

impl SessionRegistry {
    pub fn new(visibility_threshold: f32) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                sessions: RwLock::new(HashMap::new()),
                visibility_threshold,
            }),
        }
    }

    fn lookup(&self, id: &str) -> Result<Arc<Mutex<UserSession>>, CoachError> {
        self.inner
            .sessions
            .read()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| CoachError::unknown_session(id))
    }

    /// セッションを開く。既に開いていれば何もしない
    pub fn open(&self, id: &str) {
        let mut sessions = self.inner.sessions.write().unwrap();
        if sessions.contains_key(id) {
            debug!(session = id, "session already open");
            return;
        }
        sessions.insert(id.to_string(), Arc::new(Mutex::new(UserSession::new())));
        info!(session = id, total = sessions.len(), "session opened");
    }

    pub fn close(&self, id: &str) -> Result<(), CoachError> {
        let mut sessions = self.inner.sessions.write().unwrap();
        match sessions.remove(id) {
            Some(_) => {
                info!(session = id, total = sessions.len(), "session closed");
                Ok(())
            }
            None => Err(CoachError::unknown_session(id)),
        }
    }

    pub fn session_count(&self) -> usize {
        self.inner.sessions.read().unwrap().len()
    }

    /// ワークアウトを開始する。既存のワークアウトは丸ごと置き換える。
    /// 受理された種目名を返す
    pub fn start_workout(
        &self,
        id: &str,
        exercises: &[String],
    ) -> Result<Vec<&'static str>, CoachError> {
        let session = self.lookup(id)?;
        let manager = ExerciseManager::new(exercises, self.inner.visibility_threshold);
        let accepted = manager.exercise_names();
        info!(session = id, exercises = ?accepted, "workout started");
        session.lock().unwrap().manager = Some(manager);
        Ok(accepted)
    }

    pub fn switch_exercise(&self, id: &str, exercise: &str) -> Result<(), CoachError> {
        let session = self.lookup(id)?;
        let mut session = session.lock().unwrap();
        match session.manager.as_mut() {
            Some(manager) => manager.switch(exercise),
            None => Err(CoachError::NoActiveWorkout),
        }
    }

    /// アクティブ種目のカウントをゼロに戻す
    pub fn reset_counter(&self, id: &str) -> Result<(), CoachError> {
        let session = self.lookup(id)?;
        let mut session = session.lock().unwrap();
        match session.manager.as_mut() {
            Some(manager) => {
                manager.reset_active();
                Ok(())
            }
            None => Err(CoachError::NoActiveWorkout),
        }
    }

    /// 1フレーム分の推定結果を取り込む
    ///
    /// 人が写っていないフレームは何も更新せず現在のスナップショットを
    /// 返す。pixelsが与えられればその上に、なければ推定結果と同じ寸法の
    /// 黒キャンバスに骨格を描き、セッションの最新フレームとして保存する。
    /// 画素数が上限を超える寸法はセッションに触れずエラーを返す。
    pub fn process_frame(
        &self,
        id: &str,
        estimate: &PoseEstimate,
        pixels: Option<FrameBuffer>,
    ) -> Result<FrameReport, CoachError> {
        let session = self.lookup(id)?;
        let mut guard = session.lock().unwrap();
        let session = &mut *guard;

        if estimate.people.is_empty() {
            let snapshot = session.manager.as_ref().and_then(ExerciseManager::snapshot);
            return Ok(FrameReport {
                snapshot,
                multiple_people: false,
            });
        }

        if estimate.width as u64 * estimate.height as u64 > MAX_FRAME_PIXELS {
            return Err(CoachError::OversizedFrame {
                width: estimate.width,
                height: estimate.height,
            });
        }

        let multiple_people = estimate.multiple_people();
        session.multiple_people = multiple_people;
        let mut frame = pixels
            .filter(FrameBuffer::is_consistent)
            .unwrap_or_else(|| FrameBuffer::new(estimate.width, estimate.height));

        let snapshot = match session.manager.as_mut() {
            Some(manager) => {
                manager.update(estimate);
                manager.render(&mut frame, estimate, self.inner.visibility_threshold);
                manager.snapshot()
            }
            None => None,
        };
        session.latest_frame = Some(frame);

        Ok(FrameReport {
            snapshot,
            multiple_people,
        })
    }

    /// ポーリング用の現在状況。フレームを送らずに問い合わせできる
    pub fn poll(&self, id: &str) -> Result<FrameReport, CoachError> {
        let session = self.lookup(id)?;
        let session = session.lock().unwrap();
        Ok(FrameReport {
            snapshot: session.manager.as_ref().and_then(ExerciseManager::snapshot),
            multiple_people: session.multiple_people,
        })
    }

    /// 直近の注釈付きフレーム
    pub fn latest_frame(&self, id: &str) -> Result<Option<FrameBuffer>, CoachError> {
        let session = self.lookup(id)?;
        let session = session.lock().unwrap();
        Ok(session.latest_frame.clone())
    }
}
