pub mod bridge;
pub mod lunge;
pub mod manager;
pub mod pushup;
pub mod situp;
pub mod squat;
pub mod superman;
pub mod timed;

pub use bridge::GluteBridgeCounter;
pub use lunge::LungeCounter;
pub use manager::{ExerciseKind, ExerciseManager, ManagerSnapshot, RepCounter};
pub use pushup::{PushupCounter, PushupStyle};
pub use situp::SitupCounter;
pub use squat::SquatCounter;
pub use superman::SupermanCounter;
pub use timed::TimedActivity;

/// 計測に使う体側
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}
