pub mod overlay;
pub mod skeleton;

pub use overlay::FrameBuffer;
pub use skeleton::{BAD_FORM_COLOR, GOOD_FORM_COLOR, NEUTRAL_COLOR, SKELETON_CONNECTIONS};
