use thiserror::Error;

pub mod anim;
pub mod layout;
pub mod model;
pub mod view;

pub use anim::{AnimationSpec, AnimationState, Easing};
pub use layout::{HitResult, Point, RingLayout};
pub use model::{MenuOptions, RadialMenu, Slice, SliceContent, TapEvent};
pub use view::draw;

/// Angular offset that aligns slice 0's wedge with the top of the ring.
/// Shared by hit-testing and drawing so the two can never drift apart.
pub const ANGULAR_ORIGIN_DEG: f64 = 112.5;
/// Hit-test inner boundary as a fraction of the outer radius. Independent of
/// the drawn ring thickness.
pub const HIT_INNER_RATIO: f64 = 0.5;
pub const OUTLINE_EXTRA_WIDTH: f64 = 4.0; // bg arc pokes out behind the colored arc
pub const LABEL_FONT_SIZE: f64 = 12.0;
pub const CLOSE_GLYPH_SIZE: f64 = 14.0;
pub const CENTER_ICON_SIZE: f64 = 30.0;
pub const CENTER_ICON_ALPHA: f64 = 0.4;
pub const ICON_SOURCE_SIZE: i32 = 256; // icons are loaded large and scaled at draw time
pub const FRAME_INTERVAL_MS: u64 = 16;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MenuError {
    #[error("menu configuration invalid: {0}")]
    Configuration(String),
    #[error("slice {index} content invalid: {reason}")]
    InvalidContent { index: usize, reason: String },
}
