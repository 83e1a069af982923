//! Vernissage is a choreographed reveal engine for an artwork gallery entrance.
//!
//! It ties together three visual pieces under one four-state choreography:
//!
//! - Sprite-sheet playback, scrubbed by timelines and drawn cover-fit onto a [`Surface`]
//! - A [`DepthCarousel`] flying a virtual camera through flat artwork layers
//! - Procedural brush strokes accumulated into a monotone [`RevealMask`]
//!
//! The host owns an [`Engine`], feeds it [`EngineInput`]s and calls
//! [`Engine::frame`] from its display clock. Everything runs on that one thread.
#![forbid(unsafe_code)]

mod assets;
mod foundation;

pub(crate) mod animation;
pub(crate) mod carousel;
pub(crate) mod choreography;
/// Engine configuration loaded from JSON.
pub mod config;
pub(crate) mod mask;
pub(crate) mod render;
pub(crate) mod sprite;

pub use crate::foundation::core::{
    Affine, BezPath, Epoch, Fps, FrameIndex, Point, Rect, Vec2, Viewport,
};
pub use crate::foundation::error::{VernissageError, VernissageResult};

pub use crate::animation::ease::Ease;
pub use crate::animation::proc::{Rng64, SineStack};
pub use crate::animation::timeline::{
    FrameClock, ManualClock, RunHandle, Scheduler, SystemClock, Timeline, TimelineStatus,
    TimelineTick,
};
pub use crate::assets::PreparedImage;
pub use crate::assets::decode::{decode_image, decode_sheets, load_image};
pub use crate::carousel::camera::{CameraMotion, CameraState};
pub use crate::carousel::depth::{CarouselConfig, CarouselMode, CarouselTick, DepthCarousel};
pub use crate::carousel::layers::{CarouselLayer, Placement, depth_opacity, place};
pub use crate::choreography::engine::{Engine, EngineEvent, EngineInput};
pub use crate::choreography::ownership::{OwnershipRegistry, OwnershipToken};
pub use crate::choreography::state::{
    Applied, ChoreographyMachine, ChoreographyState, TimelineSlot, Transition, Trigger,
};
pub use crate::config::{EngineConfig, HandoffConfig, SpriteConfig, TimelineConfig};
pub use crate::mask::outline::{edge_profile, layer_outline, taper};
pub use crate::mask::reveal::{
    RevealMask, StrokeState, render_coverage, settle_time_ms, shapes_at, spread_scale,
};
pub use crate::mask::stroke::{MaskConfig, MotionKind, Stroke, generate, generate_with};
pub use crate::render::composite::{PremulRgba8, apply_reveal_mask};
pub use crate::render::surface::Surface;
pub use crate::sprite::renderer::{CoverFit, DrawOutcome, SheetStatus, SpriteRenderer};
pub use crate::sprite::sheet::{FrameDescriptor, FrameTable, SheetLayout, SheetRef};
