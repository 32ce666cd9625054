pub mod errors;
pub mod free_space;
pub mod geometry;
pub mod message;
pub mod placement;
pub mod retry;
pub mod topology;
pub mod visibility;
pub mod visual_state;

pub use errors::*;
pub use free_space::{available_rect, compute_free_space, gap_rect, FreeSpace, SiblingWindow};
pub use geometry::ScreenRect;
pub use message::{MessageHandler, MouseUpEvent, WindowMessage};
pub use placement::{
    button_size, compute_placement, popup_origin, CededSpace, PlacementResult,
    DEFAULT_SIZE_RATIO,
};
pub use retry::BoundedRetry;
pub use topology::{Orientation, TaskbarLayout};
pub use visibility::{Visibility, VisibilityAction};
pub use visual_state::{
    centered_icon_origin, icon_size_for_thickness, ButtonVisualState, MouseButtonKind,
    PointerEvent, PointerTracker, RawPointer, Transition,
};
