mod events;
mod mouse_hook;
mod os_version;
mod taskbar;

pub use events::*;
pub use mouse_hook::*;
pub use os_version::*;
pub use taskbar::*;
