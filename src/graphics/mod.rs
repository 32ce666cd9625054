mod icon;
mod paint;
mod renderer;

pub use icon::*;
pub use paint::*;
pub use renderer::*;
