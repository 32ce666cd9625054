pub mod config;
pub mod tray;

#[cfg(windows)]
pub mod widget;
#[cfg(windows)]
pub mod window;
#[cfg(windows)]
pub mod graphics;
#[cfg(windows)]
pub mod font;
#[cfg(windows)]
pub mod system;
#[cfg(windows)]
pub mod app;

// 导出主要的公共类型
pub use config::{AppConfig, MouseHookMode, TrayButtonOptions};
pub use tray::{MouseButtonKind, MouseUpEvent, ScreenRect, TrayButtonError, TrayButtonResult};

#[cfg(windows)]
pub use widget::TrayButton;
#[cfg(windows)]
pub use graphics::ButtonIcon;
#[cfg(windows)]
pub use app::{App, AppEvent};

// 重新导出常用的 Windows API 类型
#[cfg(windows)]
pub use windows::{
    core::*,
    Win32::Foundation::*,
    Win32::UI::WindowsAndMessaging::*,
    Win32::UI::Accessibility::*,
};

// 重新导出 winit 相关类型
#[cfg(windows)]
pub use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::EventLoop,
    window::{Window, WindowLevel},
    dpi::{PhysicalPosition, PhysicalSize},
    raw_window_handle::{HasWindowHandle, RawWindowHandle},
};

// 重新导出其他常用类型
#[cfg(windows)]
pub use softbuffer::{Context, Surface};
#[cfg(windows)]
pub use fontdue::{Font, FontSettings};
pub use std::{rc::Rc, time::{Duration, Instant}, num::NonZeroU32};
