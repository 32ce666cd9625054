use crate::*;
use crate::config::AppConfig;
use crate::font::FontManager;
use crate::graphics::{BarStyle, ButtonIcon, Renderer, layout_bar};
use crate::tray::{MouseButtonKind, MouseUpEvent, popup_origin};
use crate::widget::TrayButton;
use crate::window::{create_bar_window, monitor_rect_for, set_bar_position};
use tracing::{debug, error, info, warn};
use winit::event::ElementState;
use winit::event_loop::{ActiveEventLoop, EventLoopProxy};
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowId;

/// 失焦隐藏后短时间内忽略按钮点击，否则点按钮关闭弹出条会让它立刻重新打开
const REOPEN_GRACE: Duration = Duration::from_millis(300);

/// 从按钮窗口过程转交给事件循环的事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    TrayMouseUp(MouseUpEvent),
}

/// 点击按钮后弹出的条目栏
struct BarWindow {
    window: Rc<Window>,
    renderer: Renderer,
    width: u32,
    height: u32,
    visible: bool,
    hidden_by_focus_at: Option<Instant>,
}

/// 应用程序主结构体
pub struct App {
    config: AppConfig,
    button: TrayButton,
    font_manager: FontManager,
    style: BarStyle,
    bar: Option<BarWindow>,
    started: bool,
}

impl App {
    pub fn new(config: AppConfig, proxy: EventLoopProxy<AppEvent>) -> Self {
        let mut button = TrayButton::new(config.button.clone());

        // 回调运行在按钮的窗口过程中，只投递事件，由事件循环处理
        button.on_mouse_up(move |event| {
            if proxy.send_event(AppEvent::TrayMouseUp(event)).is_err() {
                debug!("事件循环已关闭，丢弃点击");
            }
        });

        Self {
            config,
            button,
            font_manager: FontManager::new(),
            style: BarStyle::default(),
            bar: None,
            started: false,
        }
    }

    /// 读取配置中的图标，失败时退回系统应用图标
    fn load_icon(&self) -> Option<ButtonIcon> {
        if let Some(path) = &self.config.icon_path {
            match ButtonIcon::from_file(path) {
                Ok(icon) => return Some(icon),
                Err(error) => warn!("{}，使用默认图标", error),
            }
        }

        ButtonIcon::application_default()
            .map_err(|error| warn!("{}", error))
            .ok()
    }

    fn create_bar(&self, event_loop: &ActiveEventLoop) -> std::result::Result<BarWindow, String> {
        let (_, width, height) = layout_bar(&self.config.bar_items, &self.font_manager, &self.style);
        let window = create_bar_window(event_loop, width, height)?;

        let mut renderer = Renderer::new();
        renderer.initialize(&window)?;

        Ok(BarWindow {
            window,
            renderer,
            width,
            height,
            visible: false,
            hidden_by_focus_at: None,
        })
    }

    fn toggle_bar(&mut self) {
        let Some(bar) = self.bar.as_ref() else {
            return;
        };

        if bar.visible {
            self.hide_bar(false);
        } else if bar
            .hidden_by_focus_at
            .is_some_and(|hidden_at| hidden_at.elapsed() < REOPEN_GRACE)
        {
            debug!("弹出条刚因失焦关闭，忽略本次点击");
        } else {
            self.show_bar();
        }
    }

    fn show_bar(&mut self) {
        let Some(bar) = self.bar.as_mut() else {
            return;
        };
        let (Some(button), Some(layout)) =
            (self.button.position_and_size(), self.button.taskbar_layout())
        else {
            warn!("托盘按钮尚未定位，无法显示弹出条");
            return;
        };

        let (_, width, height) = layout_bar(&self.config.bar_items, &self.font_manager, &self.style);
        let screen = monitor_rect_for(button);
        let (x, y) = popup_origin(button, (width as i32, height as i32), &layout, screen);

        bar.width = width;
        bar.height = height;
        let _ = bar.window.request_inner_size(PhysicalSize::new(width, height));

        if let Err(error) = set_bar_position(&bar.window, x, y, width, height) {
            warn!("{}", error);
            return;
        }

        bar.visible = true;
        bar.hidden_by_focus_at = None;
        bar.window.focus_window();
        bar.window.request_redraw();
        debug!("弹出条显示在 ({}, {})", x, y);
    }

    fn hide_bar(&mut self, focus_lost: bool) {
        let Some(bar) = self.bar.as_mut() else {
            return;
        };
        if !bar.visible {
            return;
        }

        bar.window.set_visible(false);
        bar.visible = false;
        bar.hidden_by_focus_at = focus_lost.then(Instant::now);
        debug!("弹出条已隐藏");
    }
}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.started {
            return;
        }
        self.started = true;

        match self.create_bar(event_loop) {
            Ok(bar) => self.bar = Some(bar),
            Err(error) => warn!("{}", error),
        }

        let icon = self.load_icon();
        self.button.set_icon(icon);
        self.button.set_text(self.config.tooltip.clone());

        // 首次创建失败时宿主应改用其他入口，这里直接退出
        if let Err(error) = self.button.set_visible(true) {
            error!("无法在任务栏上放置按钮: {}", error);
            event_loop.exit();
            return;
        }

        info!("托盘按钮已就绪");
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            AppEvent::TrayMouseUp(click) => match click.button {
                MouseButtonKind::Left => self.toggle_bar(),
                MouseButtonKind::Right => self.hide_bar(false),
            },
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(bar) = self.bar.as_mut() else {
            return;
        };
        if bar.window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::RedrawRequested => {
                if bar.visible {
                    if let Err(error) = bar.renderer.draw_bar(
                        &self.config.bar_items,
                        &self.font_manager,
                        &self.style,
                        bar.width,
                        bar.height,
                    ) {
                        warn!("绘制弹出条失败: {}", error);
                    }
                }
            }
            WindowEvent::Focused(false) => self.hide_bar(true),
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.logical_key == Key::Named(NamedKey::Escape) =>
            {
                self.hide_bar(false)
            }
            WindowEvent::CloseRequested => self.hide_bar(false),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.button.dispose();
        info!("托盘按钮已释放");
    }
}
