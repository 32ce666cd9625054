use crate::*;
use crate::config::TrayButtonOptions;
use crate::graphics::{ButtonIcon, render_button};
use crate::system::{
    MouseHookRegistration, ShellEventHook, enumerate_taskbar_children, locate_taskbar, window_rect,
};
use crate::tray::{
    BoundedRetry, ButtonVisualState, CededSpace, MessageHandler, MouseUpEvent, PlacementResult, PointerEvent,
    ScreenRect, TaskbarLayout, TrayButtonResult, WindowMessage, compute_free_space,
    compute_placement,
};
use crate::window::{SELF_HEAL_TIMER_ID, Tooltip, apply_placement, move_window};
use tracing::{debug, info, warn};
use windows::Win32::UI::Input::KeyboardAndMouse::{TME_LEAVE, TRACKMOUSEEVENT, TrackMouseEvent};

/// 按钮窗口的全部可变状态，只在窗口线程上访问
pub struct ButtonCore {
    hwnd: HWND,
    options: TrayButtonOptions,
    icon: Option<Rc<ButtonIcon>>,
    tooltip: Option<Tooltip>,
    text: Option<String>,
    state: ButtonVisualState,
    tracking_leave: bool,
    position: Option<ScreenRect>,
    layout: Option<TaskbarLayout>,
    ceded: Option<CededSpace>,
    self_heal: BoundedRetry,
    mouse_hook: Option<MouseHookRegistration>,
    shell_hook: Option<ShellEventHook>,
    pending_clicks: Vec<MouseUpEvent>,
}

impl ButtonCore {
    pub fn new(
        hwnd: HWND,
        options: TrayButtonOptions,
        icon: Option<Rc<ButtonIcon>>,
        tooltip: Option<Tooltip>,
    ) -> Self {
        let self_heal = options.self_heal_retry();
        Self {
            hwnd,
            options,
            icon,
            tooltip,
            text: None,
            state: ButtonVisualState::empty(),
            tracking_leave: false,
            position: None,
            layout: None,
            ceded: None,
            self_heal,
            mouse_hook: None,
            shell_hook: None,
            pending_clicks: Vec::new(),
        }
    }

    pub fn attach_mouse_hook(&mut self, registration: MouseHookRegistration) {
        if let Some(position) = self.position {
            registration.set_region(position);
        }
        self.mouse_hook = Some(registration);
    }

    pub fn attach_shell_hook(&mut self, hook: ShellEventHook) {
        self.shell_hook = Some(hook);
    }

    pub fn position(&self) -> Option<ScreenRect> {
        self.position
    }

    pub fn layout(&self) -> Option<TaskbarLayout> {
        self.layout
    }

    pub fn set_icon(&mut self, icon: Option<Rc<ButtonIcon>>) {
        self.icon = icon;
        self.render();
    }

    pub fn set_text(&mut self, text: Option<String>) {
        self.text = text;
        if let Some(tooltip) = self.tooltip.as_mut() {
            tooltip.set_text(self.text.as_deref());
        }
    }

    /// 取出尚未交给宿主的点击
    pub fn take_clicks(&mut self) -> Vec<MouseUpEvent> {
        std::mem::take(&mut self.pending_clicks)
    }

    /// 执行一次定位：解析任务栏、计算空闲区域、必要时移动窗口
    pub fn reposition(&mut self) -> TrayButtonResult<PlacementResult> {
        let topology = locate_taskbar()?;
        let siblings = enumerate_taskbar_children(topology.taskbar);
        let free = compute_free_space(&topology.layout, &siblings, Some(self.hwnd.0 as isize));

        let current = if unsafe { IsWindowVisible(self.hwnd) }.as_bool() {
            window_rect(self.hwnd)
        } else {
            None
        };

        let result = compute_placement(&topology.layout, &free, current, self.options.size_ratio)?;
        self.layout = Some(topology.layout);

        let Some(target) = result.target else {
            debug!("托盘按钮位置仍然有效");
            self.update_position(current);
            return Ok(result);
        };

        apply_placement(&topology, self.hwnd, &result)?;
        if let Some(task_list) = result.task_list {
            self.ceded = Some(CededSpace::record(self.ceded, topology.layout.task_list, task_list));
        }
        info!(
            "托盘按钮已移动: {} -> {} (间隙中有 {} 个其他按钮)",
            current.map(|r| r.to_string()).unwrap_or_else(|| "无".to_string()),
            target,
            free.obstructing.len()
        );

        self.update_position(Some(target));
        self.render();
        Ok(result)
    }

    /// 定位失败只记录日志，等待下一次触发
    pub fn reposition_logged(&mut self) {
        if let Err(error) = self.reposition() {
            warn!("托盘按钮定位失败，等待下次触发: {}", error);
        }
    }

    fn update_position(&mut self, position: Option<ScreenRect>) {
        if self.position == position {
            return;
        }
        self.position = position;

        if let Some(position) = position {
            if let Some(hook) = self.mouse_hook.as_ref() {
                hook.set_region(position);
            }
            if let Some(tooltip) = self.tooltip.as_mut() {
                tooltip.set_client_rect(Self::client_rect(position));
            }
        }
    }

    fn client_rect(position: ScreenRect) -> ScreenRect {
        ScreenRect::from_origin_size(0, 0, position.width(), position.height())
    }

    fn render(&mut self) {
        let Some(position) = self.position else {
            return;
        };

        let icon = self.icon.as_ref().map(|icon| icon.handle());
        if let Err(error) = render_button(
            self.hwnd,
            position.width(),
            position.height(),
            icon,
            self.state,
        ) {
            warn!("{}", error);
        }
    }

    fn start_self_heal(&mut self) {
        if self.self_heal.start() {
            return;
        }

        let timer = unsafe {
            SetTimer(
                Some(self.hwnd),
                SELF_HEAL_TIMER_ID,
                self.self_heal.interval_ms(),
                None,
            )
        };
        if timer == 0 {
            warn!("启动自愈定时器失败");
            self.self_heal.stop();
            return;
        }
        info!("开始自愈重检");
    }

    fn on_self_heal_tick(&mut self) {
        if self.self_heal.tick() {
            self.reposition_logged();
        }
        if !self.self_heal.is_active() {
            self.stop_self_heal();
        }
    }

    fn stop_self_heal(&mut self) {
        self.self_heal.stop();
        if unsafe { KillTimer(Some(self.hwnd), SELF_HEAL_TIMER_ID) }.is_ok() {
            debug!("自愈重检结束");
        }
    }

    fn track_leave(&mut self) {
        if self.tracking_leave {
            return;
        }

        let mut request = TRACKMOUSEEVENT {
            cbSize: std::mem::size_of::<TRACKMOUSEEVENT>() as u32,
            dwFlags: TME_LEAVE,
            hwndTrack: self.hwnd,
            dwHoverTime: 0,
        };
        self.tracking_leave = unsafe { TrackMouseEvent(&mut request) }.is_ok();
    }

    fn process_pointer(&mut self, event: PointerEvent, inside: bool, x: i32, y: i32) {
        let transition = self.state.apply(event, inside);
        if transition.changed {
            self.render();
        }
        if let Some(button) = transition.click {
            self.pending_clicks.push(MouseUpEvent { button, x, y });
        }
    }

    fn on_native_pointer(&mut self, event: PointerEvent, x: i32, y: i32) {
        match event {
            PointerEvent::Leave => self.tracking_leave = false,
            _ => self.track_leave(),
        }

        let inside = self
            .position
            .map(|position| Self::client_rect(position).contains_point(x, y))
            .unwrap_or(false);
        self.process_pointer(event, inside, x, y);
    }

    fn drain_hook_input(&mut self) {
        let Some(inputs) = self.mouse_hook.as_ref().map(|hook| hook.drain()) else {
            return;
        };
        let Some(position) = self.position else {
            return;
        };

        for input in inputs {
            let (x, y) = position.to_local(input.x, input.y);
            self.process_pointer(input.event, input.inside, x, y);
        }
    }

    /// 停止定时器、卸载钩子、销毁提示框，并归还让出的空间
    pub fn teardown(&mut self) {
        self.stop_self_heal();
        self.mouse_hook = None;
        self.shell_hook = None;
        self.tooltip = None;
        self.state = ButtonVisualState::empty();
        self.pending_clicks.clear();

        self.position = None;
        let Some(ceded) = self.ceded.take() else {
            return;
        };

        match locate_taskbar() {
            Ok(topology) => {
                if let Some(task_list) = ceded.reclaimed_task_list(&topology.layout) {
                    match move_window(
                        topology.task_list,
                        None,
                        task_list,
                        SWP_NOZORDER | SWP_NOACTIVATE,
                    ) {
                        Ok(()) => debug!("任务按钮容器已恢复为 {}", task_list),
                        Err(error) => warn!("恢复任务按钮容器失败: {}", error),
                    }
                }
            }
            Err(error) => debug!("按钮移除时未找到任务栏: {}", error),
        }
    }
}

impl MessageHandler for ButtonCore {
    fn handle(&mut self, message: WindowMessage) -> Option<isize> {
        match message {
            WindowMessage::Pointer { event, x, y } => {
                // 钩子启用时以钩子为唯一输入来源
                if self.mouse_hook.is_none() {
                    self.on_native_pointer(event, x, y);
                }
                Some(0)
            }
            WindowMessage::HookInputAvailable => {
                self.drain_hook_input();
                Some(0)
            }
            WindowMessage::Paint => {
                self.render();
                None
            }
            WindowMessage::EraseBackground => Some(1),
            WindowMessage::Resized { width, height } => {
                if let Some(tooltip) = self.tooltip.as_mut() {
                    tooltip.set_client_rect(ScreenRect::from_origin_size(0, 0, width, height));
                }
                None
            }
            WindowMessage::Timer(id) if id == SELF_HEAL_TIMER_ID => {
                self.on_self_heal_tick();
                Some(0)
            }
            WindowMessage::DisplaySettingsChanged => {
                info!("显示设置已变化，重新定位托盘按钮");
                self.reposition_logged();
                self.start_self_heal();
                Some(0)
            }
            WindowMessage::ShellLayoutChanged => {
                self.start_self_heal();
                Some(0)
            }
            WindowMessage::MouseActivate => Some(MA_NOACTIVATE as isize),
            WindowMessage::Destroy => {
                self.stop_self_heal();
                None
            }
            WindowMessage::Timer(_) | WindowMessage::Other(_) => None,
        }
    }
}
