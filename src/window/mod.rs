mod creation;
mod positioning;
mod procedure;
mod state;
mod tooltip;

pub use creation::*;
pub use positioning::*;
pub use procedure::*;
pub use state::*;
pub use tooltip::*;

use crate::*;
use crate::config::TrayButtonOptions;
use crate::graphics::ButtonIcon;
use crate::system::{MouseHookRegistration, ShellEventHook, locate_taskbar, os_build_number};
use crate::tray::{
    MouseUpEvent, PlacementResult, ScreenRect, TaskbarLayout, TrayButtonError, TrayButtonResult,
};
use std::cell::RefCell;
use tracing::{debug, info, warn};

/// 显示设置变化（由监视窗口转发）
pub const WM_APP_DISPLAY_SETTINGS_CHANGED: u32 = WM_APP + 1;
/// 外壳窗口位置变化（由事件钩子投递）
pub const WM_APP_SHELL_LAYOUT_CHANGED: u32 = WM_APP + 2;
/// 低级鼠标钩子队列中有新输入
pub const WM_APP_HOOK_INPUT: u32 = WM_APP + 3;
/// 自愈重检定时器
pub const SELF_HEAL_TIMER_ID: usize = 1;

pub type MouseUpHandler = Box<dyn FnMut(MouseUpEvent)>;
pub type SharedMouseUpHandler = Rc<RefCell<Option<MouseUpHandler>>>;

/// 窗口过程通过 `GWLP_USERDATA` 访问的状态
pub struct ButtonShared {
    pub core: RefCell<ButtonCore>,
    pub handler: SharedMouseUpHandler,
}

/// 按钮的原生窗口及其附属资源
///
/// 每个实例恰好对应一个存活的原生窗口，销毁可重复调用。
pub struct ButtonWindow {
    hwnd: HWND,
    watcher: Option<HWND>,
    shared: Rc<ButtonShared>,
    destroyed: bool,
}

impl ButtonWindow {
    /// 创建按钮窗口并完成首次定位
    ///
    /// 只有找不到任务栏或原生窗口创建失败时返回错误；钩子、提示框或首次
    /// 定位失败只记录日志，由后续触发重试。
    pub fn create(
        options: &TrayButtonOptions,
        icon: Option<Rc<ButtonIcon>>,
        text: Option<&str>,
        handler: SharedMouseUpHandler,
    ) -> TrayButtonResult<Self> {
        let topology = locate_taskbar()?;
        let hwnd = create_button_window(topology.taskbar)?;

        let tooltip = match Tooltip::create(hwnd) {
            Ok(tooltip) => Some(tooltip),
            Err(error) => {
                warn!("创建提示框失败: {}", error);
                None
            }
        };

        let mut core = ButtonCore::new(hwnd, options.clone(), icon, tooltip);
        core.set_text(text.map(str::to_string));

        if options.mouse_hook.resolve(os_build_number()) {
            match MouseHookRegistration::install(hwnd, ScreenRect::default()) {
                Ok(registration) => core.attach_mouse_hook(registration),
                Err(error) => warn!("{}，改用窗口鼠标消息", error),
            }
        }

        match ShellEventHook::install(hwnd, &topology) {
            Ok(hook) => core.attach_shell_hook(hook),
            Err(error) => warn!("{}", error),
        }

        let shared = Rc::new(ButtonShared {
            core: RefCell::new(core),
            handler,
        });

        unsafe {
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, Rc::as_ptr(&shared) as isize);
        }

        let watcher = match create_watcher_window(hwnd) {
            Ok(watcher) => Some(watcher),
            Err(error) => {
                warn!("创建显示设置监视窗口失败: {}", error);
                None
            }
        };

        info!("托盘按钮窗口已创建: {:?}", hwnd);

        let window = Self {
            hwnd,
            watcher,
            shared,
            destroyed: false,
        };

        if let Ok(mut core) = window.shared.core.try_borrow_mut() {
            core.reposition_logged();
        }

        Ok(window)
    }

    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }

    pub fn set_icon(&self, icon: Option<Rc<ButtonIcon>>) {
        match self.shared.core.try_borrow_mut() {
            Ok(mut core) => core.set_icon(icon),
            Err(_) => warn!("窗口过程正在运行，忽略图标更新"),
        }
    }

    pub fn set_text(&self, text: Option<String>) {
        match self.shared.core.try_borrow_mut() {
            Ok(mut core) => core.set_text(text),
            Err(_) => warn!("窗口过程正在运行，忽略提示文字更新"),
        }
    }

    /// 最近一次应用的位置
    pub fn position(&self) -> Option<ScreenRect> {
        self.shared.core.try_borrow().ok().and_then(|core| core.position())
    }

    /// 最近一次定位时观察到的任务栏布局
    pub fn layout(&self) -> Option<TaskbarLayout> {
        self.shared.core.try_borrow().ok().and_then(|core| core.layout())
    }

    /// 立即执行一次定位
    pub fn reposition(&self) -> TrayButtonResult<PlacementResult> {
        self.shared
            .core
            .try_borrow_mut()
            .map_err(|_| TrayButtonError::RepositionFailed("窗口过程正在运行".to_string()))?
            .reposition()
    }

    /// 卸载钩子、销毁提示框和窗口，并把让出的空间还给任务按钮容器
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;

        unsafe {
            SetWindowLongPtrW(self.hwnd, GWLP_USERDATA, 0);
        }

        match self.shared.core.try_borrow_mut() {
            Ok(mut core) => core.teardown(),
            Err(_) => warn!("窗口过程正在运行，跳过按钮状态清理"),
        }

        if let Some(watcher) = self.watcher.take() {
            unsafe {
                let _ = DestroyWindow(watcher);
            }
        }

        if let Err(error) = unsafe { DestroyWindow(self.hwnd) } {
            warn!("销毁托盘按钮窗口失败: {}", error);
        }

        debug!("托盘按钮窗口已销毁: {:?}", self.hwnd);
    }
}

impl Drop for ButtonWindow {
    fn drop(&mut self) {
        self.destroy();
    }
}
