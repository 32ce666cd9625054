use crate::*;
use crate::system::TaskbarTopology;
use crate::tray::{TrayButtonError, TrayButtonResult};
use crate::window::WM_APP_SHELL_LAYOUT_CHANGED;
use lazy_static::lazy_static;
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// 已安装的外壳事件钩子，句柄按整数保存
#[derive(Debug, Clone, Copy)]
struct ShellWatch {
    hook: isize,
    taskbar: isize,
    tray: isize,
    button: isize,
}

lazy_static! {
    static ref SHELL_WATCHES: Mutex<Vec<ShellWatch>> = Mutex::new(Vec::new());
}

/// 监听通知区域位置变化的事件钩子
///
/// 通知区域图标增减时托盘会变宽，挤占按钮所在的间隙。钩子只关心外壳
/// 线程上的 `EVENT_OBJECT_LOCATIONCHANGE`，收到后向按钮窗口投递消息。
#[derive(Debug)]
pub struct ShellEventHook {
    hook: HWINEVENTHOOK,
}

impl ShellEventHook {
    pub fn install(button: HWND, topology: &TaskbarTopology) -> TrayButtonResult<Self> {
        let mut process_id = 0u32;
        let thread_id =
            unsafe { GetWindowThreadProcessId(topology.tray, Some(&mut process_id)) };
        if thread_id == 0 {
            return Err(TrayButtonError::HookInstallFailed(
                "无法获取通知区域所在线程".to_string(),
            ));
        }

        let hook = unsafe {
            SetWinEventHook(
                EVENT_OBJECT_LOCATIONCHANGE,
                EVENT_OBJECT_LOCATIONCHANGE,
                None,
                Some(shell_event_proc),
                process_id,
                thread_id,
                WINEVENT_OUTOFCONTEXT | WINEVENT_SKIPOWNPROCESS,
            )
        };

        if hook.0.is_null() {
            return Err(TrayButtonError::HookInstallFailed(
                "设置外壳事件钩子失败".to_string(),
            ));
        }

        if let Ok(mut watches) = SHELL_WATCHES.lock() {
            watches.push(ShellWatch {
                hook: hook.0 as isize,
                taskbar: topology.taskbar.0 as isize,
                tray: topology.tray.0 as isize,
                button: button.0 as isize,
            });
        }

        info!("已安装外壳事件钩子 (线程 {})", thread_id);
        Ok(Self { hook })
    }
}

impl Drop for ShellEventHook {
    fn drop(&mut self) {
        if let Ok(mut watches) = SHELL_WATCHES.lock() {
            watches.retain(|watch| watch.hook != self.hook.0 as isize);
        }

        if !self.hook.0.is_null() {
            unsafe {
                let _ = UnhookWinEvent(self.hook);
            }
            debug!("已移除外壳事件钩子");
        }
    }
}

/// 外壳事件回调
unsafe extern "system" fn shell_event_proc(
    hevent: HWINEVENTHOOK,
    event: u32,
    hwnd: HWND,
    idobject: i32,
    _idchild: i32,
    _ideventthread: u32,
    _dwmseventtime: u32,
) {
    if event != EVENT_OBJECT_LOCATIONCHANGE || idobject != OBJID_WINDOW.0 {
        return;
    }

    let watch = match SHELL_WATCHES.lock() {
        Ok(watches) => watches
            .iter()
            .find(|watch| watch.hook == hevent.0 as isize)
            .copied(),
        Err(_) => return,
    };

    let Some(watch) = watch else {
        return;
    };

    let source = hwnd.0 as isize;
    if source != watch.tray && source != watch.taskbar {
        return;
    }

    debug!(
        "外壳窗口位置变化: {}",
        crate::system::class_name(hwnd).unwrap_or_default()
    );

    let posted = unsafe {
        PostMessageW(
            Some(HWND(watch.button as *mut _)),
            WM_APP_SHELL_LAYOUT_CHANGED,
            WPARAM(0),
            LPARAM(0),
        )
    };
    if let Err(error) = posted {
        warn!("转发外壳布局变化失败: {}", error);
    }
}
