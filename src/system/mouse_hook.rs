use crate::*;
use crate::tray::{
    MouseButtonKind, PointerEvent, PointerTracker, RawPointer, ScreenRect, TrayButtonError,
    TrayButtonResult,
};
use crate::window::WM_APP_HOOK_INPUT;
use lazy_static::lazy_static;
use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, info, warn};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;

/// 钩子线程交给按钮窗口的输入，坐标为屏幕坐标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookInput {
    pub event: PointerEvent,
    pub inside: bool,
    pub x: i32,
    pub y: i32,
}

struct HookTarget {
    id: u64,
    window: isize,
    region: ScreenRect,
    tracker: PointerTracker,
    sender: Sender<HookInput>,
}

#[derive(Default)]
struct HookRegistry {
    hook: isize,
    next_id: u64,
    targets: Vec<HookTarget>,
}

lazy_static! {
    static ref HOOK_REGISTRY: Mutex<HookRegistry> = Mutex::new(HookRegistry::default());
}

/// 低级鼠标钩子上的一个跟踪区域
///
/// 第一个注册时安装钩子，最后一个注销时卸载。钩子回调只做区域筛选，
/// 事件经通道排队后由窗口线程取出处理。
pub struct MouseHookRegistration {
    id: u64,
    receiver: Receiver<HookInput>,
}

impl MouseHookRegistration {
    pub fn install(window: HWND, region: ScreenRect) -> TrayButtonResult<Self> {
        let mut registry = HOOK_REGISTRY
            .lock()
            .map_err(|_| TrayButtonError::HookInstallFailed("钩子注册表已损坏".to_string()))?;

        if registry.hook == 0 {
            let module = unsafe { GetModuleHandleW(None) }
                .map_err(|e| TrayButtonError::HookInstallFailed(e.to_string()))?;
            let hook = unsafe {
                SetWindowsHookExW(
                    WH_MOUSE_LL,
                    Some(low_level_mouse_proc),
                    Some(HINSTANCE(module.0)),
                    0,
                )
            }
            .map_err(|e| TrayButtonError::HookInstallFailed(e.to_string()))?;

            registry.hook = hook.0 as isize;
            info!("已安装低级鼠标钩子");
        }

        let (sender, receiver) = mpsc::channel();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.targets.push(HookTarget {
            id,
            window: window.0 as isize,
            region,
            tracker: PointerTracker::default(),
            sender,
        });

        debug!("注册鼠标跟踪区域 #{}: {}", id, region);
        Ok(Self { id, receiver })
    }

    /// 按钮移动后更新跟踪区域
    pub fn set_region(&self, region: ScreenRect) {
        if let Ok(mut registry) = HOOK_REGISTRY.lock() {
            if let Some(target) = registry.targets.iter_mut().find(|t| t.id == self.id) {
                if target.region != region {
                    target.region = region;
                    target.tracker.reset();
                }
            }
        }
    }

    /// 取出排队中的全部输入
    pub fn drain(&self) -> Vec<HookInput> {
        self.receiver.try_iter().collect()
    }
}

impl Drop for MouseHookRegistration {
    fn drop(&mut self) {
        let Ok(mut registry) = HOOK_REGISTRY.lock() else {
            return;
        };

        registry.targets.retain(|target| target.id != self.id);
        debug!("注销鼠标跟踪区域 #{}", self.id);

        if registry.targets.is_empty() && registry.hook != 0 {
            let hook = HHOOK(registry.hook as *mut _);
            if let Err(error) = unsafe { UnhookWindowsHookEx(hook) } {
                warn!("卸载低级鼠标钩子失败: {}", error);
            }
            registry.hook = 0;
            info!("已卸载低级鼠标钩子");
        }
    }
}

fn raw_pointer(message: u32) -> Option<RawPointer> {
    match message {
        WM_MOUSEMOVE => Some(RawPointer::Move),
        WM_LBUTTONDOWN => Some(RawPointer::Down(MouseButtonKind::Left)),
        WM_LBUTTONUP => Some(RawPointer::Up(MouseButtonKind::Left)),
        WM_RBUTTONDOWN => Some(RawPointer::Down(MouseButtonKind::Right)),
        WM_RBUTTONUP => Some(RawPointer::Up(MouseButtonKind::Right)),
        _ => None,
    }
}

fn dispatch(raw: RawPointer, x: i32, y: i32) {
    let Ok(mut registry) = HOOK_REGISTRY.lock() else {
        return;
    };

    for target in registry.targets.iter_mut() {
        let region = target.region;
        let Some((event, inside)) = target.tracker.translate(raw, x, y, &region) else {
            continue;
        };

        let input = HookInput { event, inside, x, y };
        if target.sender.send(input).is_ok() {
            unsafe {
                let _ = PostMessageW(
                    Some(HWND(target.window as *mut _)),
                    WM_APP_HOOK_INPUT,
                    WPARAM(0),
                    LPARAM(0),
                );
            }
        }
    }
}

unsafe extern "system" fn low_level_mouse_proc(
    code: i32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if code == HC_ACTION as i32 {
        if let Some(raw) = raw_pointer(wparam.0 as u32) {
            let info = unsafe { &*(lparam.0 as *const MSLLHOOKSTRUCT) };
            dispatch(raw, info.pt.x, info.pt.y);
        }
    }
    unsafe { CallNextHookEx(None, code, wparam, lparam) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_button_messages_are_tracked() {
        assert_eq!(raw_pointer(WM_MOUSEMOVE), Some(RawPointer::Move));
        assert_eq!(
            raw_pointer(WM_RBUTTONUP),
            Some(RawPointer::Up(MouseButtonKind::Right))
        );
        assert_eq!(raw_pointer(WM_MOUSEWHEEL), None);
        assert_eq!(raw_pointer(WM_MBUTTONDOWN), None);
    }
}
