use crate::*;
use crate::tray::{MessageHandler, MouseButtonKind, MouseUpEvent, PointerEvent, WindowMessage};
use crate::window::{
    ButtonShared, SharedMouseUpHandler, WM_APP_DISPLAY_SETTINGS_CHANGED, WM_APP_HOOK_INPUT,
    WM_APP_SHELL_LAYOUT_CHANGED,
};
use tracing::{debug, warn};

// 部分消息常量不在 windows 的导出中
const WM_MOUSELEAVE: u32 = 0x02A3;
const WM_DPICHANGED_AFTERPARENT: u32 = 0x02E3;

fn loword(value: isize) -> i32 {
    (value & 0xFFFF) as u16 as i32
}

fn hiword(value: isize) -> i32 {
    ((value >> 16) & 0xFFFF) as u16 as i32
}

/// 鼠标消息中的有符号客户区坐标
fn point_from_lparam(lparam: LPARAM) -> (i32, i32) {
    (loword(lparam.0) as i16 as i32, hiword(lparam.0) as i16 as i32)
}

/// 把原生消息解码为 [`WindowMessage`]
pub fn decode_message(msg: u32, wparam: WPARAM, lparam: LPARAM) -> WindowMessage {
    let pointer = |event: PointerEvent| {
        let (x, y) = point_from_lparam(lparam);
        WindowMessage::Pointer { event, x, y }
    };

    match msg {
        WM_MOUSEMOVE => pointer(PointerEvent::Move),
        WM_LBUTTONDOWN => pointer(PointerEvent::Down(MouseButtonKind::Left)),
        WM_LBUTTONUP => pointer(PointerEvent::Up(MouseButtonKind::Left)),
        WM_RBUTTONDOWN => pointer(PointerEvent::Down(MouseButtonKind::Right)),
        WM_RBUTTONUP => pointer(PointerEvent::Up(MouseButtonKind::Right)),
        WM_MOUSELEAVE => WindowMessage::Pointer {
            event: PointerEvent::Leave,
            x: -1,
            y: -1,
        },
        WM_APP_HOOK_INPUT => WindowMessage::HookInputAvailable,
        WM_PAINT => WindowMessage::Paint,
        WM_ERASEBKGND => WindowMessage::EraseBackground,
        WM_SIZE => WindowMessage::Resized {
            width: loword(lparam.0),
            height: hiword(lparam.0),
        },
        WM_TIMER => WindowMessage::Timer(wparam.0),
        WM_DISPLAYCHANGE | WM_DPICHANGED_AFTERPARENT | WM_APP_DISPLAY_SETTINGS_CHANGED => {
            WindowMessage::DisplaySettingsChanged
        }
        WM_APP_SHELL_LAYOUT_CHANGED => WindowMessage::ShellLayoutChanged,
        WM_MOUSEACTIVATE => WindowMessage::MouseActivate,
        WM_DESTROY => WindowMessage::Destroy,
        other => WindowMessage::Other(other),
    }
}

/// 把排队的点击交给宿主
///
/// 此时按钮状态的借用已经释放，宿主在回调中可以安全地修改按钮。
fn dispatch_clicks(handler: &SharedMouseUpHandler, clicks: Vec<MouseUpEvent>) {
    let Ok(mut handler) = handler.try_borrow_mut() else {
        warn!("点击回调正在运行，丢弃 {} 次点击", clicks.len());
        return;
    };

    if let Some(handler) = handler.as_mut() {
        for click in clicks {
            debug!("按钮点击: {:?}", click);
            handler(click);
        }
    }
}

/// 按钮窗口过程
pub unsafe extern "system" fn button_window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let raw = unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) } as *const ButtonShared;
    if raw.is_null() {
        return unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) };
    }

    // 持有一份引用，回调中销毁按钮也不会释放正在使用的状态
    let shared = unsafe {
        Rc::increment_strong_count(raw);
        Rc::from_raw(raw)
    };

    let message = decode_message(msg, wparam, lparam);
    let (result, clicks) = match shared.core.try_borrow_mut() {
        Ok(mut core) => {
            let result = core.handle(message);
            (result, core.take_clicks())
        }
        // 重入（例如移动窗口时同步发来的消息）交给默认处理
        Err(_) => (None, Vec::new()),
    };

    if !clicks.is_empty() {
        dispatch_clicks(&shared.handler, clicks);
    }

    match result {
        Some(value) => LRESULT(value),
        None => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

/// 显示设置监视窗口过程，把广播转发给按钮窗口
pub unsafe extern "system" fn watcher_window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let forward = match msg {
        WM_DISPLAYCHANGE | WM_DPICHANGED => true,
        WM_SETTINGCHANGE => wparam.0 as u32 == SPI_SETWORKAREA.0,
        _ => false,
    };

    if forward {
        let button = unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) };
        if button != 0 {
            debug!("转发显示设置变化: {:#06x}", msg);
            unsafe {
                let _ = PostMessageW(
                    Some(HWND(button as *mut _)),
                    WM_APP_DISPLAY_SETTINGS_CHANGED,
                    WPARAM(0),
                    LPARAM(0),
                );
            }
        }
    }

    unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
}
