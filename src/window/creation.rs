use crate::*;
use crate::tray::{TrayButtonError, TrayButtonResult};
use crate::window::{button_window_proc, watcher_window_proc};
use tracing::debug;
use windows::Win32::System::LibraryLoader::GetModuleHandleW;

/// 按钮窗口类名
pub const BUTTON_CLASS: PCWSTR = w!("TaskbarTrayButton");
/// 显示设置监视窗口类名
pub const WATCHER_CLASS: PCWSTR = w!("TaskbarTrayButtonWatcher");

type WindowProc = unsafe extern "system" fn(HWND, u32, WPARAM, LPARAM) -> LRESULT;

/// 当前模块句柄
pub fn module_instance() -> TrayButtonResult<HINSTANCE> {
    let module = unsafe { GetModuleHandleW(None) }
        .map_err(|e| TrayButtonError::WindowCreationFailed(format!("获取模块句柄失败: {}", e)))?;
    Ok(HINSTANCE(module.0))
}

/// 注册窗口类，类已存在时视为成功
fn register_class(
    class: PCWSTR,
    procedure: WindowProc,
    instance: HINSTANCE,
) -> TrayButtonResult<()> {
    let cursor = unsafe { LoadCursorW(None, IDC_ARROW) }.unwrap_or_default();
    let class_info = WNDCLASSEXW {
        cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
        lpfnWndProc: Some(procedure),
        hInstance: instance,
        hCursor: cursor,
        lpszClassName: class,
        ..Default::default()
    };

    let atom = unsafe { RegisterClassExW(&class_info) };
    if atom == 0 {
        let error = unsafe { GetLastError() };
        if error != ERROR_CLASS_ALREADY_EXISTS {
            return Err(TrayButtonError::WindowCreationFailed(format!(
                "注册窗口类失败: {:?}",
                error
            )));
        }
    }
    Ok(())
}

/// 创建任务栏上的按钮窗口
///
/// 按钮是任务栏的分层子窗口，创建时不可见，首次定位成功后才显示。
pub fn create_button_window(taskbar: HWND) -> TrayButtonResult<HWND> {
    let instance = module_instance()?;
    register_class(BUTTON_CLASS, button_window_proc, instance)?;

    let hwnd = unsafe {
        CreateWindowExW(
            WS_EX_LAYERED | WS_EX_NOACTIVATE | WS_EX_TOOLWINDOW,
            BUTTON_CLASS,
            w!(""),
            WS_CHILD | WS_CLIPSIBLINGS,
            0,
            0,
            0,
            0,
            Some(taskbar),
            None,
            Some(instance),
            None,
        )
    }
    .map_err(|e| TrayButtonError::WindowCreationFailed(format!("创建按钮窗口失败: {}", e)))?;

    debug!("按钮窗口句柄: {:?}", hwnd);
    Ok(hwnd)
}

/// 创建接收显示设置广播的隐藏顶层窗口
///
/// 广播消息只发给顶层窗口，子窗口收不到，由这个窗口转发给按钮。
pub fn create_watcher_window(button: HWND) -> TrayButtonResult<HWND> {
    let instance = module_instance()?;
    register_class(WATCHER_CLASS, watcher_window_proc, instance)?;

    let hwnd = unsafe {
        CreateWindowExW(
            WS_EX_TOOLWINDOW | WS_EX_NOACTIVATE,
            WATCHER_CLASS,
            w!(""),
            WS_POPUP,
            0,
            0,
            0,
            0,
            None,
            None,
            Some(instance),
            None,
        )
    }
    .map_err(|e| TrayButtonError::WindowCreationFailed(format!("创建监视窗口失败: {}", e)))?;

    unsafe {
        SetWindowLongPtrW(hwnd, GWLP_USERDATA, button.0 as isize);
    }
    Ok(hwnd)
}

/// 创建弹出条窗口
pub fn create_bar_window(
    event_loop: &winit::event_loop::ActiveEventLoop,
    width: u32,
    height: u32,
) -> std::result::Result<Rc<Window>, String> {
    let window_attributes = Window::default_attributes()
        .with_title("Quick Strip")
        .with_inner_size(PhysicalSize::new(width, height))
        .with_decorations(false)
        .with_window_level(WindowLevel::AlwaysOnTop)
        .with_resizable(false)
        .with_visible(false);

    let window = event_loop
        .create_window(window_attributes)
        .map_err(|e| format!("创建弹出条窗口失败: {}", e))?;

    hide_from_taskbar(&window);

    Ok(Rc::new(window))
}

/// 获取窗口的Windows句柄
pub fn get_window_hwnd(window: &Window) -> Option<HWND> {
    if let Ok(handle) = window.window_handle() {
        if let RawWindowHandle::Win32(win32_handle) = handle.as_raw() {
            return Some(HWND(win32_handle.hwnd.get() as *mut _));
        }
    }
    None
}

/// 隐藏窗口在任务栏上的图标
///
/// 窗口仍处于隐藏状态，样式在下一次显示时生效。
pub fn hide_from_taskbar(window: &Window) {
    if let Some(hwnd) = get_window_hwnd(window) {
        unsafe {
            let ex_style = GetWindowLongW(hwnd, GWL_EXSTYLE) as u32;
            SetWindowLongW(hwnd, GWL_EXSTYLE, (ex_style | WS_EX_TOOLWINDOW.0) as i32);
        }
    }
}
