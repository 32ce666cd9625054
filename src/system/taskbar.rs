use crate::*;
use crate::tray::{ScreenRect, SiblingWindow, TaskbarLayout, TrayButtonError, TrayButtonResult};
use tracing::debug;

/// 任务栏窗口类名
pub const TASKBAR_CLASS: PCWSTR = w!("Shell_TrayWnd");
/// 任务按钮容器窗口类名
pub const TASK_LIST_CLASS: PCWSTR = w!("ReBarWindow32");
/// 通知区域窗口类名
pub const TRAY_CLASS: PCWSTR = w!("TrayNotifyWnd");

/// 一次定位时解析出的任务栏窗口
///
/// 这些窗口属于外壳进程，随时可能被移动或重建，因此每次定位都重新查找，
/// 不在调用之间缓存。
#[derive(Debug, Clone, Copy)]
pub struct TaskbarTopology {
    pub taskbar: HWND,
    pub task_list: HWND,
    pub tray: HWND,
    pub layout: TaskbarLayout,
}

/// 查找任务栏、任务按钮容器和通知区域
pub fn locate_taskbar() -> TrayButtonResult<TaskbarTopology> {
    let taskbar = unsafe { FindWindowW(TASKBAR_CLASS, None) }
        .ok()
        .filter(|hwnd| !hwnd.is_invalid())
        .ok_or_else(|| TrayButtonError::TopologyNotFound("Shell_TrayWnd".to_string()))?;

    let task_list = find_child(taskbar, TASK_LIST_CLASS)
        .ok_or_else(|| TrayButtonError::TopologyNotFound("ReBarWindow32".to_string()))?;
    let tray = find_child(taskbar, TRAY_CLASS)
        .ok_or_else(|| TrayButtonError::TopologyNotFound("TrayNotifyWnd".to_string()))?;

    let rect_of = |hwnd: HWND, name: &str| {
        window_rect(hwnd)
            .ok_or_else(|| TrayButtonError::TopologyNotFound(format!("无法获取 {} 的区域", name)))
    };

    let layout = TaskbarLayout::from_rects(
        rect_of(taskbar, "Shell_TrayWnd")?,
        rect_of(task_list, "ReBarWindow32")?,
        rect_of(tray, "TrayNotifyWnd")?,
    );

    Ok(TaskbarTopology {
        taskbar,
        task_list,
        tray,
        layout,
    })
}

fn find_child(parent: HWND, class: PCWSTR) -> Option<HWND> {
    unsafe { FindWindowExW(Some(parent), None, class, None) }
        .ok()
        .filter(|hwnd| !hwnd.is_invalid())
}

/// 获取窗口的屏幕矩形
pub fn window_rect(hwnd: HWND) -> Option<ScreenRect> {
    let mut rect = RECT::default();
    unsafe { GetWindowRect(hwnd, &mut rect) }.ok()?;
    Some(ScreenRect::new(rect.left, rect.top, rect.right, rect.bottom))
}

/// 枚举任务栏的全部子窗口
///
/// 结果直接写入调用方持有的缓冲区，回调中不做任何筛选。
pub fn enumerate_taskbar_children(taskbar: HWND) -> Vec<SiblingWindow> {
    let mut children: Vec<SiblingWindow> = Vec::new();
    unsafe {
        let _ = EnumChildWindows(
            Some(taskbar),
            Some(collect_child),
            LPARAM(&mut children as *mut Vec<SiblingWindow> as isize),
        );
    }
    debug!("任务栏共有 {} 个子窗口", children.len());
    children
}

unsafe extern "system" fn collect_child(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let children = unsafe { &mut *(lparam.0 as *mut Vec<SiblingWindow>) };
    children.push(SiblingWindow {
        id: hwnd.0 as isize,
        rect: window_rect(hwnd),
        visible: unsafe { IsWindowVisible(hwnd) }.as_bool(),
    });
    true.into()
}

/// 获取窗口类名
pub fn class_name(hwnd: HWND) -> Option<String> {
    if hwnd.is_invalid() {
        return None;
    }

    let mut buffer = [0u16; 256];
    let len = unsafe { GetClassNameW(hwnd, &mut buffer) };
    (len > 0).then(|| String::from_utf16_lossy(&buffer[..len as usize]))
}
