use crate::*;
use crate::system::TaskbarTopology;
use crate::tray::{PlacementResult, ScreenRect, TrayButtonError, TrayButtonResult};
use tracing::debug;
use windows::Win32::Graphics::Gdi::{
    GetMonitorInfoW, MONITOR_DEFAULTTONEAREST, MONITORINFO, MapWindowPoints, MonitorFromRect,
};

/// 把屏幕矩形的左上角换算成父窗口客户区坐标
///
/// 两个点一起换算时系统会处理镜像（从右到左）布局的父窗口。
fn to_parent_coordinates(hwnd: HWND, rect: ScreenRect) -> (i32, i32) {
    let parent = unsafe { GetParent(hwnd) }.ok().filter(|p| !p.is_invalid());
    let Some(parent) = parent else {
        return (rect.left, rect.top);
    };

    let mut points = [
        POINT {
            x: rect.left,
            y: rect.top,
        },
        POINT {
            x: rect.right,
            y: rect.bottom,
        },
    ];
    unsafe {
        MapWindowPoints(None, Some(parent), &mut points);
    }
    (
        points[0].x.min(points[1].x),
        points[0].y.min(points[1].y),
    )
}

/// 把窗口移动到指定的屏幕矩形
pub fn move_window(
    hwnd: HWND,
    insert_after: Option<HWND>,
    rect: ScreenRect,
    flags: SET_WINDOW_POS_FLAGS,
) -> TrayButtonResult<()> {
    let (x, y) = to_parent_coordinates(hwnd, rect);
    unsafe {
        SetWindowPos(
            hwnd,
            insert_after,
            x,
            y,
            rect.width(),
            rect.height(),
            flags,
        )
    }
    .map_err(|e| TrayButtonError::RepositionFailed(format!("移动窗口到 {} 失败: {}", rect, e)))
}

/// 应用一次定位结果
///
/// 先同步调整任务按钮容器，再移动按钮，两者不会出现短暂重叠。
pub fn apply_placement(
    topology: &TaskbarTopology,
    button: HWND,
    result: &PlacementResult,
) -> TrayButtonResult<()> {
    if let Some(task_list) = result.task_list {
        move_window(
            topology.task_list,
            None,
            task_list,
            SWP_NOZORDER | SWP_NOACTIVATE,
        )?;
        debug!("任务按钮容器已调整为 {}", task_list);
    }

    if let Some(target) = result.target {
        move_window(
            button,
            Some(HWND_TOP),
            target,
            SWP_NOACTIVATE | SWP_SHOWWINDOW,
        )?;
    }

    Ok(())
}

/// 矩形所在显示器的区域
pub fn monitor_rect_for(rect: ScreenRect) -> ScreenRect {
    let area = RECT {
        left: rect.left,
        top: rect.top,
        right: rect.right,
        bottom: rect.bottom,
    };

    let mut info = MONITORINFO {
        cbSize: std::mem::size_of::<MONITORINFO>() as u32,
        ..Default::default()
    };

    let found = unsafe {
        let monitor = MonitorFromRect(&area, MONITOR_DEFAULTTONEAREST);
        GetMonitorInfoW(monitor, &mut info).as_bool()
    };

    if found {
        let m = info.rcMonitor;
        ScreenRect::new(m.left, m.top, m.right, m.bottom)
    } else {
        rect
    }
}

/// 设置弹出条位置并显示
pub fn set_bar_position(
    window: &Window,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
) -> std::result::Result<(), String> {
    window.set_outer_position(PhysicalPosition::new(x, y));

    // 通过Windows API直接设置位置确保精确
    if let Some(hwnd) = crate::window::get_window_hwnd(window) {
        unsafe {
            SetWindowPos(
                hwnd,
                Some(HWND_TOPMOST),
                x,
                y,
                width as i32,
                height as i32,
                SWP_SHOWWINDOW,
            )
        }
        .map_err(|e| format!("设置弹出条位置失败: {}", e))?;
    }

    Ok(())
}
