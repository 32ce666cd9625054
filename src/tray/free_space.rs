use tracing::debug;

use crate::tray::{Orientation, ScreenRect, TaskbarLayout};

/// 任务栏的一个子窗口快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiblingWindow {
    /// 原始窗口句柄值，仅用于识别自身窗口
    pub id: isize,
    /// 获取矩形失败时为 `None`
    pub rect: Option<ScreenRect>,
    pub visible: bool,
}

/// 空闲区域计算结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeSpace {
    /// 任务按钮容器与通知区域之间的原始间隙
    pub gap: ScreenRect,
    /// 可用于放置按钮的区域：从任务按钮容器的起始边到通知区域的起始边
    pub available: ScreenRect,
    /// 间隙中其他第三方按钮占用的矩形
    pub obstructing: Vec<ScreenRect>,
}

/// 任务按钮容器尾边与通知区域起始边之间的原始间隙
pub fn gap_rect(layout: &TaskbarLayout) -> ScreenRect {
    let TaskbarLayout { taskbar, task_list, tray, .. } = layout;
    match layout.orientation {
        Orientation::Horizontal if layout.is_right_to_left => {
            ScreenRect::new(tray.right, taskbar.top, task_list.left, taskbar.bottom)
        }
        Orientation::Horizontal => {
            ScreenRect::new(task_list.right, taskbar.top, tray.left, taskbar.bottom)
        }
        Orientation::Vertical => {
            ScreenRect::new(taskbar.left, task_list.bottom, taskbar.right, tray.top)
        }
    }
}

/// 按钮可以占用的区域，任务按钮容器自身可以让出空间
pub fn available_rect(layout: &TaskbarLayout) -> ScreenRect {
    let TaskbarLayout { taskbar, task_list, tray, .. } = layout;
    match layout.orientation {
        Orientation::Horizontal if layout.is_right_to_left => {
            ScreenRect::new(tray.right, taskbar.top, task_list.right, taskbar.bottom)
        }
        Orientation::Horizontal => {
            ScreenRect::new(task_list.left, taskbar.top, tray.left, taskbar.bottom)
        }
        Orientation::Vertical => {
            ScreenRect::new(taskbar.left, task_list.top, taskbar.right, tray.top)
        }
    }
}

/// 计算空闲区域以及占用间隙的其他按钮
///
/// `own` 为本按钮窗口的句柄值，避免与自身碰撞。获取矩形失败的子窗口
/// 只记录日志后跳过。
pub fn compute_free_space(
    layout: &TaskbarLayout,
    siblings: &[SiblingWindow],
    own: Option<isize>,
) -> FreeSpace {
    let gap = gap_rect(layout);
    let available = available_rect(layout);

    let mut obstructing = Vec::new();
    for sibling in siblings {
        if Some(sibling.id) == own || !sibling.visible {
            continue;
        }

        let Some(rect) = sibling.rect else {
            debug!("跳过无法获取矩形的任务栏子窗口: {:#x}", sibling.id);
            continue;
        };

        if rect.is_empty() || rect.is_inside(&layout.task_list) {
            continue;
        }

        if !gap.is_empty() && rect.is_inside(&gap) {
            obstructing.push(rect);
        }
    }

    obstructing.sort_by_key(|r| (r.left, r.top));
    obstructing.dedup();

    FreeSpace {
        gap,
        available,
        obstructing,
    }
}
