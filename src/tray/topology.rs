use serde::{Deserialize, Serialize};

use crate::tray::ScreenRect;

/// 任务栏方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// 一次布局计算所需的任务栏几何信息
///
/// 只保存矩形，不持有任何窗口句柄；这些窗口属于外壳进程，
/// 每次放置都会重新查询，不跨调用缓存。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskbarLayout {
    /// 任务栏窗口
    pub taskbar: ScreenRect,
    /// 任务按钮容器
    pub task_list: ScreenRect,
    /// 通知区域
    pub tray: ScreenRect,
    pub orientation: Orientation,
    /// 仅水平任务栏有意义
    pub is_right_to_left: bool,
}

impl TaskbarLayout {
    /// 由三个窗口矩形推导方向和文字方向
    pub fn from_rects(taskbar: ScreenRect, task_list: ScreenRect, tray: ScreenRect) -> Self {
        let orientation = if taskbar.width() >= taskbar.height() {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        };

        // 近似判断：通知区域位于任务栏左半边即视为从右到左布局
        let is_right_to_left =
            orientation == Orientation::Horizontal && tray.left < taskbar.center_x();

        Self {
            taskbar,
            task_list,
            tray,
            orientation,
            is_right_to_left,
        }
    }

    /// 任务栏的厚度（水平时为高度，垂直时为宽度）
    pub fn thickness(&self) -> i32 {
        match self.orientation {
            Orientation::Horizontal => self.taskbar.height(),
            Orientation::Vertical => self.taskbar.width(),
        }
    }

    /// 以任务栏中线为轴做水平镜像，同时翻转 RTL 标志
    pub fn mirrored(&self) -> Self {
        let axis = self.taskbar.left + self.taskbar.width() / 2;
        Self {
            taskbar: self.taskbar.mirrored_horizontally(axis),
            task_list: self.task_list.mirrored_horizontally(axis),
            tray: self.tray.mirrored_horizontally(axis),
            orientation: self.orientation,
            is_right_to_left: !self.is_right_to_left,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bottom_taskbar_is_horizontal_ltr() {
        let layout = TaskbarLayout::from_rects(
            ScreenRect::new(0, 1040, 1920, 1080),
            ScreenRect::new(0, 1040, 1800, 1080),
            ScreenRect::new(1850, 1040, 1920, 1080),
        );
        assert_eq!(layout.orientation, Orientation::Horizontal);
        assert!(!layout.is_right_to_left);
        assert_eq!(layout.thickness(), 40);
    }

    #[test]
    fn tray_on_left_half_means_rtl() {
        let layout = TaskbarLayout::from_rects(
            ScreenRect::new(0, 1040, 1920, 1080),
            ScreenRect::new(120, 1040, 1920, 1080),
            ScreenRect::new(0, 1040, 70, 1080),
        );
        assert!(layout.is_right_to_left);
    }

    #[test]
    fn side_taskbar_is_vertical_and_never_rtl() {
        let layout = TaskbarLayout::from_rects(
            ScreenRect::new(0, 0, 62, 1080),
            ScreenRect::new(0, 0, 62, 900),
            ScreenRect::new(0, 980, 62, 1080),
        );
        assert_eq!(layout.orientation, Orientation::Vertical);
        assert!(!layout.is_right_to_left);
        assert_eq!(layout.thickness(), 62);
    }

    #[test]
    fn mirroring_toggles_rtl() {
        let layout = TaskbarLayout::from_rects(
            ScreenRect::new(0, 1040, 1920, 1080),
            ScreenRect::new(0, 1040, 1800, 1080),
            ScreenRect::new(1850, 1040, 1920, 1080),
        );
        let mirrored = layout.mirrored();
        assert!(mirrored.is_right_to_left);
        assert_eq!(mirrored.tray, ScreenRect::new(0, 1040, 70, 1080));
        assert_eq!(mirrored.task_list, ScreenRect::new(120, 1040, 1920, 1080));
    }
}
