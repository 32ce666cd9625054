//! 屏幕坐标矩形
//!
//! 所有矩形都是不可变值，每次查询都重新创建，不在原处修改。

use serde::{Deserialize, Serialize};

/// 屏幕坐标系中的矩形（右、下边界不包含）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ScreenRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ScreenRect {
    /// 创建矩形，右/下边界小于左/上边界时收缩为空矩形
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right: right.max(left),
            bottom: bottom.max(top),
        }
    }

    /// 以原点和尺寸创建矩形
    pub fn from_origin_size(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self::new(left, top, left + width.max(0), top + height.max(0))
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// 宽或高为零
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// 当前矩形是否完全位于 `other` 内（边界重合也算）
    pub fn is_inside(&self, other: &ScreenRect) -> bool {
        self.left >= other.left
            && self.top >= other.top
            && self.right <= other.right
            && self.bottom <= other.bottom
    }

    /// 两个矩形是否有正面积的重叠，仅共享一条边不算相交
    pub fn intersects(&self, other: &ScreenRect) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    pub fn center_x(&self) -> i32 {
        self.left + self.width() / 2
    }

    pub fn center_y(&self) -> i32 {
        self.top + self.height() / 2
    }

    pub fn with_left(&self, left: i32) -> Self {
        Self::new(left, self.top, self.right, self.bottom)
    }

    pub fn with_right(&self, right: i32) -> Self {
        Self::new(self.left, self.top, right, self.bottom)
    }

    pub fn with_top(&self, top: i32) -> Self {
        Self::new(self.left, top, self.right, self.bottom)
    }

    pub fn with_bottom(&self, bottom: i32) -> Self {
        Self::new(self.left, self.top, self.right, bottom)
    }

    /// 以 `x = axis` 为轴做水平镜像
    pub fn mirrored_horizontally(&self, axis: i32) -> Self {
        Self::new(2 * axis - self.right, self.top, 2 * axis - self.left, self.bottom)
    }

    /// 转换为相对矩形左上角的局部坐标
    pub fn to_local(&self, x: i32, y: i32) -> (i32, i32) {
        (x - self.left, y - self.top)
    }
}

impl std::fmt::Display for ScreenRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {}, {})", self.left, self.top, self.right, self.bottom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_collapses_inverted_edges() {
        let rect = ScreenRect::new(10, 10, 5, 2);
        assert_eq!(rect.width(), 0);
        assert_eq!(rect.height(), 0);
        assert!(rect.is_empty());
    }

    #[test]
    fn is_inside_accepts_shared_edges() {
        let outer = ScreenRect::new(0, 0, 100, 40);
        assert!(ScreenRect::new(0, 0, 100, 40).is_inside(&outer));
        assert!(ScreenRect::new(68, 0, 100, 40).is_inside(&outer));
        assert!(!ScreenRect::new(90, 0, 101, 40).is_inside(&outer));
    }

    #[test]
    fn touching_rects_do_not_intersect() {
        let a = ScreenRect::new(1768, 1040, 1800, 1080);
        let b = ScreenRect::new(1800, 1040, 1820, 1080);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&ScreenRect::new(1799, 1040, 1820, 1080)));
    }

    #[test]
    fn mirror_is_an_involution() {
        let rect = ScreenRect::new(1818, 1040, 1850, 1080);
        let mirrored = rect.mirrored_horizontally(960);
        assert_eq!(mirrored, ScreenRect::new(70, 1040, 102, 1080));
        assert_eq!(mirrored.mirrored_horizontally(960), rect);
    }

    #[test]
    fn contains_point_excludes_far_edges() {
        let rect = ScreenRect::from_origin_size(10, 10, 20, 20);
        assert!(rect.contains_point(10, 10));
        assert!(!rect.contains_point(30, 15));
        assert_eq!(rect.to_local(15, 25), (5, 15));
    }
}
