//! 按钮放置计算
//!
//! 纯几何计算：给定任务栏布局和空闲区域，决定按钮应处的位置以及
//! 任务按钮容器需要让出的空间。实际的窗口移动由 Win32 层完成。

use crate::tray::{FreeSpace, Orientation, ScreenRect, TaskbarLayout, TrayButtonError, TrayButtonResult};

/// 默认按钮长度与任务栏厚度之比
pub const DEFAULT_SIZE_RATIO: f32 = 0.8;

/// 一次放置检查的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementResult {
    /// 按钮当前所在的矩形
    pub current: Option<ScreenRect>,
    /// 需要移动到的矩形，无需移动时为 `None`
    pub target: Option<ScreenRect>,
    /// 任务按钮容器的新矩形，无需调整时为 `None`
    pub task_list: Option<ScreenRect>,
    pub orientation: Orientation,
}

impl PlacementResult {
    pub fn needs_move(&self) -> bool {
        self.target.is_some()
    }
}

/// 按钮尺寸：主轴为任务栏厚度的 `size_ratio` 倍，交叉轴占满任务栏
pub fn button_size(layout: &TaskbarLayout, size_ratio: f32) -> (i32, i32) {
    let thickness = layout.thickness();
    let length = ((thickness as f32) * size_ratio).round().max(1.0) as i32;
    match layout.orientation {
        Orientation::Horizontal => (length, thickness),
        Orientation::Vertical => (thickness, length),
    }
}

/// 计算 `[start, end)` 内去掉被占用区间后剩下的连续空闲区间
pub fn free_spans(start: i32, end: i32, blocked: &[(i32, i32)]) -> Vec<(i32, i32)> {
    let mut blocked: Vec<(i32, i32)> = blocked
        .iter()
        .map(|&(a, b)| (a.max(start), b.min(end)))
        .filter(|&(a, b)| a < b)
        .collect();
    blocked.sort_unstable();

    let mut spans = Vec::new();
    let mut cursor = start;
    for (a, b) in blocked {
        if a > cursor {
            spans.push((cursor, a));
        }
        cursor = cursor.max(b);
    }
    if cursor < end {
        spans.push((cursor, end));
    }
    spans
}

/// 检查当前位置是否仍然有效，否则计算新的目标矩形
///
/// 当前位置尺寸正确、位于可用区域内、不与任何第三方按钮或任务按钮容器
/// 相交时保持不动，因此在布局不变的情况下重复调用不会移动按钮。
pub fn compute_placement(
    layout: &TaskbarLayout,
    free: &FreeSpace,
    current: Option<ScreenRect>,
    size_ratio: f32,
) -> TrayButtonResult<PlacementResult> {
    let (width, height) = button_size(layout, size_ratio);
    let current = current.filter(|rect| !rect.is_empty());

    if let Some(rect) = current {
        let keep = rect.width() == width
            && rect.height() == height
            && rect.is_inside(&free.available)
            && !rect.intersects(&layout.task_list)
            && !free.obstructing.iter().any(|o| rect.intersects(o));

        if keep {
            return Ok(PlacementResult {
                current,
                target: None,
                task_list: None,
                orientation: layout.orientation,
            });
        }
    }

    let available = free.available;
    let target = match layout.orientation {
        Orientation::Horizontal => {
            let blocked: Vec<(i32, i32)> =
                free.obstructing.iter().map(|o| (o.left, o.right)).collect();
            let spans = free_spans(available.left, available.right, &blocked);
            let fits = |&&(a, b): &&(i32, i32)| b - a >= width;

            if layout.is_right_to_left {
                spans
                    .iter()
                    .rev()
                    .find(fits)
                    .map(|&(a, _)| ScreenRect::new(a, available.top, a + width, available.bottom))
            } else {
                spans
                    .iter()
                    .find(fits)
                    .map(|&(_, b)| ScreenRect::new(b - width, available.top, b, available.bottom))
            }
        }
        Orientation::Vertical => {
            let blocked: Vec<(i32, i32)> =
                free.obstructing.iter().map(|o| (o.top, o.bottom)).collect();
            free_spans(available.top, available.bottom, &blocked)
                .iter()
                .find(|&&(a, b)| b - a >= height)
                .map(|&(_, b)| ScreenRect::new(available.left, b - height, available.right, b))
        }
    };

    let target = target.ok_or(TrayButtonError::NoRoom {
        required: match layout.orientation {
            Orientation::Horizontal => width,
            Orientation::Vertical => height,
        },
    })?;

    // 任务按钮容器的尾边与按钮的起始边对齐，但不能越过间隙中的第三方按钮
    let obstructing = &free.obstructing;
    let task_list = match layout.orientation {
        Orientation::Horizontal if layout.is_right_to_left => {
            let edge = obstructing.iter().map(|o| o.right).fold(target.right, i32::max);
            layout.task_list.with_left(edge)
        }
        Orientation::Horizontal => {
            let edge = obstructing.iter().map(|o| o.left).fold(target.left, i32::min);
            layout.task_list.with_right(edge)
        }
        Orientation::Vertical => {
            let edge = obstructing.iter().map(|o| o.top).fold(target.top, i32::min);
            layout.task_list.with_bottom(edge)
        }
    };

    Ok(PlacementResult {
        current,
        target: Some(target),
        task_list: (task_list != layout.task_list).then_some(task_list),
        orientation: layout.orientation,
    })
}

/// 按钮让出空间时对任务按钮容器做过的调整
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CededSpace {
    /// 第一次调整之前容器的矩形
    pub original: ScreenRect,
    /// 最后一次设置的矩形
    pub applied: ScreenRect,
}

impl CededSpace {
    /// 记录一次容器调整
    ///
    /// 容器仍停在上次设置的位置时沿用之前的原始矩形，否则容器已被
    /// 资源管理器重新布局，以当前矩形作为新的原始矩形。
    pub fn record(previous: Option<Self>, current: ScreenRect, applied: ScreenRect) -> Self {
        let original = match previous {
            Some(ceded) if ceded.applied == current => ceded.original,
            _ => current,
        };
        Self { original, applied }
    }

    /// 按钮移除后容器应恢复到的矩形
    ///
    /// 容器被其他程序移动过时不做处理。恢复的尾边不越过通知区域。
    pub fn reclaimed_task_list(&self, layout: &TaskbarLayout) -> Option<ScreenRect> {
        let task_list = layout.task_list;
        if task_list != self.applied {
            return None;
        }

        let tray = layout.tray;
        let restored = match layout.orientation {
            Orientation::Horizontal if layout.is_right_to_left => {
                task_list.with_left(self.original.left.max(tray.right))
            }
            Orientation::Horizontal => task_list.with_right(self.original.right.min(tray.left)),
            Orientation::Vertical => task_list.with_bottom(self.original.bottom.min(tray.top)),
        };
        (restored != task_list).then_some(restored)
    }
}

/// 计算弹出窗口的左上角，使其贴着按钮出现在任务栏朝向桌面的一侧
pub fn popup_origin(
    button: ScreenRect,
    popup_size: (i32, i32),
    layout: &TaskbarLayout,
    screen: ScreenRect,
) -> (i32, i32) {
    let (width, height) = popup_size;
    let taskbar = layout.taskbar;
    let clamp_x = |x: i32| x.min(screen.right - width).max(screen.left);
    let clamp_y = |y: i32| y.min(screen.bottom - height).max(screen.top);

    match layout.orientation {
        Orientation::Horizontal => {
            let y = if taskbar.center_y() >= screen.center_y() {
                taskbar.top - height
            } else {
                taskbar.bottom
            };
            let x = if layout.is_right_to_left {
                button.left
            } else {
                button.right - width
            };
            (clamp_x(x), y)
        }
        Orientation::Vertical => {
            let x = if taskbar.center_x() < screen.center_x() {
                taskbar.right
            } else {
                taskbar.left - width
            };
            (x, clamp_y(button.bottom - height))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tray::{compute_free_space, SiblingWindow};

    fn bottom_layout() -> TaskbarLayout {
        TaskbarLayout::from_rects(
            ScreenRect::new(0, 1040, 1920, 1080),
            ScreenRect::new(0, 1040, 1800, 1080),
            ScreenRect::new(1850, 1040, 1920, 1080),
        )
    }

    fn obstruction(id: isize, rect: ScreenRect) -> SiblingWindow {
        SiblingWindow {
            id,
            rect: Some(rect),
            visible: true,
        }
    }

    #[test]
    fn button_is_eighty_percent_of_thickness() {
        assert_eq!(button_size(&bottom_layout(), DEFAULT_SIZE_RATIO), (32, 40));

        let side = TaskbarLayout::from_rects(
            ScreenRect::new(0, 0, 60, 1080),
            ScreenRect::new(0, 0, 60, 900),
            ScreenRect::new(0, 980, 60, 1080),
        );
        assert_eq!(button_size(&side, DEFAULT_SIZE_RATIO), (60, 48));
    }

    #[test]
    fn free_spans_skip_blocked_ranges() {
        assert_eq!(free_spans(0, 100, &[]), vec![(0, 100)]);
        assert_eq!(
            free_spans(0, 100, &[(40, 50), (45, 60), (90, 120)]),
            vec![(0, 40), (60, 90)]
        );
        assert!(free_spans(0, 100, &[(-10, 200)]).is_empty());
    }

    #[test]
    fn empty_gap_places_button_against_tray() {
        let layout = bottom_layout();
        let free = compute_free_space(&layout, &[], None);

        let result = compute_placement(&layout, &free, None, DEFAULT_SIZE_RATIO).unwrap();
        assert_eq!(result.target, Some(ScreenRect::new(1818, 1040, 1850, 1080)));
        assert_eq!(result.task_list, Some(ScreenRect::new(0, 1040, 1818, 1080)));
        assert_eq!(result.orientation, Orientation::Horizontal);
    }

    #[test]
    fn obstruction_pushes_button_to_its_left() {
        let layout = bottom_layout();
        let free = compute_free_space(
            &layout,
            &[obstruction(9, ScreenRect::new(1800, 1040, 1820, 1080))],
            None,
        );

        let result = compute_placement(&layout, &free, None, DEFAULT_SIZE_RATIO).unwrap();
        assert_eq!(result.target, Some(ScreenRect::new(1768, 1040, 1800, 1080)));
        assert_eq!(result.task_list, Some(ScreenRect::new(0, 1040, 1768, 1080)));
    }

    #[test]
    fn second_pass_without_changes_is_a_no_op() {
        let layout = bottom_layout();
        let own = 42;
        let free = compute_free_space(&layout, &[], Some(own));
        let first = compute_placement(&layout, &free, None, DEFAULT_SIZE_RATIO).unwrap();
        let placed = first.target.unwrap();

        // 模拟窗口移动后的布局
        let layout = TaskbarLayout::from_rects(layout.taskbar, first.task_list.unwrap(), layout.tray);
        let free = compute_free_space(&layout, &[obstruction(own, placed)], Some(own));
        let second = compute_placement(&layout, &free, Some(placed), DEFAULT_SIZE_RATIO).unwrap();

        assert_eq!(second.target, None);
        assert_eq!(second.current, Some(placed));
        assert!(!second.needs_move());
    }

    #[test]
    fn wrong_size_forces_a_move() {
        let layout = bottom_layout();
        let free = compute_free_space(&layout, &[], None);
        let stale = ScreenRect::new(1810, 1040, 1850, 1080);

        let result = compute_placement(&layout, &free, Some(stale), DEFAULT_SIZE_RATIO).unwrap();
        assert_eq!(result.target, Some(ScreenRect::new(1818, 1040, 1850, 1080)));
    }

    #[test]
    fn overlap_with_regrown_container_forces_a_move() {
        let layout = bottom_layout();
        let free = compute_free_space(&layout, &[], None);
        let inside_container = ScreenRect::new(1700, 1040, 1732, 1080);

        let result =
            compute_placement(&layout, &free, Some(inside_container), DEFAULT_SIZE_RATIO).unwrap();
        assert!(result.needs_move());
    }

    #[test]
    fn vertical_button_sits_above_tray() {
        let layout = TaskbarLayout::from_rects(
            ScreenRect::new(0, 0, 60, 1080),
            ScreenRect::new(0, 0, 60, 900),
            ScreenRect::new(0, 980, 60, 1080),
        );
        let free = compute_free_space(&layout, &[], None);

        let result = compute_placement(&layout, &free, None, DEFAULT_SIZE_RATIO).unwrap();
        assert_eq!(result.target, Some(ScreenRect::new(0, 932, 60, 980)));
        assert_eq!(result.task_list, Some(ScreenRect::new(0, 0, 60, 932)));
    }

    #[test]
    fn no_fitting_span_reports_no_room() {
        let layout = TaskbarLayout::from_rects(
            ScreenRect::new(0, 1040, 200, 1080),
            ScreenRect::new(0, 1040, 0, 1080),
            ScreenRect::new(110, 1040, 200, 1080),
        );
        let free = compute_free_space(
            &layout,
            &[obstruction(1, ScreenRect::new(20, 1040, 90, 1080))],
            None,
        );

        let err = compute_placement(&layout, &free, None, DEFAULT_SIZE_RATIO).unwrap_err();
        assert_eq!(err, TrayButtonError::NoRoom { required: 32 });
    }

    #[test]
    fn rtl_result_mirrors_ltr_result() {
        let layout = bottom_layout();
        let blocker = ScreenRect::new(1800, 1040, 1820, 1080);
        let free = compute_free_space(&layout, &[obstruction(1, blocker)], None);
        let ltr = compute_placement(&layout, &free, None, DEFAULT_SIZE_RATIO).unwrap();

        let mirrored = layout.mirrored();
        let free = compute_free_space(
            &mirrored,
            &[obstruction(1, blocker.mirrored_horizontally(960))],
            None,
        );
        let rtl = compute_placement(&mirrored, &free, None, DEFAULT_SIZE_RATIO).unwrap();

        assert_eq!(rtl.target, ltr.target.map(|t| t.mirrored_horizontally(960)));
        assert_eq!(rtl.task_list, ltr.task_list.map(|t| t.mirrored_horizontally(960)));
    }

    #[test]
    fn container_stops_at_foreign_button_when_button_skips_ahead() {
        // 容器与第三方按钮之间的空隙放不下按钮，按钮只能放到更远的空闲区间
        let layout = TaskbarLayout::from_rects(
            ScreenRect::new(0, 1040, 1920, 1080),
            ScreenRect::new(0, 1040, 10, 1080),
            ScreenRect::new(1850, 1040, 1920, 1080),
        );
        let blocker = ScreenRect::new(12, 1040, 20, 1080);
        let free = compute_free_space(&layout, &[obstruction(1, blocker)], None);

        let result = compute_placement(&layout, &free, None, DEFAULT_SIZE_RATIO).unwrap();
        assert_eq!(result.target, Some(ScreenRect::new(1818, 1040, 1850, 1080)));
        assert_eq!(result.task_list, Some(ScreenRect::new(0, 1040, 12, 1080)));

        let mirrored = layout.mirrored();
        let free = compute_free_space(
            &mirrored,
            &[obstruction(1, blocker.mirrored_horizontally(960))],
            None,
        );
        let rtl = compute_placement(&mirrored, &free, None, DEFAULT_SIZE_RATIO).unwrap();
        assert_eq!(rtl.task_list, Some(ScreenRect::new(1908, 1040, 1920, 1080)));
    }

    #[test]
    fn vertical_container_stops_at_foreign_button() {
        let layout = TaskbarLayout::from_rects(
            ScreenRect::new(0, 0, 60, 1080),
            ScreenRect::new(0, 0, 60, 10),
            ScreenRect::new(0, 980, 60, 1080),
        );
        let free = compute_free_space(
            &layout,
            &[obstruction(1, ScreenRect::new(0, 20, 60, 40))],
            None,
        );

        let result = compute_placement(&layout, &free, None, DEFAULT_SIZE_RATIO).unwrap();
        assert_eq!(result.target, Some(ScreenRect::new(0, 932, 60, 980)));
        assert_eq!(result.task_list, Some(ScreenRect::new(0, 0, 60, 20)));
    }

    struct Fixture {
        layout: TaskbarLayout,
        siblings: Vec<SiblingWindow>,
    }

    impl Fixture {
        fn random(rng: &mut fastrand::Rng) -> Self {
            let width = rng.i32(800..3840);
            let thickness = rng.i32(24..80);
            let top = rng.i32(0..2000);
            let taskbar = ScreenRect::new(0, top, width, top + thickness);
            let tray_left = rng.i32(width / 2..width - 10);
            let tray = ScreenRect::new(tray_left, top, width, top + thickness);
            let container_right = rng.i32(0..tray_left);
            let task_list = ScreenRect::new(0, top, container_right, top + thickness);

            let mut siblings = Vec::new();
            for id in 0..rng.usize(0..4) {
                let a = rng.i32(container_right..tray_left);
                let b = rng.i32(a..=tray_left);
                siblings.push(obstruction(id as isize, ScreenRect::new(a, top, b, top + thickness)));
            }

            Self {
                layout: TaskbarLayout::from_rects(taskbar, task_list, tray),
                siblings,
            }
        }

        fn axis(&self) -> i32 {
            self.layout.taskbar.left + self.layout.taskbar.width() / 2
        }

        fn mirrored(&self) -> Self {
            let axis = self.axis();
            Self {
                layout: self.layout.mirrored(),
                siblings: self
                    .siblings
                    .iter()
                    .map(|s| SiblingWindow {
                        rect: s.rect.map(|r| r.mirrored_horizontally(axis)),
                        ..*s
                    })
                    .collect(),
            }
        }

        fn place(&self, current: Option<ScreenRect>) -> TrayButtonResult<PlacementResult> {
            let free = compute_free_space(&self.layout, &self.siblings, Some(OWN));
            compute_placement(&self.layout, &free, current, DEFAULT_SIZE_RATIO)
        }

        /// 模拟移动窗口后的布局
        fn applied(&self, result: &PlacementResult) -> Self {
            let mut siblings = self.siblings.clone();
            if let Some(target) = result.target {
                siblings.push(obstruction(OWN, target));
            }
            Self {
                layout: TaskbarLayout {
                    task_list: result.task_list.unwrap_or(self.layout.task_list),
                    ..self.layout
                },
                siblings,
            }
        }
    }

    const OWN: isize = 1000;

    /// 随机布局下的包含、无碰撞、幂等和镜像对称
    #[test]
    fn random_fixtures_hold_placement_properties() {
        let mut rng = fastrand::Rng::with_seed(0x7a5c);

        for _ in 0..2000 {
            let ltr = Fixture::random(&mut rng);
            let rtl = ltr.mirrored();
            let axis = ltr.axis();

            let ltr_result = ltr.place(None);
            let rtl_result = rtl.place(None);
            match (&ltr_result, &rtl_result) {
                (Ok(a), Ok(b)) => {
                    assert_eq!(b.target, a.target.map(|t| t.mirrored_horizontally(axis)));
                    assert_eq!(b.task_list, a.task_list.map(|t| t.mirrored_horizontally(axis)));
                }
                (Err(a), Err(b)) => {
                    assert!(matches!(a, TrayButtonError::NoRoom { .. }));
                    assert_eq!(a, b);
                }
                _ => panic!("镜像结果不一致: {:?} / {:?}", ltr_result, rtl_result),
            }

            for (fixture, result) in [(&ltr, ltr_result), (&rtl, rtl_result)] {
                let Ok(result) = result else {
                    continue;
                };
                let free = compute_free_space(&fixture.layout, &fixture.siblings, Some(OWN));
                let target = result.target.unwrap();
                let task_list = result.task_list.unwrap_or(fixture.layout.task_list);

                assert!(target.is_inside(&free.available), "{} 不在 {} 内", target, free.available);
                assert!(!target.intersects(&task_list));
                for blocker in &free.obstructing {
                    assert!(!target.intersects(blocker), "{} 与 {} 相交", target, blocker);
                    assert!(!task_list.intersects(blocker), "容器 {} 盖住了 {}", task_list, blocker);
                }

                let moved = fixture.applied(&result);
                let second = moved.place(Some(target)).unwrap();
                assert_eq!(second.target, None, "第二次放置移动了 {}", target);
                assert_eq!(second.task_list, None);
            }
        }
    }

    #[test]
    fn reclaim_restores_container_edge_from_before_placement() {
        let layout = bottom_layout();
        let free = compute_free_space(&layout, &[], None);
        let result = compute_placement(&layout, &free, None, DEFAULT_SIZE_RATIO).unwrap();
        let applied = result.task_list.unwrap();
        let ceded = CededSpace::record(None, layout.task_list, applied);

        let shown = TaskbarLayout { task_list: applied, ..layout };
        assert_eq!(ceded.reclaimed_task_list(&shown), Some(ScreenRect::new(0, 1040, 1800, 1080)));

        // 再次调整时保留最初的矩形
        let shrunk = ScreenRect::new(0, 1040, 1768, 1080);
        let ceded = CededSpace::record(Some(ceded), applied, shrunk);
        assert_eq!(ceded.original, layout.task_list);
        let shown = TaskbarLayout { task_list: shrunk, ..layout };
        assert_eq!(ceded.reclaimed_task_list(&shown), Some(ScreenRect::new(0, 1040, 1800, 1080)));
    }

    #[test]
    fn reclaim_skips_container_moved_by_someone_else() {
        let layout = bottom_layout();
        let applied = ScreenRect::new(0, 1040, 1818, 1080);
        let ceded = CededSpace::record(None, layout.task_list, applied);

        let relaid = TaskbarLayout { task_list: ScreenRect::new(0, 1040, 1700, 1080), ..layout };
        assert_eq!(ceded.reclaimed_task_list(&relaid), None);

        // 资源管理器重新布局后以新的矩形为原始矩形
        let again = CededSpace::record(Some(ceded), relaid.task_list, ScreenRect::new(0, 1040, 1690, 1080));
        assert_eq!(again.original, relaid.task_list);
    }

    #[test]
    fn reclaim_never_reaches_into_grown_tray() {
        let layout = bottom_layout();
        let ceded = CededSpace {
            original: ScreenRect::new(0, 1040, 1800, 1080),
            applied: ScreenRect::new(0, 1040, 1700, 1080),
        };
        let grown = TaskbarLayout {
            task_list: ceded.applied,
            tray: ScreenRect::new(1760, 1040, 1920, 1080),
            ..layout
        };
        assert_eq!(ceded.reclaimed_task_list(&grown), Some(ScreenRect::new(0, 1040, 1760, 1080)));
    }

    #[test]
    fn popup_opens_above_bottom_taskbar() {
        let layout = bottom_layout();
        let screen = ScreenRect::new(0, 0, 1920, 1080);
        let button = ScreenRect::new(1818, 1040, 1850, 1080);

        assert_eq!(popup_origin(button, (300, 200), &layout, screen), (1550, 840));
        // 靠近屏幕左边缘时被夹紧
        let left_button = ScreenRect::new(10, 1040, 42, 1080);
        assert_eq!(popup_origin(left_button, (300, 200), &layout, screen), (0, 840));
    }
}
