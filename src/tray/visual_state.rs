//! 按钮的悬停/按下状态机以及由状态决定的绘制参数

use bitflags::bitflags;

use crate::tray::ScreenRect;

bitflags! {
    /// 按钮视觉状态，仅由输入状态机修改
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ButtonVisualState: u8 {
        const HOVER = 0b001;
        const LEFT_PRESSED = 0b010;
        const RIGHT_PRESSED = 0b100;
    }
}

/// 鼠标按键类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButtonKind {
    Left,
    Right,
}

impl MouseButtonKind {
    fn pressed_flag(self) -> ButtonVisualState {
        match self {
            MouseButtonKind::Left => ButtonVisualState::LEFT_PRESSED,
            MouseButtonKind::Right => ButtonVisualState::RIGHT_PRESSED,
        }
    }
}

/// 驱动状态机的输入事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Move,
    Down(MouseButtonKind),
    Up(MouseButtonKind),
    Leave,
}

/// 一次状态迁移的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transition {
    /// 视觉状态是否改变（需要重绘）
    pub changed: bool,
    /// 完成的一次点击
    pub click: Option<MouseButtonKind>,
}

impl ButtonVisualState {
    /// 处理一个输入事件，`inside` 表示光标当前是否位于按钮内
    ///
    /// 光标离开窗口后无法继续跟踪按下状态，因此 `Leave` 无条件回到正常状态。
    pub fn apply(&mut self, event: PointerEvent, inside: bool) -> Transition {
        let before = *self;
        let mut click = None;

        match event {
            PointerEvent::Move if inside => self.insert(Self::HOVER),
            PointerEvent::Move | PointerEvent::Leave => *self = Self::empty(),
            PointerEvent::Down(button) => {
                if inside {
                    self.insert(Self::HOVER | button.pressed_flag());
                }
            }
            PointerEvent::Up(button) => {
                if self.contains(button.pressed_flag()) {
                    self.remove(button.pressed_flag());
                    if inside {
                        click = Some(button);
                    }
                }
                if !inside {
                    *self = Self::empty();
                }
            }
        }

        Transition {
            changed: *self != before,
            click,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.intersects(Self::LEFT_PRESSED | Self::RIGHT_PRESSED)
    }

    /// 高亮矩形的不透明度
    pub fn highlight_opacity(&self) -> f32 {
        if self.is_pressed() {
            0.25
        } else if self.contains(Self::HOVER) {
            0.10
        } else {
            0.0
        }
    }
}

/// 根据按钮厚度选择图标尺寸
pub fn icon_size_for_thickness(thickness: i32) -> i32 {
    match thickness {
        t if t >= 48 => 32,
        t if t >= 40 => 24,
        t if t >= 32 => 20,
        _ => 16,
    }
}

/// 图标在按钮内居中时的左上角
pub fn centered_icon_origin(width: i32, height: i32, icon_size: i32) -> (i32, i32) {
    ((width - icon_size) / 2, (height - icon_size) / 2)
}

/// 低级鼠标钩子上报的原始事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawPointer {
    Move,
    Down(MouseButtonKind),
    Up(MouseButtonKind),
}

/// 从屏幕级鼠标事件中推导按钮的进入/离开
///
/// 低级鼠标钩子看到的是整个桌面的事件，这里只保留与跟踪区域相关的部分，
/// 并在光标离开区域时合成一次 `Leave`。
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerTracker {
    inside: bool,
}

impl PointerTracker {
    pub fn is_inside(&self) -> bool {
        self.inside
    }

    /// 返回需要交给状态机的事件以及光标是否在区域内
    pub fn translate(
        &mut self,
        raw: RawPointer,
        x: i32,
        y: i32,
        region: &ScreenRect,
    ) -> Option<(PointerEvent, bool)> {
        let inside = region.contains_point(x, y);
        let was_inside = std::mem::replace(&mut self.inside, inside);

        match raw {
            RawPointer::Move if inside => Some((PointerEvent::Move, true)),
            RawPointer::Move if was_inside => Some((PointerEvent::Leave, false)),
            RawPointer::Move => None,
            RawPointer::Down(button) if inside => Some((PointerEvent::Down(button), true)),
            RawPointer::Down(_) => None,
            RawPointer::Up(button) if inside || was_inside => Some((PointerEvent::Up(button), inside)),
            RawPointer::Up(_) => None,
        }
    }

    pub fn reset(&mut self) {
        self.inside = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hover_press_release_emits_click() {
        let mut state = ButtonVisualState::default();

        assert!(state.apply(PointerEvent::Move, true).changed);
        assert_eq!(state, ButtonVisualState::HOVER);
        assert_eq!(state.highlight_opacity(), 0.10);

        assert!(state.apply(PointerEvent::Down(MouseButtonKind::Left), true).changed);
        assert_eq!(state.highlight_opacity(), 0.25);

        let transition = state.apply(PointerEvent::Up(MouseButtonKind::Left), true);
        assert!(transition.changed);
        assert_eq!(transition.click, Some(MouseButtonKind::Left));
        assert_eq!(state, ButtonVisualState::HOVER);
    }

    #[test]
    fn leave_resets_from_any_state() {
        let mut state = ButtonVisualState::HOVER | ButtonVisualState::RIGHT_PRESSED;
        let transition = state.apply(PointerEvent::Leave, false);
        assert!(transition.changed);
        assert_eq!(transition.click, None);
        assert_eq!(state, ButtonVisualState::empty());
        assert_eq!(state.highlight_opacity(), 0.0);
    }

    #[test]
    fn release_outside_does_not_click() {
        let mut state = ButtonVisualState::default();
        state.apply(PointerEvent::Down(MouseButtonKind::Right), true);
        let transition = state.apply(PointerEvent::Up(MouseButtonKind::Right), false);
        assert_eq!(transition.click, None);
        assert_eq!(state, ButtonVisualState::empty());
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut state = ButtonVisualState::HOVER;
        let transition = state.apply(PointerEvent::Up(MouseButtonKind::Left), true);
        assert_eq!(transition, Transition::default());
    }

    #[test]
    fn repeated_move_does_not_request_redraw() {
        let mut state = ButtonVisualState::default();
        state.apply(PointerEvent::Move, true);
        assert!(!state.apply(PointerEvent::Move, true).changed);
    }

    #[test]
    fn icon_size_steps() {
        assert_eq!(icon_size_for_thickness(24), 16);
        assert_eq!(icon_size_for_thickness(32), 20);
        assert_eq!(icon_size_for_thickness(40), 24);
        assert_eq!(icon_size_for_thickness(47), 24);
        assert_eq!(icon_size_for_thickness(72), 32);
        assert_eq!(centered_icon_origin(32, 40, 24), (4, 8));
    }

    #[test]
    fn tracker_synthesizes_leave() {
        let region = ScreenRect::new(1818, 1040, 1850, 1080);
        let mut tracker = PointerTracker::default();

        assert_eq!(tracker.translate(RawPointer::Move, 10, 10, &region), None);
        assert_eq!(
            tracker.translate(RawPointer::Move, 1820, 1050, &region),
            Some((PointerEvent::Move, true))
        );
        assert!(tracker.is_inside());
        assert_eq!(
            tracker.translate(RawPointer::Move, 1700, 1050, &region),
            Some((PointerEvent::Leave, false))
        );
        assert_eq!(tracker.translate(RawPointer::Move, 1701, 1050, &region), None);
    }

    #[test]
    fn tracker_ignores_clicks_elsewhere() {
        let region = ScreenRect::new(1818, 1040, 1850, 1080);
        let mut tracker = PointerTracker::default();

        assert_eq!(
            tracker.translate(RawPointer::Down(MouseButtonKind::Left), 5, 5, &region),
            None
        );
        assert_eq!(
            tracker.translate(RawPointer::Up(MouseButtonKind::Left), 5, 5, &region),
            None
        );
        assert_eq!(
            tracker.translate(RawPointer::Down(MouseButtonKind::Left), 1830, 1060, &region),
            Some((PointerEvent::Down(MouseButtonKind::Left), true))
        );
        assert_eq!(
            tracker.translate(RawPointer::Up(MouseButtonKind::Left), 1831, 1061, &region),
            Some((PointerEvent::Up(MouseButtonKind::Left), true))
        );
    }
}
