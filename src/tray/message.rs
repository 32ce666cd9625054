use crate::tray::{MouseButtonKind, PointerEvent};

/// 一次完成的点击，坐标为按钮客户区坐标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseUpEvent {
    pub button: MouseButtonKind,
    pub x: i32,
    pub y: i32,
}

/// 按钮窗口关心的消息
///
/// 窗口过程先把原生消息解码成这个枚举，再交给 [`MessageHandler`]，
/// 处理逻辑不直接接触消息常量。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMessage {
    /// 原生鼠标消息，坐标为客户区坐标
    Pointer { event: PointerEvent, x: i32, y: i32 },
    /// 低级鼠标钩子队列中有待处理的事件
    HookInputAvailable,
    Paint,
    EraseBackground,
    Resized { width: i32, height: i32 },
    Timer(usize),
    /// 显示设置、DPI 或工作区发生变化
    DisplaySettingsChanged,
    /// 通知区域等外壳窗口移动了
    ShellLayoutChanged,
    /// 鼠标点击时请求激活
    MouseActivate,
    Destroy,
    Other(u32),
}

/// 窗口消息处理器
pub trait MessageHandler {
    /// 返回 `Some(result)` 表示消息已处理，`None` 交给默认窗口过程
    fn handle(&mut self, message: WindowMessage) -> Option<isize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder(Vec<WindowMessage>);

    impl MessageHandler for Recorder {
        fn handle(&mut self, message: WindowMessage) -> Option<isize> {
            self.0.push(message);
            match message {
                WindowMessage::EraseBackground => Some(1),
                WindowMessage::Other(_) => None,
                _ => Some(0),
            }
        }
    }

    #[test]
    fn unhandled_messages_fall_through() {
        let mut recorder = Recorder(Vec::new());
        assert_eq!(recorder.handle(WindowMessage::EraseBackground), Some(1));
        assert_eq!(recorder.handle(WindowMessage::Other(0x0400)), None);
        assert_eq!(recorder.0.len(), 2);
    }
}
