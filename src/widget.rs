use crate::*;
use crate::config::TrayButtonOptions;
use crate::graphics::ButtonIcon;
use crate::tray::{
    MouseUpEvent, PlacementResult, ScreenRect, TaskbarLayout, TrayButtonError, TrayButtonResult,
    Visibility, VisibilityAction,
};
use crate::window::{ButtonWindow, SharedMouseUpHandler};
use std::cell::RefCell;
use tracing::{info, warn};

/// 任务栏通知区域旁的按钮
///
/// 图标、提示文字、可见性可以按任意顺序设置。设为可见时创建原生窗口并
/// 放到任务按钮容器与通知区域之间，设为不可见或释放时销毁窗口并归还空间。
pub struct TrayButton {
    options: TrayButtonOptions,
    icon: Option<Rc<ButtonIcon>>,
    text: Option<String>,
    handler: SharedMouseUpHandler,
    window: Option<ButtonWindow>,
    visibility: Visibility,
    disposed: bool,
}

impl TrayButton {
    pub fn new(options: TrayButtonOptions) -> Self {
        Self {
            options: options.sanitized(),
            icon: None,
            text: None,
            handler: Rc::new(RefCell::new(None)),
            window: None,
            visibility: Visibility::default(),
            disposed: false,
        }
    }

    /// 设置图标，只触发重绘
    pub fn set_icon(&mut self, icon: Option<ButtonIcon>) {
        self.icon = icon.map(Rc::new);
        if let Some(window) = &self.window {
            window.set_icon(self.icon.clone());
        }
    }

    pub fn icon(&self) -> Option<&ButtonIcon> {
        self.icon.as_deref()
    }

    /// 设置提示文字，`None` 删除提示
    pub fn set_text(&mut self, text: Option<String>) {
        self.text = text;
        if let Some(window) = &self.window {
            window.set_text(self.text.clone());
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// 创建或销毁原生窗口
    ///
    /// 只有首次创建原生窗口失败时返回错误，调用方可以改用其他入口
    /// （例如通知区域图标）。之后的创建失败只记录日志，下次设置可见性
    /// 或重新定位时重试。
    pub fn set_visible(&mut self, visible: bool) -> TrayButtonResult<()> {
        if self.disposed {
            return Err(TrayButtonError::WindowCreationFailed(
                "按钮已释放".to_string(),
            ));
        }

        match self.visibility.request(visible, self.window.is_some()) {
            VisibilityAction::Create => self.create_window(),
            VisibilityAction::Destroy => {
                self.window = None;
                info!("托盘按钮已隐藏");
                Ok(())
            }
            VisibilityAction::Nothing => Ok(()),
        }
    }

    fn create_window(&mut self) -> TrayButtonResult<()> {
        match ButtonWindow::create(
            &self.options,
            self.icon.clone(),
            self.text.as_deref(),
            self.handler.clone(),
        ) {
            Ok(window) => {
                self.window = Some(window);
                self.visibility.created();
                info!("托盘按钮已显示");
                Ok(())
            }
            Err(error) => self.visibility.creation_failed(error),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.window.is_some()
    }

    /// 注册点击回调，替换之前的回调
    pub fn on_mouse_up(&mut self, handler: impl FnMut(MouseUpEvent) + 'static) {
        match self.handler.try_borrow_mut() {
            Ok(mut slot) => *slot = Some(Box::new(handler)),
            Err(_) => warn!("不能在点击回调中替换回调"),
        }
    }

    /// 最近一次应用的屏幕矩形
    pub fn position_and_size(&self) -> Option<ScreenRect> {
        self.window.as_ref().and_then(|window| window.position())
    }

    /// 最近一次定位时的任务栏布局
    pub fn taskbar_layout(&self) -> Option<TaskbarLayout> {
        self.window.as_ref().and_then(|window| window.layout())
    }

    /// 立即重新定位，之前重新创建失败时先重试创建
    pub fn reposition(&mut self) -> TrayButtonResult<PlacementResult> {
        if !self.disposed && self.visibility.pending(self.window.is_some()) == VisibilityAction::Create {
            self.create_window()?;
        }

        self.window
            .as_ref()
            .ok_or_else(|| TrayButtonError::RepositionFailed("按钮不可见".to_string()))?
            .reposition()
    }

    /// 释放按钮，可重复调用
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.window = None;
        if let Ok(mut slot) = self.handler.try_borrow_mut() {
            *slot = None;
        }
    }
}

impl Drop for TrayButton {
    fn drop(&mut self) {
        self.dispose();
    }
}
