use tracing::warn;

use crate::tray::{TrayButtonError, TrayButtonResult};

/// 设置可见性后需要对原生窗口执行的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityAction {
    Create,
    Destroy,
    Nothing,
}

/// 宿主期望的可见性，以及原生窗口是否曾经创建成功
///
/// 只有第一次创建失败需要交给调用方；之后的失败（例如资源管理器重启期间
/// 找不到任务栏）保留期望的可见性，下次设置可见性或重新定位时再试。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Visibility {
    desired: bool,
    created_once: bool,
}

impl Visibility {
    pub fn is_desired(&self) -> bool {
        self.desired
    }

    pub fn has_been_created(&self) -> bool {
        self.created_once
    }

    /// 记录期望的可见性并返回需要执行的操作
    pub fn request(&mut self, visible: bool, window_exists: bool) -> VisibilityAction {
        self.desired = visible;
        self.pending(window_exists)
    }

    /// 期望与原生窗口当前状态不一致时需要执行的操作
    pub fn pending(&self, window_exists: bool) -> VisibilityAction {
        match (self.desired, window_exists) {
            (true, false) => VisibilityAction::Create,
            (false, true) => VisibilityAction::Destroy,
            _ => VisibilityAction::Nothing,
        }
    }

    pub fn created(&mut self) {
        self.created_once = true;
    }

    /// 处理一次创建失败
    pub fn creation_failed(&mut self, error: TrayButtonError) -> TrayButtonResult<()> {
        if self.created_once {
            warn!("重新创建托盘按钮失败，等待下次重试: {}", error);
            return Ok(());
        }

        self.desired = false;
        Err(error)
    }
}
