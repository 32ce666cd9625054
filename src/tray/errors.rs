use thiserror::Error;

/// 托盘按钮错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrayButtonError {
    #[error("找不到任务栏窗口: {0}")]
    TopologyNotFound(String),

    #[error("创建按钮窗口失败: {0}")]
    WindowCreationFailed(String),

    #[error("调整窗口位置失败: {0}")]
    RepositionFailed(String),

    #[error("绘制按钮失败: {0}")]
    PaintFailed(String),

    #[error("任务栏中没有足够的空间放置按钮 (需要 {required} 像素)")]
    NoRoom { required: i32 },

    #[error("安装鼠标钩子失败: {0}")]
    HookInstallFailed(String),
}

impl TrayButtonError {
    /// 检查错误是否属于稳态布局竞争，等待下一次触发重试即可
    ///
    /// 只有首次创建原生窗口的失败需要交给调用方处理。
    pub fn is_transient(&self) -> bool {
        !matches!(self, TrayButtonError::WindowCreationFailed(_))
    }
}

/// 托盘按钮结果类型
pub type TrayButtonResult<T> = Result<T, TrayButtonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_creation_failures_are_fatal() {
        assert!(!TrayButtonError::WindowCreationFailed("x".into()).is_transient());
        assert!(TrayButtonError::TopologyNotFound("x".into()).is_transient());
        assert!(TrayButtonError::NoRoom { required: 32 }.is_transient());
        assert!(TrayButtonError::PaintFailed("x".into()).is_transient());
    }
}
