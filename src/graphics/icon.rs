use crate::*;
use crate::tray::{TrayButtonError, TrayButtonResult};
use std::path::Path;
use tracing::debug;

/// 按钮图标
///
/// 从文件加载的图标由本对象负责释放，系统共享图标不释放。
#[derive(Debug)]
pub struct ButtonIcon {
    handle: HICON,
    owned: bool,
}

impl ButtonIcon {
    /// 从 .ico 文件加载图标
    pub fn from_file(path: &Path) -> TrayButtonResult<Self> {
        let wide = HSTRING::from(path);
        let handle = unsafe {
            LoadImageW(None, &wide, IMAGE_ICON, 32, 32, LR_LOADFROMFILE)
        }
        .map_err(|e| {
            TrayButtonError::PaintFailed(format!("加载图标 {} 失败: {}", path.display(), e))
        })?;

        debug!("已加载图标: {}", path.display());
        Ok(Self {
            handle: HICON(handle.0),
            owned: true,
        })
    }

    /// 系统默认应用图标
    pub fn application_default() -> TrayButtonResult<Self> {
        let handle = unsafe { LoadIconW(None, IDI_APPLICATION) }
            .map_err(|e| TrayButtonError::PaintFailed(format!("加载默认图标失败: {}", e)))?;
        Ok(Self {
            handle,
            owned: false,
        })
    }

    pub fn handle(&self) -> HICON {
        self.handle
    }
}

impl Drop for ButtonIcon {
    fn drop(&mut self) {
        if self.owned && !self.handle.is_invalid() {
            unsafe {
                let _ = DestroyIcon(self.handle);
            }
        }
    }
}
