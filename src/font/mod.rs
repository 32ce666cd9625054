mod loader;

pub use loader::*;

use crate::*;

/// 字体管理器，负责弹出条字体的加载
pub struct FontManager {
    font: Option<Font>,
}

impl FontManager {
    pub fn new() -> Self {
        let font = load_system_font();
        if font.is_none() {
            tracing::warn!("未找到可用的系统字体，弹出条将不显示文字");
        }
        Self { font }
    }

    /// 获取字体引用
    pub fn get_font(&self) -> Option<&Font> {
        self.font.as_ref()
    }
}

impl Default for FontManager {
    fn default() -> Self {
        Self::new()
    }
}
