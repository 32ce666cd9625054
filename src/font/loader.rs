use crate::*;
use tracing::debug;

/// 弹出条使用的系统字体，按优先级排列
const FONT_PATHS: [&str; 3] = [
    r"C:\Windows\Fonts\segoeui.ttf",
    r"C:\Windows\Fonts\tahoma.ttf",
    r"C:\Windows\Fonts\arial.ttf",
];

/// 加载系统字体
pub fn load_system_font() -> Option<Font> {
    FONT_PATHS.iter().find_map(|path| try_load_font_from_path(path))
}

/// 尝试从指定路径加载字体
fn try_load_font_from_path(path: &str) -> Option<Font> {
    let font_data = std::fs::read(path).ok()?;
    let settings = FontSettings {
        collection_index: 0,
        scale: 24.0,
        load_substitutions: true,
    };

    let font = Font::from_bytes(font_data, settings).ok()?;
    debug!("已加载字体: {}", path);
    Some(font)
}

/// 没有字体时按固定字宽估算文本宽度
pub fn get_pixel_text_width(text: &str, char_width: u32) -> u32 {
    text.chars().count() as u32 * char_width
}

/// 使用 Layout API 排版单行文本，返回字形以及整体宽高
pub fn layout_text(
    font: &Font,
    text: &str,
    font_size: f32,
) -> (Vec<fontdue::layout::GlyphPosition>, f32, f32) {
    let fonts = &[font];
    let mut layout = fontdue::layout::Layout::new(fontdue::layout::CoordinateSystem::PositiveYDown);

    layout.reset(&fontdue::layout::LayoutSettings {
        x: 0.0,
        y: 0.0,
        max_width: None,
        max_height: None,
        horizontal_align: fontdue::layout::HorizontalAlign::Left,
        vertical_align: fontdue::layout::VerticalAlign::Top,
        line_height: 1.0,
        wrap_style: fontdue::layout::WrapStyle::Word,
        wrap_hard_breaks: true,
    });

    layout.append(fonts, &fontdue::layout::TextStyle::new(text, font_size, 0));

    let glyphs = layout.glyphs().to_vec();
    let height = layout.height();
    let width = glyphs
        .iter()
        .map(|g| g.x + g.width as f32)
        .fold(0.0, f32::max);

    (glyphs, width, height)
}
