use crate::*;
use crate::font::{FontManager, layout_text};

/// 弹出条的配色与尺寸
#[derive(Debug, Clone)]
pub struct BarStyle {
    pub background: u32,
    pub chip: u32,
    pub text: u32,
    pub font_size: f32,
    pub padding: u32,
    pub spacing: u32,
    pub chip_height: u32,
}

impl Default for BarStyle {
    fn default() -> Self {
        Self {
            background: 0x00202020,
            chip: 0x00383838,
            text: 0x00F0F0F0,
            font_size: 15.0,
            padding: 10,
            spacing: 8,
            chip_height: 32,
        }
    }
}

/// 单个条目在弹出条中的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipLayout {
    pub x: u32,
    pub width: u32,
}

/// 计算各条目的位置以及整个弹出条的尺寸
pub fn layout_bar(
    items: &[String],
    font_manager: &FontManager,
    style: &BarStyle,
) -> (Vec<ChipLayout>, u32, u32) {
    let mut chips = Vec::with_capacity(items.len());
    let mut x = style.padding;

    for item in items {
        let text_width = match font_manager.get_font() {
            Some(font) => {
                let (_, width, _) = layout_text(font, item, style.font_size);
                width.ceil() as u32
            }
            None => crate::font::get_pixel_text_width(item, (style.font_size * 0.6) as u32),
        };
        let width = text_width + style.padding * 2;
        chips.push(ChipLayout { x, width });
        x += width + style.spacing;
    }

    let width = if chips.is_empty() {
        style.padding * 2
    } else {
        x - style.spacing + style.padding
    };
    let height = style.chip_height + style.padding * 2;
    (chips, width, height)
}

/// 图形渲染器，负责弹出条的绘制
pub struct Renderer {
    surface: Option<Surface<Rc<Window>, Rc<Window>>>,
    context: Option<Context<Rc<Window>>>,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            surface: None,
            context: None,
        }
    }

    /// 初始化渲染器
    pub fn initialize(&mut self, window: &Rc<Window>) -> std::result::Result<(), String> {
        let context = Context::new(window.clone())
            .map_err(|e| format!("创建渲染上下文失败: {}", e))?;

        let surface = Surface::new(&context, window.clone())
            .map_err(|e| format!("创建渲染表面失败: {}", e))?;

        self.context = Some(context);
        self.surface = Some(surface);

        Ok(())
    }

    /// 绘制弹出条
    pub fn draw_bar(
        &mut self,
        items: &[String],
        font_manager: &FontManager,
        style: &BarStyle,
        window_width: u32,
        window_height: u32,
    ) -> std::result::Result<(), String> {
        let surface = self.surface.as_mut().ok_or("渲染表面未初始化")?;

        let (Some(width), Some(height)) =
            (NonZeroU32::new(window_width), NonZeroU32::new(window_height))
        else {
            return Ok(());
        };

        surface
            .resize(width, height)
            .map_err(|e| format!("调整缓冲区失败: {}", e))?;

        let mut buffer = surface
            .buffer_mut()
            .map_err(|e| format!("获取缓冲区失败: {}", e))?;

        buffer.fill(style.background);

        let (chips, _, _) = layout_bar(items, font_manager, style);
        let canvas = Canvas {
            width: window_width,
            height: window_height,
        };

        for (item, chip) in items.iter().zip(chips) {
            canvas.fill_rect(
                &mut buffer,
                chip.x,
                style.padding,
                chip.width,
                style.chip_height,
                style.chip,
            );

            if let Some(font) = font_manager.get_font() {
                Self::draw_text_with_font(&mut buffer, &canvas, item, font, style, chip);
            }
        }

        buffer.present().map_err(|e| format!("呈现缓冲区失败: {}", e))?;

        Ok(())
    }

    /// 在条目中居中绘制文本
    fn draw_text_with_font(
        buffer: &mut [u32],
        canvas: &Canvas,
        text: &str,
        font: &Font,
        style: &BarStyle,
        chip: ChipLayout,
    ) {
        let (glyphs, text_width, text_height) = layout_text(font, text, style.font_size);
        if glyphs.is_empty() {
            return;
        }

        let text_x = chip.x as f32 + (chip.width as f32 - text_width) / 2.0;
        let text_y = style.padding as f32 + (style.chip_height as f32 - text_height) / 2.0;

        for glyph in glyphs {
            let (metrics, bitmap) = font.rasterize(glyph.parent, glyph.key.px);
            canvas.blend_coverage(
                buffer,
                &bitmap,
                &metrics,
                text_x as i32 + glyph.x as i32,
                text_y as i32 + glyph.y as i32,
                style.text,
            );
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

struct Canvas {
    width: u32,
    height: u32,
}

impl Canvas {
    fn fill_rect(&self, buffer: &mut [u32], x: u32, y: u32, width: u32, height: u32, color: u32) {
        for row in y..(y + height).min(self.height) {
            for col in x..(x + width).min(self.width) {
                let index = (row * self.width + col) as usize;
                if let Some(pixel) = buffer.get_mut(index) {
                    *pixel = color;
                }
            }
        }
    }

    /// 按字形覆盖率把文字颜色混合到背景上
    fn blend_coverage(
        &self,
        buffer: &mut [u32],
        bitmap: &[u8],
        metrics: &fontdue::Metrics,
        char_x: i32,
        char_y: i32,
        color: u32,
    ) {
        for y in 0..metrics.height {
            for x in 0..metrics.width {
                let pixel_x = char_x + x as i32;
                let pixel_y = char_y + y as i32;

                if pixel_x < 0
                    || pixel_y < 0
                    || pixel_x >= self.width as i32
                    || pixel_y >= self.height as i32
                {
                    continue;
                }

                let coverage = bitmap.get(y * metrics.width + x).copied().unwrap_or(0);
                if coverage == 0 {
                    continue;
                }

                let index = (pixel_y as u32 * self.width + pixel_x as u32) as usize;
                if let Some(pixel) = buffer.get_mut(index) {
                    *pixel = mix(*pixel, color, coverage);
                }
            }
        }
    }
}

/// 按 `alpha` 在两种 0RGB 颜色之间插值
fn mix(background: u32, foreground: u32, alpha: u8) -> u32 {
    let a = alpha as u32;
    let channel = |shift: u32| {
        let bg = (background >> shift) & 0xFF;
        let fg = (foreground >> shift) & 0xFF;
        ((fg * a + bg * (255 - a) + 127) / 255) << shift
    };
    channel(16) | channel(8) | channel(0)
}
