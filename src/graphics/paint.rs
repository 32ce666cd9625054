//! 按钮的分层窗口绘制
//!
//! 每次重绘都在 32 位自顶向下的 DIB 上完成后整体提交给分层窗口，
//! 不存在半成品画面。

use crate::*;
use crate::tray::{
    ButtonVisualState, TrayButtonError, TrayButtonResult, centered_icon_origin,
    icon_size_for_thickness,
};
use std::ffi::c_void;
use windows::Win32::Graphics::Gdi::{
    AC_SRC_ALPHA, AC_SRC_OVER, AlphaBlend, BI_RGB, BITMAPINFO, BITMAPINFOHEADER, BLENDFUNCTION,
    CreateCompatibleDC, CreateDIBSection, DIB_RGB_COLORS, DeleteDC, DeleteObject, GetDC, HBITMAP,
    HDC, HGDIOBJ, ReleaseDC, SelectObject,
};

/// 清屏像素：完全透明的颜色配上最小的 alpha，整块区域都能接收鼠标
const HIT_TESTABLE_CLEAR: u32 = 0x0100_0000;
/// 高亮源像素（不透明白色）
const HIGHLIGHT_SOURCE: u32 = 0xFFFF_FFFF;

/// 选入内存 DC 的 DIB，离开作用域时还原并释放
struct MemorySurface {
    screen_dc: HDC,
    memory_dc: HDC,
    bitmap: HBITMAP,
    previous: HGDIOBJ,
    bits: *mut u32,
    len: usize,
}

impl MemorySurface {
    fn new(width: i32, height: i32) -> TrayButtonResult<Self> {
        let paint_error = |what: &str| TrayButtonError::PaintFailed(what.to_string());

        unsafe {
            let screen_dc = GetDC(None);
            if screen_dc.is_invalid() {
                return Err(paint_error("获取屏幕 DC 失败"));
            }

            let memory_dc = CreateCompatibleDC(Some(screen_dc));
            if memory_dc.is_invalid() {
                ReleaseDC(None, screen_dc);
                return Err(paint_error("创建内存 DC 失败"));
            }

            let info = BITMAPINFO {
                bmiHeader: BITMAPINFOHEADER {
                    biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                    biWidth: width,
                    biHeight: -height,
                    biPlanes: 1,
                    biBitCount: 32,
                    biCompression: BI_RGB.0,
                    ..Default::default()
                },
                ..Default::default()
            };

            let mut bits: *mut c_void = std::ptr::null_mut();
            let bitmap =
                match CreateDIBSection(Some(memory_dc), &info, DIB_RGB_COLORS, &mut bits, None, 0) {
                    Ok(bitmap) if !bits.is_null() => bitmap,
                    _ => {
                        let _ = DeleteDC(memory_dc);
                        ReleaseDC(None, screen_dc);
                        return Err(paint_error("创建 DIB 失败"));
                    }
                };

            let previous = SelectObject(memory_dc, bitmap.into());

            Ok(Self {
                screen_dc,
                memory_dc,
                bitmap,
                previous,
                bits: bits.cast(),
                len: (width * height) as usize,
            })
        }
    }

    fn fill(&mut self, pixel: u32) {
        unsafe { std::slice::from_raw_parts_mut(self.bits, self.len) }.fill(pixel);
    }
}

impl Drop for MemorySurface {
    fn drop(&mut self) {
        unsafe {
            SelectObject(self.memory_dc, self.previous);
            let _ = DeleteObject(self.bitmap.into());
            let _ = DeleteDC(self.memory_dc);
            ReleaseDC(None, self.screen_dc);
        }
    }
}

/// 高亮的固定不透明度（0-255）
fn highlight_alpha(opacity: f32) -> u8 {
    (opacity.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// 用 1×1 白色像素拉伸混合出高亮矩形
fn blend_highlight(
    target: &MemorySurface,
    width: i32,
    height: i32,
    opacity: f32,
) -> TrayButtonResult<()> {
    let mut source = MemorySurface::new(1, 1)?;
    source.fill(HIGHLIGHT_SOURCE);

    let blend = BLENDFUNCTION {
        BlendOp: AC_SRC_OVER as u8,
        BlendFlags: 0,
        SourceConstantAlpha: highlight_alpha(opacity),
        AlphaFormat: 0,
    };

    let blended = unsafe {
        AlphaBlend(
            target.memory_dc,
            0,
            0,
            width,
            height,
            source.memory_dc,
            0,
            0,
            1,
            1,
            blend,
        )
    };

    if blended.as_bool() {
        Ok(())
    } else {
        Err(TrayButtonError::PaintFailed("混合高亮失败".to_string()))
    }
}

/// 绘制按钮并提交到分层窗口
pub fn render_button(
    hwnd: HWND,
    width: i32,
    height: i32,
    icon: Option<HICON>,
    state: ButtonVisualState,
) -> TrayButtonResult<()> {
    if width <= 0 || height <= 0 {
        return Ok(());
    }

    let mut surface = MemorySurface::new(width, height)?;
    surface.fill(HIT_TESTABLE_CLEAR);

    let opacity = state.highlight_opacity();
    if opacity > 0.0 {
        blend_highlight(&surface, width, height, opacity)?;
    }

    if let Some(icon) = icon {
        let size = icon_size_for_thickness(width.max(height));
        let (x, y) = centered_icon_origin(width, height, size);
        unsafe { DrawIconEx(surface.memory_dc, x, y, icon, size, size, 0, None, DI_NORMAL) }
            .map_err(|e| TrayButtonError::PaintFailed(format!("绘制图标失败: {}", e)))?;
    }

    let blend = BLENDFUNCTION {
        BlendOp: AC_SRC_OVER as u8,
        BlendFlags: 0,
        SourceConstantAlpha: 255,
        AlphaFormat: AC_SRC_ALPHA as u8,
    };
    let size = SIZE {
        cx: width,
        cy: height,
    };
    let source_origin = POINT { x: 0, y: 0 };

    unsafe {
        UpdateLayeredWindow(
            hwnd,
            None,
            None,
            Some(&size),
            Some(surface.memory_dc),
            Some(&source_origin),
            COLORREF(0),
            Some(&blend),
            ULW_ALPHA,
        )
    }
    .map_err(|e| TrayButtonError::PaintFailed(format!("提交分层窗口失败: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlight_alpha_follows_state() {
        let pressed = ButtonVisualState::HOVER | ButtonVisualState::LEFT_PRESSED;
        assert_eq!(highlight_alpha(pressed.highlight_opacity()), 64);
        assert_eq!(highlight_alpha(ButtonVisualState::HOVER.highlight_opacity()), 26);
        assert_eq!(highlight_alpha(ButtonVisualState::empty().highlight_opacity()), 0);
    }
}
