use crate::*;
use crate::tray::{ScreenRect, TrayButtonError, TrayButtonResult};
use crate::window::module_instance;
use tracing::{debug, warn};
use windows::Win32::UI::Controls::{
    ICC_WIN95_CLASSES, INITCOMMONCONTROLSEX, InitCommonControlsEx, TTF_SUBCLASS, TTM_ADDTOOLW,
    TTM_DELTOOLW, TTM_NEWTOOLRECTW, TTM_UPDATETIPTEXTW, TTTOOLINFOW,
};

/// TTS_ALWAYSTIP | TTS_NOPREFIX
const TOOLTIP_STYLE: u32 = 0x01 | 0x02;
const TOOL_ID: usize = 1;

fn to_wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

/// 绑定在按钮客户区上的提示框
pub struct Tooltip {
    hwnd: HWND,
    owner: HWND,
    text: Option<Vec<u16>>,
    rect: RECT,
}

impl Tooltip {
    pub fn create(owner: HWND) -> TrayButtonResult<Self> {
        let controls = INITCOMMONCONTROLSEX {
            dwSize: std::mem::size_of::<INITCOMMONCONTROLSEX>() as u32,
            dwICC: ICC_WIN95_CLASSES,
        };
        unsafe {
            let _ = InitCommonControlsEx(&controls);
        }

        let instance = module_instance()?;
        let hwnd = unsafe {
            CreateWindowExW(
                WS_EX_TOPMOST,
                w!("tooltips_class32"),
                w!(""),
                WS_POPUP | WINDOW_STYLE(TOOLTIP_STYLE),
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                Some(owner),
                None,
                Some(instance),
                None,
            )
        }
        .map_err(|e| TrayButtonError::WindowCreationFailed(format!("创建提示框失败: {}", e)))?;

        Ok(Self {
            hwnd,
            owner,
            text: None,
            rect: RECT::default(),
        })
    }

    fn tool_info(&mut self) -> TTTOOLINFOW {
        TTTOOLINFOW {
            cbSize: std::mem::size_of::<TTTOOLINFOW>() as u32,
            uFlags: TTF_SUBCLASS,
            hwnd: self.owner,
            uId: TOOL_ID,
            rect: self.rect,
            lpszText: self
                .text
                .as_mut()
                .map(|text| PWSTR(text.as_mut_ptr()))
                .unwrap_or(PWSTR::null()),
            ..Default::default()
        }
    }

    fn send(&mut self, message: u32) -> bool {
        let info = self.tool_info();
        let result = unsafe {
            SendMessageW(
                self.hwnd,
                message,
                Some(WPARAM(0)),
                Some(LPARAM(&info as *const TTTOOLINFOW as isize)),
            )
        };
        result.0 != 0
    }

    /// 设置或删除提示文字
    pub fn set_text(&mut self, text: Option<&str>) {
        let had_tool = self.text.is_some();
        match text {
            Some(text) => {
                self.text = Some(to_wide(text));
                if had_tool {
                    self.send(TTM_UPDATETIPTEXTW);
                } else if !self.send(TTM_ADDTOOLW) {
                    warn!("注册提示框工具失败");
                    self.text = None;
                    return;
                }
                debug!("提示文字: {}", text);
            }
            None if had_tool => {
                self.send(TTM_DELTOOLW);
                self.text = None;
                debug!("已移除提示文字");
            }
            None => {}
        }
    }

    /// 按钮尺寸变化后更新提示区域
    pub fn set_client_rect(&mut self, rect: ScreenRect) {
        self.rect = RECT {
            left: rect.left,
            top: rect.top,
            right: rect.right,
            bottom: rect.bottom,
        };
        if self.text.is_some() {
            self.send(TTM_NEWTOOLRECTW);
        }
    }
}

impl Drop for Tooltip {
    fn drop(&mut self) {
        unsafe {
            let _ = DestroyWindow(self.hwnd);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_text_is_nul_terminated() {
        assert_eq!(to_wide("Hi"), vec![b'H' as u16, b'i' as u16, 0]);
        assert_eq!(to_wide(""), vec![0]);
    }
}
