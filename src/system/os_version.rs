use crate::*;
use tracing::debug;
use windows::Win32::System::Registry::{HKEY_LOCAL_MACHINE, RRF_RT_REG_SZ, RegGetValueW};

/// 读取系统内部版本号（如 19045、22631）
pub fn os_build_number() -> Option<u32> {
    let mut buffer = [0u16; 32];
    let mut size = std::mem::size_of_val(&buffer) as u32;

    let status = unsafe {
        RegGetValueW(
            HKEY_LOCAL_MACHINE,
            w!(r"SOFTWARE\Microsoft\Windows NT\CurrentVersion"),
            w!("CurrentBuildNumber"),
            RRF_RT_REG_SZ,
            None,
            Some(buffer.as_mut_ptr().cast()),
            Some(&mut size),
        )
    };

    if status != ERROR_SUCCESS {
        debug!("读取系统版本号失败: {:?}", status);
        return None;
    }

    parse_build_number(&buffer)
}

fn parse_build_number(buffer: &[u16]) -> Option<u32> {
    let len = buffer.iter().position(|&c| c == 0).unwrap_or(buffer.len());
    String::from_utf16_lossy(&buffer[..len]).trim().parse().ok()
}
