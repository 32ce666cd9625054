use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::tray::{BoundedRetry, DEFAULT_SIZE_RATIO};

/// Windows 11 的首个内部版本号
pub const WINDOWS_11_BUILD: u32 = 22000;

/// 配置读写错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("读取配置文件失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("配置文件格式错误: {0}")]
    Json(#[from] serde_json::Error),

    #[error("无法确定配置目录")]
    NoConfigDir,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 是否使用低级鼠标钩子跟踪悬停和点击
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseHookMode {
    /// Windows 11 上启用（任务栏会截走子窗口的鼠标消息）
    #[default]
    Auto,
    Always,
    Never,
}

impl MouseHookMode {
    /// 根据系统内部版本号决定是否启用钩子
    pub fn resolve(self, os_build: Option<u32>) -> bool {
        match self {
            MouseHookMode::Always => true,
            MouseHookMode::Never => false,
            MouseHookMode::Auto => os_build.is_some_and(|build| build >= WINDOWS_11_BUILD),
        }
    }
}

/// 托盘按钮行为配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrayButtonOptions {
    /// 按钮长度与任务栏厚度之比
    pub size_ratio: f32,
    /// 显示设置变化后重检位置的间隔（毫秒）
    pub self_heal_interval_ms: u64,
    /// 重检次数上限
    pub self_heal_ticks: u32,
    pub mouse_hook: MouseHookMode,
}

impl Default for TrayButtonOptions {
    fn default() -> Self {
        Self {
            size_ratio: DEFAULT_SIZE_RATIO,
            self_heal_interval_ms: 250,
            self_heal_ticks: 40,
            mouse_hook: MouseHookMode::Auto,
        }
    }
}

impl TrayButtonOptions {
    /// 自愈重检任务
    pub fn self_heal_retry(&self) -> BoundedRetry {
        BoundedRetry::new(
            Duration::from_millis(self.self_heal_interval_ms),
            self.self_heal_ticks,
        )
    }

    /// 把明显无效的值拉回合理范围
    pub fn sanitized(mut self) -> Self {
        if !(0.1..=1.0).contains(&self.size_ratio) {
            warn!("按钮尺寸比例 {} 无效，使用默认值", self.size_ratio);
            self.size_ratio = DEFAULT_SIZE_RATIO;
        }
        if self.self_heal_interval_ms == 0 {
            self.self_heal_interval_ms = 250;
        }
        self
    }
}

/// 应用配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub button: TrayButtonOptions,
    /// 按钮提示文字
    pub tooltip: Option<String>,
    /// 按钮图标（.ico 文件），缺省时使用系统应用图标
    pub icon_path: Option<PathBuf>,
    /// 弹出条中显示的条目
    pub bar_items: Vec<String>,
    /// 日志级别：trace/debug/info/warn/error
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            button: TrayButtonOptions::default(),
            tooltip: Some("Quick Strip".to_string()),
            icon_path: None,
            bar_items: vec![
                "Magnifier".to_string(),
                "Read Aloud".to_string(),
                "Color Filters".to_string(),
                "Night Mode".to_string(),
            ],
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// 默认配置文件路径
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("taskbar_tray_button");
            path.push("config.json");
            path
        })
    }

    /// 从文件读取配置
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: AppConfig = serde_json::from_str(&content)?;
        config.button = config.button.sanitized();
        debug!("已加载配置: {}", path.display());
        Ok(config)
    }

    /// 读取配置，文件不存在时返回默认值
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            debug!("配置文件不存在，使用默认配置: {}", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// 写入配置文件
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// 解析日志级别，无法识别时使用 INFO
    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        let config = AppConfig::load_or_default(&path).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn save_then_load_preserves_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.tooltip = None;
        config.button.mouse_hook = MouseHookMode::Never;
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.tooltip, None);
        assert_eq!(loaded.button.mouse_hook, MouseHookMode::Never);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{ "button": { "mouse_hook": "always", "size_ratio": 7.5 } }"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.button.mouse_hook, MouseHookMode::Always);
        assert_eq!(config.button.size_ratio, DEFAULT_SIZE_RATIO);
        assert_eq!(config.button.self_heal_ticks, 40);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(ConfigError::Json(_))));
    }

    #[test]
    fn hook_mode_resolution() {
        assert!(MouseHookMode::Auto.resolve(Some(22631)));
        assert!(!MouseHookMode::Auto.resolve(Some(19045)));
        assert!(!MouseHookMode::Auto.resolve(None));
        assert!(MouseHookMode::Always.resolve(None));
        assert!(!MouseHookMode::Never.resolve(Some(22631)));
    }

    #[test]
    fn retry_follows_options() {
        let options = TrayButtonOptions::default();
        let retry = options.self_heal_retry();
        assert_eq!(retry.interval_ms(), 250);
        assert!(!retry.is_active());
    }

    #[test]
    fn unknown_log_level_falls_back_to_info() {
        let mut config = AppConfig::default();
        config.log_level = "chatty".to_string();
        assert_eq!(config.tracing_level(), tracing::Level::INFO);
        config.log_level = "debug".to_string();
        assert_eq!(config.tracing_level(), tracing::Level::DEBUG);
    }
}
