#[cfg(windows)]
use anyhow::Context as _;
#[cfg(windows)]
use taskbar_tray_button::{App, AppEvent, EventLoop, config::AppConfig};

/// 程序入口点
#[cfg(windows)]
fn main() -> anyhow::Result<()> {
    let path = AppConfig::default_path();
    let loaded = match &path {
        Some(path) => AppConfig::load_or_default(path),
        None => Err(taskbar_tray_button::config::ConfigError::NoConfigDir),
    };

    let (config, load_error) = match loaded {
        Ok(config) => (config, None),
        Err(error) => (AppConfig::default(), Some(error)),
    };

    tracing_subscriber::fmt()
        .with_max_level(config.tracing_level())
        .init();

    if let Some(error) = load_error {
        tracing::error!("{}，使用默认配置", error);
    }

    let event_loop = EventLoop::<AppEvent>::with_user_event()
        .build()
        .context("创建事件循环失败")?;

    let mut app = App::new(config, event_loop.create_proxy());

    event_loop.run_app(&mut app).context("运行应用失败")?;

    Ok(())
}

#[cfg(not(windows))]
fn main() {
    eprintln!("taskbar_tray_button 只能在 Windows 上运行");
}
