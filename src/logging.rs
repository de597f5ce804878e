//! Run log setup
//!
//! DEBUG and above always go to `<logs_dir>/<unix-seconds>.log`. INFO and
//! above also go to the terminal unless the dashboard owns it.

use anyhow::{Context, Result};
use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Initialize the global logger and return the path of the run log
pub fn init(logs_dir: &Path, terminal: bool) -> Result<PathBuf> {
    std::fs::create_dir_all(logs_dir)
        .with_context(|| format!("Failed to create directory: {:?}", logs_dir))?;

    let config = ConfigBuilder::new()
        .set_location_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build();

    let path = logs_dir.join(format!("{}.log", chrono::Utc::now().timestamp()));
    let file = File::create(&path).with_context(|| format!("Failed to create log file {:?}", path))?;

    let mut loggers: Vec<Box<dyn SharedLogger>> =
        vec![WriteLogger::new(LevelFilter::Debug, config.clone(), file)];
    if terminal {
        loggers.push(TermLogger::new(
            LevelFilter::Info,
            config,
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ));
    }

    CombinedLogger::init(loggers).context("Failed to initialize logger")?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_run_log() {
        let dir = TempDir::new().unwrap();
        let logs = dir.path().join("logs");

        let path = init(&logs, false).unwrap();
        log::info!("run log smoke test");
        log::logger().flush();

        assert!(path.starts_with(&logs));
        assert!(path.exists());
        // The global logger can only be set once
        assert!(init(&logs, false).is_err());
    }
}
