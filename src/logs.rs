use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use clap::ValueEnum;
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::config::CommonConfig;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LogConfig {
    #[serde(default = "LogConfig::default_target")]
    pub target: LogTarget,

    #[serde(default = "LogConfig::default_level")]
    pub level: LogLevel,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub enum LogTarget {
    #[serde(rename = "stdout")]
    Stdout,
    #[serde(rename = "stderr")]
    Stderr,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    #[serde(rename = "error")]
    Error,
    #[serde(rename = "warn")]
    Warn,
    #[serde(rename = "info")]
    Info,
    #[serde(rename = "debug")]
    Debug,
}

impl CommonConfig for LogConfig {
    fn default() -> Self {
        Self {
            target: Self::default_target(),
            level: Self::default_level(),
        }
    }

    fn complete(&mut self) -> Result<()> {
        Ok(())
    }
}

impl LogConfig {
    pub fn default_target() -> LogTarget {
        LogTarget::Stderr
    }

    pub fn default_level() -> LogLevel {
        LogLevel::Info
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
        }
    }
}

pub fn init(cfg: &LogConfig) -> Result<()> {
    let is_terminal = match cfg.target {
        LogTarget::Stdout => io::stdout().is_terminal(),
        LogTarget::Stderr => io::stderr().is_terminal(),
    };

    let colors = ColoredLevelConfig::new()
        .info(Color::Green)
        .debug(Color::Magenta);

    let dispatch = fern::Dispatch::new()
        .format(move |out, message, record| {
            if is_terminal {
                out.finish(format_args!(
                    "{} [{}] {}",
                    humantime::format_rfc3339_millis(std::time::SystemTime::now()),
                    colors.color(record.level()),
                    message
                ))
            } else {
                out.finish(format_args!(
                    "{} [{}] {}",
                    humantime::format_rfc3339_millis(std::time::SystemTime::now()),
                    record.level(),
                    message
                ))
            }
        })
        .level(cfg.level.into());

    let dispatch = match cfg.target {
        LogTarget::Stdout => dispatch.chain(io::stdout()),
        LogTarget::Stderr => dispatch.chain(io::stderr()),
    };
    dispatch.apply().context("init logger")?;

    Ok(())
}
