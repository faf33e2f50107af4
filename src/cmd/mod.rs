mod check;
mod config;
mod render;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::warn;

use wallaby_authz::config::{AppConfig, CommonConfig};
use wallaby_authz::logs::{self, LogLevel};

#[derive(Parser)]
#[command(author, version, about)]
pub struct App {
    #[command(subcommand)]
    pub commands: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    Check(check::CheckArgs),
    Config(config::ShowConfigArgs),
    Render(render::RenderArgs),
}

pub trait RunCommand {
    fn run(&self) -> Result<()>;
}

impl App {
    pub fn run(&self) -> Result<()> {
        match &self.commands {
            Commands::Check(args) => args.run(),
            Commands::Config(args) => args.run(),
            Commands::Render(args) => args.run(),
        }
    }
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Path of the config file. Defaults to `$WALLABY_CONFIG`, then
    /// `~/.config/wallaby/wallaby.toml`.
    #[arg(short, long)]
    pub config: Option<String>,

    /// Overrides the log level of the config file.
    #[arg(long)]
    pub log_level: Option<LogLevel>,
}

impl ConfigArgs {
    /// Loads the config and initializes the logger from it.
    pub fn load(&self) -> Result<AppConfig> {
        let path = AppConfig::config_path(self.config.as_deref())?;
        let found = AppConfig::read(&path)?;
        let missing = found.is_none();

        let mut cfg = found.unwrap_or_else(<AppConfig as CommonConfig>::default);
        if let Some(level) = self.log_level {
            cfg.log.level = level;
        }
        logs::init(&cfg.log)?;
        if missing {
            warn!("Config file '{}' not found, using defaults", path.display());
        }

        cfg.complete().context("validate config")?;
        Ok(cfg)
    }
}
