use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use wallaby_authz::authz::factory::AuthzFactory;
use wallaby_authz::display::display_json;
use wallaby_authz::i18n::Messages;

use super::{ConfigArgs, RunCommand};

/// Validate the configuration and display the resolved controllers in
/// JSON format.
#[derive(Args)]
pub struct ShowConfigArgs {
    /// Display the raw authorization configuration instead.
    #[arg(long)]
    pub raw: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

impl RunCommand for ShowConfigArgs {
    fn run(&self) -> Result<()> {
        let cfg = self.config.load()?;
        if self.raw {
            return display_json(&cfg.authz);
        }

        let messages = Messages::new().with_overrides(&cfg.messages);
        let service =
            AuthzFactory::new(&cfg.authz).build_service(&cfg.authz, Arc::new(messages))?;
        display_json(service.controllers().summaries())
    }
}
