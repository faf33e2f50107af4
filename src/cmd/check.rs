use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use wallaby_authz::authz::factory::AuthzFactory;
use wallaby_authz::authz::{AuthnUserInfo, Authorizer, ModelClass, Subject};
use wallaby_authz::display::display_json;
use wallaby_authz::i18n::Messages;

use super::{ConfigArgs, RunCommand};

/// Check whether a user may perform an action within a controller.
#[derive(Args)]
pub struct CheckArgs {
    /// The controller handling the request, e.g. `Admin::ProductsController`.
    #[arg(long)]
    pub controller: String,

    /// The action to check, e.g. `index`, `show`, `update`.
    #[arg(short, long)]
    pub action: String,

    /// The model the action targets. Defaults to the controller's own model.
    #[arg(short, long)]
    pub model: Option<String>,

    /// Name of the user.
    #[arg(short, long, default_value = "anonymous")]
    pub user: String,

    /// Roles of the user, can be repeated.
    #[arg(short, long)]
    pub role: Vec<String>,

    #[arg(long)]
    pub admin: bool,

    #[arg(long)]
    pub anonymous: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Debug, Serialize)]
struct CheckResponse {
    allow: bool,
    authorizer: String,
    model: String,
}

impl RunCommand for CheckArgs {
    fn run(&self) -> Result<()> {
        let cfg = self.config.load()?;
        let messages = Messages::new().with_overrides(&cfg.messages);
        let service =
            AuthzFactory::new(&cfg.authz).build_service(&cfg.authz, Arc::new(messages))?;

        let user = AuthnUserInfo {
            name: self.user.clone(),
            roles: self.role.clone(),
            is_admin: self.admin,
            is_anonymous: self.anonymous,
        };
        let ctx = service.context(&self.controller, user)?;

        let model = match self.model.as_deref() {
            Some(model) => ModelClass::new(model),
            None => ctx.current_model_class()?.clone(),
        };
        let authorizer: Arc<dyn Authorizer> = match self.model {
            Some(_) => ctx.authorizer_for(&model, None)?.into(),
            None => ctx.current_authorizer()?,
        };

        let allow = authorizer.authorized(&self.action, &Subject::from(&model));
        display_json(CheckResponse {
            allow,
            authorizer: authorizer.class_name().to_string(),
            model: model.to_string(),
        })
    }
}
