use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::class::AuthorizerClass;
use super::context::AuthzContext;
use super::policy::{ChainPolicy, Policy, PolicyRequest, PolicyResponse};
use super::{AuthnUserInfo, Authorizer, ModelClass, Subject};

/// Decision taken when no policy of the chain decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    #[default]
    Allow,
    Deny,
}

/// The policy chain shared by every instance of one authorizer class.
pub struct GenericPolicy {
    chain: ChainPolicy,
    default: Decision,
}

impl GenericPolicy {
    pub fn new(chain: ChainPolicy, default: Decision) -> Self {
        Self { chain, default }
    }

    pub fn chain(&self) -> &ChainPolicy {
        &self.chain
    }
}

/// Generic model authorizer, answers through a [`GenericPolicy`] with the
/// model name as resource and the action as verb.
pub struct ModelAuthorizer {
    class_name: String,
    model: ModelClass,
    user: AuthnUserInfo,
    policy: Arc<GenericPolicy>,
}

impl ModelAuthorizer {
    pub fn new(
        class: &AuthorizerClass,
        ctx: &AuthzContext,
        model: &ModelClass,
        policy: Arc<GenericPolicy>,
    ) -> Self {
        Self {
            class_name: class.name().to_string(),
            model: model.clone(),
            user: ctx.user().clone(),
            policy,
        }
    }

    /// Constructor of a class whose instances decide through `policy`.
    pub fn constructor(
        policy: Arc<GenericPolicy>,
    ) -> impl Fn(&AuthorizerClass, &AuthzContext, &ModelClass) -> Box<dyn Authorizer> + Send + Sync
    {
        move |class, ctx, model| Box::new(Self::new(class, ctx, model, policy.clone()))
    }

    /// Constructor of a class that permits everything.
    pub fn allow_all(
        class: &AuthorizerClass,
        ctx: &AuthzContext,
        model: &ModelClass,
    ) -> Box<dyn Authorizer> {
        let policy = GenericPolicy::new(ChainPolicy::new(vec![]), Decision::Allow);
        Box::new(Self::new(class, ctx, model, Arc::new(policy)))
    }
}

impl Authorizer for ModelAuthorizer {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn model_class(&self) -> &ModelClass {
        &self.model
    }

    fn authorized(&self, action: &str, subject: &Subject<'_>) -> bool {
        let req = PolicyRequest {
            resource: self.model.name(),
            verb: action,
            user: &self.user,
        };

        let allow = match self.policy.chain.check(&req) {
            Ok(PolicyResponse::Ok) => true,
            Ok(PolicyResponse::Unauthorized) => false,
            Ok(PolicyResponse::Continue) => matches!(self.policy.default, Decision::Allow),
            Err(err) => {
                warn!(
                    "Authorization check of {} on {subject:?} failed, deny: {err:#}",
                    self.class_name
                );
                false
            }
        };
        debug!(
            "{} {} {action} on {subject:?} by '{}'",
            self.class_name,
            if allow { "allows" } else { "denies" },
            self.user.name
        );
        allow
    }
}
