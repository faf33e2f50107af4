mod actor;
mod chain;
mod rule;
mod union;

pub use actor::{AdminPolicy, AnonymousPolicy};
pub use chain::ChainPolicy;
pub use rule::{ClassRulePolicy, RolePolicy, RoleRule};
pub use union::UnionPolicy;

use anyhow::Result;

use super::AuthnUserInfo;

/// One step of a generic authorization decision.
pub trait Policy: Send + Sync {
    fn check(&self, req: &PolicyRequest<'_>) -> Result<PolicyResponse>;
}

#[derive(Debug, Clone, Copy)]
pub struct PolicyRequest<'a> {
    /// Name of the model the action targets.
    pub resource: &'a str,
    pub verb: &'a str,
    pub user: &'a AuthnUserInfo,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PolicyResponse {
    Ok,
    /// No opinion, the next policy decides.
    Continue,
    Unauthorized,
}
