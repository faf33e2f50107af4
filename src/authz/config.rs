use std::collections::HashSet;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::config::CommonConfig;

use super::generic::Decision;
use super::policy::RoleRule;

/// Authorization related configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthzConfig {
    /// Decision of the generic authorizers when no rule decides.
    /// Defaults to allow.
    #[serde(default)]
    pub default_decision: Decision,

    /// Rules for anonymous users. If empty, anonymous users fall back to
    /// the default decision. Defaults to empty.
    #[serde(default = "AuthzConfig::default_anonymous_rules")]
    pub anonymous_rules: Vec<RoleRule>,

    #[serde(default)]
    pub roles: Vec<RoleConfig>,

    /// Authorizer classes, parents listed before their children.
    #[serde(default)]
    pub authorizers: Vec<AuthorizerConfig>,

    /// Controller types, parents listed before their children.
    #[serde(default)]
    pub controllers: Vec<ControllerConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RoleConfig {
    pub name: String,

    #[serde(default)]
    pub rules: Vec<RoleRule>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthorizerConfig {
    pub name: String,

    /// Parent class, the generic `ModelAuthorizer` when omitted.
    #[serde(default)]
    pub parent: Option<String>,

    /// The model this class governs.
    #[serde(default)]
    pub model: Option<String>,

    /// Granted to every authenticated user, on top of the parent's rules.
    #[serde(default)]
    pub rules: Vec<RoleRule>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ControllerConfig {
    pub name: String,

    #[serde(default)]
    pub parent: Option<String>,

    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub application_authorizer: Option<String>,

    #[serde(default)]
    pub model_authorizer: Option<String>,
}

impl CommonConfig for AuthzConfig {
    fn default() -> Self {
        Self {
            default_decision: Decision::default(),
            anonymous_rules: Self::default_anonymous_rules(),
            roles: vec![],
            authorizers: vec![],
            controllers: vec![],
        }
    }

    fn complete(&mut self) -> Result<()> {
        let mut names = HashSet::new();
        for role in self.roles.iter() {
            if role.name.is_empty() {
                bail!("role name cannot be empty");
            }
            if !names.insert(role.name.as_str()) {
                bail!("duplicate role '{}'", role.name);
            }
        }

        let mut names = HashSet::new();
        names.insert(AuthzConfig::GENERIC_AUTHORIZER);
        for authorizer in self.authorizers.iter() {
            if authorizer.name.is_empty() {
                bail!("authorizer name cannot be empty");
            }
            if !names.insert(authorizer.name.as_str()) {
                bail!("duplicate authorizer '{}'", authorizer.name);
            }
        }

        for controller in self.controllers.iter() {
            if controller.name.is_empty() {
                bail!("controller name cannot be empty");
            }
        }

        Ok(())
    }
}

impl AuthzConfig {
    /// Name of the generic root authorizer class.
    pub const GENERIC_AUTHORIZER: &'static str = "ModelAuthorizer";

    pub fn default_anonymous_rules() -> Vec<RoleRule> {
        vec![]
    }
}
