mod generic;

pub mod class;
pub mod config;
pub mod context;
pub mod controller;
pub mod factory;
pub mod policy;
pub mod registry;
pub mod resolver;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use class::{AuthorizerClass, AuthorizerClassRef};
pub use context::{AuthzContext, AuthzService};
pub use controller::{ControllerClass, ControllerSet, ControllerTree, Slot};
pub use generic::{Decision, GenericPolicy, ModelAuthorizer};
pub use registry::{AuthorizerMap, AuthorizerRegistry};
pub use resolver::{ConventionResolver, ModelResolver};

/// Answers whether an action on a subject is permitted, for one model.
pub trait Authorizer: Send + Sync {
    /// Name of the [`AuthorizerClass`] that built this instance.
    fn class_name(&self) -> &str;

    fn model_class(&self) -> &ModelClass;

    fn authorized(&self, action: &str, subject: &Subject<'_>) -> bool;
}

/// Identity of a model type, e.g. `Product`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelClass(Arc<str>);

impl ModelClass {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModelClass {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A model record. Reports the model class it is a runtime instance of.
pub trait Model {
    fn model_class(&self) -> ModelClass;
}

/// What an action is performed on: a whole model class or one record.
#[derive(Clone, Copy)]
pub enum Subject<'a> {
    Class(&'a ModelClass),
    Instance(&'a dyn Model),
}

impl Subject<'_> {
    /// The class used to resolve the authorizer. A class subject is used
    /// as is, a record reports its runtime class.
    pub fn model_class(&self) -> ModelClass {
        match self {
            Subject::Class(class) => (*class).clone(),
            Subject::Instance(record) => record.model_class(),
        }
    }

    pub fn is_class(&self) -> bool {
        matches!(self, Subject::Class(_))
    }
}

impl<'a> From<&'a ModelClass> for Subject<'a> {
    fn from(class: &'a ModelClass) -> Self {
        Subject::Class(class)
    }
}

impl<'a, M: Model> From<&'a M> for Subject<'a> {
    fn from(record: &'a M) -> Self {
        Subject::Instance(record)
    }
}

impl fmt::Debug for Subject<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Class(class) => write!(f, "Class({class})"),
            Subject::Instance(record) => write!(f, "Instance({})", record.model_class()),
        }
    }
}

/// The actor authorization is evaluated for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthnUserInfo {
    pub name: String,

    #[serde(default)]
    pub roles: Vec<String>,

    #[serde(default)]
    pub is_admin: bool,

    #[serde(default)]
    pub is_anonymous: bool,
}

impl AuthnUserInfo {
    pub fn anonymous() -> Self {
        Self {
            name: String::from("anonymous"),
            roles: vec![],
            is_admin: false,
            is_anonymous: true,
        }
    }
}

#[derive(Error, Debug)]
pub enum AuthzError {
    #[error("inheritance check failed: {klass} does not inherit from {parent}")]
    Configuration { klass: String, parent: String },

    #[error("{0}")]
    Argument(String),

    #[error("controller '{0}' is not declared")]
    UnknownController(String),

    #[error("controller '{0}' is already declared")]
    DuplicateController(String),

    #[error(transparent)]
    Lookup(anyhow::Error),
}
