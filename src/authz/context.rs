use std::panic::Location;
use std::sync::Arc;

use log::{debug, warn};
use once_cell::unsync::OnceCell;

use crate::i18n::{Messages, Translate};

use super::class::AuthorizerClassRef;
use super::controller::{ControllerClass, ControllerSet, Slot};
use super::registry::AuthorizerRegistry;
use super::resolver::ModelResolver;
use super::{AuthnUserInfo, Authorizer, AuthzError, ModelClass, Subject};

/// Frozen controller configuration plus the collaborators every request
/// context shares. Built once before serving.
pub struct AuthzService {
    controllers: ControllerSet,
    registry: Arc<dyn AuthorizerRegistry>,
    resolver: Arc<dyn ModelResolver>,
    messages: Arc<dyn Translate>,
}

impl AuthzService {
    pub fn new(
        controllers: ControllerSet,
        registry: Arc<dyn AuthorizerRegistry>,
        resolver: Arc<dyn ModelResolver>,
        messages: Arc<dyn Translate>,
    ) -> Self {
        Self {
            controllers,
            registry,
            resolver,
            messages,
        }
    }

    pub fn controllers(&self) -> &ControllerSet {
        &self.controllers
    }

    /// Starts a fresh context for one request handled by `controller`.
    pub fn context(
        &self,
        controller: &str,
        user: AuthnUserInfo,
    ) -> Result<AuthzContext, AuthzError> {
        let controller = self.controllers.get(controller)?;
        Ok(AuthzContext {
            controller,
            user,
            registry: self.registry.clone(),
            resolver: self.resolver.clone(),
            messages: self.messages.clone(),
            current_model_class: OnceCell::new(),
            current_authorizer: OnceCell::new(),
        })
    }
}

/// Request scoped authorization queries for one controller.
///
/// Not shared between threads: the memoized current model class and
/// current authorizer live as long as the context.
pub struct AuthzContext {
    controller: Arc<ControllerClass>,
    user: AuthnUserInfo,

    registry: Arc<dyn AuthorizerRegistry>,
    resolver: Arc<dyn ModelResolver>,
    messages: Arc<dyn Translate>,

    current_model_class: OnceCell<ModelClass>,
    current_authorizer: OnceCell<Arc<dyn Authorizer>>,
}

impl AuthzContext {
    /// Builds a standalone context with the built-in messages.
    pub fn new(
        controller: Arc<ControllerClass>,
        user: AuthnUserInfo,
        registry: Arc<dyn AuthorizerRegistry>,
        resolver: Arc<dyn ModelResolver>,
    ) -> Self {
        Self {
            controller,
            user,
            registry,
            resolver,
            messages: Arc::new(Messages::new()),
            current_model_class: OnceCell::new(),
            current_authorizer: OnceCell::new(),
        }
    }

    pub fn controller(&self) -> &ControllerClass {
        &self.controller
    }

    pub fn user(&self) -> &AuthnUserInfo {
        &self.user
    }

    pub fn current_model_class(&self) -> Result<&ModelClass, AuthzError> {
        self.current_model_class.get_or_try_init(|| {
            self.resolver
                .current_model_class(&self.controller)
                .map_err(AuthzError::Lookup)
        })
    }

    /// Authorizer of the current model class. Comes from the controller's
    /// model authorizer when configured, else from the registry under the
    /// controller's application authorizer. Resolved once per context.
    pub fn current_authorizer(&self) -> Result<Arc<dyn Authorizer>, AuthzError> {
        let authorizer = self.current_authorizer.get_or_try_init(|| {
            let model = self.current_model_class()?;
            let class = self.controller.get(Slot::ModelAuthorizer).cloned();
            self.authorizer_for(model, class).map(Arc::from)
        })?;
        Ok(authorizer.clone())
    }

    /// Builds an authorizer for `model`. Without an explicit class, the
    /// registry picks one under the application authorizer. Never memoized.
    pub fn authorizer_for(
        &self,
        model: &ModelClass,
        class: Option<AuthorizerClassRef>,
    ) -> Result<Box<dyn Authorizer>, AuthzError> {
        let class = match class {
            Some(class) => class,
            None => self
                .registry
                .lookup(model, self.controller.get(Slot::ApplicationAuthorizer))
                .map_err(AuthzError::Lookup)?,
        };
        debug!(
            "Use authorizer {class} for model {model} in {}",
            self.controller.name()
        );
        Ok(class.instantiate(self, model))
    }

    /// Checks if the user is allowed to perform `action` on `subject`.
    ///
    /// A class subject resolves its authorizer directly, a record through
    /// its runtime class.
    pub fn authorized(
        &self,
        action: &str,
        subject: Option<Subject<'_>>,
    ) -> Result<bool, AuthzError> {
        let Some(subject) = subject else {
            let message = self
                .messages
                .translate(Messages::REQUIRED, &[("subject", "subject")]);
            return Err(AuthzError::Argument(message));
        };

        let model = subject.model_class();
        let authorizer = self.authorizer_for(&model, None)?;
        Ok(authorizer.authorized(action, &subject))
    }

    pub fn unauthorized(
        &self,
        action: &str,
        subject: Option<Subject<'_>>,
    ) -> Result<bool, AuthzError> {
        self.authorized(action, subject).map(|allow| !allow)
    }

    #[deprecated(note = "use `current_authorizer` instead, it will be removed from 5.3.*")]
    #[track_caller]
    pub fn authorizer(&self) -> Result<Arc<dyn Authorizer>, AuthzError> {
        let caller = Location::caller();
        warn!(
            "{} (called from {caller})",
            self.messages.translate(Messages::DEPRECATION_AUTHORIZER, &[])
        );
        self.current_authorizer()
    }
}
