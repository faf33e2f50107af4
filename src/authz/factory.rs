use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::i18n::Translate;

use super::class::{AuthorizerClass, AuthorizerClassRef};
use super::config::AuthzConfig;
use super::context::AuthzService;
use super::controller::{ControllerSet, ControllerTree};
use super::generic::{Decision, GenericPolicy, ModelAuthorizer};
use super::policy::{
    AdminPolicy, AnonymousPolicy, ChainPolicy, ClassRulePolicy, RolePolicy, RoleRule, UnionPolicy,
};
use super::registry::AuthorizerMap;
use super::resolver::ConventionResolver;
use super::ModelClass;

/// Builds the authorization service from configuration.
///
/// Generic authorizer classes decide through a policy chain in the
/// following order:
/// 1. Admin policy (always enabled)
/// 2. Rules of the authorizer class and its ancestors (if any)
/// 3. Role rules of the user (if roles are defined)
/// 4. Anonymous rules (if any)
pub struct AuthzFactory {
    roles: Arc<HashMap<String, Vec<RoleRule>>>,
}

impl AuthzFactory {
    pub fn new(cfg: &AuthzConfig) -> Self {
        let roles = cfg
            .roles
            .iter()
            .map(|role| (role.name.clone(), role.rules.clone()))
            .collect();
        Self {
            roles: Arc::new(roles),
        }
    }

    pub fn build_service(
        &self,
        cfg: &AuthzConfig,
        messages: Arc<dyn Translate>,
    ) -> Result<AuthzService> {
        let registry = self.build_registry(cfg)?;
        let controllers = self.build_controllers(cfg, &registry)?;
        info!(
            "Authorization ready with {} authorizer classes and {} controllers",
            registry.classes().len() + 1,
            controllers.len()
        );

        Ok(AuthzService::new(
            controllers,
            Arc::new(registry),
            Arc::new(ConventionResolver::new()),
            messages,
        ))
    }

    pub fn build_registry(&self, cfg: &AuthzConfig) -> Result<AuthorizerMap> {
        if matches!(cfg.default_decision, Decision::Allow) && !cfg.roles.is_empty() {
            warn!(
                "Roles are defined but the default decision is allow, \
                 role rules can only grant what is already allowed"
            );
        }

        let generic_policy = self.build_policy(cfg, vec![]);
        let generic = AuthorizerClass::new(
            AuthzConfig::GENERIC_AUTHORIZER,
            ModelAuthorizer::constructor(Arc::new(generic_policy)),
        )
        .into_ref();

        let mut registry = AuthorizerMap::new(generic.clone());
        let mut class_rules: HashMap<String, Vec<RoleRule>> = HashMap::new();
        for authorizer in cfg.authorizers.iter() {
            let parent = match authorizer.parent.as_deref() {
                None => generic.clone(),
                Some(name) => registry.find(name).cloned().with_context(|| {
                    format!(
                        "parent '{name}' of authorizer '{}' is not defined before it",
                        authorizer.name
                    )
                })?,
            };

            let mut rules = class_rules
                .get(parent.name())
                .cloned()
                .unwrap_or_default();
            rules.extend(authorizer.rules.iter().cloned());

            let policy = self.build_policy(cfg, rules.clone());
            let mut class = AuthorizerClass::inherit(&authorizer.name, &parent)
                .with_constructor(ModelAuthorizer::constructor(Arc::new(policy)));
            if let Some(model) = authorizer.model.as_deref() {
                class = class.with_model(ModelClass::new(model));
            }

            class_rules.insert(authorizer.name.clone(), rules);
            registry.register(class.into_ref());
        }

        Ok(registry)
    }

    pub fn build_controllers(
        &self,
        cfg: &AuthzConfig,
        registry: &AuthorizerMap,
    ) -> Result<ControllerSet> {
        let find = |name: &str| -> Result<AuthorizerClassRef> {
            registry
                .find(name)
                .cloned()
                .with_context(|| format!("authorizer '{name}' is not defined"))
        };

        let mut tree = ControllerTree::new();
        for controller in cfg.controllers.iter() {
            let name = controller.name.as_str();
            tree.declare(name, controller.parent.as_deref())
                .with_context(|| format!("declare controller '{name}'"))?;

            if let Some(model) = controller.model.as_deref() {
                tree.set_model(name, ModelClass::new(model))?;
            }
            if let Some(klass) = controller.application_authorizer.as_deref() {
                tree.set_application_authorizer(name, find(klass)?)
                    .with_context(|| format!("set application authorizer of '{name}'"))?;
            }
            if let Some(klass) = controller.model_authorizer.as_deref() {
                tree.set_model_authorizer(name, find(klass)?)
                    .with_context(|| format!("set model authorizer of '{name}'"))?;
            }
        }

        tree.freeze().context("resolve controller configuration")
    }

    fn build_policy(&self, cfg: &AuthzConfig, class_rules: Vec<RoleRule>) -> GenericPolicy {
        let mut policies = vec![UnionPolicy::Admin(AdminPolicy)];

        if !class_rules.is_empty() {
            policies.push(UnionPolicy::ClassRule(ClassRulePolicy::new(class_rules)));
        }

        if !self.roles.is_empty() {
            policies.push(UnionPolicy::Role(RolePolicy::new(self.roles.clone())));
        }

        if !cfg.anonymous_rules.is_empty() {
            policies.push(UnionPolicy::Anonymous(AnonymousPolicy::new(
                cfg.anonymous_rules.clone(),
            )));
        }

        GenericPolicy::new(ChainPolicy::new(policies), cfg.default_decision)
    }
}

#[cfg(test)]
mod tests {
    use crate::authz::config::{AuthorizerConfig, ControllerConfig, RoleConfig};
    use crate::authz::{AuthnUserInfo, AuthzError, Slot, Subject};
    use crate::config::CommonConfig;
    use crate::i18n::Messages;

    use super::*;

    fn authorizer(name: &str, parent: Option<&str>, model: Option<&str>) -> AuthorizerConfig {
        AuthorizerConfig {
            name: name.to_string(),
            parent: parent.map(String::from),
            model: model.map(String::from),
            rules: vec![],
        }
    }

    fn controller(name: &str, parent: Option<&str>) -> ControllerConfig {
        ControllerConfig {
            name: name.to_string(),
            parent: parent.map(String::from),
            model: None,
            application_authorizer: None,
            model_authorizer: None,
        }
    }

    fn config() -> AuthzConfig {
        let mut cfg = <AuthzConfig as CommonConfig>::default();
        cfg.default_decision = Decision::Deny;
        cfg.roles = vec![RoleConfig {
            name: "editor".to_string(),
            rules: vec![RoleRule::new(["Product"], ["edit"])],
        }];

        let mut base = authorizer("BaseAuthorizer", None, None);
        base.rules = vec![RoleRule::new(["*"], ["index"])];
        let mut product = authorizer("ProductAuthorizer", Some("BaseAuthorizer"), Some("Product"));
        product.rules = vec![RoleRule::new(["Product"], ["show"])];
        cfg.authorizers = vec![base, product];

        let mut app = controller("Admin::ApplicationController", None);
        app.application_authorizer = Some("BaseAuthorizer".to_string());
        let mut products = controller(
            "Admin::ProductsController",
            Some("Admin::ApplicationController"),
        );
        products.model_authorizer = Some("ProductAuthorizer".to_string());
        cfg.controllers = vec![
            app,
            products,
            controller("Admin::OrdersController", Some("Admin::ApplicationController")),
        ];
        cfg
    }

    fn get_chain_length(policy: &GenericPolicy) -> usize {
        policy.chain().len()
    }

    #[test]
    fn test_build_policy() {
        let cfg = <AuthzConfig as CommonConfig>::default();
        let factory = AuthzFactory::new(&cfg);
        assert_eq!(get_chain_length(&factory.build_policy(&cfg, vec![])), 1);

        let cfg = config();
        let factory = AuthzFactory::new(&cfg);
        let policy = factory.build_policy(&cfg, vec![RoleRule::new(["*"], ["index"])]);
        assert_eq!(get_chain_length(&policy), 3);
        assert!(policy
            .chain()
            .policies()
            .iter()
            .any(|p| matches!(p, UnionPolicy::ClassRule(_))));

        let mut cfg = config();
        cfg.anonymous_rules = vec![RoleRule::new(["Product"], ["index"])];
        let factory = AuthzFactory::new(&cfg);
        assert_eq!(get_chain_length(&factory.build_policy(&cfg, vec![])), 3);
    }

    #[test]
    fn test_build_registry() {
        let cfg = config();
        let factory = AuthzFactory::new(&cfg);
        let registry = factory.build_registry(&cfg).unwrap();

        assert_eq!(registry.generic().name(), "ModelAuthorizer");
        let product = registry.find("ProductAuthorizer").unwrap();
        assert_eq!(product.parent().unwrap().name(), "BaseAuthorizer");
        assert_eq!(product.model().unwrap().name(), "Product");

        let mut cfg = config();
        cfg.authorizers.reverse();
        let err = factory.build_registry(&cfg).err().unwrap();
        assert!(err.to_string().contains("is not defined before it"));
    }

    #[test]
    fn test_build_controllers() {
        let cfg = config();
        let factory = AuthzFactory::new(&cfg);
        let registry = factory.build_registry(&cfg).unwrap();
        let set = factory.build_controllers(&cfg, &registry).unwrap();

        let orders = set.get("Admin::OrdersController").unwrap();
        assert_eq!(
            orders.get(Slot::ApplicationAuthorizer).unwrap().name(),
            "BaseAuthorizer"
        );
        assert!(orders.get(Slot::ModelAuthorizer).is_none());

        // Model authorizer outside of the application authorizer tree
        let mut cfg = config();
        cfg.authorizers
            .push(authorizer("UnrelatedAuthorizer", None, None));
        cfg.controllers[1].model_authorizer = Some("UnrelatedAuthorizer".to_string());
        let registry = factory.build_registry(&cfg).unwrap();
        let err = factory.build_controllers(&cfg, &registry).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AuthzError>(),
            Some(AuthzError::Configuration { .. })
        ));

        let mut cfg = config();
        cfg.controllers[0].application_authorizer = Some("MissingAuthorizer".to_string());
        let err = factory.build_controllers(&cfg, &registry).unwrap_err();
        assert!(err.to_string().contains("authorizer 'MissingAuthorizer' is not defined"));
    }

    #[test]
    fn test_service_decisions() {
        let cfg = config();
        let factory = AuthzFactory::new(&cfg);
        let service = factory
            .build_service(&cfg, Arc::new(Messages::new()))
            .unwrap();
        let product = ModelClass::new("Product");
        let order = ModelClass::new("Order");

        let user = AuthnUserInfo {
            name: "alice".to_string(),
            ..Default::default()
        };
        let ctx = service.context("Admin::OrdersController", user).unwrap();

        // Inherited class rule of BaseAuthorizer
        assert!(ctx.authorized("index", Some(Subject::from(&order))).unwrap());
        assert!(!ctx.authorized("show", Some(Subject::from(&order))).unwrap());
        // ProductAuthorizer adds its own rule
        assert!(ctx.authorized("show", Some(Subject::from(&product))).unwrap());
        assert!(!ctx.authorized("edit", Some(Subject::from(&product))).unwrap());

        let editor = AuthnUserInfo {
            name: "bob".to_string(),
            roles: vec!["editor".to_string()],
            ..Default::default()
        };
        let ctx = service.context("Admin::ProductsController", editor).unwrap();
        assert_eq!(ctx.current_authorizer().unwrap().class_name(), "ProductAuthorizer");
        assert!(ctx.authorized("edit", Some(Subject::from(&product))).unwrap());

        let admin = AuthnUserInfo {
            name: "root".to_string(),
            is_admin: true,
            ..Default::default()
        };
        let ctx = service.context("Admin::ProductsController", admin).unwrap();
        assert!(ctx.authorized("destroy", Some(Subject::from(&order))).unwrap());

        let ctx = service
            .context("Admin::ProductsController", AuthnUserInfo::anonymous())
            .unwrap();
        assert!(ctx.unauthorized("index", Some(Subject::from(&product))).unwrap());
    }
}
