use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use super::{Policy, PolicyRequest, PolicyResponse};

/// Grants `verbs` on `resources`, either may contain the `*` wildcard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleRule {
    pub resources: HashSet<String>,
    pub verbs: HashSet<String>,
}

impl RoleRule {
    pub fn new<R, V>(resources: R, verbs: V) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        V: IntoIterator,
        V::Item: Into<String>,
    {
        Self {
            resources: resources.into_iter().map(Into::into).collect(),
            verbs: verbs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn grants(&self, resource: &str, verb: &str) -> bool {
        let covers = |set: &HashSet<String>, name: &str| set.contains("*") || set.contains(name);
        covers(&self.resources, resource) && covers(&self.verbs, verb)
    }
}

pub(crate) fn grants_any(rules: &[RoleRule], resource: &str, verb: &str) -> bool {
    rules.iter().any(|rule| rule.grants(resource, verb))
}

/// Grants what the actor's roles grant. Admins and anonymous actors are
/// left to their own policies, an undefined role is an error.
pub struct RolePolicy {
    roles: Arc<HashMap<String, Vec<RoleRule>>>,
}

impl RolePolicy {
    pub fn new(roles: Arc<HashMap<String, Vec<RoleRule>>>) -> Self {
        Self { roles }
    }
}

impl Policy for RolePolicy {
    fn check(&self, req: &PolicyRequest<'_>) -> Result<PolicyResponse> {
        if req.user.is_admin || req.user.is_anonymous {
            return Ok(PolicyResponse::Continue);
        }

        for role in req.user.roles.iter() {
            let Some(rules) = self.roles.get(role) else {
                bail!("user '{}' has undefined role '{role}'", req.user.name);
            };
            if grants_any(rules, req.resource, req.verb) {
                return Ok(PolicyResponse::Ok);
            }
        }
        Ok(PolicyResponse::Continue)
    }
}

/// Rules declared on an authorizer class (and inherited from its ancestors),
/// granted to every authenticated user.
pub struct ClassRulePolicy {
    rules: Vec<RoleRule>,
}

impl ClassRulePolicy {
    pub fn new(rules: Vec<RoleRule>) -> Self {
        Self { rules }
    }
}

impl Policy for ClassRulePolicy {
    fn check(&self, req: &PolicyRequest<'_>) -> Result<PolicyResponse> {
        if req.user.is_anonymous {
            return Ok(PolicyResponse::Continue);
        }

        Ok(match grants_any(&self.rules, req.resource, req.verb) {
            true => PolicyResponse::Ok,
            false => PolicyResponse::Continue,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::authz::AuthnUserInfo;

    use super::*;

    fn user(name: &str, roles: &[&str]) -> AuthnUserInfo {
        AuthnUserInfo {
            name: name.to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            is_admin: false,
            is_anonymous: false,
        }
    }

    fn request<'a>(
        resource: &'a str,
        verb: &'a str,
        user: &'a AuthnUserInfo,
    ) -> PolicyRequest<'a> {
        PolicyRequest {
            resource,
            verb,
            user,
        }
    }

    #[test]
    fn test_role_policy() {
        let mut roles = HashMap::new();
        roles.insert(
            "editor".to_string(),
            vec![
                RoleRule::new(["Product"], ["*"]),
                RoleRule::new(["Order"], ["index", "show"]),
            ],
        );
        let policy = RolePolicy::new(Arc::new(roles));

        // Admin user should continue
        let mut admin = user("admin_user", &[]);
        admin.is_admin = true;
        let result = policy.check(&request("Product", "destroy", &admin)).unwrap();
        assert_eq!(result, PolicyResponse::Continue);

        // Anonymous user should continue
        let anonymous = AuthnUserInfo::anonymous();
        let result = policy.check(&request("Product", "show", &anonymous)).unwrap();
        assert_eq!(result, PolicyResponse::Continue);

        let editor = user("alice", &["editor"]);
        let result = policy.check(&request("Product", "destroy", &editor)).unwrap();
        assert_eq!(result, PolicyResponse::Ok);
        let result = policy.check(&request("Order", "show", &editor)).unwrap();
        assert_eq!(result, PolicyResponse::Ok);
        let result = policy.check(&request("Order", "destroy", &editor)).unwrap();
        assert_eq!(result, PolicyResponse::Continue);

        let nobody = user("bob", &[]);
        let result = policy.check(&request("Product", "show", &nobody)).unwrap();
        assert_eq!(result, PolicyResponse::Continue);

        let unknown = user("carol", &["ghost"]);
        let err = policy
            .check(&request("Product", "show", &unknown))
            .unwrap_err();
        assert!(err.to_string().contains("undefined role 'ghost'"));
    }

    #[test]
    fn test_class_rule_policy() {
        let policy = ClassRulePolicy::new(vec![RoleRule::new(["*"], ["index"])]);

        let alice = user("alice", &[]);
        let result = policy.check(&request("Product", "index", &alice)).unwrap();
        assert_eq!(result, PolicyResponse::Ok);
        let result = policy.check(&request("Product", "edit", &alice)).unwrap();
        assert_eq!(result, PolicyResponse::Continue);

        let anonymous = AuthnUserInfo::anonymous();
        let result = policy.check(&request("Product", "index", &anonymous)).unwrap();
        assert_eq!(result, PolicyResponse::Continue);
    }

    #[test]
    fn test_grants() {
        let rules = vec![
            RoleRule::new(["Order"], ["index", "show"]),
            RoleRule::new(["Product"], ["*"]),
            RoleRule::new(["*"], ["export"]),
        ];

        assert!(grants_any(&rules, "Product", "destroy"));
        assert!(grants_any(&rules, "Order", "show"));
        assert!(grants_any(&rules, "AuditLog", "export"));

        assert!(!grants_any(&rules, "Order", "update"));
        assert!(!grants_any(&rules, "Category", "index"));
        assert!(!grants_any(&[], "Product", "index"));
    }
}
