use anyhow::Result;

use super::rule::{grants_any, RoleRule};
use super::{Policy, PolicyRequest, PolicyResponse};

/// Admins may do anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct AdminPolicy;

impl Policy for AdminPolicy {
    fn check(&self, req: &PolicyRequest<'_>) -> Result<PolicyResponse> {
        Ok(match req.user.is_admin {
            true => PolicyResponse::Ok,
            false => PolicyResponse::Continue,
        })
    }
}

/// Closes the chain for anonymous actors: whatever `rules` do not grant
/// them is refused, later policies never see them.
pub struct AnonymousPolicy {
    rules: Vec<RoleRule>,
}

impl AnonymousPolicy {
    pub fn new(rules: Vec<RoleRule>) -> Self {
        Self { rules }
    }
}

impl Policy for AnonymousPolicy {
    fn check(&self, req: &PolicyRequest<'_>) -> Result<PolicyResponse> {
        if !req.user.is_anonymous {
            return Ok(PolicyResponse::Continue);
        }
        Ok(match grants_any(&self.rules, req.resource, req.verb) {
            true => PolicyResponse::Ok,
            false => PolicyResponse::Unauthorized,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::authz::AuthnUserInfo;

    use super::*;

    #[test]
    fn test_admin_policy() {
        let mut user = AuthnUserInfo {
            name: "root".to_string(),
            ..Default::default()
        };
        let check = |user: &AuthnUserInfo| {
            AdminPolicy
                .check(&PolicyRequest {
                    resource: "AuditLog",
                    verb: "destroy",
                    user,
                })
                .unwrap()
        };

        assert_eq!(check(&user), PolicyResponse::Continue);
        user.is_admin = true;
        assert_eq!(check(&user), PolicyResponse::Ok);
    }

    #[test]
    fn test_anonymous_policy() {
        let policy = AnonymousPolicy::new(vec![RoleRule::new(["Product"], ["index", "show"])]);
        let anonymous = AuthnUserInfo::anonymous();
        let alice = AuthnUserInfo {
            name: "alice".to_string(),
            ..Default::default()
        };

        let cases = [
            ("Product", "show", &anonymous, PolicyResponse::Ok),
            ("Product", "update", &anonymous, PolicyResponse::Unauthorized),
            ("Order", "index", &anonymous, PolicyResponse::Unauthorized),
            ("Order", "index", &alice, PolicyResponse::Continue),
        ];
        for (resource, verb, user, expect) in cases {
            let req = PolicyRequest {
                resource,
                verb,
                user,
            };
            assert_eq!(policy.check(&req).unwrap(), expect, "{resource}#{verb}");
        }
    }
}
