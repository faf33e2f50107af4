use anyhow::Result;

use super::actor::{AdminPolicy, AnonymousPolicy};
use super::rule::{ClassRulePolicy, RolePolicy};
use super::{Policy, PolicyRequest, PolicyResponse};

pub enum UnionPolicy {
    Admin(AdminPolicy),
    ClassRule(ClassRulePolicy),
    Role(RolePolicy),
    Anonymous(AnonymousPolicy),
}

impl UnionPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            UnionPolicy::Admin(_) => "admin",
            UnionPolicy::ClassRule(_) => "class rule",
            UnionPolicy::Role(_) => "role",
            UnionPolicy::Anonymous(_) => "anonymous",
        }
    }
}

impl Policy for UnionPolicy {
    fn check(&self, req: &PolicyRequest<'_>) -> Result<PolicyResponse> {
        let policy: &dyn Policy = match self {
            UnionPolicy::Admin(p) => p,
            UnionPolicy::ClassRule(p) => p,
            UnionPolicy::Role(p) => p,
            UnionPolicy::Anonymous(p) => p,
        };
        policy.check(req)
    }
}
