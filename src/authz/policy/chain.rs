use anyhow::{Context, Result};
use log::debug;

use super::union::UnionPolicy;
use super::{Policy, PolicyRequest, PolicyResponse};

/// Asks each policy in turn, the first one that does not answer
/// [`PolicyResponse::Continue`] decides.
pub struct ChainPolicy {
    policies: Vec<UnionPolicy>,
}

impl ChainPolicy {
    pub fn new(policies: Vec<UnionPolicy>) -> Self {
        Self { policies }
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    pub fn policies(&self) -> &[UnionPolicy] {
        &self.policies
    }
}

impl Policy for ChainPolicy {
    fn check(&self, req: &PolicyRequest<'_>) -> Result<PolicyResponse> {
        for policy in self.policies.iter() {
            let resp = policy
                .check(req)
                .with_context(|| format!("{} policy", policy.name()))?;
            if resp != PolicyResponse::Continue {
                debug!(
                    "{} policy answers {resp:?} for {}#{} by '{}'",
                    policy.name(),
                    req.resource,
                    req.verb,
                    req.user.name
                );
                return Ok(resp);
            }
        }
        Ok(PolicyResponse::Continue)
    }
}
