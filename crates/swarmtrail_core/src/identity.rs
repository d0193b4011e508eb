use crate::provider::AgentSample;
use std::collections::HashMap;
use swarmtrail_data::AgentId;

/// Resolves agents to [`AgentId`]s.
///
/// A stable id reported by the host always wins. Agents without one get a
/// run-local id the first time their instance handle is seen: `-1`, `-2`, ...
/// These never collide with stable ids (which are non-negative) but are only
/// valid until [`IdentityRegistry::reset`].
#[derive(Debug, Default, Clone)]
pub struct IdentityRegistry {
    fallback: HashMap<u64, AgentId>,
    next_fallback: i64,
}

impl IdentityRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, sample: &AgentSample) -> AgentId {
        match sample.stable_id {
            Some(id) if id.0 >= 0 => id,
            _ => *self.fallback.entry(sample.instance).or_insert_with(|| {
                self.next_fallback += 1;
                AgentId(-self.next_fallback)
            }),
        }
    }

    /// Number of run-local ids issued so far.
    #[must_use]
    pub fn fallback_count(&self) -> usize {
        self.fallback.len()
    }

    pub fn reset(&mut self) {
        self.fallback.clear();
        self.next_fallback = 0;
    }
}
