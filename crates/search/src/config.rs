use kingdoms_core::ScopePolicy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub scope_policy: ScopePolicy,
    /// Forbid two expanded choices of the same hand card in one sequence.
    pub one_choice_per_card: bool,
    /// Stop after scoring this many candidate sequences.
    pub max_candidates: Option<u64>,
    /// Stop once this much wall time has passed.
    pub time_limit_ms: Option<u64>,
    /// Log a warning when the full enumeration would exceed this many candidates.
    pub warn_candidates_above: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            scope_policy: ScopePolicy::Strict,
            one_choice_per_card: false,
            max_candidates: None,
            time_limit_ms: None,
            warn_candidates_above: 5_000_000,
        }
    }
}
