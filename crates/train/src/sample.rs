use crate::SampleError;
use kingdoms_core::{
    context_weights, ActionChoice, Catalog, ContextWeights, RequiredScope, RngState, Scope,
    ScopePolicy,
};
use serde::{Deserialize, Serialize};

/// Signed game result used as the training label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Outcome {
    Win,
    Loss,
}

impl Outcome {
    pub fn sign(self) -> f64 {
        match self {
            Self::Win => 1.0,
            Self::Loss => -1.0,
        }
    }
}

impl TryFrom<i8> for Outcome {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Win),
            -1 => Ok(Self::Loss),
            other => Err(format!("outcome must be 1 or -1, got {other}")),
        }
    }
}

impl From<Outcome> for i8 {
    fn from(value: Outcome) -> Self {
        match value {
            Outcome::Win => 1,
            Outcome::Loss => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleContext {
    pub player_hp_ratio: f64,
    pub opponent_hp_ratio: f64,
}

/// An action referenced by name, as it appears in recorded play data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedChoice {
    pub name: String,
    #[serde(default)]
    pub scope: Option<Scope>,
}

impl NamedChoice {
    pub fn new(name: impl Into<String>, scope: Option<Scope>) -> Self {
        Self {
            name: name.into(),
            scope,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    pub context: SampleContext,
    pub sequence: Vec<NamedChoice>,
    pub outcome: Outcome,
}

/// A sample bound to catalog ids, ready for scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSample {
    pub weights: ContextWeights,
    pub sequence: Vec<ActionChoice>,
    pub outcome: Outcome,
}

pub fn resolve_sample(
    catalog: &Catalog,
    sample: &TrainingSample,
    policy: ScopePolicy,
) -> Result<ResolvedSample, SampleError> {
    if sample.sequence.is_empty() {
        return Err(SampleError::EmptySequence);
    }
    let sequence = sample
        .sequence
        .iter()
        .map(|named| {
            let id = catalog.require(&named.name)?;
            ActionChoice::with_policy(catalog, id, named.scope, policy)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ResolvedSample {
        weights: context_weights(
            sample.context.player_hp_ratio,
            sample.context.opponent_hp_ratio,
        ),
        sequence,
        outcome: sample.outcome,
    })
}

fn random_context(rng: &mut RngState) -> SampleContext {
    SampleContext {
        player_hp_ratio: rng.gen_range_f64(0.1, 1.0),
        opponent_hp_ratio: rng.gen_range_f64(0.1, 1.0),
    }
}

fn random_choice(catalog: &Catalog, rng: &mut RngState) -> Option<NamedChoice> {
    let names: Vec<&str> = catalog.names().collect();
    if names.is_empty() {
        return None;
    }
    let name = names[rng.gen_index(names.len())];
    let def = catalog.by_name(name)?;
    let scope = if def.scope_options.is_empty() {
        None
    } else {
        Some(def.scope_options[rng.gen_index(def.scope_options.len())])
    };
    Some(NamedChoice::new(name, scope))
}

fn random_sequence(catalog: &Catalog, rng: &mut RngState) -> Vec<NamedChoice> {
    let max_len = catalog.len().min(3);
    if max_len == 0 {
        return Vec::new();
    }
    let len = 1 + rng.gen_index(max_len);
    (0..len).filter_map(|_| random_choice(catalog, rng)).collect()
}

/// Random contexts, one to three random catalog actions with legal scopes and a coin-flip outcome.
pub fn generate_synthetic_samples(
    catalog: &Catalog,
    count: usize,
    rng: &mut RngState,
) -> Vec<TrainingSample> {
    let mut samples = Vec::with_capacity(count);
    for _ in 0..count {
        let sequence = random_sequence(catalog, rng);
        if sequence.is_empty() {
            continue;
        }
        let outcome = if rng.gen_bool(0.5) {
            Outcome::Win
        } else {
            Outcome::Loss
        };
        samples.push(TrainingSample {
            context: random_context(rng),
            sequence,
            outcome,
        });
    }
    tracing::debug!(requested = count, generated = samples.len(), "synthetic samples generated");
    samples
}

/// `source` played at a scope matching `scope`, followed later by `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfluencePattern {
    pub source: String,
    pub scope: RequiredScope,
    pub target: String,
}

impl InfluencePattern {
    pub fn new(source: impl Into<String>, scope: RequiredScope, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            scope,
            target: target.into(),
        }
    }

    pub fn matches(&self, sequence: &[NamedChoice]) -> bool {
        sequence.iter().enumerate().any(|(i, choice)| {
            choice.name == self.source
                && self.scope.matches(choice.scope)
                && sequence[i + 1..].iter().any(|later| later.name == self.target)
        })
    }
}

/// Samples labelled `Win` exactly when they contain `pattern`.
///
/// Roughly half the sequences get the pattern planted so both labels occur.
pub fn generate_pattern_samples(
    catalog: &Catalog,
    pattern: &InfluencePattern,
    count: usize,
    rng: &mut RngState,
) -> Vec<TrainingSample> {
    let source_scope = match pattern.scope {
        RequiredScope::Exact(scope) => Some(scope),
        RequiredScope::Any => catalog
            .by_name(&pattern.source)
            .and_then(|def| def.scope_options.first().copied()),
    };
    let target_scope = catalog
        .by_name(&pattern.target)
        .and_then(|def| def.scope_options.first().copied());

    let mut samples = Vec::with_capacity(count);
    for _ in 0..count {
        let mut sequence = random_sequence(catalog, rng);
        if rng.gen_bool(0.5) {
            let at = rng.gen_index(sequence.len() + 1);
            sequence.insert(at, NamedChoice::new(pattern.source.clone(), source_scope));
            let after = at + 1 + rng.gen_index(sequence.len() - at);
            sequence.insert(after, NamedChoice::new(pattern.target.clone(), target_scope));
        }
        if sequence.is_empty() {
            continue;
        }
        let outcome = if pattern.matches(&sequence) {
            Outcome::Win
        } else {
            Outcome::Loss
        };
        samples.push(TrainingSample {
            context: random_context(rng),
            sequence,
            outcome,
        });
    }
    samples
}
