use crate::{
    ActionId, Attributes, Catalog, Dual, InfluenceRule, RequiredScope, RngState, Scalar, Scope,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Standard deviation of the zero-centred initial modifiers.
pub const INIT_STD_DEV: f64 = 0.01;

/// Gradient slots per parameter: attack, defense, support.
pub const SLOTS_PER_PARAM: usize = 3;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InfluenceKey {
    pub source: String,
    pub target: String,
    pub scope: RequiredScope,
}

impl InfluenceKey {
    pub fn new(source: impl Into<String>, target: impl Into<String>, scope: RequiredScope) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            scope,
        }
    }
}

impl fmt::Display for InfluenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}@{}", self.source, self.target, self.scope)
    }
}

pub trait InfluenceSource {
    type Scalar: Scalar;

    fn modifier(&self, source: ActionId, rule: &InfluenceRule) -> Option<Attributes<Self::Scalar>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoInfluence;

impl InfluenceSource for NoInfluence {
    type Scalar = f64;

    fn modifier(&self, _source: ActionId, _rule: &InfluenceRule) -> Option<Attributes> {
        None
    }
}

/// Learnable modifiers keyed by (source, target, required scope).
///
/// The only constructors go through a catalog, so a model is always
/// initialized before it can be read.
#[derive(Debug, Clone)]
pub struct InfluenceModel {
    keys: Vec<InfluenceKey>,
    values: Vec<Attributes>,
    by_ids: HashMap<(ActionId, ActionId, RequiredScope), usize>,
    by_key: HashMap<InfluenceKey, usize>,
}

impl InfluenceModel {
    pub fn initialize(catalog: &Catalog, rng: &mut RngState) -> Self {
        Self::initialize_with(catalog, |_| {
            Attributes::new(
                rng.gen_normal(0.0, INIT_STD_DEV),
                rng.gen_normal(0.0, INIT_STD_DEV),
                rng.gen_normal(0.0, INIT_STD_DEV),
            )
        })
    }

    pub fn initialize_with<F>(catalog: &Catalog, mut init: F) -> Self
    where
        F: FnMut(&InfluenceKey) -> Attributes,
    {
        let mut model = Self {
            keys: Vec::new(),
            values: Vec::new(),
            by_ids: HashMap::new(),
            by_key: HashMap::new(),
        };
        for (source_id, def) in catalog.iter() {
            for rule in catalog.rules(source_id) {
                let key = InfluenceKey::new(
                    def.name.clone(),
                    catalog.get(rule.target).name.clone(),
                    rule.required,
                );
                let value = init(&key);
                let slot = model.keys.len();
                model.by_ids.insert((source_id, rule.target, rule.required), slot);
                model.by_key.insert(key.clone(), slot);
                model.keys.push(key);
                model.values.push(value);
            }
        }
        tracing::debug!(parameters = model.len(), "influence weights initialized");
        model
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn slot_count(&self) -> usize {
        self.keys.len() * SLOTS_PER_PARAM
    }

    /// Modifier for `source` acting on `target` when `source` was played at `scope`.
    /// An exact scope parameter wins over an any-scope one.
    pub fn lookup(&self, source: &str, target: &str, scope: Option<Scope>) -> Option<Attributes> {
        let mut key = InfluenceKey::new(source, target, RequiredScope::Any);
        if let Some(value) = scope {
            key.scope = RequiredScope::Exact(value);
            if let Some(found) = self.get(&key) {
                return Some(found);
            }
            key.scope = RequiredScope::Any;
        }
        self.get(&key)
    }

    pub fn get(&self, key: &InfluenceKey) -> Option<Attributes> {
        self.by_key.get(key).map(|slot| self.values[*slot])
    }

    pub fn set(&mut self, key: &InfluenceKey, value: Attributes) -> bool {
        match self.by_key.get(key) {
            Some(slot) => {
                self.values[*slot] = value;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&InfluenceKey, &Attributes)> {
        self.keys.iter().zip(self.values.iter())
    }

    pub fn keys(&self) -> &[InfluenceKey] {
        &self.keys
    }

    pub fn flat_values(&self) -> Vec<f64> {
        self.values
            .iter()
            .flat_map(|value| value.to_array())
            .collect()
    }

    pub fn apply_deltas(&mut self, deltas: &[f64]) {
        for (param, value) in self.values.iter_mut().enumerate() {
            let base = param * SLOTS_PER_PARAM;
            let mut parts = value.to_array();
            for (offset, part) in parts.iter_mut().enumerate() {
                if let Some(delta) = deltas.get(base + offset) {
                    *part += delta;
                }
            }
            *value = Attributes::from_array(parts);
        }
    }

    pub fn tracked(&self) -> TrackedInfluence<'_> {
        TrackedInfluence { model: self }
    }

    pub fn snapshot(&self) -> WeightSnapshot {
        WeightSnapshot {
            version: SNAPSHOT_VERSION,
            entries: self
                .iter()
                .map(|(key, value)| SnapshotEntry {
                    source: key.source.clone(),
                    target: key.target.clone(),
                    scope: key.scope,
                    attack: value.attack,
                    defense: value.defense,
                    support: value.support,
                })
                .collect(),
        }
    }

    /// Overlays saved values onto matching keys; everything else keeps its current value.
    pub fn restore(&mut self, snapshot: &WeightSnapshot) -> RestoreReport {
        let mut report = RestoreReport::default();
        let mut seen = BTreeSet::new();
        for entry in &snapshot.entries {
            let key = entry.key();
            let value = Attributes::new(entry.attack, entry.defense, entry.support);
            if !value.is_finite() {
                report.invalid.push(key);
                continue;
            }
            if self.set(&key, value) {
                seen.insert(key);
                report.restored += 1;
            } else {
                report.unexpected.push(key);
            }
        }
        report.missing = self
            .keys
            .iter()
            .filter(|key| !seen.contains(*key))
            .cloned()
            .collect();
        for key in &report.missing {
            tracing::warn!(key = %key, "weight missing from snapshot; keeping fresh value");
        }
        for key in &report.unexpected {
            tracing::warn!(key = %key, "snapshot weight has no parameter; ignored");
        }
        for key in &report.invalid {
            tracing::warn!(key = %key, "snapshot weight is not finite; ignored");
        }
        report
    }

    fn slot(&self, source: ActionId, rule: &InfluenceRule) -> Option<usize> {
        self.by_ids
            .get(&(source, rule.target, rule.required))
            .copied()
    }
}

impl InfluenceSource for InfluenceModel {
    type Scalar = f64;

    fn modifier(&self, source: ActionId, rule: &InfluenceRule) -> Option<Attributes> {
        self.slot(source, rule).map(|slot| self.values[slot])
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TrackedInfluence<'m> {
    model: &'m InfluenceModel,
}

impl InfluenceSource for TrackedInfluence<'_> {
    type Scalar = Dual;

    fn modifier(&self, source: ActionId, rule: &InfluenceRule) -> Option<Attributes<Dual>> {
        let slot = self.model.slot(source, rule)?;
        let value = self.model.values[slot];
        let base = slot * SLOTS_PER_PARAM;
        Some(Attributes::new(
            Dual::variable(value.attack, base),
            Dual::variable(value.defense, base + 1),
            Dual::variable(value.support, base + 2),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub source: String,
    pub target: String,
    pub scope: RequiredScope,
    pub attack: f64,
    pub defense: f64,
    pub support: f64,
}

impl SnapshotEntry {
    pub fn key(&self) -> InfluenceKey {
        InfluenceKey::new(self.source.clone(), self.target.clone(), self.scope)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightSnapshot {
    pub version: u32,
    pub entries: Vec<SnapshotEntry>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestoreReport {
    pub restored: usize,
    pub missing: Vec<InfluenceKey>,
    pub unexpected: Vec<InfluenceKey>,
    pub invalid: Vec<InfluenceKey>,
}

impl RestoreReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty() && self.invalid.is_empty()
    }
}
