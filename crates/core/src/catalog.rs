use crate::{Attributes, CoreError, ScopePolicy};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;

pub type Scope = i32;

/// Scope an influence rule requires from its source action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Option<Scope>", into = "Option<Scope>")]
pub enum RequiredScope {
    Any,
    Exact(Scope),
}

impl RequiredScope {
    pub fn matches(self, chosen: Option<Scope>) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(scope) => chosen == Some(scope),
        }
    }
}

impl From<Option<Scope>> for RequiredScope {
    fn from(value: Option<Scope>) -> Self {
        match value {
            Some(scope) => Self::Exact(scope),
            None => Self::Any,
        }
    }
}

impl From<RequiredScope> for Option<Scope> {
    fn from(value: RequiredScope) -> Self {
        match value {
            RequiredScope::Any => None,
            RequiredScope::Exact(scope) => Some(scope),
        }
    }
}

impl fmt::Display for RequiredScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::Exact(scope) => write!(f, "{scope}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActionId(pub usize);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDef {
    pub name: String,
    pub base: Attributes,
    #[serde(default)]
    pub scope_options: Vec<Scope>,
    #[serde(default)]
    pub timing: Option<String>,
    #[serde(default)]
    pub response_suit: Option<String>,
    #[serde(default)]
    pub response_rank_range: Option<(u8, u8)>,
    #[serde(default)]
    pub potential_influences: BTreeMap<String, BTreeSet<RequiredScope>>,
}

impl ActionDef {
    pub fn new(name: impl Into<String>, base: Attributes) -> Self {
        Self {
            name: name.into(),
            base,
            scope_options: Vec::new(),
            timing: None,
            response_suit: None,
            response_rank_range: None,
            potential_influences: BTreeMap::new(),
        }
    }

    pub fn with_scopes(mut self, scopes: impl IntoIterator<Item = Scope>) -> Self {
        self.scope_options = scopes.into_iter().collect();
        self
    }

    pub fn with_influence(mut self, target: impl Into<String>, required: RequiredScope) -> Self {
        self.potential_influences
            .entry(target.into())
            .or_default()
            .insert(required);
        self
    }

    pub fn has_scope_choice(&self) -> bool {
        !self.scope_options.is_empty()
    }

    pub fn accepts_scope(&self, scope: Option<Scope>, policy: ScopePolicy) -> bool {
        match scope {
            Some(value) => self.scope_options.contains(&value),
            None => !self.has_scope_choice() || policy == ScopePolicy::AllowUnscoped,
        }
    }
}

/// An influence edge whose target resolved to a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfluenceRule {
    pub target: ActionId,
    pub required: RequiredScope,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedInfluence {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    defs: Vec<ActionDef>,
    by_name: HashMap<String, ActionId>,
    rules: Vec<Vec<InfluenceRule>>,
    unresolved: Vec<UnresolvedInfluence>,
}

impl Catalog {
    pub fn from_defs(defs: Vec<ActionDef>) -> Result<Self, CoreError> {
        let mut by_name = HashMap::with_capacity(defs.len());
        let mut normalized = Vec::with_capacity(defs.len());
        for (idx, mut def) in defs.into_iter().enumerate() {
            if !def.base.is_finite() {
                return Err(CoreError::NonFiniteAttributes(def.name));
            }
            if by_name.insert(def.name.clone(), ActionId(idx)).is_some() {
                return Err(CoreError::DuplicateAction(def.name));
            }
            let mut seen = HashSet::new();
            def.scope_options.retain(|scope| seen.insert(*scope));
            normalized.push(def);
        }

        let mut rules = Vec::with_capacity(normalized.len());
        let mut unresolved = Vec::new();
        for def in &normalized {
            let mut resolved = Vec::new();
            for (target, scopes) in &def.potential_influences {
                let Some(target_id) = by_name.get(target).copied() else {
                    tracing::warn!(
                        action = %def.name,
                        missing = %target,
                        "influence target not in catalog; edge ignored"
                    );
                    unresolved.push(UnresolvedInfluence {
                        source: def.name.clone(),
                        target: target.clone(),
                    });
                    continue;
                };
                for required in scopes {
                    resolved.push(InfluenceRule {
                        target: target_id,
                        required: *required,
                    });
                }
            }
            rules.push(resolved);
        }

        Ok(Self {
            defs: normalized,
            by_name,
            rules,
            unresolved,
        })
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Ids are only minted by this catalog, so indexing cannot miss.
    pub fn get(&self, id: ActionId) -> &ActionDef {
        &self.defs[id.0]
    }

    pub fn try_get(&self, id: ActionId) -> Option<&ActionDef> {
        self.defs.get(id.0)
    }

    pub fn id(&self, name: &str) -> Option<ActionId> {
        self.by_name.get(name).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<&ActionDef> {
        self.id(name).map(|id| self.get(id))
    }

    pub fn require(&self, name: &str) -> Result<ActionId, CoreError> {
        self.id(name)
            .ok_or_else(|| CoreError::UnknownAction(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (ActionId, &ActionDef)> {
        self.defs
            .iter()
            .enumerate()
            .map(|(idx, def)| (ActionId(idx), def))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.defs.iter().map(|def| def.name.as_str())
    }

    /// Resolved influence rules of `source`, ordered by target name then scope.
    pub fn rules(&self, source: ActionId) -> &[InfluenceRule] {
        self.rules.get(source.0).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn unresolved(&self) -> &[UnresolvedInfluence] {
        &self.unresolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ActionDef> {
        vec![
            ActionDef::new("strike", Attributes::attack(1.0)),
            ActionDef::new("dismantle", Attributes::support(1.0))
                .with_scopes([1, 2, 1])
                .with_influence("strike", RequiredScope::Exact(2))
                .with_influence("strike", RequiredScope::Any)
                .with_influence("ghost", RequiredScope::Any),
        ]
    }

    #[test]
    fn resolves_rules_and_records_unknown_targets() {
        let catalog = Catalog::from_defs(sample()).expect("catalog");
        let dismantle = catalog.id("dismantle").expect("id");
        let strike = catalog.id("strike").expect("id");
        assert_eq!(catalog.get(dismantle).scope_options, vec![1, 2]);
        assert_eq!(
            catalog.rules(dismantle),
            &[
                InfluenceRule {
                    target: strike,
                    required: RequiredScope::Any
                },
                InfluenceRule {
                    target: strike,
                    required: RequiredScope::Exact(2)
                },
            ]
        );
        assert!(catalog.rules(strike).is_empty());
        assert_eq!(
            catalog.unresolved(),
            &[UnresolvedInfluence {
                source: "dismantle".to_string(),
                target: "ghost".to_string(),
            }]
        );
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut defs = sample();
        defs.push(ActionDef::new("strike", Attributes::defense(1.0)));
        let err = Catalog::from_defs(defs).expect_err("duplicate must fail");
        assert_eq!(err, CoreError::DuplicateAction("strike".to_string()));
    }

    #[test]
    fn rejects_non_finite_base() {
        let defs = vec![ActionDef::new("bad", Attributes::attack(f64::NAN))];
        assert!(matches!(
            Catalog::from_defs(defs),
            Err(CoreError::NonFiniteAttributes(_))
        ));
    }

    #[test]
    fn scope_acceptance_follows_policy() {
        let catalog = Catalog::from_defs(sample()).expect("catalog");
        let dismantle = catalog.by_name("dismantle").expect("def");
        let strike = catalog.by_name("strike").expect("def");
        assert!(dismantle.accepts_scope(Some(1), ScopePolicy::Strict));
        assert!(!dismantle.accepts_scope(Some(3), ScopePolicy::Strict));
        assert!(!dismantle.accepts_scope(None, ScopePolicy::Strict));
        assert!(dismantle.accepts_scope(None, ScopePolicy::AllowUnscoped));
        assert!(strike.accepts_scope(None, ScopePolicy::Strict));
        assert!(!strike.accepts_scope(Some(1), ScopePolicy::AllowUnscoped));
    }

    #[test]
    fn required_scope_matching() {
        assert!(RequiredScope::Any.matches(None));
        assert!(RequiredScope::Any.matches(Some(4)));
        assert!(RequiredScope::Exact(4).matches(Some(4)));
        assert!(!RequiredScope::Exact(4).matches(None));
        assert!(!RequiredScope::Exact(4).matches(Some(3)));
    }
}
