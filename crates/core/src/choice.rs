use crate::{ActionId, Catalog, CoreError, Scope};
use serde::{Deserialize, Serialize};

/// Whether `None` is a legal scope for an action that offers scope options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopePolicy {
    #[default]
    Strict,
    AllowUnscoped,
}

/// A catalog action bound to its chosen scope. Only built through the validating constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ActionChoice {
    action: ActionId,
    scope: Option<Scope>,
}

impl ActionChoice {
    pub fn new(catalog: &Catalog, action: ActionId, scope: Option<Scope>) -> Result<Self, CoreError> {
        Self::with_policy(catalog, action, scope, ScopePolicy::Strict)
    }

    pub fn with_policy(
        catalog: &Catalog,
        action: ActionId,
        scope: Option<Scope>,
        policy: ScopePolicy,
    ) -> Result<Self, CoreError> {
        let def = catalog
            .try_get(action)
            .ok_or_else(|| CoreError::UnknownAction(format!("#{}", action.0)))?;
        if !def.accepts_scope(scope, policy) {
            return Err(CoreError::InvalidScope {
                action: def.name.clone(),
                scope,
            });
        }
        Ok(Self { action, scope })
    }

    pub fn by_name(catalog: &Catalog, name: &str, scope: Option<Scope>) -> Result<Self, CoreError> {
        let action = catalog.require(name)?;
        Self::new(catalog, action, scope)
    }

    pub fn action(&self) -> ActionId {
        self.action
    }

    pub fn scope(&self) -> Option<Scope> {
        self.scope
    }

    pub fn label(&self, catalog: &Catalog) -> String {
        let name = &catalog.get(self.action).name;
        match self.scope {
            Some(scope) => format!("{name}@{scope}"),
            None => name.clone(),
        }
    }
}

pub fn describe_sequence(catalog: &Catalog, sequence: &[ActionChoice]) -> String {
    if sequence.is_empty() {
        return "(pass)".to_string();
    }
    sequence
        .iter()
        .map(|choice| choice.label(catalog))
        .collect::<Vec<_>>()
        .join(" -> ")
}
