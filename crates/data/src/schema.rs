use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use kingdoms_core::{ActionDef, Attributes, HeroTemplate, RequiredScope, Scope};

/// One entry of `actions.json`. Influence scopes use `null` for "any scope".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawActionDef {
    pub name: String,
    #[serde(default)]
    pub attack: f64,
    #[serde(default)]
    pub defense: f64,
    #[serde(default)]
    pub support: f64,
    #[serde(default)]
    pub scope: Vec<Scope>,
    #[serde(default)]
    pub timing: Option<String>,
    #[serde(default)]
    pub response_suit: Option<String>,
    #[serde(default)]
    pub response_rank_range: Option<(u8, u8)>,
    #[serde(default)]
    pub influences: BTreeMap<String, Vec<Option<Scope>>>,
}

impl RawActionDef {
    pub fn into_def(self) -> ActionDef {
        let mut def = ActionDef::new(
            self.name,
            Attributes::new(self.attack, self.defense, self.support),
        )
        .with_scopes(self.scope);
        def.timing = self.timing;
        def.response_suit = self.response_suit;
        def.response_rank_range = self.response_rank_range;
        for (target, scopes) in self.influences {
            if scopes.is_empty() {
                tracing::debug!(action = %def.name, influenced = %target, "influence lists no scopes");
            }
            for scope in scopes {
                def = def.with_influence(target.clone(), RequiredScope::from(scope));
            }
        }
        def
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawHeroTemplate {
    pub name: String,
    pub max_hp: u32,
}

impl From<RawHeroTemplate> for HeroTemplate {
    fn from(value: RawHeroTemplate) -> Self {
        HeroTemplate {
            name: value.name,
            max_hp: value.max_hp,
        }
    }
}
