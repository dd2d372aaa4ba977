use crate::{ActionId, Catalog, CoreError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroTemplate {
    pub name: String,
    pub max_hp: u32,
}

/// `current_hp <= max_hp` is the caller's responsibility and is not clamped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hero {
    pub name: String,
    pub max_hp: u32,
    pub current_hp: u32,
}

impl Hero {
    pub fn new(name: impl Into<String>, max_hp: u32, current_hp: u32) -> Self {
        Self {
            name: name.into(),
            max_hp,
            current_hp,
        }
    }

    pub fn from_template(template: &HeroTemplate, current_hp: u32) -> Self {
        Self::new(template.name.clone(), template.max_hp, current_hp)
    }

    pub fn hp_ratio(&self) -> f64 {
        if self.max_hp == 0 {
            0.0
        } else {
            self.current_hp as f64 / self.max_hp as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub name: String,
    pub hero: Hero,
    pub hand: Vec<ActionId>,
}

impl Player {
    pub fn new(name: impl Into<String>, hero: Hero) -> Self {
        Self {
            name: name.into(),
            hero,
            hand: Vec::new(),
        }
    }

    pub fn with_hand<S: AsRef<str>>(
        mut self,
        catalog: &Catalog,
        names: &[S],
    ) -> Result<Self, CoreError> {
        self.hand = names
            .iter()
            .map(|name| catalog.require(name.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self)
    }

    /// Ids missing from `catalog` are labelled `#id`.
    pub fn hand_names(&self, catalog: &Catalog) -> Vec<String> {
        self.hand
            .iter()
            .map(|id| match catalog.try_get(*id) {
                Some(def) => def.name.clone(),
                None => format!("#{}", id.0),
            })
            .collect()
    }
}
