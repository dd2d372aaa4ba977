use crate::schema::{RawActionDef, RawHeroTemplate};
use anyhow::Context;
use kingdoms_core::{Catalog, HeroTemplate};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub const ACTIONS_FILE: &str = "actions.json";
pub const HEROES_FILE: &str = "heroes.json";

const BUILTIN_ACTIONS: &[u8] = include_bytes!("../actions.json");
const BUILTIN_HEROES: &[u8] = include_bytes!("../heroes.json");

pub fn load_catalog(path: &Path) -> anyhow::Result<Catalog> {
    let raws: Vec<RawActionDef> = load_json(path)?;
    build_catalog(raws).with_context(|| format!("build catalog {}", path.display()))
}

/// Loads `actions.json` from `dir`.
pub fn load_catalog_dir(dir: &Path) -> anyhow::Result<Catalog> {
    load_catalog(&dir.join(ACTIONS_FILE))
}

/// The catalog embedded in this crate.
pub fn load_builtin_catalog() -> anyhow::Result<Catalog> {
    let raws: Vec<RawActionDef> =
        serde_json::from_slice(BUILTIN_ACTIONS).context("parse builtin actions JSON")?;
    build_catalog(raws).context("build builtin catalog")
}

pub fn parse_catalog(raw: &str) -> anyhow::Result<Catalog> {
    let raws: Vec<RawActionDef> = serde_json::from_str(raw).context("parse actions JSON")?;
    build_catalog(raws)
}

fn build_catalog(raws: Vec<RawActionDef>) -> anyhow::Result<Catalog> {
    let defs = raws.into_iter().map(RawActionDef::into_def).collect();
    let catalog = Catalog::from_defs(defs)?;
    tracing::info!(
        actions = catalog.len(),
        unresolved = catalog.unresolved().len(),
        "catalog loaded"
    );
    Ok(catalog)
}

pub fn load_hero_templates(path: &Path) -> anyhow::Result<Vec<HeroTemplate>> {
    let raws: Vec<RawHeroTemplate> = load_json(path)?;
    validate_heroes(raws).with_context(|| format!("validate {}", path.display()))
}

pub fn load_builtin_hero_templates() -> anyhow::Result<Vec<HeroTemplate>> {
    let raws: Vec<RawHeroTemplate> =
        serde_json::from_slice(BUILTIN_HEROES).context("parse builtin heroes JSON")?;
    validate_heroes(raws)
}

pub fn load_hero_template(path: &Path, name: &str) -> anyhow::Result<Option<HeroTemplate>> {
    Ok(find_hero(load_hero_templates(path)?, name))
}

pub fn find_hero(templates: Vec<HeroTemplate>, name: &str) -> Option<HeroTemplate> {
    templates.into_iter().find(|hero| hero.name == name)
}

fn validate_heroes(raws: Vec<RawHeroTemplate>) -> anyhow::Result<Vec<HeroTemplate>> {
    let mut seen = HashSet::new();
    let mut heroes = Vec::with_capacity(raws.len());
    for raw in raws {
        if !seen.insert(raw.name.clone()) {
            anyhow::bail!("duplicate hero template {}", raw.name);
        }
        heroes.push(HeroTemplate::from(raw));
    }
    Ok(heroes)
}

pub(crate) fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}
