use crate::load::load_json;
use anyhow::Context;
use kingdoms_core::{
    Catalog, InfluenceModel, RestoreReport, RngState, WeightSnapshot, SNAPSHOT_VERSION,
};
use std::fs;
use std::path::Path;

pub const WEIGHTS_FILE: &str = "influence_weights.json";

#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Restored(RestoreReport),
    NotFound,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct LoadedWeights {
    pub model: InfluenceModel,
    pub status: LoadStatus,
}

pub fn save_weights(model: &InfluenceModel, path: &Path) -> anyhow::Result<()> {
    if model.is_empty() {
        anyhow::bail!("refusing to save empty influence model to {}", path.display());
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
    }
    let body = serde_json::to_string_pretty(&model.snapshot()).context("serialize weights")?;
    fs::write(path, body).with_context(|| format!("write {}", path.display()))?;
    tracing::info!(path = %path.display(), parameters = model.len(), "influence weights saved");
    Ok(())
}

pub fn read_snapshot(path: &Path) -> anyhow::Result<WeightSnapshot> {
    let snapshot: WeightSnapshot = load_json(path)?;
    if snapshot.version != SNAPSHOT_VERSION {
        anyhow::bail!(
            "unsupported weight snapshot version {} in {}",
            snapshot.version,
            path.display()
        );
    }
    Ok(snapshot)
}

/// Builds a fresh model from `catalog`, then overlays the snapshot at `path`.
/// Missing or unreadable snapshots leave the fresh model in place.
pub fn load_weights(catalog: &Catalog, path: &Path, rng: &mut RngState) -> LoadedWeights {
    let mut model = InfluenceModel::initialize(catalog, rng);
    if !path.exists() {
        tracing::info!(path = %path.display(), "no weight snapshot; using fresh weights");
        return LoadedWeights {
            model,
            status: LoadStatus::NotFound,
        };
    }
    match read_snapshot(path) {
        Ok(snapshot) => {
            let report = model.restore(&snapshot);
            tracing::info!(
                path = %path.display(),
                restored = report.restored,
                missing = report.missing.len(),
                unexpected = report.unexpected.len(),
                "influence weights loaded"
            );
            LoadedWeights {
                model,
                status: LoadStatus::Restored(report),
            }
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %format!("{err:#}"), "weight snapshot unreadable; using fresh weights");
            LoadedWeights {
                model,
                status: LoadStatus::Failed(format!("{err:#}")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kingdoms_core::{ActionDef, Attributes, RequiredScope};
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_file(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "kingdoms_weights_{tag}_{}_{}.json",
            std::process::id(),
            nanos
        ))
    }

    fn catalog() -> Catalog {
        Catalog::from_defs(vec![
            ActionDef::new("a", Attributes::attack(1.0))
                .with_influence("b", RequiredScope::Any),
            ActionDef::new("b", Attributes::support(1.0)).with_scopes([1]),
        ])
        .expect("catalog")
    }

    #[test]
    fn empty_model_is_not_saved() {
        let catalog = Catalog::from_defs(vec![ActionDef::new("a", Attributes::attack(1.0))])
            .expect("catalog");
        let model = InfluenceModel::initialize(&catalog, &mut RngState::from_seed(1));
        let file = unique_temp_file("empty");
        let err = save_weights(&model, &file).expect_err("empty");
        assert!(err.to_string().contains("empty influence model"));
        assert!(!file.exists());
    }

    #[test]
    fn missing_file_falls_back() {
        let file = unique_temp_file("missing");
        let loaded = load_weights(&catalog(), &file, &mut RngState::from_seed(2));
        assert_eq!(loaded.status, LoadStatus::NotFound);
        assert_eq!(loaded.model.len(), 1);
    }

    #[test]
    fn corrupt_file_falls_back() {
        let file = unique_temp_file("corrupt");
        fs::write(&file, "{not json").expect("write");
        let loaded = load_weights(&catalog(), &file, &mut RngState::from_seed(2));
        assert!(matches!(loaded.status, LoadStatus::Failed(_)));
        assert_eq!(loaded.model.len(), 1);
        let _ = fs::remove_file(file);
    }

    #[test]
    fn wrong_version_is_rejected() {
        let file = unique_temp_file("version");
        fs::write(&file, r#"{"version":99,"entries":[]}"#).expect("write");
        let err = read_snapshot(&file).expect_err("version");
        assert!(err.to_string().contains("unsupported weight snapshot version"));
        let _ = fs::remove_file(file);
    }
}
