use anyhow::Context;
use kingdoms_search::SearchConfig;
use kingdoms_train::TrainConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings file shared by the subcommands; every table is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub search: SearchConfig,
    pub train: TrainConfig,
    pub synthetic_samples: Option<usize>,
}

impl CliConfig {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("parse {}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kingdoms_core::ScopePolicy;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = CliConfig::parse("").expect("config");
        assert_eq!(config.train, TrainConfig::default());
        assert_eq!(config.search.max_candidates, None);
        assert_eq!(config.synthetic_samples, None);
    }

    #[test]
    fn tables_override_selected_fields() {
        let config = CliConfig::parse(
            r#"
synthetic_samples = 250

[train]
epochs = 30
learning_rate = 0.005
scope_policy = "allow_unscoped"

[train.adam]
beta2 = 0.99

[search]
max_candidates = 100000
one_choice_per_card = true
"#,
        )
        .expect("config");
        assert_eq!(config.synthetic_samples, Some(250));
        assert_eq!(config.train.epochs, 30);
        assert_eq!(config.train.batch_size, 10);
        assert_eq!(config.train.scope_policy, ScopePolicy::AllowUnscoped);
        assert_eq!(config.train.adam.beta2, 0.99);
        assert_eq!(config.train.adam.beta1, 0.9);
        assert_eq!(config.search.max_candidates, Some(100_000));
        assert!(config.search.one_choice_per_card);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(CliConfig::parse("[train]\nscope_policy = \"loose\"").is_err());
    }
}
