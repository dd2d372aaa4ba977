use crate::TrainError;
use kingdoms_core::ScopePolicy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdamConfig {
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
}

impl Default for AdamConfig {
    fn default() -> Self {
        Self {
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub epochs: usize,
    pub learning_rate: f64,
    pub batch_size: usize,
    pub seed: u64,
    /// Write a snapshot every this many epochs; 0 keeps only the final one.
    pub checkpoint_every: usize,
    pub scope_policy: ScopePolicy,
    pub adam: AdamConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 10,
            learning_rate: 0.01,
            batch_size: 10,
            seed: 0xC0FFEE,
            checkpoint_every: 5,
            scope_policy: ScopePolicy::Strict,
            adam: AdamConfig::default(),
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<(), TrainError> {
        if self.epochs == 0 {
            return Err(TrainError::InvalidConfig("epochs must be positive".into()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(TrainError::InvalidConfig(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.batch_size == 0 {
            return Err(TrainError::InvalidConfig("batch_size must be positive".into()));
        }
        let adam = &self.adam;
        let beta_ok = |b: f64| (0.0..1.0).contains(&b);
        let epsilon_ok = adam.epsilon.is_finite() && adam.epsilon > 0.0;
        if !beta_ok(adam.beta1) || !beta_ok(adam.beta2) || !epsilon_ok {
            return Err(TrainError::InvalidConfig(
                "adam betas must lie in [0, 1) and epsilon must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn is_checkpoint_epoch(&self, epoch: usize) -> bool {
        let last = epoch + 1 == self.epochs;
        last || (self.checkpoint_every > 0 && (epoch + 1) % self.checkpoint_every == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(TrainConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_settings() {
        let zero_epochs = TrainConfig {
            epochs: 0,
            ..TrainConfig::default()
        };
        assert!(matches!(zero_epochs.validate(), Err(TrainError::InvalidConfig(_))));
        let bad_lr = TrainConfig {
            learning_rate: -0.5,
            ..TrainConfig::default()
        };
        assert!(matches!(bad_lr.validate(), Err(TrainError::InvalidConfig(_))));
        let nan_lr = TrainConfig {
            learning_rate: f64::NAN,
            ..TrainConfig::default()
        };
        assert!(nan_lr.validate().is_err());
        let zero_batch = TrainConfig {
            batch_size: 0,
            ..TrainConfig::default()
        };
        assert!(zero_batch.validate().is_err());
    }

    #[test]
    fn checkpoints_every_n_and_last() {
        let config = TrainConfig {
            epochs: 7,
            checkpoint_every: 3,
            ..TrainConfig::default()
        };
        let epochs: Vec<usize> = (0..7).filter(|e| config.is_checkpoint_epoch(*e)).collect();
        assert_eq!(epochs, vec![2, 5, 6]);
        let final_only = TrainConfig {
            epochs: 4,
            checkpoint_every: 0,
            ..TrainConfig::default()
        };
        let epochs: Vec<usize> = (0..4).filter(|e| final_only.is_checkpoint_epoch(*e)).collect();
        assert_eq!(epochs, vec![3]);
    }

    #[test]
    fn partial_toml_style_json_fills_defaults() {
        let config: TrainConfig =
            serde_json::from_str(r#"{"epochs": 3, "adam": {"beta1": 0.8}}"#).expect("config");
        assert_eq!(config.epochs, 3);
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.adam.beta1, 0.8);
        assert_eq!(config.adam.beta2, 0.999);
    }
}
