use crate::{resolve_sample, Adam, ResolvedSample, TrainConfig, TrainError, TrainingSample};
use kingdoms_core::{Catalog, Evaluator, InfluenceModel, RngState, Scalar};
use kingdoms_data::save_weights;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    pub epoch: usize,
    /// Mean loss over the valid samples processed this epoch.
    pub mean_loss: f64,
    pub samples: usize,
    pub updates: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainReport {
    pub epochs: Vec<EpochStats>,
    pub valid_samples: usize,
    pub skipped_samples: usize,
    pub snapshots_written: usize,
    pub snapshot_failures: usize,
}

impl TrainReport {
    pub fn final_loss(&self) -> Option<f64> {
        self.epochs.last().map(|stats| stats.mean_loss)
    }
}

/// Fits `model` so that winning sequences score higher and losing ones lower.
///
/// Each sample contributes `-outcome * score`. Samples that fail to resolve
/// against `catalog` are skipped. When `checkpoint` is given the model is saved
/// there on checkpoint epochs; a failed save is logged and training continues.
pub fn train(
    catalog: &Catalog,
    model: &mut InfluenceModel,
    samples: &[TrainingSample],
    config: &TrainConfig,
    checkpoint: Option<&Path>,
) -> Result<TrainReport, TrainError> {
    config.validate()?;
    if samples.is_empty() {
        return Err(TrainError::InvalidConfig("no training samples given".into()));
    }
    if model.is_empty() {
        return Err(TrainError::EmptyModel);
    }

    let resolved: Vec<Option<ResolvedSample>> = samples
        .iter()
        .enumerate()
        .map(|(idx, sample)| match resolve_sample(catalog, sample, config.scope_policy) {
            Ok(resolved) => Some(resolved),
            Err(err) => {
                tracing::debug!(sample = idx, error = %err, "skipping training sample");
                None
            }
        })
        .collect();
    let valid_samples = resolved.iter().filter(|s| s.is_some()).count();
    let skipped_samples = resolved.len() - valid_samples;
    if valid_samples == 0 {
        return Err(TrainError::NoValidSamples {
            skipped: skipped_samples,
        });
    }
    if skipped_samples > 0 {
        tracing::warn!(skipped = skipped_samples, "training samples failed to resolve");
    }

    tracing::info!(
        epochs = config.epochs,
        learning_rate = config.learning_rate,
        batch_size = config.batch_size,
        parameters = model.len(),
        samples = valid_samples,
        "training started"
    );

    let mut rng = RngState::from_seed(config.seed);
    let mut adam = Adam::new(model.slot_count(), config.learning_rate, config.adam);
    let mut order: Vec<usize> = (0..resolved.len()).collect();
    let mut report = TrainReport {
        valid_samples,
        skipped_samples,
        ..TrainReport::default()
    };

    for epoch in 0..config.epochs {
        rng.shuffle(&mut order);
        let mut loss_sum = 0.0;
        let mut processed = 0;
        let mut updates = 0;

        for batch in order.chunks(config.batch_size) {
            let mut grad = vec![0.0; model.slot_count()];
            let mut batch_loss = 0.0;
            let mut batch_valid = 0usize;
            {
                let tracked = model.tracked();
                let evaluator = Evaluator::new(catalog, &tracked);
                for sample in batch.iter().filter_map(|idx| resolved[*idx].as_ref()) {
                    let target = sample.outcome.sign();
                    let score = evaluator.score_with_weights(&sample.sequence, sample.weights);
                    batch_loss += -target * score.value();
                    score.accumulate_grad(-target, &mut grad);
                    batch_valid += 1;
                }
            }
            if batch_valid == 0 {
                continue;
            }
            let scale = 1.0 / batch_valid as f64;
            for g in &mut grad {
                *g *= scale;
            }
            let deltas = adam.step(&grad);
            model.apply_deltas(&deltas);
            loss_sum += batch_loss;
            processed += batch_valid;
            updates += 1;
        }

        let mean_loss = if processed > 0 {
            loss_sum / processed as f64
        } else {
            0.0
        };
        tracing::info!(
            epoch = epoch + 1,
            epochs = config.epochs,
            mean_loss,
            updates,
            "epoch finished"
        );
        report.epochs.push(EpochStats {
            epoch: epoch + 1,
            mean_loss,
            samples: processed,
            updates,
        });

        if let Some(path) = checkpoint {
            if config.is_checkpoint_epoch(epoch) {
                match save_weights(model, path) {
                    Ok(()) => {
                        report.snapshots_written += 1;
                        tracing::debug!(path = %path.display(), epoch = epoch + 1, "checkpoint saved");
                    }
                    Err(err) => {
                        report.snapshot_failures += 1;
                        tracing::warn!(path = %path.display(), error = %err, "checkpoint save failed");
                    }
                }
            }
        }
    }

    tracing::info!(
        final_loss = report.final_loss().unwrap_or_default(),
        snapshots = report.snapshots_written,
        "training finished"
    );
    Ok(report)
}
