use crate::{ActionChoice, ActionDef, Attributes, Catalog, InfluenceSource, Scalar};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContextWeights {
    pub attack: f64,
    pub defense: f64,
    pub support: f64,
}

/// Press the attack when the opponent is low, defend when we are low.
pub fn context_weights(player_hp_ratio: f64, opponent_hp_ratio: f64) -> ContextWeights {
    ContextWeights {
        attack: 1.0 + (1.0 - opponent_hp_ratio),
        defense: 1.0 + (1.0 - player_hp_ratio),
        support: 1.0,
    }
}

pub fn evaluate<S: Scalar>(
    action: &ActionDef,
    weights: ContextWeights,
    modifier: &Attributes<S>,
) -> S {
    let effective = Attributes::<S>::constant(action.base) + modifier.clone();
    effective.weighted(weights.attack, weights.defense, weights.support)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionScore {
    pub action: String,
    pub scope: Option<crate::Scope>,
    pub modifier: Attributes,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceBreakdown {
    pub weights: ContextWeights,
    pub positions: Vec<PositionScore>,
    pub total: f64,
}

/// Scores sequences against a catalog using whatever supplies influence modifiers.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a, I> {
    catalog: &'a Catalog,
    influences: &'a I,
}

impl<'a, I: InfluenceSource> Evaluator<'a, I> {
    pub fn new(catalog: &'a Catalog, influences: &'a I) -> Self {
        Self {
            catalog,
            influences,
        }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn score_sequence(
        &self,
        sequence: &[ActionChoice],
        player_hp_ratio: f64,
        opponent_hp_ratio: f64,
    ) -> I::Scalar {
        self.score_with_weights(sequence, context_weights(player_hp_ratio, opponent_hp_ratio))
    }

    pub fn score_with_weights(&self, sequence: &[ActionChoice], weights: ContextWeights) -> I::Scalar {
        let modifiers = self.propagate(sequence);
        let mut total = I::Scalar::zero();
        for (choice, modifier) in sequence.iter().zip(modifiers.iter()) {
            total += evaluate(self.catalog.get(choice.action()), weights, modifier);
        }
        total
    }

    /// Accumulated modifier per position. Each matching rule at position `i`
    /// feeds only the nearest later position holding its target.
    pub fn propagate(&self, sequence: &[ActionChoice]) -> Vec<Attributes<I::Scalar>> {
        let mut acc = vec![Attributes::<I::Scalar>::zero(); sequence.len()];
        for (i, choice) in sequence.iter().enumerate() {
            for rule in self.catalog.rules(choice.action()) {
                if !rule.required.matches(choice.scope()) {
                    continue;
                }
                let Some(modifier) = self.influences.modifier(choice.action(), rule) else {
                    continue;
                };
                let next = sequence[i + 1..]
                    .iter()
                    .position(|later| later.action() == rule.target);
                if let Some(offset) = next {
                    acc[i + 1 + offset] += modifier;
                }
            }
        }
        acc
    }

    pub fn breakdown(&self, sequence: &[ActionChoice], weights: ContextWeights) -> SequenceBreakdown {
        let modifiers = self.propagate(sequence);
        let mut positions = Vec::with_capacity(sequence.len());
        let mut total = 0.0;
        for (choice, modifier) in sequence.iter().zip(modifiers.iter()) {
            let def = self.catalog.get(choice.action());
            let score = evaluate(def, weights, modifier).value();
            total += score;
            positions.push(PositionScore {
                action: def.name.clone(),
                scope: choice.scope(),
                modifier: modifier.values(),
                score,
            });
        }
        SequenceBreakdown {
            weights,
            positions,
            total,
        }
    }
}
