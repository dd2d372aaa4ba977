use crate::{SearchConfig, SearchError};
use kingdoms_core::{
    context_weights, ActionChoice, ActionId, Catalog, ContextWeights, CoreError, Evaluator,
    InfluenceSource, Player, ScopePolicy,
};
use serde::Serialize;
use std::time::Instant;

const TIME_CHECK_INTERVAL: u64 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExpandedChoice {
    pub choice: ActionChoice,
    pub hand_slot: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub sequence: Vec<ActionChoice>,
    pub score: f64,
    pub weights: ContextWeights,
    pub expanded_choices: usize,
    pub candidates_scored: u64,
    /// False when a budget interrupted the enumeration.
    pub complete: bool,
    pub elapsed_ms: u64,
}

pub fn expand_choices(
    catalog: &Catalog,
    hand: &[ActionId],
    policy: ScopePolicy,
) -> Result<Vec<ExpandedChoice>, SearchError> {
    let mut expanded = Vec::new();
    for (hand_slot, id) in hand.iter().enumerate() {
        let def = catalog
            .try_get(*id)
            .ok_or_else(|| CoreError::UnknownAction(format!("#{}", id.0)))?;
        if def.has_scope_choice() {
            for scope in &def.scope_options {
                let choice = ActionChoice::with_policy(catalog, *id, Some(*scope), policy)?;
                expanded.push(ExpandedChoice { choice, hand_slot });
            }
            if policy == ScopePolicy::AllowUnscoped {
                let choice = ActionChoice::with_policy(catalog, *id, None, policy)?;
                expanded.push(ExpandedChoice { choice, hand_slot });
            }
        } else {
            let choice = ActionChoice::new(catalog, *id, None)?;
            expanded.push(ExpandedChoice { choice, hand_slot });
        }
    }
    Ok(expanded)
}

pub fn arrangement_count(n: usize) -> u128 {
    let mut total: u128 = 1;
    let mut term: u128 = 1;
    for k in 0..n {
        term = term.saturating_mul((n - k) as u128);
        total = total.saturating_add(term);
    }
    total
}

pub fn find_best_sequence<I>(
    catalog: &Catalog,
    influences: &I,
    player: &Player,
    opponent: &Player,
) -> Result<SearchOutcome, SearchError>
where
    I: InfluenceSource<Scalar = f64>,
{
    find_best_sequence_with(catalog, influences, player, opponent, &SearchConfig::default())
}

/// Scores every ordering of every subset of the expanded hand and keeps the best.
///
/// Ties keep the earliest candidate in (length, choice index) order.
pub fn find_best_sequence_with<I>(
    catalog: &Catalog,
    influences: &I,
    player: &Player,
    opponent: &Player,
    config: &SearchConfig,
) -> Result<SearchOutcome, SearchError>
where
    I: InfluenceSource<Scalar = f64>,
{
    let started_at = Instant::now();
    let weights = context_weights(player.hero.hp_ratio(), opponent.hero.hp_ratio());
    let choices = expand_choices(catalog, &player.hand, config.scope_policy)?;

    let planned = arrangement_count(choices.len());
    if planned > config.warn_candidates_above as u128 {
        tracing::warn!(
            choices = choices.len(),
            candidates = %planned,
            "sequence search is factorial in hand size"
        );
    } else {
        tracing::debug!(choices = choices.len(), candidates = %planned, "starting sequence search");
    }

    let mut search = Search {
        evaluator: Evaluator::new(catalog, influences),
        weights,
        choices: &choices,
        config,
        started_at,
        used: vec![false; choices.len()],
        slot_used: vec![false; player.hand.len()],
        path: Vec::with_capacity(choices.len()),
        sequence: Vec::with_capacity(choices.len()),
        best: None,
        scored: 0,
        interrupted: false,
    };
    search.descend();

    let (best_path, score) = search.best.take().unwrap_or_default();
    let sequence = best_path.iter().map(|idx| choices[*idx].choice).collect();
    let outcome = SearchOutcome {
        sequence,
        score,
        weights,
        expanded_choices: choices.len(),
        candidates_scored: search.scored,
        complete: !search.interrupted,
        elapsed_ms: started_at.elapsed().as_millis() as u64,
    };
    if !outcome.complete {
        tracing::warn!(
            scored = outcome.candidates_scored,
            "sequence search interrupted by budget; result may not be optimal"
        );
    }
    Ok(outcome)
}

struct Search<'a, I> {
    evaluator: Evaluator<'a, I>,
    weights: ContextWeights,
    choices: &'a [ExpandedChoice],
    config: &'a SearchConfig,
    started_at: Instant,
    used: Vec<bool>,
    slot_used: Vec<bool>,
    path: Vec<usize>,
    sequence: Vec<ActionChoice>,
    best: Option<(Vec<usize>, f64)>,
    scored: u64,
    interrupted: bool,
}

impl<I: InfluenceSource<Scalar = f64>> Search<'_, I> {
    fn descend(&mut self) {
        if self.budget_exhausted() {
            self.interrupted = true;
            return;
        }
        self.score_current();
        for idx in 0..self.choices.len() {
            if self.interrupted {
                return;
            }
            let slot = self.choices[idx].hand_slot;
            if self.used[idx] || (self.config.one_choice_per_card && self.slot_used[slot]) {
                continue;
            }
            self.used[idx] = true;
            self.slot_used[slot] = true;
            self.path.push(idx);
            self.sequence.push(self.choices[idx].choice);

            self.descend();

            self.sequence.pop();
            self.path.pop();
            self.used[idx] = false;
            self.slot_used[slot] = self.path.iter().any(|p| self.choices[*p].hand_slot == slot);
        }
    }

    fn score_current(&mut self) {
        let score = self
            .evaluator
            .score_with_weights(&self.sequence, self.weights);
        self.scored += 1;
        let better = match &self.best {
            None => score.is_finite(),
            Some((best_path, best_score)) => {
                score > *best_score
                    || (score == *best_score && precedes(&self.path, best_path))
            }
        };
        if better {
            self.best = Some((self.path.clone(), score));
        }
    }

    fn budget_exhausted(&self) -> bool {
        if let Some(limit) = self.config.max_candidates {
            if self.scored >= limit {
                return true;
            }
        }
        if let Some(limit_ms) = self.config.time_limit_ms {
            if self.scored % TIME_CHECK_INTERVAL == 0
                && self.started_at.elapsed().as_millis() as u64 >= limit_ms
            {
                return true;
            }
        }
        false
    }
}

fn precedes(a: &[usize], b: &[usize]) -> bool {
    (a.len(), a) < (b.len(), b)
}
