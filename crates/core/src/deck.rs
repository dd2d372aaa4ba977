use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Card counts of the shared draw pile, by action name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckComposition {
    pub counts: BTreeMap<String, u32>,
}

impl Default for DeckComposition {
    fn default() -> Self {
        let counts = [
            ("杀", 15),
            ("过河拆桥", 5),
            ("顺手牵羊", 5),
            ("闪", 10),
            ("桃", 5),
            ("闪电", 1),
        ]
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
        Self { counts }
    }
}

impl DeckComposition {
    pub fn new<S: Into<String>>(counts: impl IntoIterator<Item = (S, u32)>) -> Self {
        Self {
            counts: counts
                .into_iter()
                .map(|(name, count)| (name.into(), count))
                .collect(),
        }
    }

    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    /// Removes one copy per known card that is still in the pile.
    pub fn without_known<S: AsRef<str>>(&self, known: &[S]) -> Self {
        let mut remaining = self.clone();
        for name in known {
            if let Some(count) = remaining.counts.get_mut(name.as_ref()) {
                *count = count.saturating_sub(1);
            }
        }
        remaining
    }

    /// Proportion of each remaining card name in the pile after removing known cards.
    /// Empty when the pile is exhausted or the opponent holds no cards.
    pub fn estimate_opponent_hand<S: AsRef<str>>(
        &self,
        known: &[S],
        opponent_hand_size: usize,
    ) -> BTreeMap<String, f64> {
        let remaining = self.without_known(known);
        let total = remaining.total();
        if total == 0 || opponent_hand_size == 0 {
            return BTreeMap::new();
        }
        remaining
            .counts
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(name, count)| (name, count as f64 / total as f64))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_deck_has_forty_one_cards() {
        assert_eq!(DeckComposition::default().total(), 41);
    }

    #[test]
    fn known_cards_shift_proportions() {
        let deck = DeckComposition::new([("a", 2), ("b", 2)]);
        let probs = deck.estimate_opponent_hand(&["a", "a", "a", "zzz"], 3);
        assert_eq!(probs.len(), 1);
        assert_eq!(probs.get("b"), Some(&1.0));
    }

    #[test]
    fn proportions_sum_to_one() {
        let probs = DeckComposition::default().estimate_opponent_hand(&["杀", "闪"], 4);
        let sum: f64 = probs.values().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert_eq!(probs.get("杀"), Some(&(14.0 / 39.0)));
    }

    #[test]
    fn empty_when_no_cards_or_no_hand() {
        let deck = DeckComposition::new([("a", 1)]);
        assert!(deck.estimate_opponent_hand(&["a"], 2).is_empty());
        assert!(deck.estimate_opponent_hand::<&str>(&[], 0).is_empty());
    }
}
