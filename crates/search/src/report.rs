use crate::{SearchError, SearchOutcome};
use kingdoms_core::{describe_sequence, Catalog, Evaluator, InfluenceSource, Player, SequenceBreakdown};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SideSummary {
    pub player: String,
    pub hero: String,
    pub current_hp: u32,
    pub max_hp: u32,
    pub hand: Vec<String>,
}

impl SideSummary {
    pub fn new(catalog: &Catalog, player: &Player) -> Self {
        Self {
            player: player.name.clone(),
            hero: player.hero.name.clone(),
            current_hp: player.hero.current_hp,
            max_hp: player.hero.max_hp,
            hand: player.hand_names(catalog),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReport {
    pub me: SideSummary,
    pub opponent: SideSummary,
    pub recommended: String,
    pub breakdown: SequenceBreakdown,
    pub expanded_choices: usize,
    pub candidates_scored: u64,
    pub complete: bool,
    pub elapsed_ms: u64,
}

impl SearchReport {
    pub fn new<I: InfluenceSource<Scalar = f64>>(
        catalog: &Catalog,
        influences: &I,
        me: &Player,
        opponent: &Player,
        outcome: &SearchOutcome,
    ) -> Self {
        let breakdown =
            Evaluator::new(catalog, influences).breakdown(&outcome.sequence, outcome.weights);
        Self {
            me: SideSummary::new(catalog, me),
            opponent: SideSummary::new(catalog, opponent),
            recommended: describe_sequence(catalog, &outcome.sequence),
            breakdown,
            expanded_choices: outcome.expanded_choices,
            candidates_scored: outcome.candidates_scored,
            complete: outcome.complete,
            elapsed_ms: outcome.elapsed_ms,
        }
    }

    pub fn to_text_report(&self) -> String {
        let mut lines = vec![
            side_line("me/己方", &self.me),
            side_line("opponent/敌方", &self.opponent),
            format!(
                "weights/权重: attack/攻击={:.2} defense/防御={:.2} support/辅助={:.2}",
                self.breakdown.weights.attack,
                self.breakdown.weights.defense,
                self.breakdown.weights.support
            ),
            String::new(),
            format!("recommended/推荐: {}", self.recommended),
        ];
        for (idx, pos) in self.breakdown.positions.iter().enumerate() {
            let scope = pos
                .scope
                .map(|value| format!(" scope/范围={value}"))
                .unwrap_or_default();
            lines.push(format!(
                "  {:>2}. {}{} score/分数={:.3} modifier/修正=({:.3}, {:.3}, {:.3})",
                idx + 1,
                pos.action,
                scope,
                pos.score,
                pos.modifier.attack,
                pos.modifier.defense,
                pos.modifier.support
            ));
        }
        lines.push(format!("total/总分: {:.3}", self.breakdown.total));
        lines.push(format!(
            "search/搜索: choices/选项={} candidates/候选={} complete/完整={} elapsed/耗时={}ms",
            self.expanded_choices, self.candidates_scored, self.complete, self.elapsed_ms
        ));
        lines.join("\n")
    }
}

fn side_line(label: &str, side: &SideSummary) -> String {
    let hand = if side.hand.is_empty() {
        "(none/无)".to_string()
    } else {
        side.hand.join(", ")
    };
    format!(
        "{label}: {} ({} {}/{} HP) hand/手牌: {hand}",
        side.player, side.hero, side.current_hp, side.max_hp
    )
}

pub fn write_json(path: &Path, report: &SearchReport) -> Result<(), SearchError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_string_pretty(report)?;
    fs::write(path, body)?;
    Ok(())
}

pub fn write_text(path: &Path, report: &SearchReport) -> Result<(), SearchError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, report.to_text_report())?;
    Ok(())
}
