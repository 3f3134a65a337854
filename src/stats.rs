use crate::models::{LedgerEntry, Player};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub total_entries: usize,
    pub total_delta: i64,
    pub total_added: u64,
    pub total_removed: u64,
    pub distinct_players: usize,
    pub earliest_date: Option<NaiveDate>,
    pub latest_date: Option<NaiveDate>,
}

/// The tracked subject measured against the current leader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub tracked: Player,
    pub leader: Player,
    pub rank: usize,
    pub remaining: u64,
    pub progress: f64,
}

pub fn build_summary(entries: &[LedgerEntry]) -> LedgerSummary {
    let mut summary = LedgerSummary {
        total_entries: entries.len(),
        ..LedgerSummary::default()
    };
    let mut players = BTreeSet::new();

    for entry in entries {
        summary.total_delta = summary.total_delta.saturating_add(entry.delta);
        if entry.delta > 0 {
            summary.total_added = summary.total_added.saturating_add(entry.delta.unsigned_abs());
        } else {
            summary.total_removed = summary.total_removed.saturating_add(entry.delta.unsigned_abs());
        }
        players.insert(entry.player_id);
        summary.earliest_date = Some(summary.earliest_date.map_or(entry.date, |d| d.min(entry.date)));
        summary.latest_date = Some(summary.latest_date.map_or(entry.date, |d| d.max(entry.date)));
    }

    summary.distinct_players = players.len();
    summary
}

/// Share of the leader's total reached by the tracked player, capped at 1.
pub fn progress(tracked: u64, leader: u64) -> f64 {
    if leader == 0 {
        return if tracked == 0 { 0.0 } else { 1.0 };
    }
    (tracked as f64 / leader as f64).min(1.0)
}

/// Orders players by assists descending, ties by name ascending.
pub fn rank(players: &mut [Player]) {
    players.sort_by(|a, b| b.assists.cmp(&a.assists).then_with(|| a.name.cmp(&b.name)));
}

/// `ranking` must already be ordered best first.
pub fn build_standing(ranking: &[Player]) -> Option<Standing> {
    let leader = ranking.first()?;
    let (index, tracked) = ranking
        .iter()
        .enumerate()
        .find(|(_, player)| player.is_tracked)?;

    Some(Standing {
        rank: index + 1,
        remaining: leader.assists.saturating_sub(tracked.assists),
        progress: progress(tracked.assists, leader.assists),
        tracked: tracked.clone(),
        leader: leader.clone(),
    })
}
