//! Assist ledger state machine.
//!
//! A player's `assists` is a cached value that always equals its seed value
//! plus the sum of the deltas of its surviving ledger entries. Every mutation
//! goes through one atomic store call so the two never drift apart.

use crate::errors::LedgerError;
use crate::models::{EntryDraft, LedgerEntry, Player};
use crate::seed::SeedPlayer;
use crate::stats::{build_standing, build_summary, rank, LedgerSummary, Standing};
use crate::storage::{Backend, LedgerStore};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UndoOutcome {
    pub deleted_entry_id: u64,
    pub delta_subtracted: i64,
    pub player_id: u64,
    pub player: Player,
}

/// A player whose cached total disagrees with its seed plus ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discrepancy {
    pub player_id: u64,
    pub expected: i128,
    pub actual: u64,
}

pub struct AssistLedger<S = Backend> {
    store: S,
}

impl<S: LedgerStore> AssistLedger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn player(&self, id: u64) -> Result<Player, LedgerError> {
        self.store
            .player(id)
            .ok_or_else(|| LedgerError::player_not_found(id))
    }

    /// Appends a signed change for `player_id` and moves its total with it.
    /// The returned entry id is what a caller hands back to [`Self::undo_last`].
    pub async fn apply_delta(
        &mut self,
        player_id: u64,
        delta: i64,
        date: Option<NaiveDate>,
        notes: Option<String>,
    ) -> Result<LedgerEntry, LedgerError> {
        if delta == 0 {
            return Err(LedgerError::InvalidDelta("delta must be non-zero".into()));
        }
        let player = self.player(player_id)?;
        let assists = shift(player.assists, delta).ok_or_else(|| {
            warn!(player_id, delta, assists = player.assists, "rejected delta");
            LedgerError::InvalidDelta(format!(
                "cannot apply {delta} to {} assists for {}",
                player.assists, player.name
            ))
        })?;

        let draft = EntryDraft {
            player_id,
            delta,
            date: date.unwrap_or_else(today),
            notes: notes.filter(|notes| !notes.trim().is_empty()),
        };
        let entry = self.store.append_entry(draft, assists).await?;
        info!(entry_id = entry.id, player_id, delta, assists, "applied delta");
        Ok(entry)
    }

    /// Reverses entry `entry_id`. Only entries still present can be undone,
    /// so a repeated undo fails with `NotFound` and changes nothing.
    pub async fn undo_last(&mut self, entry_id: u64) -> Result<UndoOutcome, LedgerError> {
        let entry = self
            .store
            .entry(entry_id)
            .ok_or_else(|| LedgerError::entry_not_found(entry_id))?;
        let player = self.player(entry.player_id)?;
        let assists = shift(player.assists, -entry.delta).ok_or_else(|| {
            LedgerError::InvalidDelta(format!(
                "undoing {} would leave {} with negative assists",
                entry.delta, player.name
            ))
        })?;

        let removed = self.store.remove_entry(entry_id, assists).await?;
        info!(entry_id, player_id = removed.player_id, delta = removed.delta, assists, "undid entry");
        Ok(UndoOutcome {
            deleted_entry_id: removed.id,
            delta_subtracted: removed.delta,
            player_id: removed.player_id,
            player: self.player(removed.player_id)?,
        })
    }

    /// Sets an absolute total. The logged delta is derived from the stored
    /// value, never from anything the caller claims the previous total was.
    pub async fn set_assists(
        &mut self,
        player_id: u64,
        target: i64,
    ) -> Result<Option<LedgerEntry>, LedgerError> {
        let target = u64::try_from(target)
            .map_err(|_| LedgerError::InvalidDelta(format!("assists cannot be {target}")))?;
        let current = self.player(player_id)?.assists;
        let delta = i128::from(target) - i128::from(current);
        if delta == 0 {
            return Ok(None);
        }
        let delta = i64::try_from(delta)
            .map_err(|_| LedgerError::InvalidDelta("correction is out of range".into()))?;
        self.apply_delta(player_id, delta, None, Some("manual correction".into()))
            .await
            .map(Some)
    }

    /// Players ordered by assists descending, ties by name ascending.
    pub fn list_ranking(&self) -> Vec<Player> {
        let mut players = self.store.players();
        rank(&mut players);
        players
    }

    /// All entries, newest first.
    pub fn entries(&self) -> Vec<LedgerEntry> {
        let mut entries = self.store.entries();
        entries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        entries
    }

    pub fn recent(&self, limit: usize) -> Vec<LedgerEntry> {
        let mut entries = self.entries();
        entries.truncate(limit);
        entries
    }

    pub fn player_entries(&self, player_id: u64) -> Result<Vec<LedgerEntry>, LedgerError> {
        self.player(player_id)?;
        Ok(self
            .entries()
            .into_iter()
            .filter(|entry| entry.player_id == player_id)
            .collect())
    }

    pub fn summary(&self) -> LedgerSummary {
        build_summary(&self.store.entries())
    }

    pub fn standing(&self) -> Option<Standing> {
        build_standing(&self.list_ranking())
    }

    pub fn player_count(&self) -> usize {
        self.store.players().len()
    }

    /// Checks every seeded player against seed value plus surviving deltas.
    pub fn reconcile(&self, seeds: &[SeedPlayer]) -> Vec<Discrepancy> {
        let entries = self.store.entries();
        seeds
            .iter()
            .filter_map(|seed| {
                let player = self.store.player(seed.id)?;
                let logged: i128 = entries
                    .iter()
                    .filter(|entry| entry.player_id == seed.id)
                    .map(|entry| i128::from(entry.delta))
                    .sum();
                let expected = i128::from(seed.assists) + logged;
                (expected != i128::from(player.assists)).then_some(Discrepancy {
                    player_id: seed.id,
                    expected,
                    actual: player.assists,
                })
            })
            .collect()
    }
}

fn shift(assists: u64, delta: i64) -> Option<u64> {
    if delta >= 0 {
        assists.checked_add(delta.unsigned_abs())
    } else {
        assists.checked_sub(delta.unsigned_abs())
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
