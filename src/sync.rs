//! Client-side mirror of the ranking.
//!
//! Keeps the last player list seen from the server, skips re-rendering when
//! nothing changed, and drops to the built-in demo dataset after repeated
//! connection failures. None of this is relied on for data integrity.

use crate::models::Player;
use crate::seed::demo_players;
use crate::stats::progress;
use thiserror::Error;
use tracing::warn;

/// Consecutive failures tolerated before switching to demo data.
pub const OFFLINE_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectivityError {
    #[error("request timed out")]
    Timeout,
    #[error("server unreachable: {0}")]
    Unreachable(String),
    #[error("unexpected status {0}")]
    Status(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Online,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Changed,
    Unchanged,
    /// A mutation was in flight, so the refresh was not applied.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Retrying { attempt: u32, remaining: u32 },
    Offline,
}

pub fn fingerprint(players: &[Player]) -> String {
    players
        .iter()
        .map(|player| format!("{}:{}", player.id, player.assists))
        .collect::<Vec<_>>()
        .join("|")
}

#[derive(Debug, Clone)]
pub struct SyncState {
    players: Vec<Player>,
    fingerprint: Option<String>,
    failures: u32,
    mode: SyncMode,
    mutating: bool,
}

impl Default for SyncState {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncState {
    pub fn new() -> Self {
        Self {
            players: Vec::new(),
            fingerprint: None,
            failures: 0,
            mode: SyncMode::Online,
            mutating: false,
        }
    }

    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Takes a fresh ranking from the server. Returns `Unchanged` when the
    /// fingerprint matches the cached one so the caller can skip rendering.
    pub fn apply_refresh(&mut self, players: Vec<Player>) -> RefreshOutcome {
        if self.mutating {
            return RefreshOutcome::Skipped;
        }

        let was_offline = self.mode == SyncMode::Offline;
        self.failures = 0;
        self.mode = SyncMode::Online;

        let next = fingerprint(&players);
        if !was_offline && self.fingerprint.as_deref() == Some(next.as_str()) {
            return RefreshOutcome::Unchanged;
        }

        self.fingerprint = Some(next);
        self.players = players;
        RefreshOutcome::Changed
    }

    pub fn record_failure(&mut self, err: &ConnectivityError) -> SyncStatus {
        self.failures = self.failures.saturating_add(1);
        if self.failures < OFFLINE_THRESHOLD {
            warn!(attempt = self.failures, "refresh failed: {err}");
            return SyncStatus::Retrying {
                attempt: self.failures,
                remaining: OFFLINE_THRESHOLD - self.failures,
            };
        }

        if self.mode != SyncMode::Offline {
            warn!("refresh failed {} times, switching to demo data: {err}", self.failures);
            self.mode = SyncMode::Offline;
            self.players = demo_players();
            self.fingerprint = Some(fingerprint(&self.players));
        }
        SyncStatus::Offline
    }

    /// Marks a mutation as in flight. Returns `false` if one already is.
    pub fn begin_mutation(&mut self) -> bool {
        if self.mutating {
            return false;
        }
        self.mutating = true;
        true
    }

    pub fn end_mutation(&mut self) {
        self.mutating = false;
    }

    /// Tracked player's progress toward the top of the cached ranking.
    pub fn progress(&self) -> Option<f64> {
        let leader = self.players.iter().map(|player| player.assists).max()?;
        let tracked = self.players.iter().find(|player| player.is_tracked)?;
        Some(progress(tracked.assists, leader))
    }
}
