use crate::config::{Config, StorageKind};
use crate::errors::LedgerError;
use crate::ledger::AssistLedger;
use crate::storage::{Backend, JsonFileStore, MemoryStore};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared handle to the ledger. Writers take the lock exclusively so an
/// apply and an undo never interleave; reads share it.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<RwLock<AssistLedger>>,
}

impl AppState {
    pub fn new(ledger: AssistLedger) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(ledger)),
        }
    }

    pub async fn from_config(config: &Config) -> Result<Self, LedgerError> {
        let backend = match config.storage {
            StorageKind::Memory => Backend::Memory(MemoryStore::seeded()),
            StorageKind::File => Backend::File(JsonFileStore::open(&config.data_path).await?),
        };
        Ok(Self::new(AssistLedger::new(backend)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::{REFERENCE_PLAYERS, TRACKED_PLAYER_ID};

    async fn hammer(state: AppState, player_id: u64, rounds: i64) -> i64 {
        let mut kept = 0;
        for round in 1..=rounds {
            let delta = if round % 3 == 0 { -round } else { round };
            let entry = state
                .ledger
                .write()
                .await
                .apply_delta(player_id, delta, None, None)
                .await
                .unwrap();
            tokio::task::yield_now().await;
            if round % 2 == 0 {
                state.ledger.write().await.undo_last(entry.id).await.unwrap();
            } else {
                kept += delta;
            }
        }
        kept
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_apply_and_undo_stay_reconciled() {
        let state = AppState::new(AssistLedger::new(Backend::Memory(MemoryStore::seeded())));

        let tasks: Vec<_> = [TRACKED_PLAYER_ID, TRACKED_PLAYER_ID, 2, TRACKED_PLAYER_ID]
            .into_iter()
            .map(|player_id| tokio::spawn(hammer(state.clone(), player_id, 40)))
            .collect();
        let mut kept_for_braden = 0;
        for (index, task) in tasks.into_iter().enumerate() {
            let kept = task.await.unwrap();
            if index != 2 {
                kept_for_braden += kept;
            }
        }

        let ledger = state.ledger.read().await;
        assert!(ledger.reconcile(&REFERENCE_PLAYERS).is_empty());
        let braden = ledger.player(TRACKED_PLAYER_ID).unwrap();
        assert_eq!(braden.assists as i64, 758 + kept_for_braden);
    }

    #[tokio::test]
    async fn memory_config_builds_seeded_state() {
        let config = Config::from_lookup(|key| (key == "APP_STORAGE").then(|| "memory".to_string()));
        let state = AppState::from_config(&config).await.unwrap();
        assert_eq!(state.ledger.read().await.list_ranking().len(), 11);
    }
}
