use crate::errors::LedgerError;
use crate::models::{EntryDraft, LedgerEntry, Player};
use crate::seed;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info};

/// Storage seam for the ledger core.
///
/// Every mutating call is a single atomic unit: the ledger table and the
/// player's counter either both change or neither does.
pub trait LedgerStore: Send + Sync {
    fn player(&self, id: u64) -> Option<Player>;
    fn players(&self) -> Vec<Player>;
    fn entry(&self, id: u64) -> Option<LedgerEntry>;
    fn entries(&self) -> Vec<LedgerEntry>;
    /// Appends `draft` under a fresh id and sets the player's total to `assists`.
    fn append_entry(
        &mut self,
        draft: EntryDraft,
        assists: u64,
    ) -> impl Future<Output = Result<LedgerEntry, LedgerError>> + Send;
    /// Deletes entry `id` and sets its player's total to `assists`.
    fn remove_entry(
        &mut self,
        id: u64,
        assists: u64,
    ) -> impl Future<Output = Result<LedgerEntry, LedgerError>> + Send;
}

/// The two persisted tables plus the id high-water mark.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tables {
    pub players: Vec<Player>,
    pub ledger: Vec<LedgerEntry>,
    #[serde(default)]
    pub last_entry_id: u64,
}

impl Tables {
    pub fn seeded(now: DateTime<Utc>) -> Self {
        Self {
            players: seed::players_at(now),
            ledger: Vec::new(),
            last_entry_id: 0,
        }
    }

    fn normalize(mut self) -> Self {
        let highest = self.ledger.iter().map(|entry| entry.id).max().unwrap_or(0);
        self.last_entry_id = self.last_entry_id.max(highest);
        self
    }

    fn player(&self, id: u64) -> Option<Player> {
        self.players.iter().find(|player| player.id == id).cloned()
    }

    fn entry(&self, id: u64) -> Option<LedgerEntry> {
        self.ledger.iter().find(|entry| entry.id == id).cloned()
    }

    fn append(
        &mut self,
        draft: EntryDraft,
        assists: u64,
        now: DateTime<Utc>,
    ) -> Result<LedgerEntry, LedgerError> {
        let player = self
            .players
            .iter_mut()
            .find(|player| player.id == draft.player_id)
            .ok_or_else(|| LedgerError::player_not_found(draft.player_id))?;

        let id = self.last_entry_id + 1;
        let entry = LedgerEntry {
            id,
            player_id: draft.player_id,
            date: draft.date,
            delta: draft.delta,
            notes: draft.notes,
            created_at: now,
        };

        player.assists = assists;
        player.updated_at = now;
        self.last_entry_id = id;
        self.ledger.push(entry.clone());
        Ok(entry)
    }

    fn remove(&mut self, id: u64, assists: u64, now: DateTime<Utc>) -> Result<LedgerEntry, LedgerError> {
        let index = self
            .ledger
            .iter()
            .position(|entry| entry.id == id)
            .ok_or_else(|| LedgerError::entry_not_found(id))?;
        let player_id = self.ledger[index].player_id;
        let player = self
            .players
            .iter_mut()
            .find(|player| player.id == player_id)
            .ok_or_else(|| LedgerError::player_not_found(player_id))?;

        player.assists = assists;
        player.updated_at = now;
        Ok(self.ledger.remove(index))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Tables,
}

impl MemoryStore {
    pub fn new(tables: Tables) -> Self {
        Self {
            tables: tables.normalize(),
        }
    }

    pub fn seeded() -> Self {
        Self::new(Tables::seeded(Utc::now()))
    }
}

impl LedgerStore for MemoryStore {
    fn player(&self, id: u64) -> Option<Player> {
        self.tables.player(id)
    }

    fn players(&self) -> Vec<Player> {
        self.tables.players.clone()
    }

    fn entry(&self, id: u64) -> Option<LedgerEntry> {
        self.tables.entry(id)
    }

    fn entries(&self) -> Vec<LedgerEntry> {
        self.tables.ledger.clone()
    }

    async fn append_entry(&mut self, draft: EntryDraft, assists: u64) -> Result<LedgerEntry, LedgerError> {
        self.tables.append(draft, assists, Utc::now())
    }

    async fn remove_entry(&mut self, id: u64, assists: u64) -> Result<LedgerEntry, LedgerError> {
        self.tables.remove(id, assists, Utc::now())
    }
}

/// Tables kept in memory and mirrored to a JSON document.
///
/// Mutations are staged on a copy, written to a sibling temp file and renamed
/// over the data file. The in-memory copy only moves forward once the rename
/// succeeds.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    tables: Tables,
}

impl JsonFileStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        let tables = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<Tables>(&bytes).map_err(|err| {
                error!("failed to parse data file {}: {err}", path.display());
                LedgerError::storage(err)
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!("no data file at {}, seeding reference players", path.display());
                let tables = Tables::seeded(Utc::now());
                write_tables(&path, &tables).await?;
                tables
            }
            Err(err) => {
                error!("failed to read data file {}: {err}", path.display());
                return Err(err.into());
            }
        };

        Ok(Self {
            path,
            tables: tables.normalize(),
        })
    }

    async fn commit<T: Send>(
        &mut self,
        change: impl FnOnce(&mut Tables, DateTime<Utc>) -> Result<T, LedgerError> + Send,
    ) -> Result<T, LedgerError> {
        let mut staged = self.tables.clone();
        let result = change(&mut staged, Utc::now())?;
        write_tables(&self.path, &staged).await?;
        self.tables = staged;
        Ok(result)
    }
}

impl LedgerStore for JsonFileStore {
    fn player(&self, id: u64) -> Option<Player> {
        self.tables.player(id)
    }

    fn players(&self) -> Vec<Player> {
        self.tables.players.clone()
    }

    fn entry(&self, id: u64) -> Option<LedgerEntry> {
        self.tables.entry(id)
    }

    fn entries(&self) -> Vec<LedgerEntry> {
        self.tables.ledger.clone()
    }

    async fn append_entry(&mut self, draft: EntryDraft, assists: u64) -> Result<LedgerEntry, LedgerError> {
        self.commit(|staged, now| staged.append(draft, assists, now)).await
    }

    async fn remove_entry(&mut self, id: u64, assists: u64) -> Result<LedgerEntry, LedgerError> {
        self.commit(|staged, now| staged.remove(id, assists, now)).await
    }
}

/// Storage selected at startup.
#[derive(Debug)]
pub enum Backend {
    Memory(MemoryStore),
    File(JsonFileStore),
}

impl LedgerStore for Backend {
    fn player(&self, id: u64) -> Option<Player> {
        match self {
            Self::Memory(store) => store.player(id),
            Self::File(store) => store.player(id),
        }
    }

    fn players(&self) -> Vec<Player> {
        match self {
            Self::Memory(store) => store.players(),
            Self::File(store) => store.players(),
        }
    }

    fn entry(&self, id: u64) -> Option<LedgerEntry> {
        match self {
            Self::Memory(store) => store.entry(id),
            Self::File(store) => store.entry(id),
        }
    }

    fn entries(&self) -> Vec<LedgerEntry> {
        match self {
            Self::Memory(store) => store.entries(),
            Self::File(store) => store.entries(),
        }
    }

    async fn append_entry(&mut self, draft: EntryDraft, assists: u64) -> Result<LedgerEntry, LedgerError> {
        match self {
            Self::Memory(store) => store.append_entry(draft, assists).await,
            Self::File(store) => store.append_entry(draft, assists).await,
        }
    }

    async fn remove_entry(&mut self, id: u64, assists: u64) -> Result<LedgerEntry, LedgerError> {
        match self {
            Self::Memory(store) => store.remove_entry(id, assists).await,
            Self::File(store) => store.remove_entry(id, assists).await,
        }
    }
}

async fn write_tables(path: &Path, tables: &Tables) -> Result<(), LedgerError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let payload = serde_json::to_vec_pretty(tables)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, payload).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}
