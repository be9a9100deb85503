//! Persistence for Instagram account connections.
//!
//! The rest of the system only needs get/put/delete on one record per user,
//! so the store is a small trait with two implementations: a JSON-file store
//! for real deployments and an in-memory store for tests and ephemeral runs.
//! Swapping in an external database is a trait impl away.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::instagram::InstagramAccount;
use crate::{PostprepError, Result};

/// Keyed storage of per-user account connections.
pub trait AccountStore: Send + Sync {
    /// Look up the connection for a user; `None` when not connected.
    fn get(&self, user_id: &str) -> Result<Option<InstagramAccount>>;
    /// Insert or replace the user's connection.
    fn put(&self, account: &InstagramAccount) -> Result<()>;
    /// Remove the user's connection. Deleting an absent record is not an error.
    fn delete(&self, user_id: &str) -> Result<()>;
}

/// One JSON file per user id under a root directory.
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Open the store at the platform data directory
    /// (`<data dir>/postprep/accounts`).
    pub fn new() -> Result<Self> {
        let base = dirs::data_local_dir()
            .ok_or_else(|| PostprepError::Store("could not resolve data dir".to_string()))?;
        Self::at(base.join("postprep").join("accounts"))
    }

    /// Open the store at an explicit root, creating it if needed.
    pub fn at(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Record path for a user id. Ids are restricted to a filename-safe
    /// alphabet so a crafted id cannot escape the store root.
    fn path_for(&self, user_id: &str) -> Result<PathBuf> {
        if user_id.is_empty()
            || !user_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            || user_id.starts_with('.')
        {
            return Err(PostprepError::Store(format!("invalid user id: {user_id:?}")));
        }
        Ok(self.root.join(format!("{user_id}.json")))
    }
}

impl AccountStore for JsonFileStore {
    fn get(&self, user_id: &str) -> Result<Option<InstagramAccount>> {
        let path = self.path_for(user_id)?;
        if !path.exists() {
            return Ok(None);
        }
        let file = fs::File::open(&path)?;
        let account: InstagramAccount = serde_json::from_reader(file)?;
        Ok(Some(account))
    }

    fn put(&self, account: &InstagramAccount) -> Result<()> {
        let path = self.path_for(&account.user_id)?;
        let file = fs::File::create(&path)?;
        serde_json::to_writer_pretty(file, account)?;
        Ok(())
    }

    fn delete(&self, user_id: &str) -> Result<()> {
        let path = self.path_for(user_id)?;
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

/// In-memory store for tests and ephemeral deployments.
#[derive(Default)]
pub struct MemoryStore {
    accounts: RwLock<HashMap<String, InstagramAccount>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for MemoryStore {
    fn get(&self, user_id: &str) -> Result<Option<InstagramAccount>> {
        let accounts = self
            .accounts
            .read()
            .map_err(|_| PostprepError::Store("store lock poisoned".to_string()))?;
        Ok(accounts.get(user_id).cloned())
    }

    fn put(&self, account: &InstagramAccount) -> Result<()> {
        let mut accounts = self
            .accounts
            .write()
            .map_err(|_| PostprepError::Store("store lock poisoned".to_string()))?;
        accounts.insert(account.user_id.clone(), account.clone());
        Ok(())
    }

    fn delete(&self, user_id: &str) -> Result<()> {
        let mut accounts = self
            .accounts
            .write()
            .map_err(|_| PostprepError::Store("store lock poisoned".to_string()))?;
        accounts.remove(user_id);
        Ok(())
    }
}
