//! Session persistence with file locking.
//!
//! One JSON file per session id holds the serialized user and drink ledger.
//! Each request loads the session, mutates it and saves it back atomically,
//! so a session is only ever owned by the request currently handling it.

use crate::{DrinkLedger, Error, Result, User};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// Everything persisted for one user session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    /// Session identity, the moral equivalent of a session cookie value
    pub id: Uuid,
    /// Physiological inputs of the last calculation, if any
    pub user: Option<User>,
    /// The session's drink ledger
    pub ledger: DrinkLedger,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            user: None,
            ledger: DrinkLedger::default(),
        }
    }
}

impl Session {
    /// Load a session from a file with shared locking
    ///
    /// Returns a fresh session if the file doesn't exist.
    /// If the file is corrupted, logs a warning and returns a fresh session.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No session file found, starting a fresh session");
            return Ok(Self::default());
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(
                    "Unable to open session file {:?}: {}. Starting fresh.",
                    path,
                    e
                );
                return Ok(Self::default());
            }
        };

        // Acquire shared lock for reading
        if let Err(e) = file.lock_shared() {
            tracing::warn!(
                "Unable to lock session file {:?}: {}. Starting fresh.",
                path,
                e
            );
            return Ok(Self::default());
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!(
                "Failed to read session file {:?}: {}. Starting fresh.",
                path,
                e
            );
            return Ok(Self::default());
        }

        file.unlock()?;

        match serde_json::from_str::<Session>(&contents) {
            Ok(session) => {
                tracing::debug!("Loaded session {} from {:?}", session.id, path);
                Ok(session)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse session file {:?}: {}. Starting fresh.",
                    path,
                    e
                );
                Ok(Self::default())
            }
        }
    }

    /// Save the session to a file with exclusive locking
    ///
    /// Atomically writes by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "session path missing parent")
        })?)?;

        // Exclusive lock on the temp file serializes concurrent writers
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        // Atomically replace the old session file
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved session {} to {:?}", self.id, path);
        Ok(())
    }

    /// Load the session, modify it, and save it back atomically
    ///
    /// The load-mutate-save pattern every boundary operation goes through.
    pub fn update<F, T>(path: &Path, f: F) -> Result<T>
    where
        F: FnOnce(&mut Session) -> Result<T>,
    {
        let mut session = Self::load(path)?;
        let value = f(&mut session)?;
        session.save(path)?;
        Ok(value)
    }
}

/// File path of a session inside the session directory
pub fn session_path(dir: &Path, session_id: &str) -> PathBuf {
    dir.join(format!("{}.json", session_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::get_default_catalog;
    use crate::user::{Gender, UserForm};
    use chrono::Utc;

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = session_path(temp_dir.path(), "default");

        let mut session = Session::default();
        session.user = Some(UserForm::default().parse().unwrap());
        session
            .ledger
            .add_selected(get_default_catalog(), "Bier (1 L, 6%)", Utc::now())
            .unwrap();
        session
            .ledger
            .add_custom("Apfelwein", "0.3", "L", "5.5", Utc::now())
            .unwrap();
        session.save(&path).unwrap();

        let loaded = Session::load(&path).unwrap();
        assert_eq!(loaded.id, session.id);
        assert_eq!(loaded.user.as_ref().unwrap().gender(), &Gender::Male);
        assert_eq!(loaded.ledger.selected().len(), 1);
        assert_eq!(loaded.ledger.custom().len(), 1);
        assert_eq!(loaded.ledger.history().len(), 2);
    }

    #[test]
    fn test_load_nonexistent_starts_fresh() {
        let temp_dir = tempfile::tempdir().unwrap();
        let session = Session::load(&session_path(temp_dir.path(), "nope")).unwrap();
        assert!(session.user.is_none());
        assert!(session.ledger.combined().is_empty());
        assert!(session.ledger.history().is_empty());
    }

    #[test]
    fn test_corrupted_session_starts_fresh() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = session_path(temp_dir.path(), "bad");
        std::fs::write(&path, "{ invalid json }").unwrap();

        let session = Session::load(&path).unwrap();
        assert!(session.user.is_none());
        assert!(session.ledger.combined().is_empty());
    }

    #[test]
    fn test_update_pattern() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = session_path(temp_dir.path(), "default");

        Session::update(&path, |session| {
            session
                .ledger
                .add_selected(get_default_catalog(), "Bier (1 L, 6%)", Utc::now())
        })
        .unwrap();

        let loaded = Session::load(&path).unwrap();
        assert_eq!(loaded.ledger.selected().len(), 1);
    }

    #[test]
    fn test_history_reset_keeps_user_record() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = session_path(temp_dir.path(), "default");

        let mut session = Session::default();
        session.user = Some(UserForm::default().parse().unwrap());
        session
            .ledger
            .add_selected(get_default_catalog(), "Bier (1 L, 6%)", Utc::now())
            .unwrap();
        session.save(&path).unwrap();

        Session::update(&path, |session| {
            session.ledger.reset_history();
            Ok(())
        })
        .unwrap();

        let loaded = Session::load(&path).unwrap();
        assert!(loaded.ledger.history().is_empty());
        assert!(loaded.ledger.combined().is_empty());
        // The stored user survives a history reset
        assert!(loaded.user.is_some());
    }

    #[test]
    fn test_atomic_save_leaves_no_stray_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = session_path(temp_dir.path(), "default");

        Session::default().save(&path).unwrap();

        assert!(path.exists());
        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "default.json")
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only default.json, found extras: {:?}",
            extras
        );
    }
}
