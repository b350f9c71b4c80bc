//! Roster persistence with file locking.
//!
//! The roster is a single JSON document mapping user → exercise → record.
//! Reads take a shared lock, writes go through a temp file and an atomic
//! rename, and read-modify-write cycles hold an exclusive lock on a sidecar
//! `.lock` file so two processes cannot lose each other's updates.

use crate::progression::{apply_session, SessionOutcome};
use crate::{Error, ExerciseRecord, Result, Roster, SessionInput};
use fs2::FileExt;
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Storage collaborator for exercise records
pub trait RecordStore {
    fn load_record(&self, user: &str, exercise: &str) -> Result<ExerciseRecord>;

    fn save_record(&mut self, user: &str, exercise: &str, record: &ExerciseRecord) -> Result<()>;

    /// Load a record, let `f` modify it, and save it back.
    ///
    /// Nothing is saved when `f` fails.
    fn update_record<T, F>(&mut self, user: &str, exercise: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut ExerciseRecord) -> Result<T>,
    {
        let mut record = self.load_record(user, exercise)?;
        let value = f(&mut record)?;
        self.save_record(user, exercise, &record)?;
        Ok(value)
    }
}

/// Evaluate one session against a stored record and persist the result.
pub fn record_session<S: RecordStore>(
    store: &mut S,
    user: &str,
    exercise: &str,
    input: &SessionInput,
) -> Result<SessionOutcome> {
    store.update_record(user, exercise, |record| {
        let outcome = apply_session(record, input)?;
        *record = outcome.record.clone();
        Ok(outcome)
    })
}

impl Roster {
    /// Load the roster from a file with shared locking
    ///
    /// Returns an empty roster if the file doesn't exist. A file that exists
    /// but cannot be parsed is an error: saving over it would drop every
    /// user's history.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No roster file found at {:?}, starting empty", path);
            return Ok(Self::default());
        }

        let file = File::open(path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        if contents.trim().is_empty() {
            tracing::warn!("Roster file {:?} is empty, starting empty", path);
            return Ok(Self::default());
        }

        let roster: Roster = serde_json::from_str(&contents)?;
        tracing::debug!("Loaded roster with {} users from {:?}", roster.users.len(), path);
        Ok(roster)
    }

    /// Save the roster to a file
    ///
    /// Atomically writes the roster by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent)?;

        let temp = NamedTempFile::new_in(&parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            // Indented so the file stays hand-editable
            let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
            let mut ser = serde_json::Serializer::with_formatter(&mut writer, formatter);
            self.serialize(&mut ser)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved roster to {:?}", path);
        Ok(())
    }

    /// User names in display order
    pub fn user_names(&self) -> Vec<&str> {
        self.users.keys().map(String::as_str).collect()
    }

    /// Exercise names for a user in display order
    pub fn exercise_names(&self, user: &str) -> Result<Vec<&str>> {
        let exercises = self
            .users
            .get(user)
            .ok_or_else(|| Error::UnknownUser(user.to_string()))?;
        Ok(exercises.keys().map(String::as_str).collect())
    }

    pub fn add_user(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("user name must not be empty".into()));
        }
        match self.users.entry(name.to_string()) {
            Entry::Occupied(_) => Err(Error::AlreadyExists(format!("user {:?}", name))),
            Entry::Vacant(slot) => {
                slot.insert(Default::default());
                tracing::info!("Added user {:?}", name);
                Ok(())
            }
        }
    }

    pub fn add_exercise(&mut self, user: &str, name: &str, record: ExerciseRecord) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("exercise name must not be empty".into()));
        }
        record.validate()?;

        let exercises = self
            .users
            .get_mut(user)
            .ok_or_else(|| Error::UnknownUser(user.to_string()))?;
        match exercises.entry(name.to_string()) {
            Entry::Occupied(_) => Err(Error::AlreadyExists(format!(
                "exercise {:?} for user {:?}",
                name, user
            ))),
            Entry::Vacant(slot) => {
                slot.insert(record);
                tracing::info!("Added exercise {:?} for user {:?}", name, user);
                Ok(())
            }
        }
    }

    pub fn record(&self, user: &str, exercise: &str) -> Result<&ExerciseRecord> {
        self.users
            .get(user)
            .ok_or_else(|| Error::UnknownUser(user.to_string()))?
            .get(exercise)
            .ok_or_else(|| Error::UnknownExercise {
                user: user.to_string(),
                exercise: exercise.to_string(),
            })
    }

    pub fn record_mut(&mut self, user: &str, exercise: &str) -> Result<&mut ExerciseRecord> {
        self.users
            .get_mut(user)
            .ok_or_else(|| Error::UnknownUser(user.to_string()))?
            .get_mut(exercise)
            .ok_or_else(|| Error::UnknownExercise {
                user: user.to_string(),
                exercise: exercise.to_string(),
            })
    }
}

/// In-memory roster acts as its own store
impl RecordStore for Roster {
    fn load_record(&self, user: &str, exercise: &str) -> Result<ExerciseRecord> {
        self.record(user, exercise).cloned()
    }

    fn save_record(&mut self, user: &str, exercise: &str, record: &ExerciseRecord) -> Result<()> {
        *self.record_mut(user, exercise)? = record.clone();
        Ok(())
    }
}

/// Roster store backed by a JSON file
#[derive(Clone, Debug)]
pub struct JsonRosterStore {
    path: PathBuf,
}

impl JsonRosterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the whole roster
    pub fn load(&self) -> Result<Roster> {
        Roster::load(&self.path)
    }

    /// Load the roster, modify it, and save it back under an exclusive lock
    ///
    /// The roster file is only rewritten when `f` succeeds.
    pub fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Roster) -> Result<T>,
    {
        let lock = self.acquire_lock()?;

        let result = Roster::load(&self.path).and_then(|mut roster| {
            let value = f(&mut roster)?;
            roster.save(&self.path)?;
            Ok(value)
        });

        lock.unlock()?;
        result
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "roster".into());
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn acquire_lock(&self) -> Result<File> {
        let lock_path = self.lock_path();
        if let Some(parent) = lock_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;
        file.lock_exclusive()?;
        Ok(file)
    }
}

impl RecordStore for JsonRosterStore {
    fn load_record(&self, user: &str, exercise: &str) -> Result<ExerciseRecord> {
        self.load()?.load_record(user, exercise)
    }

    fn save_record(&mut self, user: &str, exercise: &str, record: &ExerciseRecord) -> Result<()> {
        self.update(|roster| roster.save_record(user, exercise, record))
    }

    fn update_record<T, F>(&mut self, user: &str, exercise: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut ExerciseRecord) -> Result<T>,
    {
        self.update(|roster| f(roster.record_mut(user, exercise)?))
    }
}
