//! Assignments on disk: `<data_dir>/assignments.json`.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tempfile::NamedTempFile;

use crate::assignment::{Assignments, DayAssignments};
use crate::error::{TurniError, TurniResult};
use crate::lock::DirLock;

const ASSIGNMENTS_FILE: &str = "assignments.json";
const LOCK_FILE: &str = "assignments.lock";

pub struct AssignmentStore {
    dir: PathBuf,
}

impl AssignmentStore {
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        AssignmentStore { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(ASSIGNMENTS_FILE)
    }

    /// Read every assignment. A missing file means nothing is assigned yet.
    pub fn load(&self) -> TurniResult<Assignments> {
        let path = self.path();
        if !path.exists() {
            return Ok(Assignments::new());
        }

        let content = std::fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(Assignments::new());
        }

        serde_json::from_str(&content)
            .map_err(|e| TurniError::Store(format!("Could not parse {}: {e}", path.display())))
    }

    /// Replace everything on `date` with `day` and persist. Returns the
    /// updated set together with what the date held before.
    ///
    /// The read-modify-write holds the store lock, so concurrent writers
    /// to different dates don't drop each other's days.
    pub fn save_day(&self, date: NaiveDate, day: DayAssignments) -> TurniResult<(Assignments, DayAssignments)> {
        self.update_day(date, |stored| {
            *stored = day;
            Ok(())
        })
    }

    /// Edit one date in place under the store lock. Returns the updated set
    /// and what the date held before. Nothing is written if `edit` fails.
    pub fn update_day(
        &self,
        date: NaiveDate,
        edit: impl FnOnce(&mut DayAssignments) -> TurniResult<()>,
    ) -> TurniResult<(Assignments, DayAssignments)> {
        let _lock = self.lock()?;
        let mut assignments = self.load()?;
        let mut day = assignments.day(date).cloned().unwrap_or_default();
        edit(&mut day)?;
        let previous = assignments.replace_day(date, day);
        self.write(&assignments)?;
        Ok((assignments, previous))
    }

    /// Apply imported days on top of the stored ones and persist.
    pub fn import(&self, imported: Assignments) -> TurniResult<Assignments> {
        let _lock = self.lock()?;
        let mut assignments = self.load()?;
        assignments.merge(imported);
        self.write(&assignments)?;
        Ok(assignments)
    }

    fn lock(&self) -> TurniResult<DirLock> {
        DirLock::exclusive(self.dir.join(LOCK_FILE))
    }

    /// Write the whole set through a uniquely named temp file, so readers
    /// never see half a file. Callers hold the lock.
    fn write(&self, assignments: &Assignments) -> TurniResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path();

        let content = serde_json::to_string_pretty(assignments)?;
        let mut temp = NamedTempFile::new_in(&self.dir)?;
        temp.write_all(content.as_bytes())?;
        temp.persist(&path)
            .map_err(|e| TurniError::Store(format!("Could not replace {}: {}", path.display(), e.error)))?;

        tracing::debug!(days = assignments.len(), path = %path.display(), "saved assignments");
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
