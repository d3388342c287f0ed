//! Loaded configuration plus the store it points at.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::config::TurniConfig;
use crate::error::TurniResult;
use crate::lock::DirLock;
use crate::shift::{ShiftInfo, shift_for_with_base};
use crate::store::AssignmentStore;

#[derive(Clone)]
pub struct Turni {
    config: TurniConfig,
    config_path: PathBuf,
}

impl Turni {
    /// Load `~/.config/turni/config.toml`, creating a commented default the
    /// first time. `TURNI_*` environment variables override file values.
    pub fn load() -> TurniResult<Self> {
        let config_path = TurniConfig::config_path()?;

        if !config_path.exists() {
            TurniConfig::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> TurniResult<Self> {
        let config = TurniConfig::load_with_env(config_path)?;
        Ok(Turni {
            config,
            config_path: config_path.to_path_buf(),
        })
    }

    pub fn config(&self) -> &TurniConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Change the config file and reload.
    ///
    /// `edit` sees the file's own values, not the environment overrides,
    /// so `TURNI_*` secrets never end up written to disk. Afterwards the
    /// effective config (file plus environment) is loaded again.
    pub fn edit_config<T>(&mut self, edit: impl FnOnce(&mut TurniConfig) -> TurniResult<T>) -> TurniResult<T> {
        let _lock = DirLock::exclusive(self.config_path.with_extension("toml.lock"))?;

        let mut file_config = TurniConfig::load_from(&self.config_path)?;
        let value = edit(&mut file_config)?;
        file_config.save_to(&self.config_path)?;

        self.config = TurniConfig::load_with_env(&self.config_path)?;
        Ok(value)
    }

    pub fn data_path(&self) -> PathBuf {
        self.config.data_path()
    }

    pub fn store(&self) -> AssignmentStore {
        AssignmentStore::open(self.data_path())
    }

    /// Shift for `date` using the configured rotation base.
    pub fn shift(&self, date: NaiveDate) -> ShiftInfo {
        shift_for_with_base(date, self.config.base_date)
    }
}
