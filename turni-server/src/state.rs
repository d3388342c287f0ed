use std::path::PathBuf;

use turni_core::TurniResult;
use turni_core::turni::Turni;

/// Shared application state.
///
/// Config and assignments are reloaded on every request so edits made with
/// the CLI show up without a restart.
#[derive(Clone)]
pub struct AppState {
    config_path: Option<PathBuf>,
}

impl AppState {
    pub fn new(turni: &Turni) -> Self {
        if turni.config().users.is_empty() {
            tracing::warn!(
                config = %turni.config_path().display(),
                "no [[users]] configured, the API is read-only"
            );
        }
        AppState { config_path: None }
    }

    /// State bound to a specific config file instead of the user's default.
    #[cfg(test)]
    pub fn with_config(path: impl Into<PathBuf>) -> Self {
        AppState {
            config_path: Some(path.into()),
        }
    }

    pub fn turni(&self) -> TurniResult<Turni> {
        match &self.config_path {
            Some(path) => Turni::load_from(path),
            None => Turni::load(),
        }
    }
}
