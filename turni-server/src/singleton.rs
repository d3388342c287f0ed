//! One turni-server per data directory.

use anyhow::{Result, bail};
use turni_core::lock::DirLock;
use turni_core::turni::Turni;

const LOCK_FILE: &str = "server.lock";

/// Lock `<data_dir>/server.lock` for the life of the process. Servers
/// pointed at different data directories don't block each other.
pub fn acquire_lock(turni: &Turni) -> Result<DirLock> {
    let path = turni.data_path().join(LOCK_FILE);

    match DirLock::try_exclusive(&path)? {
        Some(lock) => {
            tracing::debug!(path = %lock.path().display(), "acquired server lock");
            Ok(lock)
        }
        None => bail!(
            "turni-server is already running for this data directory (lock held on {})",
            path.display()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turni_with_data(dir: &std::path::Path, name: &str) -> Turni {
        let config_path = dir.join(format!("{name}.toml"));
        let data_dir = dir.join(name);
        std::fs::write(&config_path, format!("data_dir = \"{}\"\n", data_dir.display())).unwrap();
        Turni::load_from(&config_path).unwrap()
    }

    #[test]
    fn second_server_on_same_data_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let turni = turni_with_data(dir.path(), "a");

        let held = acquire_lock(&turni).unwrap();
        let err = acquire_lock(&turni).err().unwrap();
        assert!(err.to_string().contains("already running"));

        // A different data dir is unaffected
        let other = turni_with_data(dir.path(), "b");
        assert!(acquire_lock(&other).is_ok());

        drop(held);
        assert!(acquire_lock(&turni).is_ok());
    }
}
