//! Local persistence mirror.
//!
//! In local mode every collection mutation is followed by a full-collection
//! flush to a JSON file under the data directory, keyed as
//! `<namespace>-<kind>.json`. On session start the mirror loads the
//! persisted blob back, substituting the kind's seed set when nothing was
//! persisted or the blob does not parse. The mirror is never consulted in
//! connected mode.

use crate::entities::Entity;
use crate::errors::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

pub struct LocalMirror {
    dir: PathBuf,
    namespace: String,
}

impl LocalMirror {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, namespace: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            namespace: namespace.into(),
        }
    }

    fn path_for<E: Entity>(&self) -> PathBuf {
        self.dir
            .join(format!("{}-{}.json", self.namespace, E::KIND.table()))
    }

    /// Serializes the full collection for the entity's kind.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created or the file
    /// cannot be written; callers log and carry on, they never abort.
    #[instrument(skip(self, items), fields(kind = %E::KIND, count = items.len()))]
    pub fn flush<E: Entity>(&self, items: &[E]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let blob = serde_json::to_string_pretty(items)?;
        fs::write(self.path_for::<E>(), blob)?;
        debug!("flushed collection");
        Ok(())
    }

    /// Loads the persisted collection for the entity's kind, or its seed
    /// set when nothing usable was persisted. Parse failures are logged and
    /// silently replaced by the seed; load never fails.
    #[instrument(skip(self), fields(kind = %E::KIND))]
    pub fn load<E: Entity>(&self) -> Vec<E> {
        let path = self.path_for::<E>();
        let Ok(blob) = fs::read_to_string(&path) else {
            debug!(path = %path.display(), "no persisted data, seeding defaults");
            return E::seed();
        };
        match serde_json::from_str(&blob) {
            Ok(items) => items,
            Err(error) => {
                warn!(path = %path.display(), %error, "unparseable persisted data, seeding defaults");
                E::seed()
            }
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Product, User};
    use crate::test_utils::init_test_tracing;

    fn mirror() -> (LocalMirror, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        (LocalMirror::new(dir.path(), "shoplog"), dir)
    }

    #[test]
    fn flush_then_load_round_trips() {
        init_test_tracing();
        let (mirror, _dir) = mirror();

        let users = vec![User::new("Jan Janssen"), User::new("Piet")];
        mirror.flush(&users).unwrap();

        let loaded: Vec<User> = mirror.load();
        assert_eq!(loaded, users);
    }

    #[test]
    fn load_without_persisted_data_seeds_defaults() {
        init_test_tracing();
        let (mirror, _dir) = mirror();

        let loaded: Vec<Product> = mirror.load();
        assert_eq!(loaded, Product::seed());
        assert!(!loaded.is_empty());
    }

    #[test]
    fn load_with_corrupt_data_seeds_defaults() {
        init_test_tracing();
        let (mirror, dir) = mirror();

        fs::create_dir_all(dir.path()).unwrap();
        fs::write(dir.path().join("shoplog-users.json"), "{not json").unwrap();

        let loaded: Vec<User> = mirror.load();
        assert_eq!(loaded, User::seed());
    }

    #[test]
    fn files_are_keyed_by_namespace_and_kind() {
        init_test_tracing();
        let (mirror, dir) = mirror();

        mirror.flush(&[User::new("Jan Janssen")]).unwrap();
        assert!(dir.path().join("shoplog-users.json").exists());
    }

    #[test]
    fn collections_do_not_interfere() {
        init_test_tracing();
        let (mirror, _dir) = mirror();

        mirror.flush(&[User::new("Jan Janssen")]).unwrap();
        mirror.flush(&Product::seed()).unwrap();

        let users: Vec<User> = mirror.load();
        let products: Vec<Product> = mirror.load();
        assert_eq!(users.len(), 1);
        assert_eq!(products, Product::seed());
    }
}
