//! Simple file-backed [`AppPropStore`] for desktop clients and bots.

// std
use std::{
	collections::BTreeMap,
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::AppId,
	store::{AppPropStore, StoreError, StoreFuture, StoreKey},
};

/// Persists properties to a JSON file after each mutation.
///
/// The snapshot maps qualified `{app}_{name}` keys to values, so a snapshot written for
/// `App name` contains entries such as `app-name_publicKey`.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<BTreeMap<String, String>>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = if path.exists() { Self::load_snapshot(&path)? } else { BTreeMap::new() };

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	fn load_snapshot(path: &Path) -> Result<BTreeMap<String, String>, StoreError> {
		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(BTreeMap::new());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}
		Ok(())
	}

	fn persist_locked(&self, contents: &BTreeMap<String, String>) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(contents).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize store snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl AppPropStore for FileStore {
	fn get<'a>(&'a self, app: &'a AppId, name: &'a str) -> StoreFuture<'a, Option<String>> {
		Box::pin(async move {
			let key = StoreKey::new(app, name).qualified();

			Ok(self.inner.read().get(&key).cloned())
		})
	}

	fn set<'a>(&'a self, app: &'a AppId, name: &'a str, value: String) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			let key = StoreKey::new(app, name).qualified();
			let mut guard = self.inner.write();

			guard.insert(key, value);
			self.persist_locked(&guard)?;

			Ok(())
		})
	}

	fn remove<'a>(&'a self, app: &'a AppId, name: &'a str) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			let key = StoreKey::new(app, name).qualified();
			let mut guard = self.inner.write();

			if guard.remove(&key).is_some() {
				self.persist_locked(&guard)?;
			}

			Ok(())
		})
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// crates.io
	use tokio::runtime::Runtime;
	// self
	use super::*;

	fn temp_path() -> PathBuf {
		let unique = format!(
			"forum_userkey_file_store_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	#[test]
	fn save_and_reload_round_trip() {
		let path = temp_path();
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let app = AppId::from_app_name("App name").expect("App id fixture should be valid.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.set(&app, "publicKey", "PEM".into()))
			.expect("Failed to persist fixture property.");
		drop(store);

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");
		let fetched = rt
			.block_on(reopened.get(&app, "publicKey"))
			.expect("Failed to fetch fixture property from file store.")
			.expect("File store lost property after reopen.");

		assert_eq!(fetched, "PEM");

		let raw = fs::read_to_string(&path).expect("Snapshot file should be readable.");

		assert!(raw.contains("app-name_publicKey"), "Snapshot keys should be qualified.");

		rt.block_on(reopened.remove(&app, "publicKey"))
			.expect("Failed to remove fixture property.");

		let absent = rt
			.block_on(reopened.get(&app, "publicKey"))
			.expect("Fetch after removal should succeed.");

		assert!(absent.is_none());

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}
}
