//! Persistence contract for per-application properties, plus built-in backends.
//!
//! The handshake persists small string properties (key halves, nonce, client id, credential)
//! scoped by [`AppId`]. Backends only promise per-key atomicity; the handshake layers its own
//! ordering on top so observers never see a partially written keypair or credential.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::AppId};

/// Future alias returned by [`AppPropStore`] implementations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for per-application properties.
///
/// Implementations must be durable across restarts for the handshake's replay protection to
/// hold; the in-memory backend is intended for tests and demos.
pub trait AppPropStore
where
	Self: Send + Sync,
{
	/// Fetches a property value, if present.
	fn get<'a>(&'a self, app: &'a AppId, name: &'a str) -> StoreFuture<'a, Option<String>>;

	/// Persists or replaces a property value.
	fn set<'a>(&'a self, app: &'a AppId, name: &'a str, value: String) -> StoreFuture<'a, ()>;

	/// Removes a property; absent keys are not an error.
	fn remove<'a>(&'a self, app: &'a AppId, name: &'a str) -> StoreFuture<'a, ()>;
}

/// Error type produced by [`AppPropStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Unique key identifying a stored property.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreKey {
	/// Application scope component.
	pub app: AppId,
	/// Property name component.
	pub name: String,
}
impl StoreKey {
	/// Builds a key for the provided application scope and property name.
	pub fn new(app: &AppId, name: &str) -> Self {
		Self { app: app.clone(), name: name.to_owned() }
	}

	/// Flattened `{app}_{name}` form used by file snapshots and external stores.
	pub fn qualified(&self) -> String {
		format!("{}_{}", self.app, self.name)
	}
}
impl Display for StoreKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.qualified())
	}
}
