//! Thread-safe in-memory [`AppPropStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::AppId,
	store::{AppPropStore, StoreError, StoreFuture, StoreKey},
};

type StoreMap = Arc<RwLock<HashMap<StoreKey, String>>>;

/// Thread-safe backend that keeps properties in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	fn get_now(map: StoreMap, app: AppId, name: String) -> Option<String> {
		map.read().get(&StoreKey { app, name }).cloned()
	}

	fn set_now(map: StoreMap, app: AppId, name: String, value: String) -> Result<(), StoreError> {
		map.write().insert(StoreKey { app, name }, value);

		Ok(())
	}

	fn remove_now(map: StoreMap, app: AppId, name: String) {
		map.write().remove(&StoreKey { app, name });
	}
}
impl AppPropStore for MemoryStore {
	fn get<'a>(&'a self, app: &'a AppId, name: &'a str) -> StoreFuture<'a, Option<String>> {
		let map = self.0.clone();
		let app = app.to_owned();
		let name = name.to_owned();

		Box::pin(async move { Ok(Self::get_now(map, app, name)) })
	}

	fn set<'a>(&'a self, app: &'a AppId, name: &'a str, value: String) -> StoreFuture<'a, ()> {
		let map = self.0.clone();
		let app = app.to_owned();
		let name = name.to_owned();

		Box::pin(async move { Self::set_now(map, app, name, value) })
	}

	fn remove<'a>(&'a self, app: &'a AppId, name: &'a str) -> StoreFuture<'a, ()> {
		let map = self.0.clone();
		let app = app.to_owned();
		let name = name.to_owned();

		Box::pin(async move {
			Self::remove_now(map, app, name);

			Ok(())
		})
	}
}
