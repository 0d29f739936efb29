// std
use std::{env, path::PathBuf, process};
// self
use forum_userkey::{
	_preludet::*,
	auth::AppId,
	store::{AppPropStore, FileStore, MemoryStore},
};

fn app() -> AppId {
	AppId::from_app_name("App name").expect("App id fixture should be valid.")
}

fn other_app() -> AppId {
	AppId::from_app_name("Other app").expect("Second app id fixture should be valid.")
}

#[tokio::test]
async fn memory_store_round_trips_properties() {
	let store = MemoryStore::default();
	let app = app();

	assert_eq!(store.get(&app, "clientId").await.expect("Get should succeed."), None);

	store
		.set(&app, "clientId", "cafe".into())
		.await
		.expect("Setting a property should succeed.");

	assert_eq!(
		store.get(&app, "clientId").await.expect("Get should succeed."),
		Some("cafe".into())
	);

	store
		.set(&app, "clientId", "beef".into())
		.await
		.expect("Overwriting a property should succeed.");

	assert_eq!(
		store.get(&app, "clientId").await.expect("Get should succeed."),
		Some("beef".into())
	);

	store.remove(&app, "clientId").await.expect("Removing a property should succeed.");

	assert_eq!(store.get(&app, "clientId").await.expect("Get should succeed."), None);
}

#[tokio::test]
async fn removing_an_absent_property_is_not_an_error() {
	let store = MemoryStore::default();

	store.remove(&app(), "nonce").await.expect("Removal of an absent key should succeed.");
}

#[tokio::test]
async fn applications_are_isolated_from_each_other() {
	let store = MemoryStore::default();

	store
		.set(&app(), "userApiKey", "alpha".into())
		.await
		.expect("Setting the first app's property should succeed.");
	store
		.set(&other_app(), "userApiKey", "beta".into())
		.await
		.expect("Setting the second app's property should succeed.");
	store.remove(&app(), "userApiKey").await.expect("Removing the first app's key should succeed.");

	assert_eq!(
		store.get(&other_app(), "userApiKey").await.expect("Get should succeed."),
		Some("beta".into()),
		"Clearing one application must not touch another."
	);
}

fn temp_path() -> PathBuf {
	let unique = format!(
		"forum_userkey_store_it_{}_{}.json",
		process::id(),
		OffsetDateTime::now_utc().unix_timestamp_nanos(),
	);

	env::temp_dir().join(unique)
}

#[tokio::test]
async fn file_store_survives_a_reopen() {
	let path = temp_path();
	let app = app();

	{
		let store = FileStore::open(&path).expect("File store should open.");

		store
			.set(&app, "clientId", "cafe".into())
			.await
			.expect("Setting a property should succeed.");
	}

	let reopened = FileStore::open(&path).expect("File store should reopen.");

	assert_eq!(
		reopened.get(&app, "clientId").await.expect("Get should succeed."),
		Some("cafe".into())
	);

	std::fs::remove_file(&path).expect("Temporary snapshot should be removable.");
}
