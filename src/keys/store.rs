//! Keypair persistence on top of the property store.

// self
use crate::{
	_prelude::*,
	auth::{AppId, Secret},
	keys::{Keypair, KeypairGenerator},
	store::AppPropStore,
};

pub(crate) const PROP_PUBLIC_KEY: &str = "publicKey";
pub(crate) const PROP_PRIVATE_KEY: &str = "privateKey";

/// Persists and retrieves the per-application keypair, generating one on demand.
///
/// A keypair is either fully present (both halves) or treated as absent; a partial record
/// triggers regeneration. Generation failures leave the store untouched.
#[derive(Clone)]
pub struct KeypairStore {
	store: Arc<dyn AppPropStore>,
	generator: Arc<dyn KeypairGenerator>,
}
impl KeypairStore {
	/// Creates a keypair store over the provided backends.
	pub fn new(store: Arc<dyn AppPropStore>, generator: Arc<dyn KeypairGenerator>) -> Self {
		Self { store, generator }
	}

	/// Returns the stored keypair, generating and persisting a fresh one when absent.
	pub async fn keys(&self, app: &AppId) -> Result<Keypair> {
		if let Some(keypair) = self.stored(app).await? {
			return Ok(keypair);
		}

		let keypair = self.generator.generate().await?;

		self.store.set(app, PROP_PRIVATE_KEY, keypair.private_key.expose().to_owned()).await?;
		self.store.set(app, PROP_PUBLIC_KEY, keypair.public_key.clone()).await?;

		Ok(keypair)
	}

	/// Removes both halves of the stored keypair.
	pub async fn clear(&self, app: &AppId) -> Result<()> {
		self.store.remove(app, PROP_PRIVATE_KEY).await?;
		self.store.remove(app, PROP_PUBLIC_KEY).await?;

		Ok(())
	}

	async fn stored(&self, app: &AppId) -> Result<Option<Keypair>> {
		let public_key = self.store.get(app, PROP_PUBLIC_KEY).await?;
		let private_key = self.store.get(app, PROP_PRIVATE_KEY).await?;

		match (public_key, private_key) {
			(Some(public_key), Some(private_key)) =>
				Ok(Some(Keypair { public_key, private_key: Secret::new(private_key) })),
			_ => Ok(None),
		}
	}
}
impl Debug for KeypairStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("KeypairStore(..)")
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;
	use crate::{keys::generator::GeneratorFuture, store::MemoryStore};

	struct CountingGenerator(AtomicUsize);
	impl CountingGenerator {
		fn new() -> Self {
			Self(AtomicUsize::new(0))
		}

		fn calls(&self) -> usize {
			self.0.load(Ordering::SeqCst)
		}
	}
	impl KeypairGenerator for CountingGenerator {
		fn generate(&self) -> GeneratorFuture<'_> {
			let call = self.0.fetch_add(1, Ordering::SeqCst);

			Box::pin(async move {
				Ok(Keypair {
					public_key: format!("PUBLIC-{call}"),
					private_key: Secret::new(format!("PRIVATE-{call}")),
				})
			})
		}
	}

	struct FailingGenerator;
	impl KeypairGenerator for FailingGenerator {
		fn generate(&self) -> GeneratorFuture<'_> {
			Box::pin(async {
				Err(Error::KeyGenerationFailed { reason: "entropy exhausted".into() })
			})
		}
	}

	fn app() -> AppId {
		AppId::from_app_name("App name").expect("App id fixture should be valid.")
	}

	#[tokio::test]
	async fn keys_are_generated_once_and_reused() {
		let backend = Arc::new(MemoryStore::default());
		let generator = Arc::new(CountingGenerator::new());
		let store = KeypairStore::new(backend.clone(), generator.clone());
		let app = app();
		let first = store.keys(&app).await.expect("First access should generate a keypair.");
		let second = store.keys(&app).await.expect("Second access should reuse the keypair.");

		assert_eq!(first.public_key, second.public_key);
		assert_eq!(first.private_key.expose(), second.private_key.expose());
		assert_eq!(generator.calls(), 1);
		assert_eq!(
			backend.get(&app, "publicKey").await.expect("Backend get should succeed."),
			Some("PUBLIC-0".into())
		);
	}

	#[tokio::test]
	async fn partial_state_triggers_regeneration() {
		let backend = Arc::new(MemoryStore::default());
		let generator = Arc::new(CountingGenerator::new());
		let store = KeypairStore::new(backend.clone(), generator.clone());
		let app = app();

		backend
			.set(&app, "publicKey", "ORPHANED".into())
			.await
			.expect("Seeding the orphaned half should succeed.");

		let keypair = store.keys(&app).await.expect("Access should regenerate the keypair.");

		assert_eq!(keypair.public_key, "PUBLIC-0");
		assert_eq!(generator.calls(), 1);
	}

	#[tokio::test]
	async fn clearing_forces_a_fresh_pair() {
		let backend = Arc::new(MemoryStore::default());
		let generator = Arc::new(CountingGenerator::new());
		let store = KeypairStore::new(backend, generator.clone());
		let app = app();
		let first = store.keys(&app).await.expect("First access should generate a keypair.");

		store.clear(&app).await.expect("Clearing the keypair should succeed.");

		let second = store.keys(&app).await.expect("Access after clearing should regenerate.");

		assert_ne!(first.public_key, second.public_key);
		assert_eq!(generator.calls(), 2);
	}

	#[tokio::test]
	async fn generation_failure_writes_nothing() {
		let backend = Arc::new(MemoryStore::default());
		let store = KeypairStore::new(backend.clone(), Arc::new(FailingGenerator));
		let app = app();
		let err = store.keys(&app).await.expect_err("Failing generator should surface an error.");

		assert!(matches!(err, Error::KeyGenerationFailed { .. }));
		assert_eq!(
			backend.get(&app, "publicKey").await.expect("Backend get should succeed."),
			None
		);
		assert_eq!(
			backend.get(&app, "privateKey").await.expect("Backend get should succeed."),
			None
		);
	}
}
