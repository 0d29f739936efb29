//! Client side of the forum user API key handshake—local RSA keypair lifecycle, authenticated
//! authorization requests, encrypted payload validation, and credential lifecycle management.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod flows;
pub mod http;
pub mod keys;
pub mod obs;
pub mod popup;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and fixtures for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::sync::{
		OnceLock,
		atomic::{AtomicUsize, Ordering},
	};
	// crates.io
	use base64::{Engine as _, engine::general_purpose::STANDARD};
	use rand_core::OsRng;
	use rsa::{Pkcs1v15Encrypt, RsaPublicKey, pkcs8::DecodePublicKey};
	use serde_json::json;
	// self
	use crate::{
		auth::AppId,
		config::ClientConfig,
		events::{AuthEvent, EventSink},
		keys::{
			Keypair, KeypairGenerator, RsaKeypairGenerator,
			store::{PROP_PRIVATE_KEY, PROP_PUBLIC_KEY},
		},
		popup::{PopupChannel, PopupError, PopupFuture, PopupOptions},
		store::AppPropStore,
	};

	/// Builds the client configuration used across integration tests.
	pub fn test_config(api_base_url: &str) -> ClientConfig {
		ClientConfig::builder("App name")
			.api_base_url(api_base_url)
			.auth_redirect("https://app.example.com/callback")
			.scopes(["write"])
			.build()
			.expect("Test configuration should build successfully.")
	}

	/// Returns a process-wide cached keypair so tests skip repeated RSA generation.
	pub fn test_keypair() -> Keypair {
		static PAIR: OnceLock<Keypair> = OnceLock::new();

		PAIR.get_or_init(|| {
			futures::executor::block_on(RsaKeypairGenerator::new(1024).generate())
				.expect("Test keypair should generate successfully.")
		})
		.clone()
	}

	/// Seeds both halves of the cached test keypair for the provided application.
	pub async fn seed_keypair(store: &dyn AppPropStore, app: &AppId) -> Keypair {
		let keypair = test_keypair();

		store
			.set(app, PROP_PRIVATE_KEY, keypair.private_key.expose().to_owned())
			.await
			.expect("Seeding the private key should succeed.");
		store
			.set(app, PROP_PUBLIC_KEY, keypair.public_key.clone())
			.await
			.expect("Seeding the public key should succeed.");

		keypair
	}

	/// Encrypts a handshake payload for the provided SPKI public key, returning the base64
	/// ciphertext a popup channel would deliver.
	pub fn encrypt_handshake_payload(
		public_key_pem: &str,
		key: &str,
		nonce: &str,
		api: u32,
	) -> String {
		let public_key = RsaPublicKey::from_public_key_pem(public_key_pem)
			.expect("Test public key should parse successfully.");
		let plaintext = json!({ "key": key, "nonce": nonce, "api": api }).to_string();
		let ciphertext = public_key
			.encrypt(&mut OsRng, Pkcs1v15Encrypt, plaintext.as_bytes())
			.expect("Test payload should encrypt successfully.");

		STANDARD.encode(ciphertext)
	}

	/// Returns the percent-decoded value of a query parameter from an authorization URL.
	pub fn query_param(url: &Url, name: &str) -> Option<String> {
		url.query_pairs().find(|(k, _)| k == name).map(|(_, v)| v.into_owned())
	}

	/// Popup channel fake that evaluates a script against the authorization URL and counts how
	/// many windows were opened.
	pub struct ScriptedPopup {
		script: Box<dyn Fn(&Url) -> Result<String, PopupError> + Send + Sync>,
		opened: AtomicUsize,
	}
	impl ScriptedPopup {
		/// Creates a popup fake that resolves each open call through `script`.
		pub fn new(
			script: impl Fn(&Url) -> Result<String, PopupError> + Send + Sync + 'static,
		) -> Self {
			Self { script: Box::new(script), opened: AtomicUsize::new(0) }
		}

		/// Number of popup windows opened so far.
		pub fn opened(&self) -> usize {
			self.opened.load(Ordering::SeqCst)
		}
	}
	impl PopupChannel for ScriptedPopup {
		fn open<'a>(&'a self, url: &'a Url, _options: &'a PopupOptions) -> PopupFuture<'a> {
			self.opened.fetch_add(1, Ordering::SeqCst);

			let result = (self.script)(url);

			Box::pin(async move { result })
		}
	}

	/// Event sink fake that records every published lifecycle event.
	#[derive(Debug, Default)]
	pub struct RecordingSink(Mutex<Vec<AuthEvent>>);
	impl RecordingSink {
		/// Returns the events recorded so far, in publication order.
		pub fn events(&self) -> Vec<AuthEvent> {
			self.0.lock().clone()
		}
	}
	impl EventSink for RecordingSink {
		fn publish(&self, event: AuthEvent) {
			self.0.lock().push(event);
		}
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use rsa;
pub use url;
#[cfg(test)] use httpmock as _;
