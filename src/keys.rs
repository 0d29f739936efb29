//! Per-application asymmetric keypair lifecycle: generation and persistence.

pub mod generator;
pub mod store;

pub use generator::{KeypairGenerator, RsaKeypairGenerator};
pub use store::KeypairStore;

// self
use crate::{_prelude::*, auth::Secret};

/// Encoded asymmetric keypair scoped to one application.
///
/// The public half is an SPKI PEM (`BEGIN PUBLIC KEY`) the remote service encrypts the
/// handshake payload against; the private half is a PKCS#1 PEM that never leaves the client.
#[derive(Clone)]
pub struct Keypair {
	/// PEM-encoded public key shipped inside the authorization URL.
	pub public_key: String,
	/// PEM-encoded private key used to decrypt the returned payload.
	pub private_key: Secret,
}
impl Debug for Keypair {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Keypair")
			.field("public_key", &self.public_key)
			.field("private_key", &"<redacted>")
			.finish()
	}
}
