// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey, pkcs1::DecodeRsaPrivateKey};
// self
use crate::_prelude::*;

/// Decrypted authorization payload returned by the remote service.
///
/// This is the only wire format decoded beyond the outer authorization URL.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakePayload {
	/// Bearer user API key.
	pub key: String,
	/// Nonce echoed from the originating request.
	pub nonce: String,
	/// User API version the remote service speaks.
	pub api: u32,
}

/// Failures while decoding, decrypting, or parsing the returned payload.
#[derive(Debug, ThisError)]
pub enum PayloadError {
	/// The delivered string is not valid base64.
	#[error("Payload is not valid base64: {0}.")]
	Decode(#[from] base64::DecodeError),
	/// The stored private key PEM could not be parsed.
	#[error("Stored private key could not be parsed: {0}.")]
	Key(#[from] rsa::pkcs1::Error),
	/// The ciphertext does not decrypt under the stored private key.
	#[error("Payload could not be decrypted with the stored private key: {0}.")]
	Decrypt(#[from] rsa::Error),
	/// The decrypted plaintext is not the expected JSON object.
	#[error("Decrypted payload is not valid JSON: {0}.")]
	Parse(#[from] serde_path_to_error::Error<serde_json::Error>),
}

/// Decrypts a delivered payload string with the application's private key.
pub(super) fn decrypt_payload(
	private_key_pem: &str,
	raw: &str,
) -> Result<HandshakePayload, PayloadError> {
	// Some transports deliver base64 with embedded line breaks.
	let compact: String = raw.split_ascii_whitespace().collect();
	let ciphertext = STANDARD.decode(compact)?;
	let private_key = RsaPrivateKey::from_pkcs1_pem(private_key_pem)?;
	let plaintext = private_key.decrypt(Pkcs1v15Encrypt, &ciphertext)?;
	let mut deserializer = serde_json::Deserializer::from_slice(&plaintext);

	Ok(serde_path_to_error::deserialize(&mut deserializer)?)
}
