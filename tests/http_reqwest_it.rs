#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use forum_userkey::{
	_preludet::*,
	flows::UserKeyClient,
	http::{ForumHttpClient, HttpClientError, ReqwestForumClient},
	store::MemoryStore,
};

fn forum_client(server: &MockServer) -> ReqwestForumClient {
	let base = Url::parse(&server.base_url()).expect("Mock server URL should parse.");

	ReqwestForumClient::new(base).expect("Forum client should build.")
}

#[tokio::test]
async fn current_session_user_sends_the_credential_headers() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/session/current.json")
				.header("User-Api-Key", "abc123")
				.header("X-Requested-With", "XMLHttpRequest");
			then.status(200).json_body(json!({
				"current_user": {
					"username": "alice",
					"name": "Alice",
					"can_create_topic": true,
					"avatar_template": "/user_avatar/alice/{size}/42.png"
				}
			}));
		})
		.await;
	let client = forum_client(&server);
	let user = client
		.current_session_user("abc123")
		.await
		.expect("Profile fetch should succeed against the mock.");

	mock.assert_async().await;

	assert_eq!(user.username, "alice");
	assert_eq!(user.display_name(), "Alice");
	assert!(!user.is_silenced());
}

#[tokio::test]
async fn error_statuses_surface_with_their_code() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/session/current.json");
			then.status(403).body("forbidden");
		})
		.await;

	let client = forum_client(&server);
	let err = client
		.current_session_user("abc123")
		.await
		.expect_err("A 403 should surface as a status error.");

	assert!(matches!(err, HttpClientError::Status { status: 403, .. }));
}

#[tokio::test]
async fn malformed_bodies_surface_as_decode_errors() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/session/current.json");
			then.status(200).body("{\"unexpected\":true}");
		})
		.await;

	let client = forum_client(&server);
	let err = client
		.current_session_user("abc123")
		.await
		.expect_err("A body without the envelope should fail to decode.");

	assert!(matches!(err, HttpClientError::Decode { .. }));
}

#[tokio::test]
async fn revoke_posts_to_the_revocation_endpoint() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/user-api-key/revoke").header("User-Api-Key", "abc123");
			then.status(200).json_body(json!({ "success": "OK" }));
		})
		.await;
	let client = forum_client(&server);

	client.revoke_key("abc123").await.expect("Revocation should succeed against the mock.");
	mock.assert_async().await;
}

#[tokio::test]
async fn full_login_and_logout_against_a_mock_forum() {
	let server = MockServer::start_async().await;
	let session_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/session/current.json").header("User-Api-Key", "abc123");
			then.status(200)
				.json_body(json!({ "current_user": { "username": "alice", "can_create_topic": true } }));
		})
		.await;
	let revoke_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/user-api-key/revoke").header("User-Api-Key", "abc123");
			then.status(200).json_body(json!({ "success": "OK" }));
		})
		.await;
	let store = Arc::new(MemoryStore::default());
	let popup = Arc::new(ScriptedPopup::new(|url| {
		let public_key =
			query_param(url, "public_key").expect("Authorize URL should carry the public key.");
		let nonce = query_param(url, "nonce").expect("Authorize URL should carry the nonce.");

		Ok(encrypt_handshake_payload(&public_key, "abc123", &nonce, 4))
	}));
	let client = UserKeyClient::new(store.clone(), test_config(&server.base_url()), popup)
		.expect("Client should build against the mock forum.");

	seed_keypair(store.as_ref(), client.app_id()).await;
	client.login().await.expect("Login should succeed against the mock forum.");

	assert!(client.is_logged_in().await.expect("Liveness check should succeed."));
	assert!(session_mock.hits_async().await >= 2, "Login and liveness both refresh the profile.");

	client.logout().await.expect("Logout should succeed against the mock forum.");
	revoke_mock.assert_async().await;

	assert!(client.credential().await.expect("Credential lookup should succeed.").is_none());
	assert!(!client.is_logged_in().await.expect("Liveness check should succeed."));
}
