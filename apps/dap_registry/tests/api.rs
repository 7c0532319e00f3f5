use axum::{
	body::Body,
	http::{Request, StatusCode},
	Router,
};
use dap::{jws, messages::RegistrationResponse, DapRegistration};
use dap_registry::{db::MigratedDbPool, registry_did::RegistryDidProvider, RouterConfig};
use did_simple::{crypto::rand_core::OsRng, document::DidDocument, BearerDid};
use http_body_util::BodyExt as _;
use serde_json::{json, Value};
use tower::ServiceExt as _;

struct TestApp {
	router: Router,
	registry_did: BearerDid,
}

async fn app_with(
	registration_enabled: bool,
	registry_did: Option<BearerDid>,
) -> TestApp {
	let provided = registry_did
		.clone()
		.unwrap_or_else(|| BearerDid::generate(&mut OsRng));
	let router = RouterConfig {
		db_pool: MigratedDbPool::in_memory().await.unwrap(),
		registry_did: match registry_did {
			Some(did) => RegistryDidProvider::from_bearer(did),
			None => RegistryDidProvider::from_config(None),
		},
		registration_enabled,
		supported_did_methods: vec!["jwk".to_owned()],
	}
	.build()
	.unwrap();
	TestApp {
		router,
		registry_did: provided,
	}
}

async fn app() -> TestApp {
	app_with(true, Some(BearerDid::generate(&mut OsRng))).await
}

impl TestApp {
	async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
		let response = self.router.clone().oneshot(request).await.unwrap();
		let status = response.status();
		let body = response.into_body().collect().await.unwrap().to_bytes();
		let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
		(status, body)
	}

	async fn get(&self, uri: &str) -> (StatusCode, Value) {
		self.send(Request::get(uri).body(Body::empty()).unwrap())
			.await
	}

	async fn post_raw(&self, body: impl Into<Body>) -> (StatusCode, Value) {
		let request = Request::post("/daps")
			.header("content-type", "application/json")
			.body(body.into())
			.unwrap();
		self.send(request).await
	}

	async fn register(&self, registration: &DapRegistration) -> (StatusCode, Value) {
		self.post_raw(serde_json::to_vec(registration).unwrap()).await
	}
}

fn signed(handle: &str, domain: &str) -> (DapRegistration, BearerDid) {
	let did = BearerDid::generate(&mut OsRng);
	let mut registration =
		DapRegistration::create(handle, did.uri().as_str(), domain).unwrap();
	registration.sign(&did);
	(registration, did)
}

fn error_message(body: &Value) -> &str {
	body["error"]["message"].as_str().unwrap()
}

#[tokio::test]
async fn test_register_returns_counter_signed_proof() {
	let app = app().await;
	let (registration, _) = signed("alice", "example.com");

	let (status, body) = app.register(&registration).await;
	assert_eq!(status, StatusCode::CREATED);
	let RegistrationResponse { proof } = serde_json::from_value(body).unwrap();
	assert_eq!(proof.id, registration.id);
	assert_eq!(proof.handle, "alice");
	assert_eq!(proof.domain, "example.com");
	assert_eq!(proof.did, registration.did);

	// The proof verifies against the DID that the registry publishes.
	let (status, document) = app.get("/.well-known/did.json").await;
	assert_eq!(status, StatusCode::OK);
	let document: DidDocument = serde_json::from_value(document).unwrap();
	let signer = jws::verify(
		proof.signature.as_deref().unwrap(),
		Some(&proof.compute_digest()),
	)
	.unwrap();
	assert_eq!(signer.as_str(), document.id);
	assert_eq!(signer, *app.registry_did.uri());
}

#[tokio::test]
async fn test_duplicate_id_conflicts() {
	let app = app().await;
	let (first, _) = signed("alice", "example.com");
	assert_eq!(app.register(&first).await.0, StatusCode::CREATED);

	// Same id, but a different did and handle.
	let did = BearerDid::generate(&mut OsRng);
	let mut second =
		DapRegistration::create("bob", did.uri().as_str(), "example.com").unwrap();
	second.id = first.id;
	second.sign(&did);

	let (status, body) = app.register(&second).await;
	assert_eq!(status, StatusCode::CONFLICT);
	assert_eq!(error_message(&body), "DAP with the same ID already exists");
}

#[tokio::test]
async fn test_duplicate_handle_and_did_conflict() {
	let app = app().await;
	let (first, did) = signed("alice", "example.com");
	assert_eq!(app.register(&first).await.0, StatusCode::CREATED);

	let (same_handle, _) = signed("alice", "example.com");
	let (status, body) = app.register(&same_handle).await;
	assert_eq!(status, StatusCode::CONFLICT);
	assert_eq!(error_message(&body), "DAP with the same handle already exists");

	let mut same_did =
		DapRegistration::create("alice2", did.uri().as_str(), "example.com").unwrap();
	same_did.sign(&did);
	let (status, body) = app.register(&same_did).await;
	assert_eq!(status, StatusCode::CONFLICT);
	assert_eq!(error_message(&body), "DAP with the same DID already exists");
}

#[tokio::test]
async fn test_signer_mismatch_is_unauthorized() {
	let app = app().await;
	let alice = BearerDid::generate(&mut OsRng);
	let mallory = BearerDid::generate(&mut OsRng);
	let mut registration =
		DapRegistration::create("alice", alice.uri().as_str(), "example.com").unwrap();
	registration.sign(&mallory);

	let (status, body) = app.register(&registration).await;
	assert_eq!(status, StatusCode::UNAUTHORIZED);
	assert_eq!(
		error_message(&body),
		"Invalid DAP Registration: Expected registration to be signed by the specified DID"
	);
	assert_eq!(app.get("/daps/alice").await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_tampered_registration_is_unauthorized() {
	let app = app().await;
	let (mut registration, _) = signed("alice", "example.com");
	registration.domain = "evil.com".into();
	assert_eq!(app.register(&registration).await.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_requests() {
	let app = app().await;
	let (registration, _) = signed("alice", "example.com");
	let mut bad_id = serde_json::to_value(&registration).unwrap();
	bad_id["id"] = json!("reg_1234567890abcdef");
	let mut missing_signature = serde_json::to_value(&registration).unwrap();
	missing_signature.as_object_mut().unwrap().remove("signature");

	for body in [
		b"not json".to_vec(),
		b"{}".to_vec(),
		serde_json::to_vec(&bad_id).unwrap(),
		serde_json::to_vec(&missing_signature).unwrap(),
	] {
		let (status, response) = app.post_raw(body).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert!(!error_message(&response).is_empty());
	}
}

#[tokio::test]
async fn test_lookup() {
	let app = app().await;
	let (status, body) = app.get("/daps/alice").await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body, json!({ "error": { "message": "Handle not found" } }));

	let (registration, _) = signed("alice", "example.com");
	assert_eq!(app.register(&registration).await.0, StatusCode::CREATED);

	let (status, body) = app.get("/daps/alice").await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(
		body,
		json!({
			"did": registration.did,
			"proof": serde_json::to_value(&registration).unwrap(),
		})
	);
}

#[tokio::test]
async fn test_registration_disabled() {
	let app = app_with(false, Some(BearerDid::generate(&mut OsRng))).await;
	let (registration, _) = signed("alice", "example.com");

	let (status, body) = app.register(&registration).await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(error_message(&body), "Registration is disabled");

	let (status, body) = app.get("/metadata").await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, json!({ "enabled": false, "supportedDidMethods": ["jwk"] }));
}

#[tokio::test]
async fn test_metadata() {
	let app = app().await;
	let (status, body) = app.get("/metadata").await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, json!({ "enabled": true, "supportedDidMethods": ["jwk"] }));
}

#[tokio::test]
async fn test_missing_registry_did() {
	let app = app_with(true, None).await;
	let message = "Failed to access portable DID from runtime configuration";

	let (status, body) = app.get("/.well-known/did.json").await;
	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(error_message(&body), message);

	let (registration, _) = signed("alice", "example.com");
	let (status, body) = app.register(&registration).await;
	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(error_message(&body), message);
	// Nothing was stored, since the registry could not have counter-signed it.
	assert_eq!(app.get("/daps/alice").await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_root() {
	let app = app().await;
	let response = app
		.router
		.clone()
		.oneshot(Request::get("/").body(Body::empty()).unwrap())
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::OK);
}

async fn build_with_methods(methods: &[&str]) -> color_eyre::Result<Router> {
	RouterConfig {
		db_pool: MigratedDbPool::in_memory().await.unwrap(),
		registry_did: RegistryDidProvider::from_config(None),
		registration_enabled: true,
		supported_did_methods: methods.iter().map(|m| m.to_string()).collect(),
	}
	.build()
}

#[tokio::test]
async fn test_rejects_unknown_did_methods() {
	assert!(build_with_methods(&["jwk", "plc"]).await.is_err());
}

#[tokio::test]
async fn test_rejects_unverifiable_did_methods() {
	// Known methods that registrations could not be verified with.
	for method in ["web", "key", "dht"] {
		let err = build_with_methods(&["jwk", method]).await.unwrap_err();
		assert!(err.to_string().contains(method), "{err}");
	}
	assert!(build_with_methods(&["jwk"]).await.is_ok());
}

#[tokio::test]
async fn test_storage_failures_are_internal_errors() {
	let db_pool = MigratedDbPool::in_memory().await.unwrap();
	let registry_did = BearerDid::generate(&mut OsRng);
	let router = RouterConfig {
		db_pool: db_pool.clone(),
		registry_did: RegistryDidProvider::from_bearer(registry_did.clone()),
		registration_enabled: true,
		supported_did_methods: vec!["jwk".to_owned()],
	}
	.build()
	.unwrap();
	let app = TestApp {
		router,
		registry_did,
	};
	db_pool.close().await;

	// The underlying sqlx error stays out of the response body.
	let (status, body) = app.get("/daps/alice").await;
	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(
		body,
		json!({ "error": { "message": "Failed to process request" } })
	);

	let (registration, _) = signed("alice", "example.com");
	let (status, body) = app.register(&registration).await;
	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(
		body,
		json!({ "error": { "message": "Registration Request Failed" } })
	);
}
