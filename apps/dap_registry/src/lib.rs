pub mod db;
pub mod error;
pub mod registry;
pub mod registry_did;

mod routes;

use std::{str::FromStr, sync::Arc};

use axum::routing::{get, post};
use color_eyre::eyre::{ensure, Context as _};
use dap::messages::RegistrationMetadata;
use did_simple::DidMethod;
use tower_http::trace::TraceLayer;

use crate::{
	db::MigratedDbPool, registry::Registry, registry_did::RegistryDidProvider,
	routes::RouterState,
};

/// Main router of API
#[derive(Debug)]
pub struct RouterConfig {
	pub db_pool: MigratedDbPool,
	pub registry_did: RegistryDidProvider,
	/// When false, `POST /daps` is refused.
	pub registration_enabled: bool,
	/// Advertised in `/metadata`, for example `["jwk"]`.
	pub supported_did_methods: Vec<String>,
}

impl RouterConfig {
	pub fn build(self) -> color_eyre::Result<axum::Router<()>> {
		// Registrations are only verifiable for did:jwk.
		for method in &self.supported_did_methods {
			let parsed = DidMethod::from_str(method)
				.wrap_err_with(|| format!("unknown did method {method:?}"))?;
			ensure!(
				parsed == DidMethod::Jwk,
				"did method {method:?} is not supported, only \"jwk\" is"
			);
		}
		let state = RouterState {
			registry: Arc::new(Registry::new(self.db_pool, self.registry_did)),
			metadata: Arc::new(RegistrationMetadata {
				enabled: self.registration_enabled,
				supported_did_methods: self.supported_did_methods,
			}),
		};

		Ok(axum::Router::new()
			.route("/", get(routes::root))
			.route("/.well-known/did.json", get(routes::did_document))
			.route("/metadata", get(routes::metadata))
			.route("/daps", post(routes::register))
			.route("/daps/:handle", get(routes::resolve))
			.with_state(state)
			.layer(TraceLayer::new_for_http()))
	}
}
