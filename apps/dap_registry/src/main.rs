use std::net::{Ipv6Addr, SocketAddr};
use std::path::PathBuf;

use clap::Parser as _;
use color_eyre::eyre::Context as _;
use dap_registry::{db::MigratedDbPool, registry_did::RegistryDidProvider};
use did_simple::{crypto::rand_core::OsRng, BearerDid};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(clap::Parser, derive_more::Debug)]
struct Cli {
	#[clap(subcommand)]
	command: Option<Command>,
	#[clap(long, short, env, default_value = "0")]
	port: u16,
	#[clap(long, env, default_value = "daps.db")]
	db_path: PathBuf,
	/// The registry's own DID, as portable DID json. Registrations are
	/// counter-signed with it. See the `generate-did` subcommand.
	#[clap(long, env = "REGISTRY_PORTABLE_DID", hide_env_values = true)]
	#[debug(skip)]
	portable_did: Option<String>,
	/// Whether new handles can be registered.
	#[clap(long, env, default_value_t = true, action = clap::ArgAction::Set)]
	registration_enabled: bool,
	/// DID methods advertised by `/metadata`.
	#[clap(long, env, default_value = "jwk", value_delimiter = ',')]
	supported_did_methods: Vec<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
	/// Prints a freshly generated portable DID, for use as `--portable-did`.
	GenerateDid,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or("info".into()))
		.with(tracing_subscriber::fmt::layer())
		.init();

	let cli = Cli::parse();
	if let Some(Command::GenerateDid) = cli.command {
		let did = BearerDid::generate(&mut OsRng);
		let portable = serde_json::to_string_pretty(&did.export())
			.wrap_err("failed to serialize portable did")?;
		println!("{portable}");
		return Ok(());
	}

	let db_pool = {
		let connect_opts = sqlx::sqlite::SqliteConnectOptions::new()
			.create_if_missing(true)
			.filename(&cli.db_path);
		let pool_opts = sqlx::sqlite::SqlitePoolOptions::new();
		let pool = pool_opts
			.connect_with(connect_opts.clone())
			.await
			.wrap_err_with(|| {
				format!(
					"failed to connect to database with path {}",
					connect_opts.get_filename().display()
				)
			})?;
		MigratedDbPool::new(pool)
			.await
			.wrap_err("failed to migrate db pool")?
	};

	let router = dap_registry::RouterConfig {
		db_pool: db_pool.clone(),
		registry_did: RegistryDidProvider::from_config(cli.portable_did),
		registration_enabled: cli.registration_enabled,
		supported_did_methods: cli.supported_did_methods,
	}
	.build()
	.wrap_err("failed to build router")?;

	let listener = tokio::net::TcpListener::bind(SocketAddr::new(
		Ipv6Addr::UNSPECIFIED.into(),
		cli.port,
	))
	.await
	.wrap_err("failed to bind listener")?;
	info!("listening on {}", listener.local_addr()?);
	let served = axum::serve(listener, router)
		.with_graceful_shutdown(shutdown_signal())
		.await;

	info!("shutting down");
	db_pool.close().await;
	served.wrap_err("server error")
}

async fn shutdown_signal() {
	if let Err(err) = tokio::signal::ctrl_c().await {
		tracing::error!("failed to listen for ctrl-c: {err}");
		std::future::pending::<()>().await;
	}
}
