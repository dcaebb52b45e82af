mod api;
mod config;
mod decoder;
mod enricher;
mod ledger;
mod store;
mod sync;

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

use crate::api::AppState;
use crate::config::{Config, ConfigError, StoreBackend};
use crate::decoder::PropertyStateDecoder;
use crate::enricher::{EnrichError, MetadataEnricher};
use crate::ledger::{LedgerError, SolanaRpcClient};
use crate::store::{
	MemoryPropertyStore, PersistError, PostgresOptions, PostgresPropertyStore, PropertyRepository,
	Reconciler,
};
use crate::sync::{SyncPipeline, SyncScheduler};

/// Errors that stop the indexer from starting or serving
#[derive(Debug, thiserror::Error)]
enum StartupError {
	#[error("Configuration error: {0}")]
	Config(#[from] ConfigError),

	#[error("Store error: {0}")]
	Store(#[from] PersistError),

	#[error("Ledger client error: {0}")]
	Ledger(#[from] LedgerError),

	#[error("Metadata client error: {0}")]
	Enricher(#[from] EnrichError),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::builder()
				.with_default_directive(LevelFilter::INFO.into())
				.from_env_lossy(),
		)
		.with_target(false)
		.with_thread_ids(false)
		.with_thread_names(false)
		.with_file(false)
		.with_line_number(false)
		.with_timer(tracing_subscriber::fmt::time::time())
		.init();

	info!("Starting property indexer");

	if let Err(e) = run().await {
		error!("Indexer failed: {}", e);
		std::process::exit(1);
	}
}

async fn run() -> Result<(), StartupError> {
	let config = Config::from_env()?;
	info!(
		"Indexing program {} via {} every {:?}",
		config.program_id, config.rpc_url, config.interval
	);

	let repository: Arc<dyn PropertyRepository> = match &config.store {
		StoreBackend::Memory => {
			warn!("Using the in-memory store; indexed properties are lost on exit");
			Arc::new(MemoryPropertyStore::new())
		}
		StoreBackend::Postgres(url) => {
			Arc::new(PostgresPropertyStore::connect(url, PostgresOptions::default()).await?)
		}
	};

	let source = Arc::new(SolanaRpcClient::new(config.rpc_url.clone())?);
	let resolver = Arc::new(MetadataEnricher::new(
		config.ipfs_gateway.clone(),
		config.metadata_timeout,
	)?);

	let mut decoder = PropertyStateDecoder::new();
	if let Some(discriminator) = config.discriminator {
		decoder = decoder.with_expected_discriminator(discriminator);
	}

	let pipeline = Arc::new(
		SyncPipeline::new(
			source,
			resolver,
			Reconciler::new(repository.clone(), config.image_policy),
			config.program_id,
		)
		.with_decoder(decoder)
		.with_admission(config.admission),
	);
	let scheduler = Arc::new(SyncScheduler::new(pipeline.clone(), config.interval));

	if config.enabled {
		scheduler.start().await;
	} else {
		info!("Scheduled indexing disabled; use the trigger endpoint to index");
	}

	let app = api::router(AppState {
		repository,
		pipeline,
		scheduler: scheduler.clone(),
	});

	let listener = TcpListener::bind(config.bind_address()).await?;
	info!("Listening on {}", listener.local_addr()?);

	axum::serve(listener, app)
		.with_graceful_shutdown(async move {
			shutdown_signal().await;
			scheduler.stop().await;
		})
		.await?;

	info!("Indexer stopped");
	Ok(())
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = tokio::signal::ctrl_c().await {
			error!("Failed to listen for Ctrl-C: {}", e);
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
			Ok(mut signal) => {
				signal.recv().await;
			}
			Err(e) => {
				error!("Failed to listen for SIGTERM: {}", e);
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}
	info!("Shutdown signal received");
}
