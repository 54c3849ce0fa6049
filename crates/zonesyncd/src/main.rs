// # zonesyncd - one-shot reconciliation host
//
// Reads configuration from the environment, builds the remote transport,
// rate limiter and state store, then runs a single apply pass over a JSON
// manifest of desired resources.
//
// All reconciliation logic lives in zonesync-core; this binary only wires
// components together and maps the outcome to an exit code.
//
// ## Configuration
//
// ### Credentials (exactly one of the two ids)
// - `ZONESYNC_AUTH_ID`: ClouDNS main account user id
// - `ZONESYNC_SUB_AUTH_ID`: ClouDNS sub-user id
// - `ZONESYNC_AUTH_PASSWORD`: API password
// - `ZONESYNC_API_BASE`: API endpoint (default https://api.cloudns.net)
//
// ### Pacing
// - `ZONESYNC_RATE_LIMIT`: remote calls per second (default 10)
//
// ### State Store
// - `ZONESYNC_STATE_STORE_TYPE`: `memory` or `file` (default memory)
// - `ZONESYNC_STATE_STORE_PATH`: path to the state file (for file store)
//
// ### Manifest
// - `ZONESYNC_MANIFEST`: path to the JSON manifest
//
// ### Logging
// - `ZONESYNC_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export ZONESYNC_AUTH_ID=1234
// export ZONESYNC_AUTH_PASSWORD=secret
// export ZONESYNC_STATE_STORE_TYPE=file
// export ZONESYNC_STATE_STORE_PATH=/var/lib/zonesync/state.json
// export ZONESYNC_MANIFEST=/etc/zonesync/manifest.json
//
// zonesyncd
// ```

use anyhow::{Context, Result};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use zonesync_core::config::{
    DEFAULT_CLOUDNS_API_BASE, EngineConfig, ProviderConfig, RateLimitConfig, StateStoreConfig,
    SyncConfig,
};
use zonesync_core::{
    ApplyEngine, ApplyEvent, ApplySummary, Manifest, RemoteZoneApi, ResourceRegistry, SyncDriver,
    TokenBucket,
};

/// Exit codes for different termination scenarios
///
/// - 0: Every resource reconciled
/// - 1: Configuration or startup error
/// - 2: Runtime error, including resources that failed to reconcile
#[derive(Debug, Clone, Copy)]
enum SyncExitCode {
    Clean = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<SyncExitCode> for ExitCode {
    fn from(code: SyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Raw environment configuration
struct Config {
    auth_id: Option<String>,
    sub_auth_id: Option<String>,
    password: String,
    api_base: String,
    rate_limit: u32,
    state_store_type: String,
    state_store_path: Option<String>,
    manifest: String,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let rate_limit = match non_empty_var("ZONESYNC_RATE_LIMIT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("ZONESYNC_RATE_LIMIT is not a number: '{}'", raw))?,
            None => RateLimitConfig::default().requests_per_second,
        };

        Ok(Self {
            auth_id: non_empty_var("ZONESYNC_AUTH_ID"),
            sub_auth_id: non_empty_var("ZONESYNC_SUB_AUTH_ID"),
            password: env::var("ZONESYNC_AUTH_PASSWORD").unwrap_or_default(),
            api_base: non_empty_var("ZONESYNC_API_BASE")
                .unwrap_or_else(|| DEFAULT_CLOUDNS_API_BASE.to_string()),
            rate_limit,
            state_store_type: non_empty_var("ZONESYNC_STATE_STORE_TYPE")
                .unwrap_or_else(|| "memory".to_string()),
            state_store_path: non_empty_var("ZONESYNC_STATE_STORE_PATH"),
            manifest: env::var("ZONESYNC_MANIFEST").unwrap_or_default(),
            log_level: env::var("ZONESYNC_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    ///
    /// Checks that only make sense for environment input live here. Structural
    /// rules are enforced by `SyncConfig::validate`.
    fn validate(&self) -> Result<()> {
        match (&self.auth_id, &self.sub_auth_id) {
            (Some(_), Some(_)) => anyhow::bail!(
                "ZONESYNC_AUTH_ID and ZONESYNC_SUB_AUTH_ID are mutually exclusive. \
                Set only one of them."
            ),
            (None, None) => anyhow::bail!(
                "Either ZONESYNC_AUTH_ID or ZONESYNC_SUB_AUTH_ID is required. \
                Set it via: export ZONESYNC_AUTH_ID=your_id"
            ),
            _ => {}
        }

        if self.password.is_empty() {
            anyhow::bail!(
                "ZONESYNC_AUTH_PASSWORD is required. \
                Set it via: export ZONESYNC_AUTH_PASSWORD=your_password"
            );
        }

        if !self.api_base.starts_with("https://") && !self.api_base.starts_with("http://") {
            anyhow::bail!(
                "ZONESYNC_API_BASE must use HTTP or HTTPS scheme. Got: {}",
                self.api_base
            );
        }

        if self.manifest.is_empty() {
            anyhow::bail!(
                "ZONESYNC_MANIFEST is required. \
                Set it via: export ZONESYNC_MANIFEST=/etc/zonesync/manifest.json"
            );
        }

        match self.state_store_type.as_str() {
            "memory" => {}
            "file" => {
                let Some(ref path) = self.state_store_path else {
                    anyhow::bail!(
                        "ZONESYNC_STATE_STORE_PATH is required when ZONESYNC_STATE_STORE_TYPE=file. \
                        Set it via: export ZONESYNC_STATE_STORE_PATH=/var/lib/zonesync/state.json"
                    );
                };
                if let Some(parent) = std::path::Path::new(path).parent()
                    && !parent.as_os_str().is_empty()
                    && !parent.exists()
                {
                    anyhow::bail!(
                        "ZONESYNC_STATE_STORE_PATH parent directory does not exist: {}. \
                        Create it first: sudo mkdir -p {}",
                        parent.display(),
                        parent.display()
                    );
                }
            }
            other => anyhow::bail!(
                "ZONESYNC_STATE_STORE_TYPE '{}' is not supported. \
                Supported types: file, memory",
                other
            ),
        }

        parse_level(&self.log_level)?;

        Ok(())
    }

    /// Convert into the library configuration
    fn into_sync_config(self) -> Result<SyncConfig> {
        let state_store = match self.state_store_path {
            Some(path) if self.state_store_type == "file" => StateStoreConfig::File { path },
            _ => StateStoreConfig::Memory,
        };

        let config = SyncConfig {
            provider: ProviderConfig::Cloudns {
                auth_id: self.auth_id,
                sub_auth_id: self.sub_auth_id,
                password: self.password,
                api_base: self.api_base,
            },
            state_store,
            rate_limit: RateLimitConfig {
                requests_per_second: self.rate_limit,
                ..RateLimitConfig::default()
            },
            manifest_path: self.manifest,
            engine: EngineConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_level(level: &str) -> Result<Level> {
    Ok(match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => anyhow::bail!(
            "ZONESYNC_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            level
        ),
    })
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return SyncExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return SyncExitCode::ConfigError.into();
    }

    let log_level = parse_level(&config.log_level).unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return SyncExitCode::ConfigError.into();
    }

    let config = match config.into_sync_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Configuration validation error: {}", e);
            return SyncExitCode::ConfigError.into();
        }
    };

    info!("Starting zonesyncd");
    debug!("Provider: {:?}", config.provider);
    info!("Manifest: {}", config.manifest_path);

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return SyncExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run(config).await {
            Ok(summary) if summary.is_clean() => SyncExitCode::Clean,
            Ok(summary) => {
                error!("{} resource(s) failed to reconcile", summary.failed);
                SyncExitCode::RuntimeError
            }
            Err(e) => {
                error!("Apply error: {:#}", e);
                SyncExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Build every component and run one apply pass
async fn run(config: SyncConfig) -> Result<ApplySummary> {
    let registry = ResourceRegistry::with_builtin();

    #[cfg(feature = "cloudns")]
    {
        info!("Registering ClouDNS transport");
        zonesync_cloudns::register(&registry);
    }

    let api: Arc<dyn RemoteZoneApi> = Arc::from(
        registry
            .create_api(&config.provider)
            .context("Failed to build remote transport")?,
    );
    let limiter = Arc::new(TokenBucket::new(
        config.rate_limit.requests_per_second,
        config.rate_limit.burst,
    ));
    let driver = SyncDriver::new(api, limiter);

    let state_store = zonesync_core::state::from_config(&config.state_store)
        .await
        .context("Failed to open state store")?;

    let manifest = Manifest::load(&config.manifest_path)
        .await
        .context("Failed to load manifest")?;

    let (engine, events) = ApplyEngine::new(
        Arc::new(registry),
        driver,
        state_store,
        &config.engine,
    )?;
    let reporter = spawn_reporter(events);

    let outcome = tokio::select! {
        summary = engine.apply(&manifest) => summary.map_err(anyhow::Error::from),
        signal = wait_for_interrupt() => {
            warn!("Received {}, abandoning apply pass", signal?);
            Err(anyhow::anyhow!("Interrupted"))
        }
    };

    // Closing the channel lets the reporter finish draining
    drop(engine);
    if let Err(e) = reporter.await {
        warn!("Event reporter stopped abnormally: {}", e);
    }

    outcome
}

/// Log apply events as they arrive
fn spawn_reporter(mut events: mpsc::Receiver<ApplyEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                ApplyEvent::Started { resources } => {
                    info!("Applying {} resource(s)", resources)
                }
                ApplyEvent::Created { address, id } => info!("+ {} ({})", address, id),
                ApplyEvent::Updated { address } => info!("~ {}", address),
                ApplyEvent::Replaced { address, id } => info!("-/+ {} ({})", address, id),
                ApplyEvent::Unchanged { address } => debug!("= {}", address),
                ApplyEvent::Deleted { address } => info!("- {}", address),
                ApplyEvent::Dropped { address } => warn!("! {} was gone remotely", address),
                ApplyEvent::Failed { address, error } => error!("x {}: {}", address, error),
                ApplyEvent::Finished { summary } => info!(
                    "Apply finished: {} created, {} updated, {} replaced, {} unchanged, \
                    {} deleted, {} dropped, {} failed",
                    summary.created,
                    summary.updated,
                    summary.replaced,
                    summary.unchanged,
                    summary.deleted,
                    summary.dropped,
                    summary.failed
                ),
            }
        }
    })
}

/// Wait for SIGTERM or SIGINT
#[cfg(unix)]
async fn wait_for_interrupt() -> Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for CTRL-C
#[cfg(not(unix))]
async fn wait_for_interrupt() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .context("Failed to wait for CTRL-C")?;
    Ok("SIGINT")
}
