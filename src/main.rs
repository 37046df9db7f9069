use std::sync::Arc;

use eyre::{Context, Result};
use solace::backend::new_completion;
use solace::chat::{MessageEvents, ResponseRouter};
use solace::cli::Command;
use solace::config::verbose;
use solace::config::{Configuration, init_logger};
use solace::crisis::CrisisDetector;
use solace::identity::new_identity;
use solace::server::{self, AppState};
use solace::storage::new_storage;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    let cmd = Command::new();
    if cmd.version() {
        cmd.print_version();
        return Ok(());
    }

    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic: {}", panic_info);
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let config = cmd.get_config()?;
    Configuration::init(config.clone())?;

    init_logger(&config.log)?;
    verbose!("[+] Logger initialized");

    verbose!("[+] Initializing storage...");
    let storage = new_storage(&config.storage)
        .await
        .wrap_err("initializing storage")?;
    verbose!("[+] Storage initialized");

    let identity = new_identity(&config.identity).wrap_err("initializing identity")?;
    verbose!("[+] Identity provider: {}", config.identity.endpoint);

    let completion = new_completion(&config.completion).wrap_err("initializing completion")?;
    verbose!(
        "[+] Completion endpoint: {} ({})",
        config.completion.endpoint,
        config.completion.model
    );

    let detector =
        CrisisDetector::from_config(&config.crisis.patterns).wrap_err("loading crisis patterns")?;
    verbose!("[+] Loaded {} crisis patterns", detector.patterns().len());

    let events = MessageEvents::default();
    let router = ResponseRouter::new(
        Arc::new(detector),
        storage.clone(),
        completion,
        events.clone(),
    );

    let state = Arc::new(AppState {
        storage,
        identity,
        router: Arc::new(router),
        events,
    });

    let token = CancellationToken::new();
    tokio::spawn(shutdown_signal(token.clone()));

    verbose!("[+] Listening on {}", config.server.bind_address);
    server::serve(state, &config.server, token).await
}

/// Cancels `token` on SIGINT or SIGTERM.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            log::warn!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(err) => {
                log::warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    log::info!("Shutdown signal received");
    token.cancel();
}
