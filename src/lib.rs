pub mod commands;
pub mod config;
pub mod handlers;
pub mod info;
pub mod server;
pub mod trace;
pub mod webhook;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

use config::AppConfig;
use handlers::get_update_handler;
use std::net::SocketAddr;
use teloxide::{
    dispatching::Dispatcher, error_handlers::LoggingErrorHandler, prelude::*,
    update_listeners::webhooks,
};
use tokio::signal;
use trace::init_tracing;
use tracing::{error, info};
use webhook::Registrar;

pub async fn run() -> Result<(), BoxError> {
    init_tracing();

    let cfg = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            return Err(Box::new(e) as BoxError);
        }
    };

    info!("Starting bot (hosting = {})", cfg.hosting);

    // Built once for the whole process and handed to the dispatcher.
    let bot = Bot::new(cfg.token.clone()).set_api_url(cfg.api_url.clone());

    let handler = get_update_handler();
    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .enable_ctrlc_handler()
        .build();

    if !cfg.hosting {
        info!("Running in polling mode (local development).");
        info!("Bot started");
        dispatcher.dispatch().await;
        info!("Dispatcher exited (polling mode).");
        return Ok(());
    }

    // HOSTING == true path
    let webhook_target = match cfg.webhook_target() {
        Ok(url) => url,
        Err(e) => {
            error!("Cannot build webhook target: {}", e);
            return Err(Box::new(e) as BoxError);
        }
    };

    if cfg.register_on_start {
        let registrar = Registrar::from_config(&cfg);
        match registrar
            .register(&webhook_target, cfg.webhook_secret.as_deref())
            .await
        {
            Ok(reg) => info!("Webhook registered ({}): {}", reg.status, reg.body),
            Err(e) => error!("Webhook registration at startup failed: {}", e),
        }
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    info!("Serving webhook for URL: {}", webhook_target);

    // Registration happens out of band, so the listener must not call setWebhook itself.
    let mut options = webhooks::Options::new(addr, webhook_target);
    if let Some(secret) = cfg.webhook_secret.clone() {
        options = options.secret_token(secret);
    }
    let (update_listener, stop_future, webhook_router) = webhooks::axum_no_setup(options);

    info!("Bot started");

    let app = server::build_router(Some(webhook_router));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let server = axum::serve(listener, app);

    let shutdown_signal = async {
        let ctrl = signal::ctrl_c();
        #[cfg(unix)]
        {
            let mut term_stream =
                match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(s) => s,
                    Err(err) => {
                        error!("Failed to register SIGTERM handler: {}", err);
                        if let Err(e) = ctrl.await {
                            error!("Failed to listen for ctrl-c: {}", e);
                        }
                        return;
                    }
                };

            tokio::select! {
                _ = ctrl => {},
                _ = term_stream.recv() => {},
            }
        }
        #[cfg(not(unix))]
        {
            if let Err(e) = ctrl.await {
                error!("Failed to listen for ctrl-c: {}", e);
            }
        }
    };

    let server_with_shutdown = server.with_graceful_shutdown(async {
        tokio::select! {
            _ = shutdown_signal => {
                info!("Shutdown signal received (SIGINT/SIGTERM). Stopping listener & server.");
            }
            _ = stop_future => {
                info!("Listener stop_future resolved.");
            }
        }
    });

    let server_handle = tokio::spawn(async move {
        if let Err(e) = server_with_shutdown.await {
            error!("Axum server error: {}", e);
        }
    });

    dispatcher
        .dispatch_with_listener(update_listener, LoggingErrorHandler::new())
        .await;

    if let Err(e) = server_handle.await {
        error!("Server task join error: {}", e);
    }

    info!("Bot shutdown complete.");
    Ok(())
}
