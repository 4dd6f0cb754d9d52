use std::sync::Arc;

use tokio::signal;
use tracing::{error, info, warn};

use integration_server_admission::health::{HealthState, run_health_server};
use integration_server_admission::{PolicySource, WebhookConfig, WebhookState, run_webhook_server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install the TLS crypto provider before any TLS operations
    if rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .is_err()
        && rustls::crypto::CryptoProvider::get_default().is_none()
    {
        return Err("Failed to install rustls crypto provider and no provider is available".into());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("integration_server_admission=info".parse()?),
        )
        .init();

    info!("Starting integration-server-admission");

    let config = WebhookConfig::from_env()?;
    let policy_source = config.policy_source();

    // The flag is re-read on every review; this only surfaces a broken deployment early
    match policy_source.resolve() {
        Ok(policy) => info!(
            variable = %config.is_production_var,
            is_production = policy.is_production,
            "Environment policy resolved"
        ),
        Err(e) => warn!(
            error = %e,
            "Environment policy does not resolve, every admission request will be denied"
        ),
    }

    let health_state = Arc::new(HealthState::new());

    let health_handle = {
        let health_state = health_state.clone();
        let port = config.health_port;
        tokio::spawn(async move {
            if let Err(e) = run_health_server(health_state, port).await {
                error!("Health server error: {}", e);
            }
        })
    };

    let webhook_handle = if config.tls_available() {
        info!("TLS certificates found, starting webhook server");
        let state = Arc::new(WebhookState::new(
            Arc::new(policy_source),
            Some(health_state.clone()),
        ));
        let config = config.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = run_webhook_server(
                state,
                &config.cert_path,
                &config.key_path,
                config.webhook_port,
            )
            .await
            {
                error!("Webhook server error: {}", e);
            }
        }))
    } else {
        info!(
            "TLS certificates not found at {} and {}, webhook server disabled",
            config.cert_path.display(),
            config.key_path.display()
        );
        None
    };

    health_state.set_ready(webhook_handle.is_some()).await;

    let webhook_future = async {
        if let Some(handle) = webhook_handle {
            if let Err(e) = handle.await {
                error!("Webhook server task panicked: {}", e);
            }
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = health_handle => {
            if let Err(e) = result {
                error!("Health server task panicked: {}", e);
            }
        }
        _ = webhook_future => {
            // Webhook server exited (either panic or normal exit)
        }
        _ = shutdown_signal() => {
            info!("Received shutdown signal, shutting down");
            health_state.set_ready(false).await;
        }
    }

    info!("Webhook stopped");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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
}
