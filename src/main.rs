use agent_launch::config::WizardConfig;
use agent_launch::routes::wizard_routes;
use agent_launch::session::{SessionRegistry, spawn_prune_task};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let port: u16 = std::env::var("AGENT_LAUNCH_PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let idle_minutes: u64 = std::env::var("AGENT_LAUNCH_SESSION_IDLE_MIN")
        .unwrap_or_else(|_| "60".to_string())
        .parse()
        .unwrap_or(60);

    let config = WizardConfig {
        session_idle_timeout: std::time::Duration::from_secs(idle_minutes * 60),
        ..WizardConfig::default()
    };

    eprintln!("🚀 Agent Launch v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Wizard API: http://0.0.0.0:{}/api/wizard", port);
    eprintln!("   Health:     http://0.0.0.0:{}/health", port);
    eprintln!("   Sessions idle out after {} min\n", idle_minutes);

    let registry = SessionRegistry::new(config);
    let _prune_handle = spawn_prune_task(registry.clone());

    let app = wizard_routes(registry);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!(port, "wizard server started");
    axum::serve(listener, app).await?;

    Ok(())
}
