use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use campus_bus_tracking::config::database::{mask_database_url, run_migrations, DatabaseConfig};
use campus_bus_tracking::config::EnvironmentConfig;
use campus_bus_tracking::repositories::MemoryStore;
use campus_bus_tracking::services::seed_service::seed_demo_users;
use campus_bus_tracking::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("campus_bus_tracking=debug,tower_http=info")),
        )
        .init();

    info!("🚌 Campus Bus Tracking - API de ubicación en vivo");
    info!("================================================");

    let config = EnvironmentConfig::from_env()?;
    info!("⚙️ Entorno: {}", config.environment);

    let state = match config.database_url.clone() {
        Some(url) => {
            info!("🐘 Conectando a {}", mask_database_url(&url));
            let pool = DatabaseConfig::new(url)
                .create_pool()
                .await
                .context("Error conectando a la base de datos")?;
            run_migrations(&pool)
                .await
                .context("Error ejecutando migraciones")?;
            info!("✅ Base de datos lista");
            AppState::with_pool(config, pool)
        }
        None => {
            if config.is_production() {
                warn!("⚠️ DATABASE_URL no definido: los datos se pierden al reiniciar");
            }
            info!("🧠 Usando almacén en memoria");
            AppState::with_memory_store(config, MemoryStore::new())
        }
    };

    if state.config.seed_demo_users {
        if state.config.database_url.is_some() {
            warn!("⚠️ SEED_DEMO_USERS activo sobre Postgres: cuentas con contraseñas conocidas");
        }
        seed_demo_users(state.users.as_ref())
            .await
            .context("Error creando usuarios de demostración")?;
    }

    let addr: SocketAddr = state
        .config
        .server_url()
        .parse()
        .context("HOST/PORT no forman una dirección válida")?;
    let app = create_router(state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   POST /auth/login - Login");
    info!("   GET  /auth/me - Usuario actual");
    info!("   GET  /api/buses - Flota para el mapa");
    info!("   GET  /health - Health check");
    info!("🚏 Conductor:");
    info!("   GET  /driver/dashboard - Buses asignados");
    info!("   POST /driver/update_location/:id - Enviar posición");
    info!("   POST /driver/start_tracking/:id - Iniciar recorrido");
    info!("   POST /driver/stop_tracking/:id - Terminar recorrido");
    info!("🛠️ Administración:");
    info!("   POST /editor/bus/update - Alta/edición de bus");
    info!("   GET  /editor/assign_bus - Conductores y asignaciones");
    info!("   POST /editor/assign_bus - Asignar conductor");
    info!("   GET  /editor/drivers - Listar conductores");
    info!("   POST /editor/bus/:id/status - Cambiar estado");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo escuchar Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el manejador de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
