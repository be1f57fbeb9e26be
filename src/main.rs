//! Veristation - ID document capture and review station
//!
//! Main entry point for the station server.

use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use veristation::{
    camera_session::{CameraDevice, SyntheticCamera, V4l2Camera},
    capture_flow::{CaptureConfig, CaptureService},
    moderation::ModerationService,
    state::{AppConfig, AppState},
    storage::{MemoryStorage, ObjectStorage, SupabaseStorage},
    upload_pipeline::UploadPipeline,
    verification::{MemoryRecordStore, MySqlRecordStore, RecordStore},
    web_api,
};

/// Capture resolution requested from the V4L2 devices
const CAPTURE_WIDTH: u32 = 1280;
const CAPTURE_HEIGHT: u32 = 720;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "veristation=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Veristation v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = AppConfig::default();
    tracing::info!(
        storage_backend = %config.storage_backend,
        camera_backend = %config.camera_backend,
        capture_shots = config.capture_shots,
        bucket = %config.storage_bucket,
        "Configuration loaded"
    );

    // Storage backend
    let storage: Arc<dyn ObjectStorage> = match config.storage_backend.as_str() {
        "memory" => {
            tracing::warn!("Using in-memory storage; uploads will not survive a restart");
            Arc::new(MemoryStorage::new(&config.storage_bucket))
        }
        _ => Arc::new(SupabaseStorage::new(
            config.supabase_url.clone(),
            config.supabase_service_key.clone(),
            config.storage_bucket.clone(),
        )),
    };

    // Record store; the memory store pairs with the memory storage
    // backend for hardware-free development
    let (pool, records): (Option<sqlx::MySqlPool>, Arc<dyn RecordStore>) =
        match config.storage_backend.as_str() {
            "memory" => (None, Arc::new(MemoryRecordStore::new())),
            _ => {
                let pool = MySqlPoolOptions::new()
                    .max_connections(10)
                    .acquire_timeout(Duration::from_secs(10))
                    .connect(&config.database_url)
                    .await?;
                tracing::info!("Database connected");
                (Some(pool.clone()), Arc::new(MySqlRecordStore::new(pool)))
            }
        };

    // Camera backend
    let device: Arc<dyn CameraDevice> = match config.camera_backend.as_str() {
        "synthetic" => {
            tracing::warn!("Using synthetic camera backend");
            Arc::new(SyntheticCamera::default())
        }
        _ => {
            let version = V4l2Camera::check_ffmpeg().await?;
            tracing::info!(ffmpeg = %version, "V4L2 backend ready");
            Arc::new(V4l2Camera::new(
                config.camera_device_environment.clone(),
                config.camera_device_user.clone(),
                CAPTURE_WIDTH,
                CAPTURE_HEIGHT,
                config.camera_timeout_sec,
            ))
        }
    };

    // Capture and moderation services
    let capture_config = CaptureConfig::from_shot_count(config.capture_shots)?;
    let pipeline = Arc::new(UploadPipeline::new(
        storage.clone(),
        records.clone(),
        capture_config.sides().to_vec(),
    ));
    let moderation = Arc::new(ModerationService::new(storage.clone(), records.clone()));
    let capture = Arc::new(Mutex::new(CaptureService::new(
        device,
        capture_config,
        pipeline.clone(),
    )));
    tracing::info!("Capture and moderation services initialized");

    // Create application state
    let state = AppState {
        pool,
        config,
        storage,
        records,
        pipeline,
        moderation,
        capture,
        started_at: std::time::Instant::now(),
    };

    let app = web_api::create_router(state.clone())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
