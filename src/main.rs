use actix_web::{web, App, HttpServer};
use std::env;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::commons::{metrics_service::MetricsService, object_store::ObjectStoreService};
use crate::uploads::upload_service::UploadService;
use crate::workers::main_worker::MainWorker;
use crate::workers::{JobProcessor, RedisQueue, SimulatedContentGenerator, WorkerConfig};

mod commons;
mod controllers;
mod uploads;
mod workers;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing with JSON format
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Determine the application mode from environment variable
    let app_mode = env::var("APP_MODE").unwrap_or_else(|_| "api".to_string());
    info!("Starting application in {} mode", app_mode);

    let worker_config = match WorkerConfig::from_env() {
        Ok(config) => {
            info!("Worker configuration loaded successfully");
            config
        }
        Err(e) => {
            warn!("Failed to load worker configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "Failed to load worker configuration",
            ));
        }
    };

    // In worker mode, force the consumer pool on regardless of config
    let mut worker_config_final = worker_config.clone();
    if app_mode == "worker" {
        info!("Running in worker mode - forcing consumer pool to be enabled");
        worker_config_final.content_worker_thread_enabled = true;
    }

    let processor: Arc<dyn JobProcessor> = Arc::new(SimulatedContentGenerator);
    let mut main_worker = MainWorker::new(worker_config_final, processor);

    // Always start the worker in worker mode
    // In API mode, only start if enabled in config
    if app_mode == "worker" || worker_config.content_worker_thread_enabled {
        match main_worker.start().await {
            Ok(_) => info!("Content Worker System started successfully"),
            Err(e) => {
                warn!("Failed to start Content Worker System: {}", e);
                return Err(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "Failed to start worker",
                ));
            }
        }
    }

    if app_mode == "worker" {
        info!("Running in worker mode - API server will not be started");

        let main_worker_ref = Arc::new(main_worker);
        tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("Shutdown signal received, starting graceful worker shutdown");
                    main_worker_ref.signal_shutdown();

                    if let Err(e) = main_worker_ref.await_shutdown().await {
                        warn!("Error during worker shutdown: {}", e);
                    }
                    info!("Worker graceful shutdown completed");
                }
                Err(e) => warn!("Error waiting for interrupt signal: {}", e),
            }
        });

        // Keep the application running until Ctrl+C is received
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received, application will exit"),
            Err(e) => warn!("Error waiting for Ctrl+C: {}", e),
        }

        return Ok(());
    }

    // Continue with API server setup only in API mode
    info!("Setting up API server");

    let host = std::env::var("HOST").expect("HOST must be set");
    let port = std::env::var("PORT").expect("PORT must be set");

    let metrics_service = web::Data::new(MetricsService::new(
        &std::env::var("STATSD_HOST").expect("STATSD_HOST must be set"),
        std::env::var("STATSD_PORT")
            .expect("STATSD_PORT must be set")
            .parse::<u16>()
            .expect("STATSD_PORT must be a port number"),
        &std::env::var("STATSD_PREFIX").expect("STATSD_PREFIX must be set"),
    ));

    let object_store = ObjectStoreService::new(
        &env::var("MINIO_ENDPOINT").expect("MINIO_ENDPOINT must be set"),
        &env::var("MINIO_ACCESS_KEY").expect("MINIO_ACCESS_KEY must be set"),
        &env::var("MINIO_SECRET_KEY").expect("MINIO_SECRET_KEY must be set"),
        &env::var("MINIO_BUCKET_NAME").expect("MINIO_BUCKET_NAME must be set"),
        &env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
    )
    .await
    .expect("Failed to initialize object store");

    let job_queue = RedisQueue::new(
        &worker_config.redis_url,
        worker_config.content_job_queue.clone(),
    )
    .await
    .expect("Failed to connect to the job queue");

    let upload_service = web::Data::new(UploadService::new(
        Arc::new(object_store),
        Arc::new(job_queue),
        metrics_service.get_ref().clone(),
    ));

    let server = HttpServer::new(move || {
        App::new()
            .app_data(upload_service.clone())
            .app_data(metrics_service.clone())
            .service(controllers::health::health_check)
            .service(uploads::upload_controller::upload)
    })
    .bind(format!("{}:{}", host, port))?
    .run();

    // Set up graceful shutdown for both the server and worker (if enabled)
    let server_handle = server.handle();
    let main_worker_ref = Arc::new(main_worker);

    let main_worker_shutdown = Arc::clone(&main_worker_ref);

    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received, starting graceful shutdown");

                if worker_config.content_worker_thread_enabled {
                    info!("Shutting down worker");
                    main_worker_shutdown.signal_shutdown();

                    if let Err(e) = main_worker_shutdown.await_shutdown().await {
                        warn!("Error during worker shutdown: {}", e);
                    }
                }

                info!("Shutting down HTTP server");
                server_handle.stop(true).await;
                info!("Graceful shutdown completed");
            }
            Err(e) => warn!("Error waiting for interrupt signal: {}", e),
        }
    });

    info!("API server starting at {}:{}", host, port);
    server.await?;

    Ok(())
}
