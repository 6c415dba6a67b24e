//! Main entry point for the Trailside server.
//! Serves the campground listing pages, user accounts, and reviews.

use actix_web::{App, HttpServer, middleware::Logger, web};
use std::sync::Arc;

use auth_services::cookie::SessionCookie;
use auth_services::middleware::SessionMiddleware;
use auth_services::session::{PgSessionStore, SessionStore};
use image_store::{HostedImageStore, ImageStore};
use listings::pg::{PgListingStore, PgReviewStore};
use listings::{ListingStore, ReviewStore};
use postgres::database::{create_connection_pool, run_migrations, test_connection};

mod config;
mod middleware;

use config::Config;
use middleware::MethodOverride;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    log::info!("Starting trailside server...");

    let config = Config::from_env();

    // Create database connection pool
    let pool = match create_connection_pool().await {
        Ok(pool) => {
            log::info!("Database pool created successfully");

            if let Err(e) = test_connection(&pool).await {
                log::error!("Database connection test failed: {}", e);
            }
            pool
        }
        Err(e) => {
            log::error!("Failed to create database pool: {}", e);
            log::error!("Make sure PostgreSQL is running and DATABASE_URL is set");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_migrations(&pool).await {
        log::error!("Failed to run migrations: {}", e);
        std::process::exit(1);
    }

    let images: Arc<dyn ImageStore> =
        match HostedImageStore::new(config.image_host_url.clone(), config.image_host_key.clone()) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                log::error!("Failed to build image host client: {}", e);
                std::process::exit(1);
            }
        };

    let listings_store: Arc<dyn ListingStore> = Arc::new(PgListingStore::new(pool.clone()));
    let reviews_store: Arc<dyn ReviewStore> = Arc::new(PgReviewStore::new(pool.clone()));
    let sessions_store: Arc<dyn SessionStore> = Arc::new(PgSessionStore::new(pool.clone()));
    let codec = SessionCookie::from_env();

    log::info!("Server will be available at: http://0.0.0.0:{}", config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::from(listings_store.clone()))
            .app_data(web::Data::from(reviews_store.clone()))
            .app_data(web::Data::from(images.clone()))
            .app_data(web::Data::from(sessions_store.clone()))
            .wrap(SessionMiddleware::new(sessions_store.clone(), codec.clone()))
            .wrap(MethodOverride)
            .wrap(Logger::default())
            .configure(web_handlers::routes::pages)
    })
    .bind(("0.0.0.0", config.port))?
    .run()
    .await
}
