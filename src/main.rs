use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod model;
mod models;
mod routes;
mod rules;
mod utils;

use config::Config;
use db::init_db;

use crate::docs::ApiDoc;
use crate::utils::holiday_seed;
use crate::utils::username_lookup;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "HR Payroll API"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url).await;

    let pool_for_lookup_warmup = pool.clone();
    let pool_for_holiday_seed = pool.clone();
    let server_addr = config.server_addr.clone();
    let config_data = config.clone();
    let holiday_api_base = config.holiday_api_base.clone();
    let holiday_country = config.holiday_country.clone();

    actix_web::rt::spawn(async move {
        // Warm the availability filter with every account, the cache with
        // the last 30 days of active ones.
        if let Err(e) = username_lookup::warmup(&pool_for_lookup_warmup, 30, 250).await {
            eprintln!("Failed to warm up username lookup: {:?}", e);
        }
    });

    actix_web::rt::spawn(async move {
        if let Err(e) =
            holiday_seed::seed_if_empty(&pool_for_holiday_seed, &holiday_api_base, &holiday_country)
                .await
        {
            eprintln!("Holiday seeding failed: {:?}", e);
        }
    });

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(config.clone()))
            .service(index)
            // Auth + protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}
