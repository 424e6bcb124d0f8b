use actix_web::http::StatusCode;
use actix_web::middleware::{ErrorHandlers, Logger};
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info};
use std::io;
use std::sync::Arc;

mod database;
mod middleware;
mod otp;
mod router;
mod utils;

use middleware::not_found::not_found;
use otp::service::OtpService;
use router::index::routes;
use utils::config::AppConfig;
use utils::email::{EmailConfig, EmailService};

fn startup_error(context: &str, e: impl std::fmt::Display) -> io::Error {
    error!("{}: {}", context, e);
    io::Error::other(format!("{}: {}", context, e))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().map_err(|e| startup_error("Invalid configuration", e))?;

    let email_config =
        EmailConfig::from_env().map_err(|e| startup_error("Invalid email configuration", e))?;
    let mailer = EmailService::new(email_config)
        .map_err(|e| startup_error("Failed to initialize mailer", e))?;

    let store = database::connect_store(config.store_backend)
        .await
        .map_err(|e| startup_error("Failed to connect OTP store", e))?;

    let otp_service = web::Data::new(OtpService::new(Arc::new(mailer), store));
    let app_config = web::Data::new(config.clone());

    info!("Starting server on http://{}:{}", config.host, config.port);

    let server = HttpServer::new({
        let otp_service = otp_service.clone();
        move || {
            App::new()
                .wrap(Logger::default())
                .app_data(otp_service.clone())
                .app_data(app_config.clone())
                .configure(routes)
                .wrap(ErrorHandlers::new().handler(StatusCode::NOT_FOUND, not_found))
        }
    })
    .bind((config.host.as_str(), config.port))?
    .run();

    let result = server.await;

    otp_service.close().await;
    info!("Server has stopped");

    result
}
