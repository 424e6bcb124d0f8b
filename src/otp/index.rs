use super::controller::{generate_otp, generate_page, verify_otp, verify_page};
use actix_web::web;

pub fn otp_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/generate")
            .route(web::get().to(generate_page))
            .route(web::post().to(generate_otp)),
    )
    .service(
        web::resource("/verify")
            .route(web::get().to(verify_page))
            .route(web::post().to(verify_otp)),
    );
}
