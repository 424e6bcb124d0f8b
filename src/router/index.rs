use crate::otp::index::otp_routes;
use actix_web::web;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(otp_routes);
}
