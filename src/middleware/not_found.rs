use actix_web::middleware::ErrorHandlerResponse;
use actix_web::{ResponseError, Result, dev::ServiceResponse};

use crate::utils::error::CustomError;

/// Replace the default empty 404 with the JSON error envelope
pub fn not_found<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    // Pages that are missing on disk already carry their own message
    if res.response().error().is_some() {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    }

    let new_response =
        CustomError::NotFoundError("Route does not exist".to_string()).error_response();
    let (req, _) = res.into_parts();
    let res = ServiceResponse::new(req, new_response.map_into_right_body());

    Ok(ErrorHandlerResponse::Response(res))
}
