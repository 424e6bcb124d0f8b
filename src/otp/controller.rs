use actix_web::{Either, HttpResponse, web};
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::otp::model::{GenerateOtpRequest, GenerateOtpResponse, VerifyOtpRequest};
use crate::otp::service::OtpService;
use crate::utils::config::AppConfig;
use crate::utils::error::CustomError;

/// Request body sent either as JSON or as an HTML form. `None` when neither parses.
type Payload<T> = Option<Either<web::Json<T>, web::Form<T>>>;

fn payload_into_inner<T: DeserializeOwned>(payload: Payload<T>) -> Option<T> {
    payload.map(|body| match body {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    })
}

pub async fn generate_otp(
    otp_service: web::Data<OtpService>,
    payload: Payload<GenerateOtpRequest>,
) -> Result<HttpResponse, CustomError> {
    let email = payload_into_inner(payload)
        .and_then(|request| request.email)
        .unwrap_or_default();

    otp_service.generate(&email).await?;

    Ok(HttpResponse::Ok().json(GenerateOtpResponse {
        message: "OTP sent successfully".to_string(),
        success: true,
    }))
}

pub async fn verify_otp(
    otp_service: web::Data<OtpService>,
    payload: Payload<VerifyOtpRequest>,
) -> HttpResponse {
    let (email, otp) = match payload_into_inner(payload) {
        Some(request) => (
            request.email.unwrap_or_default(),
            request.otp.unwrap_or_default(),
        ),
        None => (String::new(), String::new()),
    };

    match otp_service.verify(&email, &otp).await {
        Ok(()) => HttpResponse::Ok()
            .content_type("text/plain; charset=utf-8")
            .body("OTP verified successfully"),
        Err(e) => e.text_response(),
    }
}

pub async fn generate_page(config: web::Data<AppConfig>) -> Result<HttpResponse, CustomError> {
    serve_page(&config.static_dir, "generate.html").await
}

pub async fn verify_page(config: web::Data<AppConfig>) -> Result<HttpResponse, CustomError> {
    serve_page(&config.static_dir, "verify.html").await
}

async fn serve_page(static_dir: &Path, file_name: &str) -> Result<HttpResponse, CustomError> {
    let path = static_dir.join(file_name);

    let html = tokio::fs::read_to_string(&path).await.map_err(|e| {
        log::error!("Failed to read {}: {}", path.display(), e);
        CustomError::NotFoundError("Page not found".to_string())
    })?;

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::middleware::ErrorHandlers;
    use actix_web::web::Data;
    use actix_web::{App, test};
    use std::path::PathBuf;
    use std::sync::Arc;

    use crate::database::memory::MemoryOtpStore;
    use crate::database::OtpStore;
    use crate::middleware::not_found::not_found;
    use crate::otp::service::OtpService;
    use crate::otp::testing::{FailingStore, RecordingMailer};
    use crate::router::index::routes;
    use crate::utils::config::{AppConfig, StoreBackend};

    fn test_config() -> AppConfig {
        AppConfig {
            host: "localhost".to_string(),
            port: 3001,
            static_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static"),
            store_backend: StoreBackend::Memory,
        }
    }

    macro_rules! init_app {
        ($mailer:expr, $store:expr) => {
            test::init_service(
                App::new()
                    .app_data(Data::new(OtpService::new($mailer, $store)))
                    .app_data(Data::new(test_config()))
                    .configure(routes)
                    .wrap(ErrorHandlers::new().handler(StatusCode::NOT_FOUND, not_found)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_generate_then_verify() {
        let mailer = Arc::new(RecordingMailer::default());
        let store = Arc::new(MemoryOtpStore::new());
        let app = init_app!(mailer.clone(), store.clone());

        let req = test::TestRequest::post()
            .uri("/generate")
            .set_json(serde_json::json!({ "email": "a@x.com" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "OTP sent successfully");

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        let (to, code) = sent[0].clone();
        assert_eq!(to, "a@x.com");
        assert_eq!(store.len().await, 1);

        for _ in 0..2 {
            let req = test::TestRequest::post()
                .uri("/verify")
                .set_json(serde_json::json!({ "email": "a@x.com", "otp": code }))
                .to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::OK);

            let body = test::read_body(res).await;
            assert_eq!(body, "OTP verified successfully");
        }

        let wrong = if code == "1000" { "1001" } else { "1000" };
        let req = test::TestRequest::post()
            .uri("/verify")
            .set_json(serde_json::json!({ "email": "a@x.com", "otp": wrong }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body = test::read_body(res).await;
        assert_eq!(body, "Invalid email or OTP");
    }

    #[actix_web::test]
    async fn test_generate_accepts_form_body() {
        let mailer = Arc::new(RecordingMailer::default());
        let app = init_app!(mailer.clone(), Arc::new(MemoryOtpStore::new()));

        let req = test::TestRequest::post()
            .uri("/generate")
            .set_form([("email", "form@x.com")])
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(mailer.sent()[0].0, "form@x.com");
    }

    #[actix_web::test]
    async fn test_generate_missing_email() {
        let mailer = Arc::new(RecordingMailer::default());
        let app = init_app!(mailer.clone(), Arc::new(MemoryOtpStore::new()));

        for body in [serde_json::json!({}), serde_json::json!({ "email": "" })] {
            let req = test::TestRequest::post()
                .uri("/generate")
                .set_json(body)
                .to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::BAD_REQUEST);

            let body: serde_json::Value = test::read_body_json(res).await;
            assert_eq!(body["success"], false);
            assert_eq!(body["message"], "Email address is required");
        }

        let req = test::TestRequest::post().uri("/generate").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        assert!(mailer.sent().is_empty());
    }

    #[actix_web::test]
    async fn test_generate_delivery_failure() {
        let store = Arc::new(MemoryOtpStore::new());
        let app = init_app!(Arc::new(RecordingMailer::failing()), store.clone());

        let req = test::TestRequest::post()
            .uri("/generate")
            .set_json(serde_json::json!({ "email": "a@x.com" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Failed to send OTP");
        assert_eq!(store.len().await, 0);
    }

    #[actix_web::test]
    async fn test_generate_persistence_failure() {
        let app = init_app!(Arc::new(RecordingMailer::default()), Arc::new(FailingStore));

        let req = test::TestRequest::post()
            .uri("/generate")
            .set_json(serde_json::json!({ "email": "a@x.com" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Failed to save OTP to database");
    }

    #[actix_web::test]
    async fn test_verify_missing_fields() {
        let app = init_app!(
            Arc::new(RecordingMailer::default()),
            Arc::new(MemoryOtpStore::new())
        );

        let req = test::TestRequest::post()
            .uri("/verify")
            .set_json(serde_json::json!({ "email": "a@x.com" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body = test::read_body(res).await;
        assert_eq!(body, "Email and OTP are required");
    }

    #[actix_web::test]
    async fn test_verify_accepts_form_body() {
        let store = Arc::new(MemoryOtpStore::new());
        store.create("a@x.com", "4821").await.unwrap();
        let app = init_app!(Arc::new(RecordingMailer::default()), store);

        let req = test::TestRequest::post()
            .uri("/verify")
            .set_form([("email", "a@x.com"), ("otp", "4821")])
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_verify_accepts_numeric_otp() {
        let store = Arc::new(MemoryOtpStore::new());
        store.create("a@x.com", "4821").await.unwrap();
        let app = init_app!(Arc::new(RecordingMailer::default()), store);

        let req = test::TestRequest::post()
            .uri("/verify")
            .set_json(serde_json::json!({ "email": "a@x.com", "otp": 4821 }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let body = test::read_body(res).await;
        assert_eq!(body, "OTP verified successfully");
    }

    #[actix_web::test]
    async fn test_verify_store_error() {
        let app = init_app!(Arc::new(RecordingMailer::default()), Arc::new(FailingStore));

        let req = test::TestRequest::post()
            .uri("/verify")
            .set_json(serde_json::json!({ "email": "a@x.com", "otp": "1234" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = test::read_body(res).await;
        assert_eq!(body, "Internal Server Error");
    }

    #[actix_web::test]
    async fn test_pages_are_served() {
        let app = init_app!(
            Arc::new(RecordingMailer::default()),
            Arc::new(MemoryOtpStore::new())
        );

        for uri in ["/generate", "/verify"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::OK);
            assert_eq!(
                res.headers().get("content-type").unwrap(),
                "text/html; charset=utf-8"
            );

            let body = test::read_body(res).await;
            let html = String::from_utf8(body.to_vec()).unwrap();
            assert!(html.contains(&format!("action=\"{}\"", uri)));
        }
    }

    #[actix_web::test]
    async fn test_unknown_route_returns_json_404() {
        let app = init_app!(
            Arc::new(RecordingMailer::default()),
            Arc::new(MemoryOtpStore::new())
        );

        let req = test::TestRequest::get().uri("/nope").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Route does not exist");
    }
}
