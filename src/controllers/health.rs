use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};

pub const SERVICE_NAME: &str = "content-engine";
pub const SERVICE_VERSION: &str = "v2.0";

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

#[actix_web::get("/")]
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: SERVICE_VERSION.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use actix_web::{test, App};

    use super::*;

    #[actix_web::test]
    async fn health_check_reports_service_identity() {
        let app = test::init_service(App::new().service(health_check)).await;

        let request = test::TestRequest::get().uri("/").to_request();
        let response: HealthResponse = test::call_and_read_body_json(&app, request).await;

        assert_eq!(response.status, "healthy");
        assert_eq!(response.service, "content-engine");
        assert_eq!(response.version, "v2.0");
    }
}
