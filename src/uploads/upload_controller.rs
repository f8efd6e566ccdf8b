use actix_multipart::{Multipart, MultipartError};
use actix_web::{web, HttpResponse};
use futures::TryStreamExt;
use tracing::{error, info_span};

use crate::uploads::{
    dto::ErrorDetail,
    upload_service::UploadService,
};

struct UploadedFile {
    file_name: Option<String>,
    content_type: Option<String>,
    content: Vec<u8>,
}

/// Drain the multipart stream until the `file` field, collecting its bytes.
async fn read_upload_field(payload: &mut Multipart) -> Result<Option<UploadedFile>, MultipartError> {
    while let Some(mut field) = payload.try_next().await? {
        let (name, file_name) = {
            let content_disposition = field.content_disposition();
            (
                content_disposition.get_name().map(str::to_owned),
                content_disposition.get_filename().map(str::to_owned),
            )
        };

        if name.as_deref() != Some("file") {
            continue;
        }

        let content_type = field.content_type().map(|mime| mime.to_string());

        let mut content = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            content.extend_from_slice(&chunk);
        }

        return Ok(Some(UploadedFile {
            file_name,
            content_type,
            content,
        }));
    }

    Ok(None)
}

#[actix_web::post("/upload")]
async fn upload(
    upload_service: web::Data<UploadService>,
    mut payload: Multipart,
) -> HttpResponse {
    let _span = info_span!(
        "upload-api",
        correlation_id = uuid::Uuid::new_v4().to_string()
    )
    .entered();

    let file = match read_upload_field(&mut payload).await {
        Ok(Some(file)) => file,
        Ok(None) => {
            return HttpResponse::BadRequest()
                .json(ErrorDetail::new("Missing multipart field 'file'"));
        }
        Err(e) => {
            return HttpResponse::BadRequest().json(ErrorDetail::new(e.to_string()));
        }
    };

    let Some(file_name) = file.file_name else {
        return HttpResponse::BadRequest()
            .json(ErrorDetail::new("Uploaded file is missing a filename"));
    };

    match upload_service
        .upload(&file_name, file.content, file.content_type.as_deref())
        .await
    {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            error!("Upload failed for {}: {}", file_name, e);
            HttpResponse::InternalServerError().json(ErrorDetail::new(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::header;
    use actix_web::{test, App};

    use super::*;
    use crate::uploads::dto::UploadResponse;
    use crate::uploads::upload_service::test_support::{
        test_metrics, FakeJobQueue, FakeObjectStore,
    };

    const BOUNDARY: &str = "------------------------abcdef0123456789";

    fn multipart_body(filename: &str, content: &str) -> String {
        format!(
            "--{b}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             {content}\r\n\
             --{b}--\r\n",
            b = BOUNDARY,
        )
    }

    fn multipart_request(body: String) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/upload")
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(body)
    }

    #[actix_web::test]
    async fn upload_round_trips_through_the_http_surface() {
        let store = Arc::new(FakeObjectStore::default());
        let queue = Arc::new(FakeJobQueue::default());
        let service = web::Data::new(UploadService::new(
            store.clone(),
            queue.clone(),
            test_metrics(),
        ));

        let app =
            test::init_service(App::new().app_data(service.clone()).service(upload)).await;

        let request = multipart_request(multipart_body("report.pdf", "hello")).to_request();
        let response: UploadResponse = test::call_and_read_body_json(&app, request).await;

        assert_eq!(response.file, "report.pdf");
        assert_eq!(response.message, "File uploaded and queued");
        assert!(store.objects.lock().unwrap().contains_key("report.pdf"));
        assert_eq!(queue.published.lock().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn missing_file_field_is_a_client_error() {
        let service = web::Data::new(UploadService::new(
            Arc::new(FakeObjectStore::default()),
            Arc::new(FakeJobQueue::default()),
            test_metrics(),
        ));

        let app =
            test::init_service(App::new().app_data(service.clone()).service(upload)).await;

        let body = format!(
            "--{b}\r\n\
             Content-Disposition: form-data; name=\"other\"\r\n\r\n\
             ignored\r\n\
             --{b}--\r\n",
            b = BOUNDARY,
        );
        let request = multipart_request(body).to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn queue_failure_surfaces_as_500_with_detail() {
        let service = web::Data::new(UploadService::new(
            Arc::new(FakeObjectStore::default()),
            Arc::new(FakeJobQueue {
                fail: true,
                ..Default::default()
            }),
            test_metrics(),
        ));

        let app =
            test::init_service(App::new().app_data(service.clone()).service(upload)).await;

        let request = multipart_request(multipart_body("report.pdf", "hello")).to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(
            response.status(),
            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
        );
        let detail: ErrorDetail = test::read_body_json(response).await;
        assert!(detail.detail.contains("Queue publish failed"));
    }
}
