pub mod health;
pub mod templates;
pub mod theme;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};

use crate::editor::handlers as editor;
use crate::export::handlers as export;
use crate::generation::handlers as generation;
use crate::session::handlers as session;
use crate::state::AppState;

/// Room for multipart framing on top of the photo itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let photo_body_limit = state.config.max_photo_bytes + MULTIPART_OVERHEAD;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/templates", get(templates::handle_list_templates))
        .route(
            "/api/v1/theme",
            get(theme::handle_get_theme).put(theme::handle_set_theme),
        )
        // Sessions
        .route("/api/v1/sessions", post(session::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(session::handle_get_session).delete(session::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/template",
            put(session::handle_select_template),
        )
        .route("/api/v1/sessions/:id/preview", get(session::handle_preview))
        // Generation
        .route(
            "/api/v1/sessions/:id/generate",
            post(generation::handle_generate),
        )
        // Form editor
        .route(
            "/api/v1/sessions/:id/form",
            get(editor::handle_get_form).patch(editor::handle_set_field),
        )
        .route(
            "/api/v1/sessions/:id/form/photo",
            post(editor::handle_upload_photo).layer(DefaultBodyLimit::max(photo_body_limit)),
        )
        .route("/api/v1/sessions/:id/form/save", post(editor::handle_save_form))
        .route(
            "/api/v1/sessions/:id/form/:section",
            post(editor::handle_append_entry),
        )
        .route(
            "/api/v1/sessions/:id/form/:section/:index",
            delete(editor::handle_remove_entry),
        )
        // Export
        .route(
            "/api/v1/sessions/:id/export/pdf",
            post(export::handle_export_pdf),
        )
        .route(
            "/api/v1/sessions/:id/export/print",
            get(export::handle_export_print),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tokio::sync::Notify;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::export::{ExportError, RasterImage, Rasterizer};
    use crate::generation::{GenerationError, ResumeGenerator, ResumePayload};
    use crate::layout::default_canvas_config;
    use crate::session::SessionStore;
    use crate::theme::ThemeState;

    enum Scripted {
        Resume(Value),
        Fail(&'static str),
        /// Waits for `release` after signalling `entered`.
        Gated {
            entered: Notify,
            release: Notify,
        },
    }

    #[async_trait]
    impl ResumeGenerator for Scripted {
        async fn generate(&self, description: &str) -> Result<ResumePayload, GenerationError> {
            if description.trim().is_empty() {
                return Err(GenerationError::EmptyDescription);
            }
            match self {
                Scripted::Resume(v) => Ok(ResumePayload::Structured(v.clone())),
                Scripted::Fail(msg) => Err(GenerationError::Api {
                    status: 500,
                    message: msg.to_string(),
                }),
                Scripted::Gated { entered, release } => {
                    entered.notify_one();
                    release.notified().await;
                    Ok(ResumePayload::RawText("late".to_string()))
                }
            }
        }
    }

    struct BlankRasterizer;

    #[async_trait]
    impl Rasterizer for BlankRasterizer {
        async fn rasterize(&self, _svg: String) -> Result<RasterImage, ExportError> {
            Ok(RasterImage::blank(100, 141))
        }
    }

    fn app_with(generator: Arc<dyn ResumeGenerator>) -> Router {
        build_router(AppState {
            config: Config::default(),
            sessions: SessionStore::new(),
            generator,
            rasterizer: Arc::new(BlankRasterizer),
            theme: ThemeState::default(),
            canvas: default_canvas_config(),
        })
    }

    fn app() -> Router {
        app_with(Arc::new(Scripted::Resume(json!({
            "personalInformation": { "fullName": "Ada Lovelace" },
            "skills": ["Mathematics"]
        }))))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        app.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn text_body(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn create_session(app: &Router) -> String {
        let response = send(app, "POST", "/api/v1/sessions", None).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        json_body(response).await["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let response = send(&app(), "GET", "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["service"], "folio-api");
    }

    #[tokio::test]
    async fn test_new_session_previews_placeholders() {
        let app = app();
        let id = create_session(&app).await;

        let session = json_body(send(&app, "GET", &format!("/api/v1/sessions/{id}"), None).await).await;
        assert_eq!(session["template"], "default");
        assert_eq!(session["suggestedFileName"], "resume");
        assert_eq!(session["exportState"], "idle");

        let html = text_body(send(&app, "GET", &format!("/api/v1/sessions/{id}/preview"), None).await).await;
        assert!(html.contains("Your Name"));
        assert!(html.contains("A passionate software engineer"));
    }

    #[tokio::test]
    async fn test_generation_replaces_document_and_reseeds_form() {
        let app = app();
        let id = create_session(&app).await;

        let response = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/generate"),
            Some(json!({ "userDescription": "I am a mathematician" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["document"]["personalInformation"]["fullName"], "Ada Lovelace");
        assert_eq!(body["form"]["skills"], json!([{ "title": "Mathematics", "level": "" }]));
        assert_eq!(body["form"]["languages"], json!([{ "name": "" }]));
    }

    #[tokio::test]
    async fn test_generation_failure_leaves_session_unchanged() {
        let app = app_with(Arc::new(Scripted::Fail("quota exceeded")));
        let id = create_session(&app).await;

        let response = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/generate"),
            Some(json!({ "userDescription": "anything" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(json_body(response).await["error"]["message"], "quota exceeded");

        let session = json_body(send(&app, "GET", &format!("/api/v1/sessions/{id}"), None).await).await;
        assert_eq!(session["document"]["personalInformation"]["fullName"], "");
        assert_eq!(session["generating"], false);
    }

    #[tokio::test]
    async fn test_blank_description_is_rejected() {
        let app = app();
        let id = create_session(&app).await;
        let response = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/generate"),
            Some(json!({ "userDescription": "  " })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_concurrent_generation_is_busy() {
        let gate = Arc::new(Scripted::Gated {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let app = app_with(gate.clone());
        let id = create_session(&app).await;
        let uri = format!("/api/v1/sessions/{id}/generate");

        let first = {
            let app = app.clone();
            let uri = uri.clone();
            tokio::spawn(async move {
                send(&app, "POST", &uri, Some(json!({ "userDescription": "one" }))).await
            })
        };
        let Scripted::Gated { entered, release } = &*gate else {
            unreachable!()
        };
        entered.notified().await;

        let second = send(&app, "POST", &uri, Some(json!({ "userDescription": "two" }))).await;
        assert_eq!(second.status(), StatusCode::CONFLICT);

        release.notify_one();
        assert_eq!(first.await.unwrap().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_form_edits_apply_on_save() {
        let app = app();
        let id = create_session(&app).await;
        let form_uri = format!("/api/v1/sessions/{id}/form");

        let response = send(
            &app,
            "PATCH",
            &form_uri,
            Some(json!({ "path": "personalInformation.fullName", "value": "Grace Hopper" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, "POST", &format!("{form_uri}/experience"), None).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(json_body(response).await["index"], 1);

        let response = send(&app, "DELETE", &format!("{form_uri}/experience/0"), None).await;
        assert_eq!(response.status(), StatusCode::OK);

        // not applied yet
        let session = json_body(send(&app, "GET", &format!("/api/v1/sessions/{id}"), None).await).await;
        assert_eq!(session["document"]["personalInformation"]["fullName"], "");

        let saved = json_body(send(&app, "POST", &format!("{form_uri}/save"), None).await).await;
        assert_eq!(saved["personalInformation"]["fullName"], "Grace Hopper");
        assert_eq!(saved["experience"].as_array().unwrap().len(), 1);
        assert_eq!(saved["languages"], json!([{ "name": "" }]));
    }

    #[tokio::test]
    async fn test_form_errors() {
        let app = app();
        let id = create_session(&app).await;
        let form_uri = format!("/api/v1/sessions/{id}/form");

        let response = send(&app, "PATCH", &form_uri, Some(json!({ "path": "nope", "value": 1 }))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(&app, "POST", &format!("{form_uri}/summary"), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(&app, "DELETE", &format!("{form_uri}/skills/9"), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_template_selection() {
        let app = app();
        let id = create_session(&app).await;
        let response = send(
            &app,
            "PUT",
            &format!("/api/v1/sessions/{id}/template"),
            Some(json!({ "variant": "template2" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["template"], "elegant-dark");
        assert_eq!(body["templateLabel"], "Elegant Dark");
    }

    #[tokio::test]
    async fn test_export_pdf() {
        let app = app();
        let id = create_session(&app).await;
        let uri = format!("/api/v1/sessions/{id}/export/pdf");

        let response = send(&app, "POST", &uri, Some(json!({ "fileName": "ada" }))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"ada.pdf\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_export_without_file_name_is_no_content() {
        let app = app();
        let id = create_session(&app).await;
        let uri = format!("/api/v1/sessions/{id}/export/pdf");

        let response = send(&app, "POST", &uri, Some(json!({ "fileName": "" }))).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let response = send(&app, "POST", &uri, None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_export_print_opens_dialog() {
        let app = app();
        let id = create_session(&app).await;
        let response = send(&app, "GET", &format!("/api/v1/sessions/{id}/export/print"), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(text_body(response).await.contains("window.print()"));
    }

    #[tokio::test]
    async fn test_photo_upload_is_accepted() {
        let app = app();
        let id = create_session(&app).await;
        let boundary = "folio-boundary";
        let mut body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"me.png\"\r\n\
             Content-Type: image/png\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(&[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri(format!("/api/v1/sessions/{id}/form/photo"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        // the read runs in the background
        let mut photo = String::new();
        for _ in 0..50 {
            let form = json_body(send(&app, "GET", &format!("/api/v1/sessions/{id}/form"), None).await).await;
            photo = form["personalInformation"]["profilePhoto"].as_str().unwrap().to_string();
            if !photo.is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(photo.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let app = app();
        let uri = format!("/api/v1/sessions/{}", uuid::Uuid::new_v4());
        assert_eq!(send(&app, "GET", &uri, None).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(send(&app, "DELETE", &uri, None).await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_deleted_session_is_gone() {
        let app = app();
        let id = create_session(&app).await;
        let uri = format!("/api/v1/sessions/{id}");
        assert_eq!(send(&app, "DELETE", &uri, None).await.status(), StatusCode::NO_CONTENT);
        assert_eq!(send(&app, "GET", &uri, None).await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_theme_round_trip() {
        let app = app();
        let response = send(&app, "PUT", "/api/v1/theme", Some(json!({ "theme": "dark" }))).await;
        assert_eq!(json_body(response).await["changed"], true);
        let body = json_body(send(&app, "GET", "/api/v1/theme", None).await).await;
        assert_eq!(body["theme"], "dark");
    }

    #[tokio::test]
    async fn test_templates_are_listed() {
        let body = json_body(send(&app(), "GET", "/api/v1/templates", None).await).await;
        assert_eq!(body.as_array().unwrap().len(), 4);
        assert_eq!(body[0]["label"], "Classic Blue (Default)");
    }
}
