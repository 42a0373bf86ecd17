//! In-memory editing sessions.
//!
//! A session owns one ResumeDocument, the FormEditor seeded from it, the selected
//! TemplateVariant and the per-session in-flight guards. Nothing outlives the
//! session: deleting it (or restarting the process) discards the resume.

pub mod handlers;

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::editor::{read_photo, FormEditor, PhotoError, PhotoLimits, PhotoSource};
use crate::export::ExportPipeline;
use crate::guard::InFlight;
use crate::models::ResumeDocument;
use crate::render::{render_resume, RenderedResume, TemplateVariant};

pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub document: ResumeDocument,
    pub editor: FormEditor,
    pub template: TemplateVariant,
    pub generation: InFlight,
    pub export: ExportPipeline,
}

impl Session {
    /// A fresh session on the all-default document.
    pub fn new(export: ExportPipeline) -> Self {
        let document = ResumeDocument::default();
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            editor: FormEditor::seed(&document),
            document,
            template: TemplateVariant::default(),
            generation: InFlight::new(),
            export,
        }
    }

    /// Replaces the document wholesale and reseeds the editor, discarding any
    /// unsaved edits. The latest response to arrive wins.
    pub fn apply_generation(&mut self, document: ResumeDocument) {
        self.document = document;
        self.editor = FormEditor::seed(&self.document);
        info!(session = %self.id, "Document replaced by generation result");
    }

    /// Commits the form: the normalized form state becomes the document.
    pub fn save_form(&mut self) -> &ResumeDocument {
        self.document = self.editor.submit();
        debug!(session = %self.id, "Form saved");
        &self.document
    }

    pub fn render(&self) -> RenderedResume {
        render_resume(&self.document, self.template)
    }
}

pub type SharedSession = Arc<Mutex<Session>>;

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SharedSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: Session) -> SharedSession {
        let id = session.id;
        let shared = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(id, Arc::clone(&shared));
        shared
    }

    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Reads a photo in the background and writes it into the session's editor.
///
/// Nothing waits on the returned handle. Whichever read completes last wins;
/// a failed read is logged and leaves the form unchanged.
pub fn spawn_photo_upload(
    session: SharedSession,
    source: PhotoSource,
    limits: PhotoLimits,
) -> JoinHandle<()> {
    spawn_photo_write(session, read_photo(source, limits))
}

fn spawn_photo_write<F>(session: SharedSession, read: F) -> JoinHandle<()>
where
    F: Future<Output = Result<String, PhotoError>> + Send + 'static,
{
    tokio::spawn(async move {
        match read.await {
            Ok(data_url) => {
                let mut session = session.lock().await;
                session.editor.set_profile_photo(data_url);
                debug!(session = %session.id, "Profile photo updated");
            }
            Err(e) => warn!("Profile photo ignored: {e}"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{RasterImage, Rasterizer, ExportError};
    use crate::layout::default_canvas_config;
    use crate::models::normalize;
    use async_trait::async_trait;
    use bytes::Bytes;
    use serde_json::json;
    use std::time::Duration;

    struct NoRaster;

    #[async_trait]
    impl Rasterizer for NoRaster {
        async fn rasterize(&self, _svg: String) -> Result<RasterImage, ExportError> {
            Ok(RasterImage::blank(1, 1))
        }
    }

    fn session() -> Session {
        Session::new(ExportPipeline::new(
            Arc::new(NoRaster),
            default_canvas_config(),
            Duration::from_secs(5),
        ))
    }

    fn limits() -> PhotoLimits {
        PhotoLimits {
            max_bytes: 1024,
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_generation_discards_unsaved_edits() {
        let mut s = session();
        s.editor
            .set_field(&"summary".parse().unwrap(), json!("half-typed"))
            .unwrap();
        s.apply_generation(normalize(&json!({ "summary": "Generated" })));
        assert_eq!(s.document.summary, "Generated");
        assert_eq!(s.editor.form()["summary"], "Generated");
    }

    #[test]
    fn test_save_form_replaces_document() {
        let mut s = session();
        s.editor
            .set_field(&"personalInformation.fullName".parse().unwrap(), json!("Grace"))
            .unwrap();
        assert_eq!(s.document.personal_information.full_name, "");
        s.save_form();
        assert_eq!(s.document.personal_information.full_name, "Grace");
        assert_eq!(s.render().suggested_file_name, "Grace");
    }

    #[tokio::test]
    async fn test_store_lifecycle() {
        let store = SessionStore::new();
        let shared = store.insert(session()).await;
        let id = shared.lock().await.id;
        assert!(store.get(id).await.is_some());
        assert!(store.remove(id).await);
        assert!(store.get(id).await.is_none());
        assert!(!store.remove(id).await);
    }

    #[tokio::test]
    async fn test_photo_upload_writes_profile_photo() {
        let shared = Arc::new(Mutex::new(session()));
        let source = PhotoSource::Bytes {
            content_type: Some("image/png".to_string()),
            data: Bytes::from_static(&[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]),
        };
        spawn_photo_upload(Arc::clone(&shared), source, limits())
            .await
            .unwrap();
        let s = shared.lock().await;
        assert!(s.editor.profile_photo().starts_with("data:image/png;base64,"));
        // not committed until save
        assert_eq!(s.document.personal_information.profile_photo, "");
    }

    #[tokio::test]
    async fn test_failed_photo_read_changes_nothing() {
        let shared = Arc::new(Mutex::new(session()));
        let before = shared.lock().await.editor.clone();
        let source = PhotoSource::Bytes {
            content_type: None,
            data: Bytes::from_static(b"not an image"),
        };
        spawn_photo_upload(Arc::clone(&shared), source, limits())
            .await
            .unwrap();
        assert_eq!(shared.lock().await.editor, before);
    }

    #[tokio::test]
    async fn test_last_completed_upload_wins() {
        let shared = Arc::new(Mutex::new(session()));
        let (release_first, first_read) = tokio::sync::oneshot::channel::<()>();

        // both reads in flight; the first one finishes last
        let first = spawn_photo_write(Arc::clone(&shared), async move {
            let _ = first_read.await;
            Ok("data:image/png;base64,Zmlyc3Q=".to_string())
        });
        let second = spawn_photo_write(Arc::clone(&shared), async {
            Ok("data:image/png;base64,c2Vjb25k".to_string())
        });

        second.await.unwrap();
        assert_eq!(shared.lock().await.editor.profile_photo(), "data:image/png;base64,c2Vjb25k");

        release_first.send(()).unwrap();
        first.await.unwrap();
        assert_eq!(shared.lock().await.editor.profile_photo(), "data:image/png;base64,Zmlyc3Q=");
    }

    #[tokio::test]
    async fn test_pending_read_failure_keeps_completed_photo() {
        let shared = Arc::new(Mutex::new(session()));
        spawn_photo_write(Arc::clone(&shared), async {
            Ok("data:image/png;base64,b2s=".to_string())
        })
        .await
        .unwrap();
        spawn_photo_write(Arc::clone(&shared), async { Err(PhotoError::NotAnImage) })
            .await
            .unwrap();
        assert_eq!(shared.lock().await.editor.profile_photo(), "data:image/png;base64,b2s=");
    }
}
