//! Typed calls for the writing server's endpoints.
//!
//! Each method is a thin wrapper over [`HttpGateway::send`], so credential
//! injection and failure classification apply unchanged. Auth endpoints live
//! with the auth controller.

use reqwest::Response;

use penwright_core::{
    BatchClassifyRequest, BatchDeleteRequest, BatchPreferences, ChatMessage, ChatReply,
    ChatSession, CreateSessionRequest, CreatedSession, DocType, ExportDoc, ExportRequest,
    Material, MaterialQuery, MessageResponse, Preferences, ReviewReport, ReviewRequest,
    SearchHit, SendMessageRequest, SetPreferenceRequest, UploadedMaterial,
};

use crate::client::HttpGateway;
use crate::error::{GatewayError, Result};
use crate::request::OutboundRequest;

impl HttpGateway {
    // =========================================================================
    // Material Operations
    // =========================================================================

    /// List materials matching `query`.
    ///
    /// # Errors
    ///
    /// Returns the classified gateway failure.
    pub async fn list_materials(&self, query: &MaterialQuery) -> Result<Vec<Material>> {
        self.fetch_json(OutboundRequest::get("/materials").query(query)?)
            .await
    }

    /// Upload a `.docx`, `.pdf` or `.txt` file as a new material.
    ///
    /// The server extracts, classifies and summarizes the text before it
    /// answers, and rejects other file types with a 400.
    ///
    /// # Errors
    ///
    /// Returns the classified gateway failure.
    pub async fn upload_material(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedMaterial> {
        self.fetch_json(OutboundRequest::post("/materials/upload").file("file", file_name, bytes))
            .await
    }

    /// Semantic search over materials.
    ///
    /// # Errors
    ///
    /// Returns the classified gateway failure.
    pub async fn search_materials(
        &self,
        query: &str,
        doc_type: Option<DocType>,
        top_k: u32,
    ) -> Result<Vec<SearchHit>> {
        let mut request = OutboundRequest::get("/materials/search")
            .query_param("query", query)
            .query_param("top_k", top_k);
        if let Some(doc_type) = doc_type {
            request = request.query_param("doc_type", doc_type);
        }
        self.fetch_json(request).await
    }

    /// Get one material, including its full text.
    ///
    /// # Errors
    ///
    /// Returns the classified gateway failure.
    pub async fn get_material(&self, material_id: i64) -> Result<Material> {
        self.get_json(&format!("/materials/{material_id}")).await
    }

    /// Delete one material.
    ///
    /// # Errors
    ///
    /// Returns the classified gateway failure.
    pub async fn delete_material(&self, material_id: i64) -> Result<MessageResponse> {
        self.delete_json(&format!("/materials/{material_id}")).await
    }

    /// Delete several materials.
    ///
    /// # Errors
    ///
    /// Returns the classified gateway failure.
    pub async fn batch_delete_materials(&self, ids: Vec<i64>) -> Result<MessageResponse> {
        self.post_json("/materials/batch-delete", &BatchDeleteRequest { ids })
            .await
    }

    /// Reclassify several materials.
    ///
    /// # Errors
    ///
    /// Returns the classified gateway failure.
    pub async fn batch_classify_materials(
        &self,
        ids: Vec<i64>,
        doc_type: DocType,
    ) -> Result<MessageResponse> {
        self.post_json(
            "/materials/batch-classify",
            &BatchClassifyRequest { ids, doc_type },
        )
        .await
    }

    // =========================================================================
    // Chat Operations
    // =========================================================================

    /// Open a new writing conversation.
    ///
    /// # Errors
    ///
    /// Returns the classified gateway failure.
    pub async fn create_chat_session(
        &self,
        title: &str,
        doc_type: Option<DocType>,
    ) -> Result<CreatedSession> {
        let request = CreateSessionRequest {
            title: title.to_string(),
            doc_type,
        };
        self.post_json("/chat/sessions", &request).await
    }

    /// List the user's conversations.
    ///
    /// # Errors
    ///
    /// Returns the classified gateway failure.
    pub async fn list_chat_sessions(&self) -> Result<Vec<ChatSession>> {
        self.get_json("/chat/sessions").await
    }

    /// Message history of a conversation.
    ///
    /// # Errors
    ///
    /// Returns the classified gateway failure.
    pub async fn list_messages(&self, session_id: i64) -> Result<Vec<ChatMessage>> {
        self.get_json(&format!("/chat/sessions/{session_id}/messages"))
            .await
    }

    /// Send a message and wait for the full reply.
    ///
    /// # Errors
    ///
    /// Returns the classified gateway failure.
    pub async fn send_message(&self, session_id: i64, message: &str) -> Result<ChatReply> {
        let request = SendMessageRequest {
            message: message.to_string(),
            session_id,
        };
        self.post_json("/chat/send", &request).await
    }

    /// Check a draft against the conventions of its document kind.
    ///
    /// # Errors
    ///
    /// Returns the classified gateway failure.
    pub async fn review_document(&self, content: &str, doc_type: &str) -> Result<ReviewReport> {
        let request = ReviewRequest {
            content: content.to_string(),
            doc_type: doc_type.to_string(),
        };
        self.post_json("/chat/review", &request).await
    }

    /// Delete a conversation.
    ///
    /// # Errors
    ///
    /// Returns the classified gateway failure.
    pub async fn delete_chat_session(&self, session_id: i64) -> Result<MessageResponse> {
        self.delete_json(&format!("/chat/sessions/{session_id}"))
            .await
    }

    /// Close a conversation so the server can extract its memory.
    ///
    /// # Errors
    ///
    /// Returns the classified gateway failure.
    pub async fn finish_chat_session(&self, session_id: i64) -> Result<MessageResponse> {
        self.fetch_json(OutboundRequest::post(format!(
            "/chat/sessions/{session_id}/finish"
        )))
        .await
    }

    // =========================================================================
    // Export Operations
    // =========================================================================

    /// Render a draft as a `.docx` file and record it in the export history.
    ///
    /// # Errors
    ///
    /// Returns the classified gateway failure, or `GatewayError::Decode` if
    /// the body cannot be read.
    pub async fn export_document(&self, request: &ExportRequest) -> Result<Vec<u8>> {
        let response = self
            .send(OutboundRequest::post("/documents/export").json(request)?)
            .await?;
        read_bytes(response).await
    }

    /// List exported documents, newest first.
    ///
    /// # Errors
    ///
    /// Returns the classified gateway failure.
    pub async fn list_exports(&self, skip: u32, limit: u32) -> Result<Vec<ExportDoc>> {
        let request = OutboundRequest::get("/documents/history")
            .query_param("skip", skip)
            .query_param("limit", limit);
        self.fetch_json(request).await
    }

    /// Download the `.docx` file of an export.
    ///
    /// # Errors
    ///
    /// Returns the classified gateway failure, or `GatewayError::Decode` if
    /// the body cannot be read.
    pub async fn download_export(&self, doc_id: i64) -> Result<Vec<u8>> {
        let response = self
            .send(OutboundRequest::get(format!(
                "/documents/history/{doc_id}/download"
            )))
            .await?;
        read_bytes(response).await
    }

    // =========================================================================
    // Preference Operations
    // =========================================================================

    /// All stored preferences.
    ///
    /// # Errors
    ///
    /// Returns the classified gateway failure.
    pub async fn get_preferences(&self) -> Result<Preferences> {
        self.get_json("/preferences").await
    }

    /// Set one preference.
    ///
    /// # Errors
    ///
    /// Returns the classified gateway failure.
    pub async fn set_preference(&self, key: &str, value: &str) -> Result<MessageResponse> {
        let request = SetPreferenceRequest {
            key: key.to_string(),
            value: value.to_string(),
        };
        self.put_json("/preferences", &request).await
    }

    /// Save the settings-page preferences together.
    ///
    /// # Errors
    ///
    /// Returns the classified gateway failure.
    pub async fn set_preferences(&self, prefs: &BatchPreferences) -> Result<MessageResponse> {
        self.put_json("/preferences/batch", prefs).await
    }
}

async fn read_bytes(response: Response) -> Result<Vec<u8>> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| GatewayError::Decode(e.to_string()))?;
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use penwright_core::CredentialSource;

    use super::*;
    use crate::config::GatewayConfig;
    use crate::notice::RecordingNotifier;

    struct Token;

    impl CredentialSource for Token {
        fn bearer_token(&self) -> Option<String> {
            Some("t".to_string())
        }
    }

    fn gateway(server: &MockServer) -> HttpGateway {
        HttpGateway::new(
            GatewayConfig::with_base_url(format!("{}/api", server.uri())),
            Arc::new(Token),
            Arc::new(RecordingNotifier::new()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn list_materials_sends_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/materials"))
            .and(query_param("doc_type", "通知"))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": 1, "title": "Road works", "doc_type": "通知", "summary": "",
                "keywords": [], "char_count": 10, "created_at": "2024-05-01T08:00:00"
            }])))
            .expect(1)
            .mount(&server)
            .await;

        let query = MaterialQuery {
            doc_type: Some(DocType::Notice),
            limit: Some(5),
            ..MaterialQuery::default()
        };
        let materials = gateway(&server).list_materials(&query).await.unwrap();
        assert_eq!(materials.len(), 1);
        assert_eq!(materials[0].title, "Road works");
    }

    #[tokio::test]
    async fn batch_classify_posts_ids_and_kind() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/materials/batch-classify"))
            .and(body_json(json!({"ids": [1, 2], "doc_type": "纪要"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"message": "updated 2"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let resp = gateway(&server)
            .batch_classify_materials(vec![1, 2], DocType::Minutes)
            .await
            .unwrap();
        assert_eq!(resp.message, "updated 2");
    }

    #[tokio::test]
    async fn chat_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat/sessions"))
            .and(body_json(json!({"title": "Q3 report", "doc_type": "报告"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"id": 9, "title": "Q3 report", "doc_type": "报告"}),
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/chat/sessions/9/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "role": "user", "content": "draft", "created_at": "2024-05-01T08:00:00"},
                {"id": 2, "role": "assistant", "content": "ok", "created_at": "2024-05-01T08:00:05"}
            ])))
            .mount(&server)
            .await;

        let gw = gateway(&server);
        let created = gw
            .create_chat_session("Q3 report", Some(DocType::Report))
            .await
            .unwrap();
        assert_eq!(created.id, 9);

        let messages = gw.list_messages(created.id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, "assistant");
    }

    #[tokio::test]
    async fn export_history_and_download() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/documents/history"))
            .and(query_param("skip", "0"))
            .and(query_param("limit", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 3, "title": "Notice", "doc_type": "通知", "version": 2,
                 "created_at": "2024-05-02T10:00:00"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/documents/history/3/download"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x50, 0x4b, 0x03, 0x04]))
            .mount(&server)
            .await;

        let gw = gateway(&server);
        let history = gw.list_exports(0, 20).await.unwrap();
        assert_eq!(history[0].version, Some(2));

        let bytes = gw.download_export(3).await.unwrap();
        assert_eq!(bytes, vec![0x50, 0x4b, 0x03, 0x04]);
    }

    #[tokio::test]
    async fn preferences_read_and_write() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/preferences"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"default_tone": "formal"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/preferences"))
            .and(body_json(json!({"key": "signature_org", "value": "Traffic Bureau"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "saved"})))
            .expect(1)
            .mount(&server)
            .await;

        let gw = gateway(&server);
        let prefs = gw.get_preferences().await.unwrap();
        assert_eq!(prefs.get("default_tone").map(String::as_str), Some("formal"));

        let resp = gw
            .set_preference("signature_org", "Traffic Bureau")
            .await
            .unwrap();
        assert_eq!(resp.message, "saved");
    }

    #[tokio::test]
    async fn upload_sends_multipart_file_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/materials/upload"))
            .and(header("authorization", "Bearer t"))
            .and(body_string_contains("name=\"file\"; filename=\"plan.txt\""))
            .and(body_string_contains("road closure"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 12, "title": "plan", "doc_type": "方案", "summary": null,
                "keywords": ["road"], "char_count": 12
            })))
            .expect(1)
            .mount(&server)
            .await;

        let uploaded = gateway(&server)
            .upload_material("plan.txt", b"road closure".to_vec())
            .await
            .unwrap();
        assert_eq!(uploaded.id, 12);
        assert_eq!(uploaded.doc_type.as_deref(), Some("方案"));
        assert!(uploaded.summary.is_empty());
    }

    #[tokio::test]
    async fn review_returns_report() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat/review"))
            .and(body_json(json!({"content": "draft text", "doc_type": "通知"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "score": 82,
                "issues": [{"type": "format", "description": "missing date"}],
                "summary": "mostly fine"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let report = gateway(&server)
            .review_document("draft text", "通知")
            .await
            .unwrap();
        assert!((report.score - 82.0).abs() < f64::EPSILON);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.summary, "mostly fine");
    }

    #[tokio::test]
    async fn export_posts_draft_and_returns_file() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/documents/export"))
            .and(body_json(json!({
                "content_json": {"type": "doc", "content": []},
                "title": "Closure notice",
                "doc_type": "通知",
                "session_id": 9
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x50, 0x4b]))
            .expect(1)
            .mount(&server)
            .await;

        let request = ExportRequest {
            content_json: json!({"type": "doc", "content": []}),
            title: "Closure notice".to_string(),
            doc_type: "通知".to_string(),
            session_id: Some(9),
        };
        let bytes = gateway(&server).export_document(&request).await.unwrap();
        assert_eq!(bytes, vec![0x50, 0x4b]);
    }
}
