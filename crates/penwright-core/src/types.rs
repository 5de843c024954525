//! API types shared with the writing server.
//!
//! These types mirror the JSON bodies produced and consumed by the server. They
//! carry no behaviour beyond (de)serialization; a shape that drifts from the
//! server is only caught when decoding fails at runtime.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;

/// Read a nullable column as its default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// Auth Types
// =============================================================================

/// Profile of the signed-in user, passed through from the server unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Server-assigned user ID.
    pub id: i64,
    /// Login name.
    pub username: String,
    /// Name shown in the interface.
    pub display_name: String,
    /// Department the user belongs to.
    pub department: String,
}

impl UserProfile {
    /// Encode the profile as the JSON record kept in the session store.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn encode(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a profile from a persisted JSON record.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MalformedUser` if the record is not a valid profile.
    pub fn decode(record: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(record)?)
    }
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Plain-text password.
    pub password: String,
}

/// Request body for `POST /auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Login name.
    pub username: String,
    /// Plain-text password.
    pub password: String,
    /// Name shown in the interface.
    pub display_name: String,
}

/// Response body for login and registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Bearer token for subsequent calls.
    pub token: String,
    /// Profile of the authenticated user.
    pub user: UserProfile,
}

// =============================================================================
// Document Types
// =============================================================================

/// The catalogue of official document kinds the server understands.
///
/// On the wire each kind is its Chinese name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocType {
    /// 通知
    #[serde(rename = "通知")]
    Notice,
    /// 报告
    #[serde(rename = "报告")]
    Report,
    /// 请示
    #[serde(rename = "请示")]
    Request,
    /// 批复
    #[serde(rename = "批复")]
    Reply,
    /// 函
    #[serde(rename = "函")]
    Letter,
    /// 纪要
    #[serde(rename = "纪要")]
    Minutes,
    /// 方案
    #[serde(rename = "方案")]
    Plan,
    /// 总结
    #[serde(rename = "总结")]
    Summary,
    /// 讲话稿
    #[serde(rename = "讲话稿")]
    Speech,
}

impl DocType {
    /// Every document kind, in catalogue order.
    pub const ALL: [Self; 9] = [
        Self::Notice,
        Self::Report,
        Self::Request,
        Self::Reply,
        Self::Letter,
        Self::Minutes,
        Self::Plan,
        Self::Summary,
        Self::Speech,
    ];

    /// The wire name of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Notice => "通知",
            Self::Report => "报告",
            Self::Request => "请示",
            Self::Reply => "批复",
            Self::Letter => "函",
            Self::Minutes => "纪要",
            Self::Plan => "方案",
            Self::Summary => "总结",
            Self::Speech => "讲话稿",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CoreError::UnknownDocType(s.to_string()))
    }
}

// =============================================================================
// Chat Types
// =============================================================================

/// A writing conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    /// Session ID.
    pub id: i64,
    /// Session title.
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Kind of document being drafted, if chosen.
    #[serde(default)]
    pub doc_type: Option<String>,
    /// Lifecycle status reported by the server.
    #[serde(default)]
    pub status: Option<String>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// Request to open a new writing conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    /// Session title.
    pub title: String,
    /// Kind of document to draft.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<DocType>,
}

/// Response for creating a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedSession {
    /// Session ID.
    pub id: i64,
    /// Session title.
    pub title: String,
    /// Kind of document being drafted.
    #[serde(default)]
    pub doc_type: Option<String>,
}

/// Message IDs are numeric once persisted, but may be strings for
/// messages that only exist client-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageId {
    /// Server-assigned ID.
    Number(i64),
    /// Client-assigned ID.
    Text(String),
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message ID.
    pub id: MessageId,
    /// Message role: "user" or "assistant".
    pub role: String,
    /// Message content.
    pub content: String,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

/// Request to send a message into a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    /// Message text.
    pub message: String,
    /// Target conversation.
    pub session_id: i64,
}

/// Assistant reply to a sent message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Reply text.
    pub reply: String,
}

// =============================================================================
// Material Types
// =============================================================================

/// A reference material uploaded by the user.
///
/// List responses omit `content_text` and `original_filename`; the detail
/// response fills them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    /// Material ID.
    pub id: i64,
    /// Title.
    pub title: String,
    /// Document kind the material was classified as.
    #[serde(default)]
    pub doc_type: Option<String>,
    /// Generated summary.
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    /// Extracted keywords.
    #[serde(default, deserialize_with = "null_as_default")]
    pub keywords: Vec<String>,
    /// Full extracted text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_text: Option<String>,
    /// Number of characters in the extracted text.
    #[serde(default, deserialize_with = "null_as_default")]
    pub char_count: u64,
    /// Name of the uploaded file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_filename: Option<String>,
    /// Upload timestamp.
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// The material record returned right after an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedMaterial {
    /// Material ID.
    pub id: i64,
    /// Title derived from the file name.
    pub title: String,
    /// Document kind the server classified the file as.
    #[serde(default)]
    pub doc_type: Option<String>,
    /// Generated summary.
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    /// Extracted keywords.
    #[serde(default, deserialize_with = "null_as_default")]
    pub keywords: Vec<String>,
    /// Number of characters in the extracted text.
    #[serde(default, deserialize_with = "null_as_default")]
    pub char_count: u64,
}

/// Filters and paging for listing materials.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MaterialQuery {
    /// Restrict to one document kind.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<DocType>,
    /// Restrict to titles/summaries containing a keyword.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    /// Number of records to skip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    /// Maximum number of records (server caps at 100).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// A semantic search hit over materials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Matched text.
    pub text: String,
    /// Where the text came from.
    pub metadata: SearchHitMetadata,
}

/// Provenance of a search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHitMetadata {
    /// Resource URI.
    #[serde(default)]
    pub uri: String,
    /// Resource title.
    #[serde(default)]
    pub title: String,
    /// Relevance score.
    #[serde(default)]
    pub score: f64,
}

/// Request to delete several materials at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchDeleteRequest {
    /// Material IDs.
    pub ids: Vec<i64>,
}

/// Request to reclassify several materials at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchClassifyRequest {
    /// Material IDs.
    pub ids: Vec<i64>,
    /// New document kind.
    pub doc_type: DocType,
}

// =============================================================================
// Export Types
// =============================================================================

/// A previously exported document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDoc {
    /// Export record ID.
    pub id: i64,
    /// Document title.
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Document kind.
    #[serde(default)]
    pub doc_type: Option<String>,
    /// Revision number.
    #[serde(default)]
    pub version: Option<u32>,
    /// Export timestamp.
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// Request to render an edited draft as a `.docx` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    /// The editor document tree.
    pub content_json: serde_json::Value,
    /// Document title; the server falls back to a default when empty.
    #[serde(default)]
    pub title: String,
    /// Document kind.
    #[serde(default)]
    pub doc_type: String,
    /// Conversation the draft came from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<i64>,
}

/// Request to review a draft before it is exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRequest {
    /// Plain text of the draft.
    pub content: String,
    /// Document kind the draft is checked against.
    pub doc_type: String,
}

/// Result of reviewing a draft.
///
/// When the reviewer is unavailable the server still answers, with a zero
/// score, no issues and an explanatory summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewReport {
    /// Overall score.
    #[serde(default, deserialize_with = "null_as_default")]
    pub score: f64,
    /// Problems found, in the reviewer's own shape.
    #[serde(default, deserialize_with = "null_as_default")]
    pub issues: Vec<serde_json::Value>,
    /// One-paragraph verdict.
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
}

// =============================================================================
// Preference Types
// =============================================================================

/// All stored preferences of a user, keyed by preference name.
pub type Preferences = BTreeMap<String, String>;

/// Request to set one preference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetPreferenceRequest {
    /// Preference name.
    pub key: String,
    /// Preference value.
    pub value: String,
}

/// The preferences the settings page edits together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPreferences {
    /// Issuing organisation used in signatures.
    #[serde(default)]
    pub signature_org: String,
    /// Default tone of drafts.
    #[serde(default = "BatchPreferences::default_tone")]
    pub default_tone: String,
    /// Default recipients line.
    #[serde(default)]
    pub default_recipients: String,
    /// Phrases drafts should avoid.
    #[serde(default)]
    pub avoid_phrases: String,
}

impl BatchPreferences {
    fn default_tone() -> String {
        "formal".to_string()
    }
}

impl Default for BatchPreferences {
    fn default() -> Self {
        Self {
            signature_org: String::new(),
            default_tone: Self::default_tone(),
            default_recipients: String::new(),
            avoid_phrases: String::new(),
        }
    }
}

/// Generic acknowledgement returned by mutating endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable result.
    pub message: String,
}
