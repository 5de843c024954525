//! Outbound request description.

use reqwest::Method;
use serde::Serialize;

use crate::error::{GatewayError, Result};

/// A request to be sent through the gateway.
///
/// Paths are relative to the configured base URL. The credential header is not
/// part of this value; the gateway adds it at send time.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    /// HTTP method.
    pub method: Method,
    /// Path below the base URL, e.g. `/auth/login`.
    pub path: String,
    /// Query string pairs.
    pub query: Vec<(String, String)>,
    /// JSON body.
    pub body: Option<serde_json::Value>,
    /// File sent as `multipart/form-data`. Takes the place of `body`.
    pub upload: Option<Upload>,
}

/// A file sent as one part of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// Form field name.
    pub field: String,
    /// File name reported to the server.
    pub file_name: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl OutboundRequest {
    /// Create a request with no query and no body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            upload: None,
        }
    }

    /// A `GET` request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// A `POST` request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// A `PUT` request.
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// A `DELETE` request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Encode` if `body` cannot be serialized.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| GatewayError::Encode(e.to_string()))?;
        self.body = Some(value);
        self.upload = None;
        Ok(self)
    }

    /// Attach a file as the multipart field `field`.
    #[must_use]
    pub fn file(
        mut self,
        field: impl Into<String>,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.body = None;
        self.upload = Some(Upload {
            field: field.into(),
            file_name: file_name.into(),
            bytes,
        });
        self
    }

    /// Append one query pair.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append the fields of a flat serializable struct as query pairs.
    ///
    /// `null` fields are skipped; strings are used verbatim and other scalars
    /// are rendered as JSON.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Encode` if `params` does not serialize to a
    /// flat object.
    pub fn query<Q: Serialize + ?Sized>(mut self, params: &Q) -> Result<Self> {
        let value =
            serde_json::to_value(params).map_err(|e| GatewayError::Encode(e.to_string()))?;
        let serde_json::Value::Object(fields) = value else {
            return Err(GatewayError::Encode(
                "query parameters must be an object".to_string(),
            ));
        };

        for (key, value) in fields {
            match value {
                serde_json::Value::Null => {}
                serde_json::Value::String(s) => self.query.push((key, s)),
                serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                    return Err(GatewayError::Encode(format!(
                        "query parameter `{key}` is not a scalar"
                    )));
                }
                other => self.query.push((key, other.to_string())),
            }
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Serialize)]
    struct Paging {
        skip: u32,
        limit: Option<u32>,
        keyword: Option<String>,
    }

    #[test]
    fn query_from_struct_skips_nulls() {
        let req = OutboundRequest::get("/materials")
            .query(&Paging {
                skip: 20,
                limit: None,
                keyword: Some("road".to_string()),
            })
            .unwrap();
        assert!(req.query.contains(&("skip".to_string(), "20".to_string())));
        assert!(req.query.contains(&("keyword".to_string(), "road".to_string())));
        assert_eq!(req.query.len(), 2);
    }

    #[test]
    fn nested_query_is_rejected() {
        let err = OutboundRequest::get("/x")
            .query(&json!({"filter": {"a": 1}}))
            .unwrap_err();
        assert!(matches!(err, GatewayError::Encode(_)));
        assert!(OutboundRequest::get("/x").query(&json!([1, 2])).is_err());
    }

    #[test]
    fn json_body() {
        let req = OutboundRequest::post("/auth/login")
            .json(&json!({"username": "u", "password": "p"}))
            .unwrap();
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.body.unwrap()["username"], "u");
    }

    #[test]
    fn file_replaces_json_body() {
        let req = OutboundRequest::post("/materials/upload")
            .json(&json!({"ignored": true}))
            .unwrap()
            .file("file", "plan.txt", b"hello".to_vec());
        assert!(req.body.is_none());
        let upload = req.upload.unwrap();
        assert_eq!(upload.field, "file");
        assert_eq!(upload.file_name, "plan.txt");
        assert_eq!(upload.bytes, b"hello");
    }
}
