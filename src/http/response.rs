//! Response construction and serialization.
//!
//! # Responsibilities
//! - Represent a complete response (status, content type, body)
//! - Serialize the fixed header block and body onto the wire
//!
//! # Wire Format
//! ```text
//! HTTP/1.1 <code> <reason>
//! Content-Type: text/html | application/json
//! Cache-Control: no-store, no-cache, must-revalidate
//! Connection: close
//! Content-Length: <n>
//!
//! <body>
//! ```

use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Response status codes the bridge emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    NotFound,
    InternalServerError,
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::NotFound => 404,
            Status::InternalServerError => 500,
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::NotFound => "Not Found",
            Status::InternalServerError => "Internal Server Error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Html,
    Json,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Html => "text/html",
            ContentType::Json => "application/json",
        }
    }
}

/// A complete response, written once and followed by connection close.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: Status,
    pub content_type: ContentType,
    pub body: String,
}

impl Response {
    pub fn html(status: Status, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: ContentType::Html,
            body: body.into(),
        }
    }

    /// 200 with `value` serialized as JSON; 500 if serialization fails.
    pub fn json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self {
                status: Status::Ok,
                content_type: ContentType::Json,
                body,
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response body");
                Self {
                    status: Status::InternalServerError,
                    content_type: ContentType::Json,
                    body: r#"{"error":"serialization failed"}"#.to_string(),
                }
            }
        }
    }

    /// Status line and headers, including the terminating blank line.
    pub fn head(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\n\
             Content-Type: {}\r\n\
             Cache-Control: no-store, no-cache, must-revalidate\r\n\
             Connection: close\r\n\
             Content-Length: {}\r\n\
             \r\n",
            self.status.code(),
            self.status.reason(),
            self.content_type.as_str(),
            self.body.len()
        )
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.head().into_bytes();
        bytes.extend_from_slice(self.body.as_bytes());
        bytes
    }

    pub async fn write_to<W: AsyncWrite + Unpin>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.to_bytes()).await?;
        writer.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_carries_fixed_headers() {
        let response = Response::html(Status::NotFound, "<p>gone</p>");
        let head = response.head();

        assert!(head.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(head.contains("Content-Type: text/html\r\n"));
        assert!(head.contains("Cache-Control: no-store, no-cache, must-revalidate\r\n"));
        assert!(head.contains("Connection: close\r\n"));
        assert!(head.contains("Content-Length: 11\r\n"));
        assert!(head.ends_with("\r\n\r\n"));
    }

    #[test]
    fn json_body() {
        #[derive(Serialize)]
        struct Body {
            success: bool,
        }

        let response = Response::json(&Body { success: true });
        assert_eq!(response.status, Status::Ok);
        assert_eq!(response.content_type, ContentType::Json);
        assert_eq!(response.body, r#"{"success":true}"#);
    }

    #[tokio::test]
    async fn write_to_emits_head_then_body() {
        let response = Response::html(Status::Ok, "hi");
        let mut out = Vec::new();
        response.write_to(&mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.ends_with("\r\n\r\nhi"));
    }
}
