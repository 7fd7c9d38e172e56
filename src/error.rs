//! Error taxonomy for asset requests.
//!
//! # Design Decisions
//! - "Nothing to do" outcomes (no route, no source file, non-GET) are not
//!   errors; they surface as `Ok(None)` and the request falls through
//! - Every variant maps to exactly one HTTP status and machine code
//! - Errors render as a JSON body so the host's error handler can forward
//!   them unchanged

use std::path::{Path, PathBuf};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::pipeline::PluginError;

/// A pipeline stage failure, as reported to the client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CompileError {
    /// Error kind reported by the stage (e.g. `SyntaxError`).
    pub kind: String,
    pub message: String,
    /// Name of the stage that failed.
    pub plugin: Option<String>,
    pub line_number: Option<u32>,
    /// Offending file, or the request's source glob when the stage did not say.
    pub filename: String,
}

/// Errors surfaced to the caller of the asset middleware.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Not Found")]
    NotFound,

    #[error("Forbidden")]
    Forbidden,

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Compile(CompileError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AssetError {
    pub fn not_found() -> Self {
        AssetError::NotFound
    }

    pub fn forbidden() -> Self {
        AssetError::Forbidden
    }

    pub fn io(path: &Path, source: std::io::Error) -> Self {
        AssetError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Build a compile error from a stage failure, falling back to
    /// `source_glob` when the stage did not name a file.
    pub fn compile(err: PluginError, source_glob: &str) -> Self {
        AssetError::Compile(CompileError {
            kind: err.kind,
            message: err.message,
            plugin: err.plugin,
            line_number: err.line_number,
            filename: err.filename.unwrap_or_else(|| source_glob.to_string()),
        })
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AssetError::Internal(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AssetError::NotFound => StatusCode::NOT_FOUND,
            AssetError::Forbidden => StatusCode::FORBIDDEN,
            AssetError::Io { .. } | AssetError::Compile(_) | AssetError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AssetError::NotFound => "NOT_FOUND",
            AssetError::Forbidden => "FORBIDDEN",
            AssetError::Io { .. } => "IO_ERROR",
            AssetError::Compile(_) => "COMPILE_ERROR",
            AssetError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to send to clients. I/O and internal failures carry
    /// server paths, so only their logged form has the details.
    fn public_message(&self) -> String {
        match self {
            AssetError::Io { .. } | AssetError::Internal(_) => "Internal Server Error".to_string(),
            other => other.to_string(),
        }
    }

    fn body(&self) -> ErrorBody<'_> {
        let mut body = ErrorBody {
            status: self.status().as_u16(),
            code: self.code(),
            kind: None,
            message: self.public_message(),
            line_number: None,
            filename: None,
            plugin: None,
        };
        if let AssetError::Compile(err) = self {
            body.kind = Some(&err.kind);
            body.line_number = err.line_number;
            body.filename = Some(&err.filename);
            body.plugin = err.plugin.as_deref();
        }
        body
    }
}

/// Wire shape of an error response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    status: u16,
    code: &'static str,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<&'a str>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    line_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plugin: Option<&'a str>,
}

impl IntoResponse for AssetError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
