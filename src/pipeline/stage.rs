//! Pipeline stages and the file records flowing through them.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

/// One file flowing through a compilation pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFile {
    base: PathBuf,
    relative: PathBuf,
    contents: Vec<u8>,
}

impl AssetFile {
    pub fn new(base: impl Into<PathBuf>, relative: impl Into<PathBuf>, contents: Vec<u8>) -> Self {
        Self {
            base: base.into(),
            relative: relative.into(),
            contents,
        }
    }

    /// Directory the relative path is anchored at (the asset root for sources).
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Path relative to [`base`](Self::base); mirrored under the cache root on output.
    pub fn relative(&self) -> &Path {
        &self.relative
    }

    pub fn path(&self) -> PathBuf {
        self.base.join(&self.relative)
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    /// Contents as UTF-8, or a plugin error naming this file.
    pub fn text(&self) -> Result<&str, PluginError> {
        std::str::from_utf8(&self.contents).map_err(|err| {
            PluginError::new(err.to_string())
                .with_kind("EncodingError")
                .with_filename(self.relative.display().to_string())
        })
    }

    pub fn set_contents(&mut self, contents: impl Into<Vec<u8>>) {
        self.contents = contents.into();
    }

    pub fn set_relative(&mut self, relative: impl Into<PathBuf>) {
        self.relative = relative.into();
    }

    pub fn into_contents(self) -> Vec<u8> {
        self.contents
    }
}

/// Failure reported by a transform.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct PluginError {
    pub kind: String,
    pub message: String,
    pub plugin: Option<String>,
    pub line_number: Option<u32>,
    pub filename: Option<String>,
}

impl PluginError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            kind: "Error".to_string(),
            message: message.into(),
            plugin: None,
            line_number: None,
            filename: None,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_line_number(mut self, line: u32) -> Self {
        self.line_number = Some(line);
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Name the failing plugin unless the transform already did.
    pub fn attributed_to(mut self, plugin: &str) -> Self {
        if self.plugin.is_none() {
            self.plugin = Some(plugin.to_string());
        }
        self
    }
}

/// An opaque transform over the whole set of files of one request.
///
/// Implementations may merge, split, rename or rewrite files. They run on a
/// blocking worker thread.
pub trait Transform: Send + Sync {
    /// Name reported in diagnostics.
    fn name(&self) -> &str;

    fn apply(&self, files: Vec<AssetFile>, args: &[Value]) -> Result<Vec<AssetFile>, PluginError>;
}

impl<T: Transform + ?Sized> Transform for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn apply(&self, files: Vec<AssetFile>, args: &[Value]) -> Result<Vec<AssetFile>, PluginError> {
        (**self).apply(files, args)
    }
}

/// A transform bound to its registration arguments.
#[derive(Clone)]
pub struct Stage {
    transform: Arc<dyn Transform>,
    args: Vec<Value>,
}

impl Stage {
    pub fn new<I, A>(transform: impl Transform + 'static, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Value>,
    {
        Self {
            transform: Arc::new(transform),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        self.transform.name()
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Run the transform, attributing any failure to this stage.
    pub fn run(&self, files: Vec<AssetFile>) -> Result<Vec<AssetFile>, PluginError> {
        self.transform
            .apply(files, &self.args)
            .map_err(|err| err.attributed_to(self.name()))
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("transform", &self.name())
            .field("args", &self.args)
            .finish()
    }
}
