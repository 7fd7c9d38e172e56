//! Built-in transforms and closure adapters.

use std::path::PathBuf;

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use serde_json::Value;

use crate::pipeline::stage::{AssetFile, PluginError, Transform};

/// Adapts a closure over the whole file set into a [`Transform`].
pub struct FnTransform<F> {
    name: String,
    f: F,
}

impl<F> FnTransform<F>
where
    F: Fn(Vec<AssetFile>, &[Value]) -> Result<Vec<AssetFile>, PluginError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Transform for FnTransform<F>
where
    F: Fn(Vec<AssetFile>, &[Value]) -> Result<Vec<AssetFile>, PluginError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, files: Vec<AssetFile>, args: &[Value]) -> Result<Vec<AssetFile>, PluginError> {
        (self.f)(files, args)
    }
}

/// Adapts a per-file closure into a [`Transform`].
pub struct MapTransform<F> {
    name: String,
    f: F,
}

impl<F> MapTransform<F>
where
    F: Fn(&mut AssetFile, &[Value]) -> Result<(), PluginError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Transform for MapTransform<F>
where
    F: Fn(&mut AssetFile, &[Value]) -> Result<(), PluginError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(
        &self,
        mut files: Vec<AssetFile>,
        args: &[Value],
    ) -> Result<Vec<AssetFile>, PluginError> {
        for file in &mut files {
            (self.f)(file, args)?;
        }
        Ok(files)
    }
}

/// Joins every file into one.
///
/// Arguments: output path (required), separator (default `"\n"`).
#[derive(Debug, Clone, Copy, Default)]
pub struct Concat;

impl Transform for Concat {
    fn name(&self) -> &str {
        "concat"
    }

    fn apply(&self, files: Vec<AssetFile>, args: &[Value]) -> Result<Vec<AssetFile>, PluginError> {
        let output = args
            .first()
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| PluginError::new("missing output file name").with_kind("ArgumentError"))?;
        let separator = args.get(1).and_then(Value::as_str).unwrap_or("\n");

        let Some(base) = files.first().map(|f| f.base().to_path_buf()) else {
            return Ok(files);
        };

        let mut contents = Vec::new();
        for (i, file) in files.into_iter().enumerate() {
            if i > 0 {
                contents.extend_from_slice(separator.as_bytes());
            }
            contents.extend(file.into_contents());
        }
        Ok(vec![AssetFile::new(base, PathBuf::from(output), contents)])
    }
}

/// Minifies stylesheets with lightningcss.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinifyCss;

impl MinifyCss {
    fn minify(source: &str, filename: &str) -> Result<String, PluginError> {
        let options = ParserOptions {
            filename: filename.to_string(),
            ..ParserOptions::default()
        };
        let stylesheet = StyleSheet::parse(source, options).map_err(|err| {
            let mut plugin_err = PluginError::new(err.kind.to_string())
                .with_kind("SyntaxError")
                .with_filename(filename);
            if let Some(loc) = &err.loc {
                plugin_err = plugin_err.with_line_number(loc.line + 1);
            }
            plugin_err
        })?;
        let result = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..PrinterOptions::default()
            })
            .map_err(|err| PluginError::new(err.to_string()).with_filename(filename))?;
        Ok(result.code)
    }
}

impl Transform for MinifyCss {
    fn name(&self) -> &str {
        "minify-css"
    }

    fn apply(
        &self,
        mut files: Vec<AssetFile>,
        _args: &[Value],
    ) -> Result<Vec<AssetFile>, PluginError> {
        for file in &mut files {
            let filename = file.relative().display().to_string();
            let minified = Self::minify(file.text()?, &filename)?;
            file.set_contents(minified);
        }
        Ok(files)
    }
}
