//! Extension alias table.
//!
//! # Responsibilities
//! - Record which file extensions are interchangeable for routing
//! - Rewrite a pattern's trailing extension into a brace alternation
//!
//! # Design Decisions
//! - Associations are symmetric: `alias(css, scss)` makes each resolvable to the other
//! - Only direct associations are expanded (no transitive closure)
//! - Group order is registration order so generated globs are deterministic

use std::collections::HashMap;

use crate::routing::registry::RegistryError;

/// Aliases registered by every server.
pub const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("css", "scss"),
    ("css", "sass"),
    ("css", "less"),
    ("js", "coffee"),
];

const RESERVED: &[char] = &['/', '\\', '*', '?', '[', ']', '{', '}', ',', '!', '.'];

/// Mapping from an extension to the extensions considered equivalent.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: HashMap<String, Vec<String>>,
}

impl AliasTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table holding [`DEFAULT_ALIASES`].
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        for (ext, alias) in DEFAULT_ALIASES {
            table.link(ext, alias);
            table.link(alias, ext);
        }
        table
    }

    /// Associate `ext` with `alias` in both directions.
    ///
    /// A leading dot is ignored. Registering an existing pair is a no-op.
    pub fn alias(&mut self, ext: &str, alias: &str) -> Result<(), RegistryError> {
        let ext = normalize(ext)?;
        let alias = normalize(alias)?;
        if ext == alias {
            return Ok(());
        }
        self.link(ext, alias);
        self.link(alias, ext);
        Ok(())
    }

    /// Merge a whole `ext -> [aliases]` mapping.
    pub fn merge<I, K, V, A>(&mut self, map: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: IntoIterator<Item = A>,
        A: AsRef<str>,
    {
        for (ext, aliases) in map {
            for alias in aliases {
                self.alias(ext.as_ref(), alias.as_ref())?;
            }
        }
        Ok(())
    }

    /// Extensions directly associated with `ext`.
    pub fn aliases(&self, ext: &str) -> &[String] {
        self.entries.get(ext).map(Vec::as_slice).unwrap_or_default()
    }

    /// `{ext,alias,...}` for an extension with aliases, `None` otherwise.
    pub fn alternation(&self, ext: &str) -> Option<String> {
        let aliases = self.entries.get(ext)?;
        let mut group = Vec::with_capacity(aliases.len() + 1);
        group.push(ext);
        group.extend(aliases.iter().map(String::as_str));
        Some(format!("{{{}}}", group.join(",")))
    }

    /// Rewrite the trailing extension of `pattern` into its alternation.
    ///
    /// `**/*.css` becomes `**/*.{css,scss,sass,less}`; patterns whose
    /// extension has no aliases are returned unchanged.
    pub fn expand(&self, pattern: &str) -> String {
        match split_extension(pattern) {
            Some((stem, ext)) => match self.alternation(ext) {
                Some(group) => format!("{stem}.{group}"),
                None => pattern.to_string(),
            },
            None => pattern.to_string(),
        }
    }

    fn link(&mut self, from: &str, to: &str) {
        let group = self.entries.entry(from.to_string()).or_default();
        if !group.iter().any(|e| e == to) {
            group.push(to.to_string());
        }
    }
}

/// Split `path` at the last `.` of its final segment.
///
/// Returns `None` when the final segment has no extension or is a dotfile.
pub(crate) fn split_extension(path: &str) -> Option<(&str, &str)> {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    let dot = name_start + path[name_start..].rfind('.')?;
    if dot == name_start || dot + 1 == path.len() {
        return None;
    }
    Some((&path[..dot], &path[dot + 1..]))
}

fn normalize(ext: &str) -> Result<&str, RegistryError> {
    let ext = ext.strip_prefix('.').unwrap_or(ext);
    if ext.is_empty() || ext.contains(RESERVED) || ext.contains(char::is_whitespace) {
        return Err(RegistryError::InvalidArgument(format!(
            "`{ext}` is not a valid extension alias"
        )));
    }
    Ok(ext)
}
