//! Named transforms for routes declared in configuration files.

use std::collections::HashMap;
use std::sync::Arc;

use crate::pipeline::stage::Transform;
use crate::pipeline::transforms::{Concat, MinifyCss};

/// Lookup table from transform name to transform.
#[derive(Clone, Default)]
pub struct TransformCatalog {
    transforms: HashMap<String, Arc<dyn Transform>>,
}

impl TransformCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding `concat` and `minify-css`.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.register(Concat);
        catalog.register(MinifyCss);
        catalog
    }

    /// Register `transform` under its own name, replacing any previous one.
    pub fn register(&mut self, transform: impl Transform + 'static) -> &mut Self {
        let transform: Arc<dyn Transform> = Arc::new(transform);
        self.transforms.insert(transform.name().to_string(), transform);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Transform>> {
        self.transforms.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.transforms.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
