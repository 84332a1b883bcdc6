//! Template lookup.
//!
//! Loading and caching templates from storage is the embedder's concern;
//! the renderer only asks a [`TemplateRegistry`] for a template by its
//! absolute name.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use stencil_ir::Name;
use stencil_value::{template_not_found, RenderResult};

use crate::Template;

/// Resolves absolute template names to loaded templates.
pub trait TemplateRegistry: Send + Sync + fmt::Debug {
    fn get_template(&self, name: &str) -> RenderResult<Arc<Template>>;
}

/// Resolve `name` relative to the template named `base`.
///
/// Names starting with `/` are absolute; others are relative to `base`'s
/// directory. `.` and `..` segments are collapsed, and `..` never climbs
/// above the root. The result has no leading slash.
pub fn to_absolute_name(base: &str, name: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    if !name.starts_with('/') {
        if let Some((dir, _)) = base.trim_start_matches('/').rsplit_once('/') {
            segments.extend(dir.split('/'));
        }
    }
    for segment in name.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// In-memory registry keyed by absolute name.
#[derive(Default)]
pub struct MemoryRegistry {
    templates: RwLock<FxHashMap<Name, Arc<Template>>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template under its own (absolute) name, replacing any
    /// previous template with that name.
    pub fn insert(&self, template: Template) -> Arc<Template> {
        let template = Arc::new(template);
        self.templates
            .write()
            .insert(Arc::clone(template.name()), Arc::clone(&template));
        template
    }

    pub fn len(&self) -> usize {
        self.templates.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.read().is_empty()
    }
}

impl TemplateRegistry for MemoryRegistry {
    fn get_template(&self, name: &str) -> RenderResult<Arc<Template>> {
        self.templates
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| template_not_found(name))
    }
}

impl fmt::Debug for MemoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let templates = self.templates.read();
        let mut names: Vec<&str> = templates.keys().map(|n| &**n).collect();
        names.sort_unstable();
        f.debug_struct("MemoryRegistry")
            .field("templates", &names)
            .finish()
    }
}
