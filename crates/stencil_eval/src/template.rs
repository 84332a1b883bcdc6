//! Loaded templates.

use rustc_hash::{FxHashMap, FxHashSet};
use stencil_ir::{Instruction, Name};

use crate::Settings;

/// A compiled template as handed over by the loader.
#[derive(Debug)]
pub struct Template {
    name: Name,
    root: Instruction,
    declared: FxHashSet<Name>,
    settings: Settings,
    /// Namespace URI -> prefix, for node handler lookup.
    prefixes: FxHashMap<Name, Name>,
    default_namespace: Option<Name>,
}

impl Template {
    pub fn new(name: &str, root: Instruction) -> Self {
        Template {
            name: name.into(),
            root,
            declared: FxHashSet::default(),
            settings: Settings::default(),
            prefixes: FxHashMap::default(),
            default_namespace: None,
        }
    }

    /// Declare top-level variable names (strict mode accepts writes to these).
    #[must_use]
    pub fn declare(mut self, names: &[&str]) -> Self {
        self.declared.extend(names.iter().map(|n| Name::from(*n)));
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Map a node namespace URI to the prefix its handlers are named with.
    #[must_use]
    pub fn with_prefix(mut self, prefix: &str, uri: &str) -> Self {
        self.prefixes.insert(uri.into(), prefix.into());
        self
    }

    /// Node namespace URI whose handlers are named `D:<name>`.
    #[must_use]
    pub fn with_default_namespace(mut self, uri: &str) -> Self {
        self.default_namespace = Some(uri.into());
        self
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn root(&self) -> &Instruction {
        &self.root
    }

    pub fn declared(&self) -> &FxHashSet<Name> {
        &self.declared
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn prefix_for(&self, uri: &str) -> Option<&Name> {
        self.prefixes.get(uri)
    }

    pub fn default_namespace(&self) -> Option<&Name> {
        self.default_namespace.as_ref()
    }
}
