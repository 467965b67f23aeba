//! Runtime description of one resource.
//!
//! Each builder generation derives its capability tables from a
//! [`ResourceSpec`]: which root verbs exist, which finders and actions can be
//! opened, and which dynamically named setters every method builder exposes.

use std::collections::BTreeSet;

use crate::{ParamName, ResourceMethod, ResourceName, ValueKind};

/// One declared query, action, or path-key parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: ParamName,
    /// Element kind; never [`ValueKind::Iterable`].
    pub kind: ValueKind,
    /// `true` if the parameter carries a list of `kind` values.
    pub repeated: bool,
}

impl ParamSpec {
    /// A single-valued parameter.
    pub fn scalar(name: ParamName, kind: ValueKind) -> Self {
        Self {
            name,
            kind,
            repeated: false,
        }
    }

    /// A list-valued parameter whose elements are of `kind`.
    pub fn repeated(name: ParamName, kind: ValueKind) -> Self {
        Self {
            name,
            kind,
            repeated: true,
        }
    }
}

/// A finder: a named collection query with its own query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinderSpec {
    pub name: String,
    pub params: Vec<ParamSpec>,
}

impl FinderSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }
}

/// An action: a named RPC-style operation with typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSpec {
    pub name: String,
    pub params: Vec<ParamSpec>,
}

impl ActionSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }
}

/// Everything a builder generation needs to know about one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSpec {
    pub name: ResourceName,
    /// Supported fixed methods. `Finder` and `Action` entries are ignored;
    /// finders and actions are declared individually.
    pub methods: BTreeSet<ResourceMethod>,
    pub finders: Vec<FinderSpec>,
    pub actions: Vec<ActionSpec>,
    /// Keys of parent resources, settable on every method builder.
    pub path_keys: Vec<ParamSpec>,
}

impl ResourceSpec {
    pub fn new(name: ResourceName) -> Self {
        Self {
            name,
            methods: BTreeSet::new(),
            finders: Vec::new(),
            actions: Vec::new(),
            path_keys: Vec::new(),
        }
    }

    pub fn with_methods(mut self, methods: impl IntoIterator<Item = ResourceMethod>) -> Self {
        self.methods.extend(
            methods
                .into_iter()
                .filter(|m| !matches!(m, ResourceMethod::Finder | ResourceMethod::Action)),
        );
        self
    }

    pub fn with_finder(mut self, finder: FinderSpec) -> Self {
        self.finders.push(finder);
        self
    }

    pub fn with_action(mut self, action: ActionSpec) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_path_key(mut self, key: ParamSpec) -> Self {
        self.path_keys.push(key);
        self
    }
}
