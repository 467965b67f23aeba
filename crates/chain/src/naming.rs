//! Naming conventions for dynamically named operations.
//!
//! Both builder generations name their per-resource operations by the same
//! rules, so the wrappers and the generations share these functions. A runtime
//! name appended after a prefix has its first character upper-cased; a name
//! used as the leading part is taken verbatim.

use crate::{OperationName, ResourceMethod};

/// The root operation opening a fixed resource method (`"get"`, `"batchGet"`, ...).
pub fn root_verb(method: ResourceMethod) -> OperationName {
    OperationName::fixed(method.root_operation())
}

/// Upper-cases the first character of `name`.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `<name>Param`, the query-parameter setter.
pub fn query_param_setter(name: &str) -> OperationName {
    OperationName::derived(format!("{name}Param"))
}

/// `add<Name>Param`, which appends to a repeated query parameter.
pub fn add_query_param_setter(name: &str) -> OperationName {
    OperationName::derived(format!("add{}Param", capitalize(name)))
}

/// `param<Name>`, the action-parameter setter.
pub fn action_param_setter(name: &str) -> OperationName {
    OperationName::derived(format!("param{}", capitalize(name)))
}

/// `<name>Key`, the path-key setter for a parent resource key.
pub fn path_key_setter(name: &str) -> OperationName {
    OperationName::derived(format!("{name}Key"))
}

/// `findBy<Name>`, the root operation opening a finder.
pub fn finder_verb(name: &str) -> OperationName {
    OperationName::derived(format!("findBy{}", capitalize(name)))
}

/// `action<Name>`, the root operation opening an action.
pub fn action_verb(name: &str) -> OperationName {
    OperationName::derived(format!("action{}", capitalize(name)))
}
