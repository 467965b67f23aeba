//! Newtype identifiers for names that flow through the adaptation layer.
//!
//! Operation names, resource names, and parameter names are all strings under
//! the hood; wrapping them keeps a resource name from being passed where an
//! operation name is expected.

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id! {
    /// Name of one invocable operation on a capability surface
    /// (e.g. `"ids"`, `"findBySearch"`, `"toneParam"`).
    OperationName
}

string_id! {
    /// Name of a resource as it appears in the request path (e.g. `"greetings"`).
    ResourceName
}

string_id! {
    /// Name of a query, action, or path-key parameter as declared by the resource.
    ParamName
}

impl OperationName {
    /// Builds an operation name from a compile-time constant.
    ///
    /// Only used for the fixed verb and setter names, which are never empty.
    pub(crate) fn fixed(name: &'static str) -> Self {
        debug_assert!(!name.is_empty());
        Self(name.to_string())
    }

    /// Builds an operation name from a naming-convention result.
    ///
    /// Convention results always carry a non-empty prefix or suffix.
    pub(crate) fn derived(name: String) -> Self {
        debug_assert!(!name.is_empty());
        Self(name)
    }
}

impl PartialEq<str> for OperationName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for OperationName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
