//! Port traits for the builder generations.
//!
//! A generation plugs into the fluent wrappers by implementing
//! [`RootSurface`] for its root builders and [`MethodSurface`] for its
//! method-specific builders. Both advertise what they can do as a
//! [`CapabilitySet`] of [`OperationSignature`]s; the resolver consults that
//! set before anything is invoked.
//!
//! The fixed operation table is the closed enum [`SetterCall`], so the
//! generations translate each variant into their own calls instead of being
//! probed by name. Only the dynamically named setters (query, action, and
//! path-key parameters) are addressed by name, with a tagged [`ParamValue`].
//!
//! ## Handle semantics
//!
//! Every operation takes `&self` and returns a *new* handle. The handle an
//! operation was invoked on stays valid and unchanged. Handles are not
//! required to be `Send` or `Sync`; a chain is traversed by one owner.

use std::collections::BTreeMap;
use std::fmt;

use crate::errors::OperationFault;
use crate::{OperationName, ParamValue, PatchRequest, PathSpec, RequestData, ValueKind};

// ---------------------------------------------------------------------------
// Signatures
// ---------------------------------------------------------------------------

/// Type of one parameter in an operation signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// One resource key.
    Key,
    /// A collection of resource keys.
    KeyCollection,
    /// A variadic array of resource keys.
    KeyArray,
    /// One entity.
    Entity,
    /// One patch document.
    Patch,
    /// An ordered list of entities.
    EntityList,
    /// A mapping from resource key to entity or patch.
    KeyedMap,
    /// A variadic array of field paths.
    PathSpecArray,
    /// A string.
    Text,
    /// A 32-bit integer.
    Integer,
    /// Any tagged parameter value.
    Dynamic,
    /// A tagged parameter value of exactly this kind.
    Value(ValueKind),
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Key => f.write_str("Key"),
            ParamType::KeyCollection => f.write_str("Collection<Key>"),
            ParamType::KeyArray => f.write_str("Key[]"),
            ParamType::Entity => f.write_str("Entity"),
            ParamType::Patch => f.write_str("Patch"),
            ParamType::EntityList => f.write_str("List<Entity>"),
            ParamType::KeyedMap => f.write_str("Map<Key, _>"),
            ParamType::PathSpecArray => f.write_str("PathSpec[]"),
            ParamType::Text => f.write_str("String"),
            ParamType::Integer => f.write_str("int"),
            ParamType::Dynamic => f.write_str("Object"),
            ParamType::Value(kind) => write!(f, "{kind}"),
        }
    }
}

/// An operation name plus its ordered parameter types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationSignature {
    pub name: OperationName,
    pub params: Vec<ParamType>,
}

impl OperationSignature {
    pub fn new(name: OperationName, params: impl Into<Vec<ParamType>>) -> Self {
        Self {
            name,
            params: params.into(),
        }
    }

    /// A signature taking no parameters (root verbs, terminal builds).
    pub fn nullary(name: OperationName) -> Self {
        Self::new(name, Vec::new())
    }

    /// A dynamically named setter accepting one value of `kind`.
    pub fn named(name: OperationName, kind: ValueKind) -> Self {
        Self::new(name, vec![ParamType::Value(kind)])
    }

    pub(crate) fn fixed(name: &'static str, params: &[ParamType]) -> Self {
        Self::new(OperationName::fixed(name), params.to_vec())
    }

    /// Renders the parameter list, e.g. `"Key, Patch"`.
    pub fn render_params(&self) -> String {
        self.params
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for OperationSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.render_params())
    }
}

/// Every operation one handle exposes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    operations: Vec<OperationSignature>,
}

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a signature; duplicates are ignored.
    pub fn insert(&mut self, signature: OperationSignature) {
        if !self.operations.contains(&signature) {
            self.operations.push(signature);
        }
    }

    pub fn with(mut self, signature: OperationSignature) -> Self {
        self.insert(signature);
        self
    }

    pub fn contains(&self, signature: &OperationSignature) -> bool {
        self.operations.contains(signature)
    }

    /// All overloads sharing `name`, in insertion order.
    pub fn overloads<'a>(
        &'a self,
        name: &'a OperationName,
    ) -> impl Iterator<Item = &'a OperationSignature> + 'a {
        self.operations.iter().filter(move |s| &s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OperationSignature> {
        self.operations.iter()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Adds the signatures of fixed-table setters.
    pub fn with_setters(mut self, setters: impl IntoIterator<Item = Setter>) -> Self {
        self.extend(setters.into_iter().map(Setter::signature));
        self
    }

    /// The fixed setters every method builder of a generation exposes.
    pub fn common_setters() -> Self {
        Self::new().with_setters([Setter::Header, Setter::Param, Setter::Name, Setter::AssocKey])
    }
}

impl Extend<OperationSignature> for CapabilitySet {
    fn extend<I: IntoIterator<Item = OperationSignature>>(&mut self, iter: I) {
        for signature in iter {
            self.insert(signature);
        }
    }
}

// ---------------------------------------------------------------------------
// The fixed operation table
// ---------------------------------------------------------------------------

/// One call from the fixed setter table, with its typed arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum SetterCall<K, V> {
    Id(K),
    Ids(Vec<K>),
    IdsArray(Vec<K>),
    Input(V),
    InputPatch(PatchRequest<V>),
    KeyedInput(K, V),
    KeyedPatch(K, PatchRequest<V>),
    Inputs(Vec<V>),
    InputMap(BTreeMap<K, V>),
    PatchInputs(BTreeMap<K, PatchRequest<V>>),
    Fields(Vec<PathSpec>),
    Name(String),
    AssocKey(String, ParamValue),
    Paginate { start: i32, count: i32 },
    PaginateStart(i32),
    PaginateCount(i32),
    Header(String, String),
    Param(String, ParamValue),
}

impl<K, V> SetterCall<K, V> {
    /// Which entry of the fixed table this call invokes.
    pub fn setter(&self) -> Setter {
        match self {
            SetterCall::Id(_) => Setter::Id,
            SetterCall::Ids(_) => Setter::Ids,
            SetterCall::IdsArray(_) => Setter::IdsArray,
            SetterCall::Input(_) => Setter::Input,
            SetterCall::InputPatch(_) => Setter::InputPatch,
            SetterCall::KeyedInput(..) => Setter::KeyedInput,
            SetterCall::KeyedPatch(..) => Setter::KeyedPatch,
            SetterCall::Inputs(_) => Setter::Inputs,
            SetterCall::InputMap(_) | SetterCall::PatchInputs(_) => Setter::KeyedInputs,
            SetterCall::Fields(_) => Setter::Fields,
            SetterCall::Name(_) => Setter::Name,
            SetterCall::AssocKey(..) => Setter::AssocKey,
            SetterCall::Paginate { .. } => Setter::Paginate,
            SetterCall::PaginateStart(_) => Setter::PaginateStart,
            SetterCall::PaginateCount(_) => Setter::PaginateCount,
            SetterCall::Header(..) => Setter::Header,
            SetterCall::Param(..) => Setter::Param,
        }
    }

    /// The exact signature this call resolves against.
    pub fn signature(&self) -> OperationSignature {
        self.setter().signature()
    }
}

/// An entry of the fixed setter table, without arguments.
///
/// Generations list these to advertise which fixed setters a builder exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Setter {
    Id,
    Ids,
    IdsArray,
    Input,
    InputPatch,
    KeyedInput,
    KeyedPatch,
    Inputs,
    /// `inputs(Map)`, shared by keyed entities and keyed patches.
    KeyedInputs,
    Fields,
    Name,
    AssocKey,
    Paginate,
    PaginateStart,
    PaginateCount,
    Header,
    Param,
}

impl Setter {
    pub fn signature(self) -> OperationSignature {
        use ParamType::*;
        let (name, params): (&'static str, &[ParamType]) = match self {
            Setter::Id => ("id", &[Key]),
            Setter::Ids => ("ids", &[KeyCollection]),
            Setter::IdsArray => ("ids", &[KeyArray]),
            Setter::Input => ("input", &[Entity]),
            Setter::InputPatch => ("input", &[Patch]),
            Setter::KeyedInput => ("input", &[Key, Entity]),
            Setter::KeyedPatch => ("input", &[Key, Patch]),
            Setter::Inputs => ("inputs", &[EntityList]),
            Setter::KeyedInputs => ("inputs", &[KeyedMap]),
            Setter::Fields => ("fields", &[PathSpecArray]),
            Setter::Name => ("name", &[Text]),
            Setter::AssocKey => ("assocKey", &[Text, Dynamic]),
            Setter::Paginate => ("paginate", &[Integer, Integer]),
            Setter::PaginateStart => ("paginateStart", &[Integer]),
            Setter::PaginateCount => ("paginateCount", &[Integer]),
            Setter::Header => ("setHeader", &[Text, Text]),
            Setter::Param => ("setParam", &[Text, Dynamic]),
        };
        OperationSignature::fixed(name, params)
    }
}

/// The zero-argument terminal operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terminal {
    /// `build`, yielding the method's plain request.
    Build,
    /// `buildKV`, yielding a batch-get request keyed by typed keys.
    BuildKv,
}

impl Terminal {
    pub fn signature(self) -> OperationSignature {
        match self {
            Terminal::Build => OperationSignature::fixed("build", &[]),
            Terminal::BuildKv => OperationSignature::fixed("buildKV", &[]),
        }
    }
}

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// An owned method-builder handle of some generation.
pub type MethodHandle<K, V> = Box<dyn MethodSurface<K, V>>;

/// Root builders of one generation for one resource.
pub trait RootSurface<K, V>: fmt::Debug {
    /// Zero-argument root operations (`"get"`, `"findBySearch"`, ...).
    fn capabilities(&self) -> &CapabilitySet;

    /// Opens a fresh method builder for a root operation listed in
    /// [`RootSurface::capabilities`].
    fn open(&self, verb: &OperationName) -> Result<MethodHandle<K, V>, OperationFault>;
}

/// A method-specific builder of one generation.
pub trait MethodSurface<K, V>: fmt::Debug {
    /// Operations this handle exposes, including terminal builds and the
    /// dynamically named setters.
    fn capabilities(&self) -> &CapabilitySet;

    /// Applies one fixed-table setter, returning the continued handle.
    fn apply(&self, call: SetterCall<K, V>) -> Result<MethodHandle<K, V>, OperationFault>;

    /// Invokes a dynamically named setter with a value whose kind matches
    /// the signature's single parameter.
    fn set_named(
        &self,
        setter: &OperationSignature,
        value: ParamValue,
    ) -> Result<MethodHandle<K, V>, OperationFault>;

    /// Builds the request accumulated so far.
    fn build(&self, terminal: Terminal) -> Result<RequestData<K, V>, OperationFault>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_input_overloads_have_distinct_signatures() {
        let entity: SetterCall<i64, String> = SetterCall::Input("hi".into());
        let patch: SetterCall<i64, String> = SetterCall::InputPatch(PatchRequest::new());
        let keyed: SetterCall<i64, String> = SetterCall::KeyedInput(1, "hi".into());

        assert_ne!(entity.signature(), patch.signature());
        assert_ne!(entity.signature(), keyed.signature());
        assert_eq!(entity.signature().name, "input");
        assert_eq!(keyed.signature().to_string(), "input(Key, Entity)");
    }

    #[test]
    fn test_keyed_maps_share_one_signature() {
        let entities: SetterCall<i64, String> = SetterCall::InputMap(BTreeMap::new());
        let patches: SetterCall<i64, String> = SetterCall::PatchInputs(BTreeMap::new());
        assert_eq!(entities.signature(), patches.signature());
    }

    #[test]
    fn test_capability_set_ignores_duplicates_and_groups_overloads() {
        let name = OperationName::new("toneParam").expect("non-empty");
        let mut caps = CapabilitySet::new();
        caps.insert(OperationSignature::named(name.clone(), ValueKind::String));
        caps.insert(OperationSignature::named(name.clone(), ValueKind::Iterable));
        caps.insert(OperationSignature::named(name.clone(), ValueKind::String));
        caps.insert(Terminal::Build.signature());

        assert_eq!(caps.len(), 3);
        assert_eq!(caps.overloads(&name).count(), 2);
        assert!(caps.contains(&Terminal::Build.signature()));
        assert!(!caps.contains(&Terminal::BuildKv.signature()));
    }
}
