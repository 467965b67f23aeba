//! Shared value types for the adaptation layer.
//!
//! These are the values that cross the boundary between calling test logic,
//! the fluent wrappers, and the builder generations: tagged parameter values,
//! field projections, patch documents, and the generation-neutral request a
//! terminal build produces.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::marker::PhantomData;

use crate::errors::ShimError;
use crate::{OperationName, ResourceName};

// ---------------------------------------------------------------------------
// Key and entity bounds
// ---------------------------------------------------------------------------

/// Bound satisfied by every resource key type (`i64`, strings, compound keys).
///
/// Keys are ordered so keyed batch inputs have a deterministic iteration order.
pub trait ResourceKey: Clone + Ord + fmt::Debug + 'static {}

impl<T> ResourceKey for T where T: Clone + Ord + fmt::Debug + 'static {}

/// Bound satisfied by every entity (record) type carried as request input.
pub trait Record: Clone + PartialEq + fmt::Debug + 'static {}

impl<T> Record for T where T: Clone + PartialEq + fmt::Debug + 'static {}

// ---------------------------------------------------------------------------
// Tagged parameter values
// ---------------------------------------------------------------------------

/// Runtime shape of a [`ParamValue`], used to pick between setter overloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Int,
    Long,
    Double,
    Bool,
    Bytes,
    /// Any ordered sequence of values.
    Iterable,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueKind::String => "string",
            ValueKind::Int => "int",
            ValueKind::Long => "long",
            ValueKind::Double => "double",
            ValueKind::Bool => "bool",
            ValueKind::Bytes => "bytes",
            ValueKind::Iterable => "iterable",
        };
        f.write_str(s)
    }
}

/// A parameter value with an explicit type tag.
///
/// Dynamically named setters dispatch on the tag rather than probing a value's
/// type at runtime. [`ParamValue::Absent`] still names the kind it stands in
/// for, so an absent value resolves to exactly one overload.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    String(String),
    Int(i32),
    Long(i64),
    Double(f64),
    Bool(bool),
    Bytes(Vec<u8>),
    List(Vec<ParamValue>),
    /// No value; the setter clears the parameter.
    Absent(ValueKind),
}

impl ParamValue {
    /// Returns the kind used for overload selection.
    ///
    /// For [`ParamValue::Absent`] this is the carried tag.
    pub fn kind(&self) -> ValueKind {
        match self {
            ParamValue::String(_) => ValueKind::String,
            ParamValue::Int(_) => ValueKind::Int,
            ParamValue::Long(_) => ValueKind::Long,
            ParamValue::Double(_) => ValueKind::Double,
            ParamValue::Bool(_) => ValueKind::Bool,
            ParamValue::Bytes(_) => ValueKind::Bytes,
            ParamValue::List(_) => ValueKind::Iterable,
            ParamValue::Absent(kind) => *kind,
        }
    }

    /// Returns `true` for [`ParamValue::Absent`].
    pub fn is_absent(&self) -> bool {
        matches!(self, ParamValue::Absent(_))
    }

    /// Collects any iterator of convertible values into a [`ParamValue::List`].
    pub fn list<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ParamValue>,
    {
        ParamValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::String(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::String(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Long(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Double(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(v: Vec<T>) -> Self {
        ParamValue::list(v)
    }
}

// ---------------------------------------------------------------------------
// Field projection and patches
// ---------------------------------------------------------------------------

/// A path to one field of an entity, used for field projection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PathSpec(Vec<String>);

impl PathSpec {
    /// Creates a path from its segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Parses a `/`-separated path such as `"/message"` or `"sender/name"`.
    ///
    /// Empty segments are dropped, so `"/"` yields an empty path.
    pub fn parse(path: &str) -> Self {
        Self::new(path.split('/').filter(|s| !s.is_empty()))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PathSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

/// A partial-update document for an entity of type `V`.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchRequest<V> {
    set: BTreeMap<String, ParamValue>,
    remove: BTreeSet<String>,
    _entity: PhantomData<fn() -> V>,
}

impl<V> PatchRequest<V> {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self {
            set: BTreeMap::new(),
            remove: BTreeSet::new(),
            _entity: PhantomData,
        }
    }

    /// Sets `field` to `value`, cancelling any earlier removal of the same field.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        let field = field.into();
        self.remove.remove(&field);
        self.set.insert(field, value.into());
        self
    }

    /// Removes `field`, cancelling any earlier assignment of the same field.
    pub fn remove(mut self, field: impl Into<String>) -> Self {
        let field = field.into();
        self.set.remove(&field);
        self.remove.insert(field);
        self
    }

    pub fn set_fields(&self) -> &BTreeMap<String, ParamValue> {
        &self.set
    }

    pub fn removed_fields(&self) -> &BTreeSet<String> {
        &self.remove
    }

    /// Returns `true` if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.remove.is_empty()
    }
}

impl<V> Default for PatchRequest<V> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Protocol and method descriptors
// ---------------------------------------------------------------------------

/// Version of the wire protocol a builder generation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProtocolVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ProtocolVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// The resource method a method-specific builder produces a request for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceMethod {
    Get,
    Create,
    Update,
    Delete,
    PartialUpdate,
    BatchGet,
    BatchCreate,
    BatchUpdate,
    BatchPartialUpdate,
    BatchDelete,
    GetAll,
    Options,
    Finder,
    Action,
}

impl ResourceMethod {
    /// The fixed root operation name for this method.
    ///
    /// Finders and actions are named per finder/action; see [`crate::naming`].
    pub fn root_operation(self) -> &'static str {
        match self {
            ResourceMethod::Get => "get",
            ResourceMethod::Create => "create",
            ResourceMethod::Update => "update",
            ResourceMethod::Delete => "delete",
            ResourceMethod::PartialUpdate => "partialUpdate",
            ResourceMethod::BatchGet => "batchGet",
            ResourceMethod::BatchCreate => "batchCreate",
            ResourceMethod::BatchUpdate => "batchUpdate",
            ResourceMethod::BatchPartialUpdate => "batchPartialUpdate",
            ResourceMethod::BatchDelete => "batchDelete",
            ResourceMethod::GetAll => "getAll",
            ResourceMethod::Options => "options",
            ResourceMethod::Finder => "findBy",
            ResourceMethod::Action => "action",
        }
    }

    /// The response shape a plain `build` of this method yields.
    pub fn response_kind(self) -> ResponseKind {
        match self {
            ResourceMethod::Get => ResponseKind::Entity,
            ResourceMethod::Create
            | ResourceMethod::Update
            | ResourceMethod::Delete
            | ResourceMethod::PartialUpdate => ResponseKind::Empty,
            ResourceMethod::BatchGet => ResponseKind::Batch,
            ResourceMethod::BatchCreate | ResourceMethod::GetAll | ResourceMethod::Finder => {
                ResponseKind::Collection
            }
            ResourceMethod::BatchUpdate
            | ResourceMethod::BatchPartialUpdate
            | ResourceMethod::BatchDelete => ResponseKind::BatchKv,
            ResourceMethod::Options => ResponseKind::Options,
            ResourceMethod::Action => ResponseKind::Action,
        }
    }
}

impl fmt::Display for ResourceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.root_operation())
    }
}

/// Shape of the response a built request expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    Entity,
    Empty,
    Batch,
    Collection,
    BatchKv,
    Options,
    Action,
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResponseKind::Entity => "entity",
            ResponseKind::Empty => "empty",
            ResponseKind::Batch => "batch",
            ResponseKind::Collection => "collection",
            ResponseKind::BatchKv => "batch_kv",
            ResponseKind::Options => "options",
            ResponseKind::Action => "action",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Response type markers
// ---------------------------------------------------------------------------

/// Ties a response type marker to the [`ResponseKind`] its requests carry.
///
/// The markers below are never constructed; they only parameterise
/// [`Request`] so the transport knows what to decode into.
pub trait ResponseType {
    const KIND: ResponseKind;
}

macro_rules! response_marker {
    (
        $(#[$attr:meta])*
        $name:ident < $($param:ident),+ > => $kind:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug)]
        pub struct $name<$($param),+> {
            _marker: PhantomData<fn() -> ($($param,)+)>,
        }

        impl<$($param),+> ResponseType for $name<$($param),+> {
            const KIND: ResponseKind = ResponseKind::$kind;
        }
    };
    (
        $(#[$attr:meta])*
        $name:ident => $kind:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug)]
        pub struct $name {
            _marker: PhantomData<()>,
        }

        impl ResponseType for $name {
            const KIND: ResponseKind = ResponseKind::$kind;
        }
    };
}

response_marker! {
    /// A single entity of type `V`.
    EntityResponse<V> => Entity
}

response_marker! {
    /// No payload; only the status matters.
    EmptyRecord => Empty
}

response_marker! {
    /// Entities keyed by their string-encoded ids.
    BatchResponse<V> => Batch
}

response_marker! {
    /// An ordered page of `T` (entities, or create statuses for batch create).
    CollectionResponse<T> => Collection
}

response_marker! {
    /// Per-key results of type `T` keyed by the typed key `K`.
    BatchKvResponse<K, T> => BatchKv
}

/// Status of one created entity; element type of a batch-create collection.
#[derive(Debug)]
pub struct CreateStatus {
    _marker: PhantomData<()>,
}

/// Status of one updated or deleted entity; value type of batch update results.
#[derive(Debug)]
pub struct UpdateStatus {
    _marker: PhantomData<()>,
}

response_marker! {
    /// Resource metadata returned by the options method.
    OptionsResponse => Options
}

response_marker! {
    /// The return value of an action, of type `T`.
    ActionResponse<T> => Action
}

// ---------------------------------------------------------------------------
// Built requests
// ---------------------------------------------------------------------------

/// Paging window for collection-returning methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Paging {
    pub start: Option<u32>,
    pub count: Option<u32>,
}

/// Request body accumulated by the `input`/`inputs` setters.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestInput<K, V> {
    None,
    Entity(V),
    Patch(PatchRequest<V>),
    Entities(Vec<V>),
    EntityMap(BTreeMap<K, V>),
    PatchMap(BTreeMap<K, PatchRequest<V>>),
}

impl<K, V> Default for RequestInput<K, V> {
    fn default() -> Self {
        RequestInput::None
    }
}

/// A generation-neutral request, as produced by a terminal build.
///
/// Both generations translate their own built request into this shape. The
/// typed wrappers [`Request`] and [`KeyedBatchRequest`] check
/// [`RequestData::response`] before handing the data out.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestData<K, V> {
    pub method: ResourceMethod,
    pub response: ResponseKind,
    pub protocol: ProtocolVersion,
    pub resource: ResourceName,
    /// Finder or action name, `None` for the fixed methods.
    pub method_name: Option<OperationName>,
    pub id: Option<K>,
    pub ids: Vec<K>,
    pub input: RequestInput<K, V>,
    pub fields: Vec<PathSpec>,
    pub query_params: BTreeMap<String, ParamValue>,
    pub action_params: BTreeMap<String, ParamValue>,
    pub path_keys: BTreeMap<String, ParamValue>,
    pub assoc_key: BTreeMap<String, ParamValue>,
    pub headers: BTreeMap<String, String>,
    pub paging: Paging,
}

impl<K, V> RequestData<K, V> {
    /// Creates an empty request for `method` on `resource`.
    pub fn new(method: ResourceMethod, protocol: ProtocolVersion, resource: ResourceName) -> Self {
        Self {
            method,
            response: method.response_kind(),
            protocol,
            resource,
            method_name: None,
            id: None,
            ids: Vec::new(),
            input: RequestInput::None,
            fields: Vec::new(),
            query_params: BTreeMap::new(),
            action_params: BTreeMap::new(),
            path_keys: BTreeMap::new(),
            assoc_key: BTreeMap::new(),
            headers: BTreeMap::new(),
            paging: Paging::default(),
        }
    }
}

/// A built request whose response decodes into `R`.
pub struct Request<K, V, R> {
    data: RequestData<K, V>,
    _response: PhantomData<fn() -> R>,
}

// Manual impls: `R` is a marker and must not pick up derive bounds.
impl<K: fmt::Debug, V: fmt::Debug, R> fmt::Debug for Request<K, V, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request").field("data", &self.data).finish()
    }
}

impl<K: Clone, V: Clone, R> Clone for Request<K, V, R> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            _response: PhantomData,
        }
    }
}

impl<K: PartialEq, V: PartialEq, R> PartialEq for Request<K, V, R> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl<K, V, R> Request<K, V, R> {
    pub fn data(&self) -> &RequestData<K, V> {
        &self.data
    }

    pub fn into_data(self) -> RequestData<K, V> {
        self.data
    }

    pub fn method(&self) -> ResourceMethod {
        self.data.method
    }

    pub fn protocol(&self) -> ProtocolVersion {
        self.data.protocol
    }
}

impl<K, V, R: ResponseType> TryFrom<RequestData<K, V>> for Request<K, V, R> {
    type Error = ShimError;

    fn try_from(data: RequestData<K, V>) -> Result<Self, Self::Error> {
        if data.response != R::KIND {
            return Err(ShimError::TypeMismatch {
                expected: R::KIND,
                actual: data.response,
            });
        }
        Ok(Self {
            data,
            _response: PhantomData,
        })
    }
}

/// A batch-get request whose response is keyed by the typed key `K`.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedBatchRequest<K, V> {
    data: RequestData<K, V>,
}

impl<K, V> KeyedBatchRequest<K, V> {
    pub fn data(&self) -> &RequestData<K, V> {
        &self.data
    }

    pub fn into_data(self) -> RequestData<K, V> {
        self.data
    }

    pub fn ids(&self) -> &[K] {
        &self.data.ids
    }
}

impl<K, V> TryFrom<RequestData<K, V>> for KeyedBatchRequest<K, V> {
    type Error = ShimError;

    fn try_from(data: RequestData<K, V>) -> Result<Self, Self::Error> {
        if data.method != ResourceMethod::BatchGet || data.response != ResponseKind::BatchKv {
            return Err(ShimError::TypeMismatch {
                expected: ResponseKind::BatchKv,
                actual: data.response,
            });
        }
        Ok(Self { data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(method: ResourceMethod) -> RequestData<i64, String> {
        RequestData::new(
            method,
            ProtocolVersion::new(2, 0, 0),
            ResourceName::new("greetings").expect("non-empty"),
        )
    }

    #[test]
    fn test_param_value_kind_follows_tag() {
        assert_eq!(ParamValue::from("a").kind(), ValueKind::String);
        assert_eq!(ParamValue::from(1_i32).kind(), ValueKind::Int);
        assert_eq!(ParamValue::from(1_i64).kind(), ValueKind::Long);
        assert_eq!(ParamValue::from(vec![1_i32, 2]).kind(), ValueKind::Iterable);
        assert_eq!(ParamValue::Absent(ValueKind::Bool).kind(), ValueKind::Bool);
        assert!(ParamValue::Absent(ValueKind::Bool).is_absent());
    }

    #[test]
    fn test_path_spec_parse_and_display() {
        let path = PathSpec::parse("/sender//name");
        assert_eq!(path.segments(), ["sender", "name"]);
        assert_eq!(path.to_string(), "/sender/name");
        assert!(PathSpec::parse("/").is_empty());
    }

    #[test]
    fn test_patch_set_and_remove_cancel_each_other() {
        let patch: PatchRequest<String> = PatchRequest::new().remove("tone").set("tone", "SINCERE");
        assert!(patch.removed_fields().is_empty());
        assert_eq!(patch.set_fields().get("tone"), Some(&ParamValue::from("SINCERE")));

        let patch = patch.remove("tone");
        assert!(patch.set_fields().is_empty());
        assert!(patch.removed_fields().contains("tone"));
    }

    #[test]
    fn test_request_conversion_checks_response_kind() {
        let typed: Result<Request<i64, String, EntityResponse<String>>, _> =
            data(ResourceMethod::Get).try_into();
        assert!(typed.is_ok());

        let mismatched: Result<Request<i64, String, EmptyRecord>, _> =
            data(ResourceMethod::Get).try_into();
        assert!(matches!(
            mismatched,
            Err(ShimError::TypeMismatch {
                expected: ResponseKind::Empty,
                actual: ResponseKind::Entity
            })
        ));
    }

    #[test]
    fn test_keyed_batch_requires_batch_get_kv() {
        let mut kv = data(ResourceMethod::BatchGet);
        kv.response = ResponseKind::BatchKv;
        assert!(KeyedBatchRequest::try_from(kv).is_ok());

        let plain = data(ResourceMethod::BatchGet);
        assert!(KeyedBatchRequest::try_from(plain).is_err());

        let batch_update = data(ResourceMethod::BatchUpdate);
        assert!(KeyedBatchRequest::try_from(batch_update).is_err());
    }
}
