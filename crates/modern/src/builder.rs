//! Native modern request builder.
//!
//! Modern builders consume themselves and return the continued builder, so
//! a value is never observed half-updated. State accumulates directly into
//! the neutral [`RequestData`]; `build` only validates and hands out a copy.

use std::collections::BTreeMap;

use chain::{
    OperationName, ParamValue, PatchRequest, PathSpec, ProtocolVersion, RequestData, RequestInput,
    ResourceMethod, ResourceName, ResponseKind, RuntimeFailure,
};

use crate::errors::ModernBuilderError;

/// Protocol version every modern request targets.
pub const MODERN_PROTOCOL: ProtocolVersion = ProtocolVersion::new(2, 0, 0);

/// Consuming request builder for one resource method.
#[derive(Debug, Clone)]
pub struct ModernRequestBuilder<K, V> {
    data: RequestData<K, V>,
}

impl<K: Clone + Ord, V: Clone> ModernRequestBuilder<K, V> {
    pub fn new(method: ResourceMethod, resource: ResourceName) -> Self {
        Self {
            data: RequestData::new(method, MODERN_PROTOCOL, resource),
        }
    }

    pub fn method(&self) -> ResourceMethod {
        self.data.method
    }

    pub fn id(mut self, id: K) -> Self {
        self.data.id = Some(id);
        self
    }

    /// Appends ids to those already set.
    pub fn ids(mut self, ids: impl IntoIterator<Item = K>) -> Self {
        self.data.ids.extend(ids);
        self
    }

    pub fn input(mut self, entity: V) -> Self {
        self.data.input = RequestInput::Entity(entity);
        self
    }

    pub fn input_patch(mut self, patch: PatchRequest<V>) -> Self {
        self.data.input = RequestInput::Patch(patch);
        self
    }

    pub fn keyed_input(mut self, id: K, entity: V) -> Result<Self, ModernBuilderError> {
        match &mut self.data.input {
            RequestInput::None => {
                self.data.input = RequestInput::EntityMap(BTreeMap::from([(id, entity)]));
            }
            RequestInput::EntityMap(map) => {
                map.insert(id, entity);
            }
            _ => return Err(self.unexpected("a keyed entity")),
        }
        Ok(self)
    }

    pub fn keyed_patch(mut self, id: K, patch: PatchRequest<V>) -> Result<Self, ModernBuilderError> {
        match &mut self.data.input {
            RequestInput::None => {
                self.data.input = RequestInput::PatchMap(BTreeMap::from([(id, patch)]));
            }
            RequestInput::PatchMap(map) => {
                map.insert(id, patch);
            }
            _ => return Err(self.unexpected("a keyed patch")),
        }
        Ok(self)
    }

    pub fn inputs(mut self, entities: Vec<V>) -> Self {
        self.data.input = RequestInput::Entities(entities);
        self
    }

    pub fn input_map(mut self, entities: BTreeMap<K, V>) -> Result<Self, ModernBuilderError> {
        if self.data.method == ResourceMethod::BatchPartialUpdate {
            return Err(self.unexpected("a map of entities"));
        }
        self.data.input = RequestInput::EntityMap(entities);
        Ok(self)
    }

    pub fn patch_inputs(
        mut self,
        patches: BTreeMap<K, PatchRequest<V>>,
    ) -> Result<Self, ModernBuilderError> {
        if self.data.method == ResourceMethod::BatchUpdate {
            return Err(self.unexpected("a map of patches"));
        }
        self.data.input = RequestInput::PatchMap(patches);
        Ok(self)
    }

    /// Adds projected fields. An empty path is rejected.
    pub fn fields(mut self, paths: impl IntoIterator<Item = PathSpec>) -> Result<Self, ModernBuilderError> {
        for path in paths {
            if path.is_empty() {
                return Err(ModernBuilderError::EmptyProjection);
            }
            self.data.fields.push(path);
        }
        Ok(self)
    }

    /// Names the finder or action. An empty name is rejected.
    pub fn name(mut self, name: &str) -> Result<Self, ModernBuilderError> {
        let name = OperationName::new(name)
            .ok_or_else(|| RuntimeFailure::IllegalArgument("method name must not be empty".into()))?;
        self.data.method_name = Some(name);
        Ok(self)
    }

    pub fn assoc_key(mut self, key: &str, value: ParamValue) -> Self {
        put(&mut self.data.assoc_key, key, value);
        self
    }

    pub fn paginate(self, start: i32, count: i32) -> Result<Self, ModernBuilderError> {
        self.paginate_start(start)?.paginate_count(count)
    }

    pub fn paginate_start(mut self, start: i32) -> Result<Self, ModernBuilderError> {
        self.data.paging.start = Some(non_negative("start", start)?);
        Ok(self)
    }

    pub fn paginate_count(mut self, count: i32) -> Result<Self, ModernBuilderError> {
        self.data.paging.count = Some(non_negative("count", count)?);
        Ok(self)
    }

    /// Sets a header. Names must be RFC 7230 tokens and replace any earlier
    /// header that differs only in case.
    pub fn set_header(mut self, name: &str, value: &str) -> Result<Self, ModernBuilderError> {
        if name.is_empty() || !name.bytes().all(is_token_byte) {
            return Err(ModernBuilderError::InvalidHeader(name.to_string()));
        }
        self.data
            .headers
            .retain(|existing, _| !existing.eq_ignore_ascii_case(name));
        self.data.headers.insert(name.to_string(), value.to_string());
        Ok(self)
    }

    /// Replaces query parameter `name`; an absent value removes it.
    pub fn query_param(mut self, name: &str, value: ParamValue) -> Self {
        put(&mut self.data.query_params, name, value);
        self
    }

    /// Appends one element to query parameter `name`, turning an earlier
    /// scalar into the first element.
    pub fn add_query_param(mut self, name: &str, value: ParamValue) -> Self {
        if value.is_absent() {
            return self;
        }
        let slot = self
            .data
            .query_params
            .entry(name.to_string())
            .or_insert_with(|| ParamValue::List(Vec::new()));
        match slot {
            ParamValue::List(items) => items.push(value),
            scalar => {
                let first = std::mem::replace(scalar, ParamValue::List(Vec::new()));
                *scalar = ParamValue::List(vec![first, value]);
            }
        }
        self
    }

    pub fn action_param(mut self, name: &str, value: ParamValue) -> Self {
        put(&mut self.data.action_params, name, value);
        self
    }

    pub fn path_key(mut self, name: &str, value: ParamValue) -> Self {
        put(&mut self.data.path_keys, name, value);
        self
    }

    pub fn build(&self) -> Result<RequestData<K, V>, ModernBuilderError> {
        let method = self.data.method;
        let needs_id = matches!(
            method,
            ResourceMethod::Get
                | ResourceMethod::Update
                | ResourceMethod::Delete
                | ResourceMethod::PartialUpdate
        );
        if needs_id && self.data.id.is_none() {
            return Err(ModernBuilderError::MissingId { method });
        }
        Ok(self.data.clone())
    }

    /// Builds a batch get whose response is keyed by typed keys.
    pub fn build_kv(&self) -> Result<RequestData<K, V>, ModernBuilderError> {
        if self.data.method != ResourceMethod::BatchGet {
            return Err(RuntimeFailure::UnsupportedOperation(format!(
                "buildKV on {}",
                self.data.method
            ))
            .into());
        }
        let mut data = self.build()?;
        data.response = ResponseKind::BatchKv;
        Ok(data)
    }

    fn unexpected(&self, body: &'static str) -> ModernBuilderError {
        ModernBuilderError::UnexpectedBody {
            method: self.data.method,
            body,
        }
    }
}

fn put(map: &mut BTreeMap<String, ParamValue>, name: &str, value: ParamValue) {
    if value.is_absent() {
        map.remove(name);
    } else {
        map.insert(name.to_string(), value);
    }
}

fn non_negative(what: &str, value: i32) -> Result<u32, RuntimeFailure> {
    u32::try_from(value)
        .map_err(|_| RuntimeFailure::IllegalArgument(format!("{what} must be >= 0, got {value}")))
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}
