//! Native legacy request builder.
//!
//! Legacy builders mutate in place and hand back `&mut Self`. Query
//! parameters are kept as ordered name/value pairs, the way they go onto a
//! protocol 1.0.0 query string, and are folded into a map only at build time.

use std::collections::{BTreeMap, BTreeSet};

use chain::{
    OperationName, ParamValue, PatchRequest, PathSpec, ProtocolVersion, RequestData, RequestInput,
    ResourceMethod, ResourceName, ResponseKind, RuntimeFailure,
};

/// Protocol version every legacy request targets.
pub const LEGACY_PROTOCOL: ProtocolVersion = ProtocolVersion::new(1, 0, 0);

/// In-place request builder for one resource method.
#[derive(Debug, Clone)]
pub struct LegacyRequestBuilder<K, V> {
    method: ResourceMethod,
    resource: ResourceName,
    method_name: Option<String>,
    key: Option<K>,
    keys: Vec<K>,
    body: RequestInput<K, V>,
    projection: Vec<PathSpec>,
    query: Vec<(String, ParamValue)>,
    repeated: BTreeSet<String>,
    action_params: BTreeMap<String, ParamValue>,
    path_keys: BTreeMap<String, ParamValue>,
    assoc_key: BTreeMap<String, ParamValue>,
    headers: Vec<(String, String)>,
    start: Option<u32>,
    count: Option<u32>,
}

impl<K: Clone + Ord, V: Clone> LegacyRequestBuilder<K, V> {
    pub fn new(method: ResourceMethod, resource: ResourceName) -> Self {
        Self {
            method,
            resource,
            method_name: None,
            key: None,
            keys: Vec::new(),
            body: RequestInput::None,
            projection: Vec::new(),
            query: Vec::new(),
            repeated: BTreeSet::new(),
            action_params: BTreeMap::new(),
            path_keys: BTreeMap::new(),
            assoc_key: BTreeMap::new(),
            headers: Vec::new(),
            start: None,
            count: None,
        }
    }

    pub fn method(&self) -> ResourceMethod {
        self.method
    }

    pub fn id(&mut self, id: K) -> &mut Self {
        self.key = Some(id);
        self
    }

    /// Adds ids; earlier ids are kept.
    pub fn ids(&mut self, ids: impl IntoIterator<Item = K>) -> &mut Self {
        self.keys.extend(ids);
        self
    }

    pub fn input(&mut self, entity: V) -> &mut Self {
        self.body = RequestInput::Entity(entity);
        self
    }

    pub fn input_patch(&mut self, patch: PatchRequest<V>) -> &mut Self {
        self.body = RequestInput::Patch(patch);
        self
    }

    /// Adds one keyed entity to a batch update.
    pub fn keyed_input(&mut self, id: K, entity: V) -> Result<&mut Self, RuntimeFailure> {
        match &mut self.body {
            RequestInput::None => {
                self.body = RequestInput::EntityMap(BTreeMap::from([(id, entity)]));
            }
            RequestInput::EntityMap(map) => {
                map.insert(id, entity);
            }
            _ => {
                return Err(RuntimeFailure::IllegalState(
                    "request already carries a non-entity body".into(),
                ))
            }
        }
        Ok(self)
    }

    /// Adds one keyed patch to a batch partial update.
    pub fn keyed_patch(&mut self, id: K, patch: PatchRequest<V>) -> Result<&mut Self, RuntimeFailure> {
        match &mut self.body {
            RequestInput::None => {
                self.body = RequestInput::PatchMap(BTreeMap::from([(id, patch)]));
            }
            RequestInput::PatchMap(map) => {
                map.insert(id, patch);
            }
            _ => {
                return Err(RuntimeFailure::IllegalState(
                    "request already carries a non-patch body".into(),
                ))
            }
        }
        Ok(self)
    }

    pub fn inputs(&mut self, entities: Vec<V>) -> &mut Self {
        self.body = RequestInput::Entities(entities);
        self
    }

    pub fn input_map(&mut self, entities: BTreeMap<K, V>) -> &mut Self {
        self.body = RequestInput::EntityMap(entities);
        self
    }

    pub fn patch_inputs(&mut self, patches: BTreeMap<K, PatchRequest<V>>) -> &mut Self {
        self.body = RequestInput::PatchMap(patches);
        self
    }

    /// Adds projected fields. Empty paths project nothing and are skipped.
    pub fn fields(&mut self, paths: impl IntoIterator<Item = PathSpec>) -> &mut Self {
        self.projection.extend(paths.into_iter().filter(|p| !p.is_empty()));
        self
    }

    pub fn name(&mut self, name: &str) -> Result<&mut Self, RuntimeFailure> {
        if name.is_empty() {
            return Err(RuntimeFailure::IllegalArgument(
                "method name must not be empty".into(),
            ));
        }
        self.method_name = Some(name.to_string());
        Ok(self)
    }

    pub fn assoc_key(&mut self, key: &str, value: ParamValue) -> &mut Self {
        put(&mut self.assoc_key, key, value);
        self
    }

    pub fn paginate(&mut self, start: i32, count: i32) -> Result<&mut Self, RuntimeFailure> {
        self.start = Some(non_negative("start", start)?);
        self.count = Some(non_negative("count", count)?);
        Ok(self)
    }

    pub fn paginate_start(&mut self, start: i32) -> Result<&mut Self, RuntimeFailure> {
        self.start = Some(non_negative("start", start)?);
        Ok(self)
    }

    pub fn paginate_count(&mut self, count: i32) -> Result<&mut Self, RuntimeFailure> {
        self.count = Some(non_negative("count", count)?);
        Ok(self)
    }

    /// Sets a header, replacing any earlier value under a case-insensitive match.
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<&mut Self, RuntimeFailure> {
        if name.is_empty() || name.chars().any(|c| c == ':' || c.is_whitespace() || c.is_control()) {
            return Err(RuntimeFailure::IllegalArgument(format!(
                "invalid header name '{name}'"
            )));
        }
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.to_string()));
        Ok(self)
    }

    /// Replaces query parameter `name`. A list becomes one pair per element;
    /// an absent value removes the parameter.
    pub fn set_param(&mut self, name: &str, value: ParamValue) -> &mut Self {
        self.query.retain(|(n, _)| n != name);
        self.repeated.remove(name);
        match value {
            ParamValue::Absent(_) => {}
            ParamValue::List(items) => {
                self.repeated.insert(name.to_string());
                self.query
                    .extend(items.into_iter().map(|item| (name.to_string(), item)));
            }
            scalar => self.query.push((name.to_string(), scalar)),
        }
        self
    }

    /// Appends one element to repeated query parameter `name`.
    pub fn add_param(&mut self, name: &str, value: ParamValue) -> &mut Self {
        if !value.is_absent() {
            self.repeated.insert(name.to_string());
            self.query.push((name.to_string(), value));
        }
        self
    }

    pub fn action_param(&mut self, name: &str, value: ParamValue) -> &mut Self {
        put(&mut self.action_params, name, value);
        self
    }

    pub fn path_key(&mut self, name: &str, value: ParamValue) -> &mut Self {
        put(&mut self.path_keys, name, value);
        self
    }

    /// Folds the accumulated state into a neutral request.
    pub fn build(&self) -> Result<RequestData<K, V>, RuntimeFailure> {
        let needs_id = matches!(
            self.method,
            ResourceMethod::Get
                | ResourceMethod::Update
                | ResourceMethod::Delete
                | ResourceMethod::PartialUpdate
        );
        if needs_id && self.key.is_none() {
            return Err(RuntimeFailure::IllegalState(format!(
                "{} requires an id",
                self.method
            )));
        }

        let mut data = RequestData::new(self.method, LEGACY_PROTOCOL, self.resource.clone());
        data.method_name = self
            .method_name
            .as_deref()
            .and_then(OperationName::new);
        data.id = self.key.clone();
        data.ids = self.keys.clone();
        data.input = self.body.clone();
        data.fields = self.projection.clone();
        data.query_params = self.fold_query();
        data.action_params = self.action_params.clone();
        data.path_keys = self.path_keys.clone();
        data.assoc_key = self.assoc_key.clone();
        data.headers = self.headers.iter().cloned().collect();
        data.paging.start = self.start;
        data.paging.count = self.count;
        Ok(data)
    }

    /// Builds a batch get whose response is keyed by typed keys.
    pub fn build_kv(&self) -> Result<RequestData<K, V>, RuntimeFailure> {
        if self.method != ResourceMethod::BatchGet {
            return Err(RuntimeFailure::UnsupportedOperation(format!(
                "buildKV on {}",
                self.method
            )));
        }
        let mut data = self.build()?;
        data.response = ResponseKind::BatchKv;
        Ok(data)
    }

    fn fold_query(&self) -> BTreeMap<String, ParamValue> {
        let mut folded = BTreeMap::new();
        for (name, value) in &self.query {
            if self.repeated.contains(name) {
                let entry = folded
                    .entry(name.clone())
                    .or_insert_with(|| ParamValue::List(Vec::new()));
                if let ParamValue::List(items) = entry {
                    items.push(value.clone());
                }
            } else {
                folded.insert(name.clone(), value.clone());
            }
        }
        // A repeated parameter whose last element was removed still exists, empty.
        for name in &self.repeated {
            folded
                .entry(name.clone())
                .or_insert_with(|| ParamValue::List(Vec::new()));
        }
        folded
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
