//! Legacy builders exposed through the `chain` surface traits.
//!
//! [`LegacyRootBuilders`] is the root; each root operation opens a
//! [`LegacyMethodBuilder`] around a native [`LegacyRequestBuilder`]. Because
//! native builders mutate in place, every operation clones the builder first
//! and mutates the clone, leaving the invoked handle untouched.
//!
//! Legacy builders expose, for a repeated query parameter `p`, both the
//! single-value convenience `pParam(T)` and the iterable `pParam(Iterable)`,
//! plus `addPParam(T)`.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use chain::naming;
use chain::{
    CapabilitySet, MethodHandle, MethodSurface, OperationFault, OperationName, OperationSignature,
    ParamSpec, ParamValue, Record, RequestData, ResourceKey, ResourceMethod, ResourceName,
    ResourceSpec, RootSurface, RuntimeFailure, Setter, SetterCall, Terminal, ValueKind,
};
use tracing::{debug, trace};

use crate::builder::LegacyRequestBuilder;

/// Where a dynamically named setter writes its value.
#[derive(Debug, Clone, PartialEq, Eq)]
enum NamedTarget {
    Query { param: String, repeated: bool },
    AddQuery { param: String },
    Action { param: String },
    PathKey { param: String },
}

/// Capabilities and named-setter routing for one kind of method builder.
#[derive(Debug)]
struct MethodTable {
    capabilities: CapabilitySet,
    named: BTreeMap<OperationName, NamedTarget>,
}

impl MethodTable {
    fn new(capabilities: CapabilitySet) -> Self {
        Self {
            capabilities,
            named: BTreeMap::new(),
        }
    }

    fn named(&mut self, name: OperationName, kind: ValueKind, target: NamedTarget) {
        self.capabilities
            .insert(OperationSignature::named(name.clone(), kind));
        self.named.insert(name, target);
    }

    fn path_keys(&mut self, keys: &[ParamSpec]) {
        for key in keys {
            self.named(
                naming::path_key_setter(key.name.as_str()),
                key.kind,
                NamedTarget::PathKey {
                    param: key.name.to_string(),
                },
            );
        }
    }

    fn query_params(&mut self, params: &[ParamSpec]) {
        for p in params {
            let name = p.name.as_str();
            let setter = naming::query_param_setter(name);
            let target = NamedTarget::Query {
                param: name.to_string(),
                repeated: p.repeated,
            };
            self.named(setter.clone(), p.kind, target.clone());
            if p.repeated {
                self.named(setter, ValueKind::Iterable, target);
                self.named(
                    naming::add_query_param_setter(name),
                    p.kind,
                    NamedTarget::AddQuery {
                        param: name.to_string(),
                    },
                );
            }
        }
    }

    fn action_params(&mut self, params: &[ParamSpec]) {
        for p in params {
            let kind = if p.repeated { ValueKind::Iterable } else { p.kind };
            self.named(
                naming::action_param_setter(p.name.as_str()),
                kind,
                NamedTarget::Action {
                    param: p.name.to_string(),
                },
            );
        }
    }
}

/// Fixed setters the legacy generation exposes for `method`.
fn fixed_setters(method: ResourceMethod) -> CapabilitySet {
    use Setter::*;
    let setters: &[Setter] = match method {
        ResourceMethod::Get => &[Id, Fields],
        ResourceMethod::Create => &[Input],
        ResourceMethod::Update => &[Id, Input],
        ResourceMethod::Delete => &[Id],
        ResourceMethod::PartialUpdate => &[Id, InputPatch],
        ResourceMethod::BatchGet => &[Ids, IdsArray, Fields],
        ResourceMethod::BatchCreate => &[Inputs],
        ResourceMethod::BatchUpdate => &[Ids, IdsArray, KeyedInput, KeyedInputs],
        ResourceMethod::BatchPartialUpdate => &[Ids, IdsArray, KeyedPatch, KeyedInputs],
        ResourceMethod::BatchDelete => &[Ids, IdsArray],
        ResourceMethod::GetAll | ResourceMethod::Finder => {
            &[Paginate, PaginateStart, PaginateCount, Fields]
        }
        ResourceMethod::Options => &[],
        ResourceMethod::Action => &[Id],
    };
    let caps = CapabilitySet::common_setters()
        .with_setters(setters.iter().copied())
        .with(Terminal::Build.signature());
    if method == ResourceMethod::BatchGet {
        caps.with(Terminal::BuildKv.signature())
    } else {
        caps
    }
}

/// What one root operation opens.
#[derive(Debug)]
struct RootEntry {
    method: ResourceMethod,
    /// Finder or action name recorded on the request.
    method_name: Option<String>,
    table: Arc<MethodTable>,
}

/// Root builders for one resource, legacy generation.
pub struct LegacyRootBuilders<K, V> {
    resource: ResourceName,
    capabilities: CapabilitySet,
    entries: BTreeMap<OperationName, RootEntry>,
    _types: PhantomData<fn() -> (K, V)>,
}

impl<K, V> fmt::Debug for LegacyRootBuilders<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LegacyRootBuilders")
            .field("resource", &self.resource)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

impl<K: ResourceKey, V: Record> LegacyRootBuilders<K, V> {
    pub fn new(spec: &ResourceSpec) -> Self {
        let mut entries = BTreeMap::new();

        for &method in &spec.methods {
            let mut table = MethodTable::new(fixed_setters(method));
            table.path_keys(&spec.path_keys);
            entries.insert(
                naming::root_verb(method),
                RootEntry {
                    method,
                    method_name: None,
                    table: Arc::new(table),
                },
            );
        }

        for finder in &spec.finders {
            let mut table = MethodTable::new(fixed_setters(ResourceMethod::Finder));
            table.path_keys(&spec.path_keys);
            table.query_params(&finder.params);
            entries.insert(
                naming::finder_verb(&finder.name),
                RootEntry {
                    method: ResourceMethod::Finder,
                    method_name: Some(finder.name.clone()),
                    table: Arc::new(table),
                },
            );
        }

        for action in &spec.actions {
            let mut table = MethodTable::new(fixed_setters(ResourceMethod::Action));
            table.path_keys(&spec.path_keys);
            table.action_params(&action.params);
            entries.insert(
                naming::action_verb(&action.name),
                RootEntry {
                    method: ResourceMethod::Action,
                    method_name: Some(action.name.clone()),
                    table: Arc::new(table),
                },
            );
        }

        let mut capabilities = CapabilitySet::new();
        capabilities.extend(entries.keys().cloned().map(OperationSignature::nullary));

        debug!(
            resource = %spec.name,
            root_operations = capabilities.len(),
            "Built legacy root builders"
        );

        Self {
            resource: spec.name.clone(),
            capabilities,
            entries,
            _types: PhantomData,
        }
    }
}

impl<K: ResourceKey, V: Record> RootSurface<K, V> for LegacyRootBuilders<K, V> {
    fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    fn open(&self, verb: &OperationName) -> Result<MethodHandle<K, V>, OperationFault> {
        let entry = self.entries.get(verb).ok_or_else(|| {
            RuntimeFailure::UnsupportedOperation(format!(
                "{} has no root operation {verb}",
                self.resource
            ))
        })?;

        let mut builder = LegacyRequestBuilder::new(entry.method, self.resource.clone());
        if let Some(name) = &entry.method_name {
            builder.name(name)?;
        }
        trace!(verb = %verb, method = %entry.method, "Opened legacy method builder");

        Ok(Box::new(LegacyMethodBuilder {
            table: Arc::clone(&entry.table),
            builder,
        }))
    }
}

/// One legacy method builder behind the `chain` surface.
pub struct LegacyMethodBuilder<K, V> {
    table: Arc<MethodTable>,
    builder: LegacyRequestBuilder<K, V>,
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for LegacyMethodBuilder<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LegacyMethodBuilder")
            .field("builder", &self.builder)
            .finish_non_exhaustive()
    }
}

impl<K: ResourceKey, V: Record> LegacyMethodBuilder<K, V> {
    fn continued(&self, builder: LegacyRequestBuilder<K, V>) -> MethodHandle<K, V> {
        Box::new(Self {
            table: Arc::clone(&self.table),
            builder,
        })
    }
}

impl<K: ResourceKey, V: Record> MethodSurface<K, V> for LegacyMethodBuilder<K, V> {
    fn capabilities(&self) -> &CapabilitySet {
        &self.table.capabilities
    }

    fn apply(&self, call: SetterCall<K, V>) -> Result<MethodHandle<K, V>, OperationFault> {
        trace!(setter = %call.signature(), "Applying legacy setter");
        let method = self.builder.method();
        let mut next = self.builder.clone();

        match call {
            SetterCall::Id(id) => {
                next.id(id);
            }
            SetterCall::Ids(ids) | SetterCall::IdsArray(ids) => {
                next.ids(ids);
            }
            SetterCall::Input(entity) => {
                next.input(entity);
            }
            SetterCall::InputPatch(patch) => {
                next.input_patch(patch);
            }
            SetterCall::KeyedInput(id, entity) => {
                next.keyed_input(id, entity)?;
            }
            SetterCall::KeyedPatch(id, patch) => {
                next.keyed_patch(id, patch)?;
            }
            SetterCall::Inputs(entities) => {
                next.inputs(entities);
            }
            SetterCall::InputMap(entities) => {
                if method == ResourceMethod::BatchPartialUpdate {
                    return Err(RuntimeFailure::IllegalArgument(
                        "batchPartialUpdate takes a map of patches".into(),
                    )
                    .into());
                }
                next.input_map(entities);
            }
            SetterCall::PatchInputs(patches) => {
                if method == ResourceMethod::BatchUpdate {
                    return Err(RuntimeFailure::IllegalArgument(
                        "batchUpdate takes a map of entities".into(),
                    )
                    .into());
                }
                next.patch_inputs(patches);
            }
            SetterCall::Fields(paths) => {
                next.fields(paths);
            }
            SetterCall::Name(name) => {
                next.name(&name)?;
            }
            SetterCall::AssocKey(key, value) => {
                next.assoc_key(&key, value);
            }
            SetterCall::Paginate { start, count } => {
                next.paginate(start, count)?;
            }
            SetterCall::PaginateStart(start) => {
                next.paginate_start(start)?;
            }
            SetterCall::PaginateCount(count) => {
                next.paginate_count(count)?;
            }
            SetterCall::Header(name, value) => {
                next.set_header(&name, &value)?;
            }
            SetterCall::Param(name, value) => {
                next.set_param(&name, value);
            }
        }

        Ok(self.continued(next))
    }

    fn set_named(
        &self,
        setter: &OperationSignature,
        value: ParamValue,
    ) -> Result<MethodHandle<K, V>, OperationFault> {
        let target = self.table.named.get(&setter.name).ok_or_else(|| {
            RuntimeFailure::UnsupportedOperation(format!("no setter {setter}"))
        })?;
        trace!(setter = %setter, "Applying legacy named setter");

        let mut next = self.builder.clone();
        match target {
            NamedTarget::Query { param, repeated } => {
                let value = match value {
                    ParamValue::List(_) | ParamValue::Absent(_) => value,
                    scalar if *repeated => ParamValue::List(vec![scalar]),
                    scalar => scalar,
                };
                next.set_param(param, value);
            }
            NamedTarget::AddQuery { param } => {
                next.add_param(param, value);
            }
            NamedTarget::Action { param } => {
                next.action_param(param, value);
            }
            NamedTarget::PathKey { param } => {
                next.path_key(param, value);
            }
        }

        Ok(self.continued(next))
    }

    fn build(&self, terminal: Terminal) -> Result<RequestData<K, V>, OperationFault> {
        let data = match terminal {
            Terminal::Build => self.builder.build()?,
            Terminal::BuildKv => self.builder.build_kv()?,
        };
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain::{FinderSpec, ParamName, ParamType, ResponseKind};

    fn spec() -> ResourceSpec {
        ResourceSpec::new(ResourceName::new("greetings").expect("non-empty"))
            .with_methods([ResourceMethod::Get, ResourceMethod::BatchGet])
            .with_finder(
                FinderSpec::new("search").param(ParamSpec::repeated(
                    ParamName::new("tones").expect("non-empty"),
                    ValueKind::String,
                )),
            )
    }

    fn op(name: &str) -> OperationName {
        OperationName::new(name).expect("non-empty")
    }

    #[test]
    fn test_root_lists_declared_verbs_only() {
        let root: LegacyRootBuilders<i64, String> = LegacyRootBuilders::new(&spec());
        let verbs: Vec<String> = root
            .capabilities()
            .iter()
            .map(|s| s.name.to_string())
            .collect();
        assert_eq!(verbs, vec!["batchGet", "findBySearch", "get"]);

        let err = root.open(&op("delete")).unwrap_err();
        assert!(matches!(
            err,
            OperationFault::Runtime(RuntimeFailure::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_repeated_param_has_scalar_and_iterable_overloads() {
        let root: LegacyRootBuilders<i64, String> = LegacyRootBuilders::new(&spec());
        let finder = root.open(&op("findBySearch")).expect("finder");
        let caps = finder.capabilities();

        let tones = op("tonesParam");
        let kinds: Vec<ParamType> = caps.overloads(&tones).map(|s| s.params[0]).collect();
        assert_eq!(
            kinds,
            vec![
                ParamType::Value(ValueKind::String),
                ParamType::Value(ValueKind::Iterable)
            ]
        );
        assert!(caps.contains(&OperationSignature::named(
            op("addTonesParam"),
            ValueKind::String
        )));
    }

    #[test]
    fn test_scalar_on_repeated_param_becomes_single_element_list() {
        let root: LegacyRootBuilders<i64, String> = LegacyRootBuilders::new(&spec());
        let finder = root.open(&op("findBySearch")).expect("finder");
        let setter = OperationSignature::named(op("tonesParam"), ValueKind::String);

        let data = finder
            .set_named(&setter, ParamValue::from("FRIENDLY"))
            .expect("set")
            .build(Terminal::Build)
            .expect("build");
        assert_eq!(
            data.query_params.get("tones"),
            Some(&ParamValue::list(["FRIENDLY"]))
        );
        assert_eq!(data.method_name, Some(op("search")));
    }

    #[test]
    fn test_operations_leave_invoked_handle_untouched() {
        let root: LegacyRootBuilders<i64, String> = LegacyRootBuilders::new(&spec());
        let batch = root.open(&op("batchGet")).expect("batch get");
        let with_ids = batch.apply(SetterCall::Ids(vec![1, 2])).expect("ids");

        assert!(batch.build(Terminal::Build).expect("build").ids.is_empty());
        let kv = with_ids.build(Terminal::BuildKv).expect("kv");
        assert_eq!(kv.ids, vec![1, 2]);
        assert_eq!(kv.response, ResponseKind::BatchKv);
    }

    #[test]
    fn test_batch_get_advertises_build_kv_but_get_does_not() {
        let root: LegacyRootBuilders<i64, String> = LegacyRootBuilders::new(&spec());
        let kv = Terminal::BuildKv.signature();
        assert!(root
            .open(&op("batchGet"))
            .expect("batch get")
            .capabilities()
            .contains(&kv));
        assert!(!root
            .open(&op("get"))
            .expect("get")
            .capabilities()
            .contains(&kv));
    }

    #[test]
    fn test_native_failures_surface_as_runtime_faults() {
        let root: LegacyRootBuilders<i64, String> = LegacyRootBuilders::new(&spec());
        let finder = root.open(&op("findBySearch")).expect("finder");
        let err = finder.apply(SetterCall::PaginateCount(-1)).unwrap_err();
        assert!(matches!(
            err,
            OperationFault::Runtime(RuntimeFailure::IllegalArgument(_))
        ));
    }
}
