//! Modern builders exposed through the `chain` surface traits.
//!
//! A repeated query parameter `p` is exposed as the iterable `pParam(Iterable)`
//! and the single-element `addPParam(T)`; there is no scalar `pParam(T)`.
//! List elements are checked against the declared element kind.

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

use crate::builder::ModernRequestBuilder;
use crate::errors::ModernBuilderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Query,
    AddQuery,
    Action,
    PathKey,
}

/// Destination and declared element kind of one named setter.
#[derive(Debug, Clone)]
struct Route {
    slot: Slot,
    param: String,
    element: ValueKind,
}

impl Route {
    /// Rejects list elements whose kind differs from the declared one.
    fn check(&self, value: &ParamValue) -> Result<(), ModernBuilderError> {
        let ParamValue::List(items) = value else {
            return Ok(());
        };
        match items.iter().find(|item| item.kind() != self.element) {
            Some(bad) => Err(ModernBuilderError::ElementKind {
                param: self.param.clone(),
                expected: self.element,
                actual: bad.kind(),
            }),
            None => Ok(()),
        }
    }
}

#[derive(Debug)]
struct Table {
    capabilities: CapabilitySet,
    routes: BTreeMap<OperationName, Route>,
}

impl Table {
    fn route(&mut self, name: OperationName, accepts: ValueKind, slot: Slot, param: &ParamSpec) {
        self.capabilities
            .insert(OperationSignature::named(name.clone(), accepts));
        self.routes.insert(
            name,
            Route {
                slot,
                param: param.name.to_string(),
                element: param.kind,
            },
        );
    }

    fn with_path_keys(mut self, keys: &[ParamSpec]) -> Self {
        for key in keys {
            self.route(naming::path_key_setter(key.name.as_str()), key.kind, Slot::PathKey, key);
        }
        self
    }

    fn with_query_params(mut self, params: &[ParamSpec]) -> Self {
        for p in params {
            let setter = naming::query_param_setter(p.name.as_str());
            if p.repeated {
                self.route(setter, ValueKind::Iterable, Slot::Query, p);
                self.route(
                    naming::add_query_param_setter(p.name.as_str()),
                    p.kind,
                    Slot::AddQuery,
                    p,
                );
            } else {
                self.route(setter, p.kind, Slot::Query, p);
            }
        }
        self
    }

    fn with_action_params(mut self, params: &[ParamSpec]) -> Self {
        for p in params {
            let accepts = if p.repeated { ValueKind::Iterable } else { p.kind };
            self.route(naming::action_param_setter(p.name.as_str()), accepts, Slot::Action, p);
        }
        self
    }
}

/// Builds the table of fixed setters for `method`.
fn table_for(method: ResourceMethod) -> Table {
    const PAGING: [Setter; 3] = [Setter::Paginate, Setter::PaginateStart, Setter::PaginateCount];
    const KEYS: [Setter; 2] = [Setter::Ids, Setter::IdsArray];

    let mut setters = vec![Setter::Header, Setter::Param, Setter::Name, Setter::AssocKey];
    match method {
        ResourceMethod::Get => setters.extend([Setter::Id, Setter::Fields]),
        ResourceMethod::Create => setters.push(Setter::Input),
        ResourceMethod::Update => setters.extend([Setter::Id, Setter::Input]),
        ResourceMethod::Delete | ResourceMethod::Action => setters.push(Setter::Id),
        ResourceMethod::PartialUpdate => setters.extend([Setter::Id, Setter::InputPatch]),
        ResourceMethod::BatchGet => {
            setters.extend(KEYS);
            setters.push(Setter::Fields);
        }
        ResourceMethod::BatchCreate => setters.push(Setter::Inputs),
        ResourceMethod::BatchUpdate => {
            setters.extend(KEYS);
            setters.extend([Setter::KeyedInput, Setter::KeyedInputs]);
        }
        ResourceMethod::BatchPartialUpdate => {
            setters.extend(KEYS);
            setters.extend([Setter::KeyedPatch, Setter::KeyedInputs]);
        }
        ResourceMethod::BatchDelete => setters.extend(KEYS),
        ResourceMethod::GetAll | ResourceMethod::Finder => {
            setters.extend(PAGING);
            setters.push(Setter::Fields);
        }
        ResourceMethod::Options => {}
    }

    let mut capabilities = CapabilitySet::new()
        .with_setters(setters)
        .with(Terminal::Build.signature());
    if method == ResourceMethod::BatchGet {
        capabilities.insert(Terminal::BuildKv.signature());
    }
    Table {
        capabilities,
        routes: BTreeMap::new(),
    }
}

#[derive(Debug)]
struct Opening {
    method: ResourceMethod,
    method_name: Option<String>,
    table: Arc<Table>,
}

/// Root request builders for one resource, current generation.
pub struct ModernRequestBuilders<K, V> {
    resource: ResourceName,
    capabilities: CapabilitySet,
    openings: BTreeMap<OperationName, Opening>,
    _types: PhantomData<fn() -> (K, V)>,
}

impl<K, V> fmt::Debug for ModernRequestBuilders<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModernRequestBuilders")
            .field("resource", &self.resource)
            .field("openings", &self.openings.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<K: ResourceKey, V: Record> ModernRequestBuilders<K, V> {
    pub fn new(spec: &ResourceSpec) -> Self {
        let mut openings = BTreeMap::new();
        let mut open = |verb: OperationName, method, method_name: Option<&str>, table: Table| {
            openings.insert(
                verb,
                Opening {
                    method,
                    method_name: method_name.map(str::to_string),
                    table: Arc::new(table.with_path_keys(&spec.path_keys)),
                },
            );
        };

        for &method in &spec.methods {
            open(naming::root_verb(method), method, None, table_for(method));
        }
        for finder in &spec.finders {
            open(
                naming::finder_verb(&finder.name),
                ResourceMethod::Finder,
                Some(finder.name.as_str()),
                table_for(ResourceMethod::Finder).with_query_params(&finder.params),
            );
        }
        for action in &spec.actions {
            open(
                naming::action_verb(&action.name),
                ResourceMethod::Action,
                Some(action.name.as_str()),
                table_for(ResourceMethod::Action).with_action_params(&action.params),
            );
        }

        let capabilities = openings.keys().fold(CapabilitySet::new(), |caps, verb| {
            caps.with(OperationSignature::nullary(verb.clone()))
        });
        debug!(
            resource = %spec.name,
            root_operations = capabilities.len(),
            "Built modern request builders"
        );

        Self {
            resource: spec.name.clone(),
            capabilities,
            openings,
            _types: PhantomData,
        }
    }
}

impl<K: ResourceKey, V: Record> RootSurface<K, V> for ModernRequestBuilders<K, V> {
    fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    fn open(&self, verb: &OperationName) -> Result<MethodHandle<K, V>, OperationFault> {
        let Some(opening) = self.openings.get(verb) else {
            return Err(RuntimeFailure::UnsupportedOperation(format!(
                "{} has no root operation {verb}",
                self.resource
            ))
            .into());
        };

        let mut builder = ModernRequestBuilder::new(opening.method, self.resource.clone());
        if let Some(name) = &opening.method_name {
            builder = builder.name(name)?;
        }
        trace!(verb = %verb, method = %opening.method, "Opened modern method builder");

        Ok(Box::new(ModernMethodBuilder {
            table: Arc::clone(&opening.table),
            builder,
        }))
    }
}

/// One modern method builder behind the `chain` surface.
pub struct ModernMethodBuilder<K, V> {
    table: Arc<Table>,
    builder: ModernRequestBuilder<K, V>,
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for ModernMethodBuilder<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModernMethodBuilder")
            .field("builder", &self.builder)
            .finish_non_exhaustive()
    }
}

impl<K: ResourceKey, V: Record> ModernMethodBuilder<K, V> {
    fn wrap(&self, builder: ModernRequestBuilder<K, V>) -> MethodHandle<K, V> {
        Box::new(Self {
            table: Arc::clone(&self.table),
            builder,
        })
    }

    fn step(
        &self,
        call: SetterCall<K, V>,
    ) -> Result<ModernRequestBuilder<K, V>, ModernBuilderError> {
        let b = self.builder.clone();
        let next = match call {
            SetterCall::Id(id) => b.id(id),
            SetterCall::Ids(ids) | SetterCall::IdsArray(ids) => b.ids(ids),
            SetterCall::Input(entity) => b.input(entity),
            SetterCall::InputPatch(patch) => b.input_patch(patch),
            SetterCall::KeyedInput(id, entity) => b.keyed_input(id, entity)?,
            SetterCall::KeyedPatch(id, patch) => b.keyed_patch(id, patch)?,
            SetterCall::Inputs(entities) => b.inputs(entities),
            SetterCall::InputMap(entities) => b.input_map(entities)?,
            SetterCall::PatchInputs(patches) => b.patch_inputs(patches)?,
            SetterCall::Fields(paths) => b.fields(paths)?,
            SetterCall::Name(name) => b.name(&name)?,
            SetterCall::AssocKey(key, value) => b.assoc_key(&key, value),
            SetterCall::Paginate { start, count } => b.paginate(start, count)?,
            SetterCall::PaginateStart(start) => b.paginate_start(start)?,
            SetterCall::PaginateCount(count) => b.paginate_count(count)?,
            SetterCall::Header(name, value) => b.set_header(&name, &value)?,
            SetterCall::Param(name, value) => b.query_param(&name, value),
        };
        Ok(next)
    }
}

impl<K: ResourceKey, V: Record> MethodSurface<K, V> for ModernMethodBuilder<K, V> {
    fn capabilities(&self) -> &CapabilitySet {
        &self.table.capabilities
    }

    fn apply(&self, call: SetterCall<K, V>) -> Result<MethodHandle<K, V>, OperationFault> {
        trace!(setter = %call.signature(), "Applying modern setter");
        let next = self.step(call)?;
        Ok(self.wrap(next))
    }

    fn set_named(
        &self,
        setter: &OperationSignature,
        value: ParamValue,
    ) -> Result<MethodHandle<K, V>, OperationFault> {
        let Some(route) = self.table.routes.get(&setter.name) else {
            return Err(RuntimeFailure::UnsupportedOperation(format!("no setter {setter}")).into());
        };
        route.check(&value)?;
        trace!(setter = %setter, param = %route.param, "Applying modern named setter");

        let b = self.builder.clone();
        let next = match route.slot {
            Slot::Query => b.query_param(&route.param, value),
            Slot::AddQuery => b.add_query_param(&route.param, value),
            Slot::Action => b.action_param(&route.param, value),
            Slot::PathKey => b.path_key(&route.param, value),
        };
        Ok(self.wrap(next))
    }

    fn build(&self, terminal: Terminal) -> Result<RequestData<K, V>, OperationFault> {
        let built = match terminal {
            Terminal::Build => self.builder.build(),
            Terminal::BuildKv => self.builder.build_kv(),
        };
        Ok(built?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain::{ActionSpec, FinderSpec, ParamName};

    fn spec() -> ResourceSpec {
        let tones = ParamSpec::repeated(ParamName::new("tones").expect("non-empty"), ValueKind::String);
        let tone = ParamSpec::scalar(ParamName::new("tone").expect("non-empty"), ValueKind::String);
        ResourceSpec::new(ResourceName::new("greetings").expect("non-empty"))
            .with_methods([ResourceMethod::Get, ResourceMethod::GetAll])
            .with_finder(FinderSpec::new("search").param(tone).param(tones))
            .with_action(ActionSpec::new("purge").param(ParamSpec::scalar(
                ParamName::new("force").expect("non-empty"),
                ValueKind::Bool,
            )))
    }

    fn op(name: &str) -> OperationName {
        OperationName::new(name).expect("non-empty")
    }

    fn open(verb: &str) -> MethodHandle<i64, String> {
        ModernRequestBuilders::<i64, String>::new(&spec())
            .open(&op(verb))
            .expect("declared verb")
    }

    #[test]
    fn test_repeated_param_has_only_iterable_overload() {
        let finder = open("findBySearch");
        let caps = finder.capabilities();
        let tones_param = op("tonesParam");
        let overloads: Vec<_> = caps.overloads(&tones_param).collect();
        assert_eq!(overloads.len(), 1);
        assert_eq!(
            overloads[0],
            &OperationSignature::named(op("tonesParam"), ValueKind::Iterable)
        );
        assert!(caps.contains(&OperationSignature::named(op("toneParam"), ValueKind::String)));
        assert!(caps.contains(&OperationSignature::named(op("addTonesParam"), ValueKind::String)));
    }

    #[test]
    fn test_list_elements_are_kind_checked() {
        let finder = open("findBySearch");
        let setter = OperationSignature::named(op("tonesParam"), ValueKind::Iterable);
        let err = finder
            .set_named(&setter, ParamValue::list([1_i64]))
            .unwrap_err();
        match err {
            OperationFault::Other(cause) => assert_eq!(
                cause.downcast_ref::<ModernBuilderError>(),
                Some(&ModernBuilderError::ElementKind {
                    param: "tones".into(),
                    expected: ValueKind::String,
                    actual: ValueKind::Long,
                })
            ),
            other => panic!("unexpected fault {other:?}"),
        }
    }

    #[test]
    fn test_action_records_its_name_and_params() {
        let action = open("actionPurge");
        let data = action
            .set_named(
                &OperationSignature::named(op("paramForce"), ValueKind::Bool),
                ParamValue::Bool(true),
            )
            .expect("param")
            .build(Terminal::Build)
            .expect("build");
        assert_eq!(data.method, ResourceMethod::Action);
        assert_eq!(data.method_name, Some(op("purge")));
        assert_eq!(data.action_params.get("force"), Some(&ParamValue::Bool(true)));
    }

    #[test]
    fn test_missing_id_is_not_a_runtime_failure() {
        let err = open("get").build(Terminal::Build).unwrap_err();
        assert!(matches!(err, OperationFault::Other(_)));
    }

    #[test]
    fn test_negative_paging_is_a_runtime_failure() {
        let err = open("getAll")
            .apply(SetterCall::Paginate { start: 0, count: -2 })
            .unwrap_err();
        assert!(matches!(
            err,
            OperationFault::Runtime(RuntimeFailure::IllegalArgument(_))
        ));
    }

    #[test]
    fn test_handles_are_independent() {
        let all = open("getAll");
        let paged = all.apply(SetterCall::PaginateCount(5)).expect("count");
        assert_eq!(all.build(Terminal::Build).expect("build").paging.count, None);
        assert_eq!(paged.build(Terminal::Build).expect("build").paging.count, Some(5));
    }
}
