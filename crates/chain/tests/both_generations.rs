//! The same chains, driven against both builder generations.

use std::collections::BTreeMap;

use chain::{
    ActionSpec, FinderSpec, ParamName, ParamSpec, ParamValue, PatchRequest, PathSpec,
    ProtocolVersion, RequestInput, ResolutionError, ResourceMethod, ResourceName, ResourceSpec,
    ResponseKind, RootBuilderWrapper, RuntimeFailure, ShimError, ValueKind,
};
use legacy::{LegacyRootBuilders, LEGACY_PROTOCOL};
use modern::{ModernBuilderError, ModernRequestBuilders, MODERN_PROTOCOL};

#[derive(Debug, Clone, PartialEq)]
struct Greeting {
    message: String,
}

fn greeting(message: &str) -> Greeting {
    Greeting {
        message: message.to_string(),
    }
}

fn param(name: &str) -> ParamName {
    ParamName::new(name).expect("non-empty")
}

fn greetings() -> ResourceSpec {
    ResourceSpec::new(ResourceName::new("greetings").expect("non-empty"))
        .with_methods([
            ResourceMethod::Get,
            ResourceMethod::Create,
            ResourceMethod::Update,
            ResourceMethod::Delete,
            ResourceMethod::PartialUpdate,
            ResourceMethod::BatchGet,
            ResourceMethod::BatchCreate,
            ResourceMethod::BatchUpdate,
            ResourceMethod::BatchPartialUpdate,
            ResourceMethod::BatchDelete,
            ResourceMethod::GetAll,
            ResourceMethod::Options,
        ])
        .with_finder(
            FinderSpec::new("search")
                .param(ParamSpec::scalar(param("tone"), ValueKind::String))
                .param(ParamSpec::repeated(param("tones"), ValueKind::String)),
        )
        .with_action(
            ActionSpec::new("purge").param(ParamSpec::scalar(param("force"), ValueKind::Bool)),
        )
        .with_path_key(ParamSpec::scalar(param("groupId"), ValueKind::Long))
}

type Root = RootBuilderWrapper<i64, Greeting>;

fn generations() -> Vec<(&'static str, ProtocolVersion, Root)> {
    let spec = greetings();
    vec![
        (
            "legacy",
            LEGACY_PROTOCOL,
            RootBuilderWrapper::new(LegacyRootBuilders::new(&spec)),
        ),
        (
            "modern",
            MODERN_PROTOCOL,
            RootBuilderWrapper::new(ModernRequestBuilders::new(&spec)),
        ),
    ]
}

#[test]
fn every_root_operation_builds_its_response_type() {
    for (generation, protocol, root) in generations() {
        let get = root.get().unwrap().id(1).unwrap().build().unwrap();
        assert_eq!(get.method(), ResourceMethod::Get, "{generation}");
        assert_eq!(get.protocol(), protocol, "{generation}");

        root.create().unwrap().input(greeting("hi")).unwrap().build().unwrap();
        root.update()
            .unwrap()
            .id(1)
            .unwrap()
            .input(greeting("hello"))
            .unwrap()
            .build()
            .unwrap();
        root.delete().unwrap().id(1).unwrap().build().unwrap();
        root.partial_update()
            .unwrap()
            .id(1)
            .unwrap()
            .input_patch(PatchRequest::new().set("message", "hey"))
            .unwrap()
            .build()
            .unwrap();

        let batch = root.batch_get().unwrap().ids([1, 2]).unwrap();
        assert_eq!(batch.build().unwrap().data().response, ResponseKind::Batch);
        let kv = batch.build_kv().unwrap();
        assert_eq!(kv.ids(), &[1, 2], "{generation}");
        assert_eq!(kv.data().response, ResponseKind::BatchKv);

        root.batch_create()
            .unwrap()
            .inputs(vec![greeting("a"), greeting("b")])
            .unwrap()
            .build()
            .unwrap();
        root.batch_update()
            .unwrap()
            .input_map(BTreeMap::from([(1, greeting("a"))]))
            .unwrap()
            .build()
            .unwrap();
        root.batch_partial_update()
            .unwrap()
            .patch_inputs(BTreeMap::from([(1, PatchRequest::new().remove("message"))]))
            .unwrap()
            .build()
            .unwrap();
        root.batch_delete().unwrap().ids_array(&[3, 4]).unwrap().build().unwrap();
        root.get_all().unwrap().paginate(0, 10).unwrap().build().unwrap();
        root.options().unwrap().build().unwrap();

        let found = root.find_by("search").unwrap().build().unwrap();
        assert_eq!(found.data().method, ResourceMethod::Finder);
        assert_eq!(found.data().method_name.as_ref().map(|n| n.as_str()), Some("search"));

        let purge = root.action::<u32>("purge").unwrap().build().unwrap();
        assert_eq!(purge.data().response, ResponseKind::Action, "{generation}");
    }
}

#[test]
fn earlier_chain_states_are_unaffected_by_later_calls() {
    for (generation, _, root) in generations() {
        let base = root.get_all().unwrap().paginate_count(5).unwrap();
        let first = base.paginate_start(10).unwrap();
        let second = base.set_header("X-Trace", "abc").unwrap();

        let base_data = base.build().unwrap().into_data();
        let first_data = first.build().unwrap().into_data();
        let second_data = second.build().unwrap().into_data();

        assert_eq!(base_data.paging.start, None, "{generation}");
        assert!(base_data.headers.is_empty(), "{generation}");
        assert_eq!(first_data.paging.start, Some(10), "{generation}");
        assert!(first_data.headers.is_empty(), "{generation}");
        assert_eq!(second_data.paging.start, None, "{generation}");
        assert_eq!(second_data.paging.count, Some(5), "{generation}");
        assert_eq!(
            second_data.headers.get("X-Trace").map(String::as_str),
            Some("abc"),
            "{generation}"
        );

        // The same state builds the same request any number of times.
        assert_eq!(base.build().unwrap().into_data(), base_data, "{generation}");
    }
}

#[test]
fn list_values_resolve_to_the_iterable_overload() {
    for (generation, _, root) in generations() {
        let data = root
            .find_by("search")
            .unwrap()
            .set_query_param("tones", ParamValue::list(["FRIENDLY", "SINCERE"]))
            .unwrap()
            .add_query_param("tones", "INSULTING")
            .unwrap()
            .set_query_param("tone", "FRIENDLY")
            .unwrap()
            .build()
            .unwrap()
            .into_data();

        assert_eq!(
            data.query_params.get("tones"),
            Some(&ParamValue::list(["FRIENDLY", "SINCERE", "INSULTING"])),
            "{generation}"
        );
        assert_eq!(
            data.query_params.get("tone"),
            Some(&ParamValue::from("FRIENDLY")),
            "{generation}"
        );
    }
}

#[test]
fn scalar_on_repeated_param_depends_on_generation_overloads() {
    let [(_, _, legacy), (_, _, modern)]: [(&str, ProtocolVersion, Root); 2] =
        generations().try_into().expect("two generations");

    let data = legacy
        .find_by("search")
        .unwrap()
        .set_query_param("tones", "FRIENDLY")
        .unwrap()
        .build()
        .unwrap()
        .into_data();
    assert_eq!(data.query_params.get("tones"), Some(&ParamValue::list(["FRIENDLY"])));

    let err = modern
        .find_by("search")
        .unwrap()
        .set_query_param("tones", "FRIENDLY")
        .unwrap_err();
    assert!(matches!(
        err,
        ShimError::Resolution(ResolutionError::NoMatchingOverload {
            kind: ValueKind::String,
            ..
        })
    ));
}

#[test]
fn absent_values_resolve_by_their_tag() {
    for (generation, _, root) in generations() {
        let finder = root.find_by("search").unwrap();
        let data = finder
            .set_query_param("tone", "FRIENDLY")
            .unwrap()
            .set_query_param("tone", ParamValue::Absent(ValueKind::String))
            .unwrap()
            .set_query_param("tones", ParamValue::Absent(ValueKind::Iterable))
            .unwrap()
            .build()
            .unwrap()
            .into_data();
        assert!(!data.query_params.contains_key("tone"), "{generation}");
        assert!(!data.query_params.contains_key("tones"), "{generation}");

        let err = finder
            .set_query_param("tones", ParamValue::Absent(ValueKind::Bool))
            .map(|_| ());
        match generation {
            // Scalar and iterable overloads: the tag must pick one.
            "legacy" => assert!(matches!(
                err,
                Err(ShimError::Resolution(ResolutionError::NoMatchingOverload { .. }))
            )),
            _ => assert!(err.is_ok(), "{generation}: {err:?}"),
        }
    }
}

#[test]
fn absent_value_on_a_lone_overload_clears_the_param() {
    for (generation, _, root) in generations() {
        let data = root
            .find_by("search")
            .unwrap()
            .set_query_param("tones", ParamValue::list(["FRIENDLY"]))
            .unwrap()
            .set_query_param("tones", ParamValue::Absent(ValueKind::String))
            .unwrap()
            .set_query_param("tone", "SINCERE")
            .unwrap()
            .set_query_param("tone", ParamValue::Absent(ValueKind::Int))
            .unwrap()
            .build()
            .unwrap()
            .into_data();
        assert!(!data.query_params.contains_key("tones"), "{generation}");
        assert!(!data.query_params.contains_key("tone"), "{generation}");
    }
}

#[test]
fn path_keys_and_action_params_reach_the_request() {
    for (generation, _, root) in generations() {
        let data = root
            .action::<u32>("purge")
            .unwrap()
            .set_path_key("groupId", 42_i64)
            .unwrap()
            .set_action_param("force", true)
            .unwrap()
            .build()
            .unwrap()
            .into_data();
        assert_eq!(data.path_keys.get("groupId"), Some(&ParamValue::Long(42)), "{generation}");
        assert_eq!(data.action_params.get("force"), Some(&ParamValue::Bool(true)), "{generation}");
    }
}

#[test]
fn unknown_operations_fail_resolution_without_invoking() {
    for (generation, _, root) in generations() {
        assert!(
            matches!(
                root.find_by("nothing"),
                Err(ShimError::Resolution(ResolutionError::NoSuchSignature { .. }))
            ),
            "{generation}"
        );
        assert!(
            matches!(
                root.get().unwrap().build_kv(),
                Err(ShimError::Resolution(ResolutionError::NoSuchSignature { .. }))
            ),
            "{generation}"
        );
        assert!(
            matches!(
                root.get().unwrap().ids([1]),
                Err(ShimError::Resolution(ResolutionError::NoSuchSignature { .. }))
            ),
            "{generation}"
        );
        assert!(
            matches!(
                root.get().unwrap().set_query_param("tone", "x"),
                Err(ShimError::Resolution(ResolutionError::UnknownOperation { .. }))
            ),
            "{generation}"
        );
    }
}

#[test]
fn runtime_failures_pass_through_unchanged() {
    for (generation, _, root) in generations() {
        let err = root.get_all().unwrap().paginate(0, -5).unwrap_err();
        assert_eq!(
            err.as_runtime(),
            Some(&RuntimeFailure::IllegalArgument(
                "count must be >= 0, got -5".into()
            )),
            "{generation}"
        );
    }
}

#[test]
fn empty_method_name_is_rejected_without_clearing() {
    for (generation, _, root) in generations() {
        let finder = root.find_by("search").unwrap();
        let err = finder.name("").unwrap_err();
        assert!(
            matches!(err, ShimError::Runtime(RuntimeFailure::IllegalArgument(_))),
            "{generation}: {err:?}"
        );
        let data = finder.build().unwrap().into_data();
        assert_eq!(
            data.method_name.as_ref().map(|n| n.as_str()),
            Some("search"),
            "{generation}"
        );
    }
}

#[test]
fn other_faults_are_wrapped_with_their_cause() {
    let [(_, _, legacy), (_, _, modern)]: [(&str, ProtocolVersion, Root); 2] =
        generations().try_into().expect("two generations");

    // Legacy reports a build without an id as a runtime failure.
    let err = legacy.get().unwrap().build().unwrap_err();
    assert!(matches!(err, ShimError::Runtime(RuntimeFailure::IllegalState(_))));

    // Modern reports it through its own error type.
    let err = modern.get().unwrap().build().unwrap_err();
    let failure = match err {
        ShimError::Invocation(failure) => failure,
        other => panic!("expected an invocation failure, got {other:?}"),
    };
    assert_eq!(failure.operation.as_str(), "build");
    assert_eq!(
        failure.cause().downcast_ref::<ModernBuilderError>(),
        Some(&ModernBuilderError::MissingId {
            method: ResourceMethod::Get
        })
    );

    let err = modern
        .get()
        .unwrap()
        .fields([PathSpec::parse("")])
        .unwrap_err();
    assert!(matches!(err, ShimError::Invocation(_)));
}

#[test]
fn keyed_inputs_accumulate_into_a_map() {
    for (generation, _, root) in generations() {
        let data = root
            .batch_update()
            .unwrap()
            .keyed_input(1, greeting("a"))
            .unwrap()
            .keyed_input(2, greeting("b"))
            .unwrap()
            .build()
            .unwrap()
            .into_data();
        match data.input {
            RequestInput::EntityMap(map) => assert_eq!(map.len(), 2, "{generation}"),
            other => panic!("{generation}: unexpected input {other:?}"),
        }

        let err = root
            .batch_update()
            .unwrap()
            .patch_inputs(BTreeMap::new())
            .unwrap_err();
        assert!(
            matches!(err, ShimError::Runtime(_) | ShimError::Invocation(_)),
            "{generation}"
        );
    }
}
