//! Registry behaviour seen from a backend module

mod common;

use common::{fill_slot, FillBackend, FillKernel};
use ndx_core::{BackendId, Error};
use ndx_kernel::{KernelRegistry, OpName, RegistryBuilder};
use proptest::prelude::*;

fn lookup_names(registry: &KernelRegistry, backend: &BackendId) -> Vec<Option<&'static str>> {
    OpName::ALL
        .iter()
        .map(|op| registry.lookup(backend, op.as_str()).ok().map(|k| k.name()))
        .collect()
}

#[test]
fn test_lookup_completeness() {
    let mut builder = RegistryBuilder::new();
    builder
        .load_backend(&FillBackend {
            id: "partial",
            ops: vec![OpName::BitwiseAnd, OpName::BitwiseXorAS],
        })
        .unwrap();
    let registry = builder.build();
    let partial = BackendId::from_static("partial");

    for op in OpName::ALL {
        match registry.lookup(&partial, op.as_str()) {
            Ok(kernel) => {
                assert!(matches!(op, OpName::BitwiseAnd | OpName::BitwiseXorAS));
                assert_eq!(kernel.name(), op.as_str());
                assert_eq!(kernel.variant(), op.variant());
            }
            Err(err) => assert!(matches!(err, Error::KernelNotFound { .. }), "{err}"),
        }
    }
    assert!(registry.has_backend(&partial));
    assert!(!registry.has_backend(&BackendId::from_static("native")));
}

#[test]
fn test_duplicate_registration_keeps_original() {
    let mut builder = RegistryBuilder::new();
    builder.load_backend(&FillBackend::all("native")).unwrap();

    for op in OpName::ALL {
        let err = builder.register("native", op.as_str(), fill_slot(op)).unwrap_err();
        assert!(matches!(err, Error::DuplicateRegistration { .. }));
    }

    // Reloading the whole backend is rejected as one unit
    let err = builder.load_backend(&FillBackend::all("native")).unwrap_err();
    assert!(matches!(err, Error::DuplicateRegistration { .. }));

    let registry = builder.build();
    assert_eq!(registry.len(), OpName::ALL.len());
    let native = BackendId::from_static("native");
    for op in OpName::ALL {
        assert_eq!(registry.lookup(&native, op.as_str()).unwrap().name(), op.as_str());
    }
}

#[test]
fn test_backends_are_independent() {
    let mut builder = RegistryBuilder::new();
    builder.load_backend(&FillBackend::all("native")).unwrap();
    builder
        .load_backend(&FillBackend {
            id: "cuda",
            ops: vec![OpName::BitwiseOr],
        })
        .unwrap();
    builder.register_binary("cuda", FillKernel(OpName::BitwiseAnd)).unwrap();
    let registry = builder.build();

    let names: Vec<&str> = registry.backends().iter().map(|b| b.as_str()).collect();
    assert_eq!(names, vec!["cuda", "native"]);
    assert_eq!(
        registry.operations(&BackendId::from_static("cuda")),
        vec!["BitwiseAnd", "BitwiseOr"]
    );
}

proptest! {
    #[test]
    fn prop_registration_order_is_irrelevant(
        order in Just(OpName::ALL.to_vec()).prop_shuffle(),
        keep in proptest::collection::vec(any::<bool>(), OpName::ALL.len()),
    ) {
        let ops: Vec<OpName> = order
            .iter()
            .zip(&keep)
            .filter(|(_, k)| **k)
            .map(|(&op, _)| op)
            .collect();
        let mut sorted = ops.clone();
        sorted.sort();

        let mut forward = RegistryBuilder::new();
        forward.load_backend(&FillBackend { id: "b", ops: ops.clone() }).unwrap();
        let mut reference = RegistryBuilder::new();
        reference.load_backend(&FillBackend { id: "b", ops: sorted }).unwrap();

        let (forward, reference) = (forward.build(), reference.build());
        let backend = BackendId::from_static("b");
        prop_assert_eq!(lookup_names(&forward, &backend), lookup_names(&reference, &backend));
        prop_assert_eq!(forward.operations(&backend), reference.operations(&backend));
    }
}
