// tests/integration/ordering.rs
use asm_versions::presentation::displayable_rows;
use asm_versions_engine::record::{
    AssemblyIdentity, AssemblyVersion, FileMetadataRecord, PublicKeyToken,
};
use proptest::prelude::*;

fn arb_record() -> impl Strategy<Value = FileMetadataRecord> {
    (
        prop::sample::select(vec!["Alpha", "alpha", "Beta", "Gamma.Core"]),
        (0u16..3, 0u16..3, 0u16..3, 0u16..3),
        prop::sample::select(vec!["a.dll", "b/a.dll", "c/d/a.dll", "z.dll"]),
        any::<bool>(),
    )
        .prop_map(|(name, (major, minor, build, revision), path, failed)| {
            if failed {
                FileMetadataRecord::failed(path.to_owned())
            } else {
                FileMetadataRecord::from_identity(
                    AssemblyIdentity {
                        name: name.to_owned(),
                        version: AssemblyVersion::new(major, minor, build, revision),
                        public_key_token: PublicKeyToken::EMPTY,
                        culture: String::new(),
                    },
                    path.to_owned(),
                )
            }
        })
}

proptest! {
    #[test]
    fn displayed_rows_are_ordered(records in prop::collection::vec(arb_record(), 0..40)) {
        let rows = displayable_rows(&records);
        prop_assert!(rows.len() <= records.len());
        prop_assert!(rows.iter().all(|r| !r.is_error));

        for pair in rows.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let ordered = a.name < b.name
                || (a.name == b.name && a.version > b.version)
                || (a.name == b.name
                    && a.version == b.version
                    && a.relative_path <= b.relative_path);
            prop_assert!(ordered, "{a:?} listed before {b:?}");
        }
    }

    #[test]
    fn ordering_does_not_depend_on_input_order(
        records in prop::collection::vec(arb_record(), 0..20)
    ) {
        let mut reversed = records.clone();
        reversed.reverse();
        let forward: Vec<_> = displayable_rows(&records).into_iter().cloned().collect();
        let backward: Vec<_> = displayable_rows(&reversed).into_iter().cloned().collect();
        prop_assert_eq!(forward, backward);
    }
}
