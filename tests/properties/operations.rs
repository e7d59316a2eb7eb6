//! Property tests for transaction planning.

use proptest::prelude::*;

use siteforge::domain::services::SiteCall;
use siteforge::domain::value_objects::PatchId;
use siteforge::{ManifestDiffer, ObjectId, OperationBuilder, Resource, SiteManifest, U256};

const PACKAGE: ObjectId = ObjectId::new([0xaa; 32]);
const SITE: ObjectId = ObjectId::new([0x51; 32]);
const OWNER: ObjectId = ObjectId::new([0x0e; 32]);

fn published(count: usize, seed: u8) -> SiteManifest {
    let resources = (0..count)
        .map(|i| {
            let locator = PatchId::new([seed; 32], [1, i as u8, 0, i as u8 + 1, 0]).to_string();
            Resource::new(format!("/page-{i}.html"), U256::from(i as u64))
                .with_header("content-type", "text/html")
                .with_locator(locator)
        })
        .collect();
    SiteManifest {
        resources,
        ..SiteManifest::empty()
    }
}

fn touches_resources(call: &SiteCall) -> bool {
    matches!(
        call,
        SiteCall::NewResource { .. }
            | SiteCall::AddHeader { .. }
            | SiteCall::AddResource { .. }
            | SiteCall::RemoveResourceIfExists { .. }
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: An unchanged site plans no resource calls.
    #[test]
    fn property_no_resource_calls_for_identical_manifests(count in 0usize..20, seed in any::<u8>()) {
        let site = published(count, seed);
        let diff = ManifestDiffer::new().with_unchanged(true).diff(&site, &site);
        let tx = OperationBuilder::new(PACKAGE).build(Some(SITE), &diff, OWNER).unwrap();
        prop_assert!(!tx.calls.iter().any(touches_resources));
    }

    /// PROPERTY: One removal per deleted resource and one add per created resource.
    #[test]
    fn property_call_counts_follow_the_diff(kept in 0usize..10, added in 0usize..10) {
        let current = published(kept + 3, 1);
        let mut next = published(kept + added, 2);
        next.resources.iter_mut().skip(kept).for_each(|r| r.content_hash = U256::from(1_000u64));

        let diff = ManifestDiffer::new().diff(&next, &current);
        let tx = OperationBuilder::new(PACKAGE).build(Some(SITE), &diff, OWNER).unwrap();

        let removals = tx.calls.iter().filter(|c| matches!(c, SiteCall::RemoveResourceIfExists { .. })).count();
        let adds = tx.calls.iter().filter(|c| matches!(c, SiteCall::AddResource { .. })).count();
        prop_assert_eq!(removals, diff.deleted().count());
        prop_assert_eq!(adds, diff.created().count());
    }
}
