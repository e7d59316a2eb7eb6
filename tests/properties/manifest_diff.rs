//! Property tests for manifest diffing.

use std::collections::BTreeMap;

use proptest::prelude::*;

use siteforge::domain::entities::{FieldUpdate, Metadata};
use siteforge::{ManifestDiffer, Resource, Route, SiteManifest, U256};

fn resource_path() -> impl Strategy<Value = String> {
    proptest::string::string_regex("/[a-z]{1,6}(/[a-z]{1,6}){0,2}(\\.html|\\.css)?").unwrap()
}

/// Resources with unique paths.
fn resources() -> impl Strategy<Value = Vec<Resource>> {
    proptest::collection::btree_map(resource_path(), any::<u64>(), 0..12).prop_map(
        |by_path: BTreeMap<String, u64>| {
            by_path
                .into_iter()
                .map(|(path, hash)| {
                    Resource::new(path, U256::from(hash)).with_header("content-encoding", "identity")
                })
                .collect()
        },
    )
}

fn manifest() -> impl Strategy<Value = SiteManifest> {
    (
        resources(),
        proptest::option::of("[a-z ]{0,12}"),
        proptest::option::of("[a-z ]{0,12}"),
    )
        .prop_map(|(resources, name, description)| {
            let routes = resources
                .first()
                .map(|r: &Resource| vec![Route::new("/*", r.path.clone())]);
            SiteManifest {
                resources,
                routes,
                metadata: description.map(|d| Metadata {
                    description: Some(d),
                    ..Default::default()
                }),
                site_name: name,
            }
        })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 96,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: A manifest diffed against itself has nothing to do.
    #[test]
    fn property_identical_manifests_have_no_update(a in manifest()) {
        let diff = ManifestDiffer::new().diff(&a, &a);
        prop_assert!(diff.resources.is_empty());
        prop_assert!(!diff.has_update());
        prop_assert_eq!(diff.routes, FieldUpdate::Noop);
        prop_assert_eq!(diff.metadata, FieldUpdate::Noop);
        prop_assert_eq!(diff.site_name, FieldUpdate::Noop);
    }

    /// PROPERTY: Diffing an empty manifest against a published one deletes everything.
    #[test]
    fn property_empty_next_deletes_every_resource(a in manifest()) {
        let diff = ManifestDiffer::new().diff(&SiteManifest::empty(), &a);
        prop_assert_eq!(diff.resources.len(), a.resources.len());
        prop_assert!(diff.resources.iter().all(|op| op.is_deleted()));
    }

    /// PROPERTY: Publishing onto nothing creates every resource.
    #[test]
    fn property_empty_current_creates_every_resource(a in manifest()) {
        let diff = ManifestDiffer::new().diff(&a, &SiteManifest::empty());
        prop_assert_eq!(diff.created().count(), a.resources.len());
        prop_assert_eq!(diff.deleted().count(), 0);
        prop_assert_eq!(diff.routes.is_update(), !a.routes_or_empty().is_empty());
        prop_assert_eq!(diff.site_name.is_update(), a.site_name.is_some());
    }

    /// PROPERTY: Every path appears exactly once across the ops, with unchanged included.
    #[test]
    fn property_ops_cover_each_path_once(next in manifest(), current in manifest()) {
        let diff = ManifestDiffer::new().with_unchanged(true).diff(&next, &current);
        let mut seen: Vec<&str> = diff.resources.iter().map(|op| op.path()).collect();
        seen.sort_unstable();
        let mut expected: Vec<&str> = next
            .paths()
            .chain(current.paths().filter(|p| next.resource(p).is_none()))
            .collect();
        expected.sort_unstable();
        prop_assert_eq!(seen, expected);
    }

    /// PROPERTY: Reordering a route list is a change.
    #[test]
    fn property_route_order_is_significant(
        a in "/[a-z]{1,8}",
        b in "/[a-z]{1,8}",
    ) {
        prop_assume!(a != b);
        let with_routes = |routes: Vec<Route>| SiteManifest {
            routes: Some(routes),
            ..SiteManifest::empty()
        };
        let current = with_routes(vec![Route::new(&a, "/index.html"), Route::new(&b, "/index.html")]);
        let next = with_routes(vec![Route::new(&b, "/index.html"), Route::new(&a, "/index.html")]);

        let diff = ManifestDiffer::new().diff(&next, &current);
        prop_assert_eq!(diff.routes.as_update().map(Vec::len), Some(2));
    }
}
