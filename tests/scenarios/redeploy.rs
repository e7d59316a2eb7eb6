//! Scenario: publishing again after the site already exists.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::common::*;
use siteforge::domain::value_objects::patch_id;
use siteforge::{DeployPhase, DeploymentFlow, Epochs, ObjectId, PrepareOutcome, U256};

async fn publish(network: &Arc<InMemoryNetwork>, site: &SiteDir, site_id: Option<ObjectId>) -> ObjectId {
    let flow = DeploymentFlow::new(
        network.clients(),
        PACKAGE,
        site.request().with_site_id(site_id),
    );
    flow.prepare().await.unwrap();
    flow.upload(Epochs::Count(1), false).await.unwrap();
    flow.certify().await.unwrap();
    flow.write_site().await.unwrap().site_id
}

#[tokio::test]
async fn unchanged_site_is_up_to_date() {
    let site = SiteDir::new();
    let network = InMemoryNetwork::new();
    let site_id = publish(&network, &site, None).await;
    let executed = network.executed().len();

    let flow = DeploymentFlow::new(
        network.clients(),
        PACKAGE,
        site.request().with_site_id(Some(site_id)),
    );
    assert_eq!(flow.prepare().await.unwrap(), PrepareOutcome::UpToDate);
    assert_eq!(flow.phase(), DeployPhase::Idle);
    assert_eq!(network.executed().len(), executed);
    assert_eq!(network.encodes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn changed_and_removed_files_are_the_only_work() {
    let site = SiteDir::new();
    let network = InMemoryNetwork::new();
    let site_id = publish(&network, &site, None).await;

    site.write("index.html", "<h1>home, updated</h1>");
    site.remove("css/site.css");

    let flow = DeploymentFlow::new(
        network.clients(),
        PACKAGE,
        site.request().with_site_id(Some(site_id)),
    );
    let PrepareOutcome::Prepared { summary } = flow.prepare().await.unwrap() else {
        panic!("edits must produce work");
    };
    assert_eq!((summary.created, summary.deleted), (1, 1));
    assert!(!summary.routes_updated);
    assert!(!summary.metadata_updated);
    assert!(!summary.name_updated);

    flow.upload(Epochs::Count(1), false).await.unwrap();
    flow.certify().await.unwrap();

    // the other files of quilt 100 still use it
    assert!(flow.cleanup().await.unwrap().is_empty());
    assert!(network.deleted_blobs().is_empty());

    let written = flow.write_site().await.unwrap();
    assert_eq!(written.site_id, site_id, "updates happen in place");

    let stored = network.site(&site_id).unwrap();
    assert_eq!(
        stored.resources.keys().cloned().collect::<Vec<_>>(),
        vec!["/blog/index.html", "/index.html"]
    );
    assert_eq!(stored.resources["/index.html"].blob_id, U256::from(101u64));
    assert_eq!(stored.resources["/blog/index.html"].blob_id, U256::from(100u64));

    let executed = network.executed();
    assert!(executed.last().unwrap().starts_with("update site"));
    // register + certify + create, then register + certify + update
    assert_eq!(executed.len(), 6);

    assert!(flow.cleanup().await.unwrap().is_empty());
    let live: Vec<String> = network
        .site(&site_id)
        .unwrap()
        .resources
        .values()
        .map(|r| patch_id::encode_blob_id(&r.blob_id))
        .collect();
    assert!(network.deleted_blobs().iter().all(|blob| !live.contains(blob)));
}

#[tokio::test]
async fn quilt_is_deleted_once_nothing_points_at_it() {
    let site = SiteDir::new();
    let network = InMemoryNetwork::new();
    let site_id = publish(&network, &site, None).await;

    site.write("index.html", "<h1>home, v2</h1>");
    site.write("blog/index.html", "<h1>blog, v2</h1>");
    site.remove("css/site.css");

    let flow = DeploymentFlow::new(
        network.clients(),
        PACKAGE,
        site.request().with_site_id(Some(site_id)),
    );
    flow.prepare().await.unwrap();
    flow.upload(Epochs::Count(1), false).await.unwrap();
    flow.certify().await.unwrap();

    // the published site still serves the old versions from quilt 100
    assert!(flow.cleanup().await.unwrap().is_empty());

    flow.write_site().await.unwrap();
    let cleaned = flow.cleanup().await.unwrap();
    assert_eq!(cleaned.len(), 1);
    assert_eq!(
        network.deleted_blobs(),
        vec![patch_id::encode_blob_id(&U256::from(100u64))]
    );
    let stored = network.site(&site_id).unwrap();
    assert!(stored
        .resources
        .values()
        .all(|r| r.blob_id == U256::from(101u64)));
}

#[tokio::test]
async fn settings_changes_update_routes_and_name() {
    let site = SiteDir::new();
    let network = InMemoryNetwork::new();
    let site_id = publish(&network, &site, None).await;

    site.write(
        "ws-resources.json",
        r#"{
            "site_name": "Renamed",
            "metadata": {"description": "A demo", "creator": "siteforge tests"},
            "routes": {"/*": "/index.html"},
            "ignore": ["/drafts/*"]
        }"#,
    );

    let flow = DeploymentFlow::new(
        network.clients(),
        PACKAGE,
        site.request().with_site_id(Some(site_id)),
    );
    let PrepareOutcome::Prepared { summary } = flow.prepare().await.unwrap() else {
        panic!("settings edits must produce work");
    };
    assert!(summary.routes_updated);
    assert!(summary.name_updated);
    assert!(!summary.metadata_updated);
    // index.html loses its custom headers but keeps its content
    assert_eq!(summary.created, 0);

    flow.upload(Epochs::Count(1), false).await.unwrap();
    flow.certify().await.unwrap();
    flow.write_site().await.unwrap();

    let stored = network.site(&site_id).unwrap();
    assert_eq!(stored.name, "Renamed");
    assert_eq!(stored.routes.unwrap().len(), 1);
    // nothing new to store: only the site transaction ran
    assert_eq!(network.executed().len(), 4);
    assert_eq!(network.encodes.load(Ordering::SeqCst), 1);
}
