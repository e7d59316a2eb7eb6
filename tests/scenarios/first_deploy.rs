//! Scenario: publishing a site for the first time.

use std::sync::Arc;

use crate::common::*;
use siteforge::domain::ports::{FlowEvent, FlowEventSink, PhaseStatus};
use siteforge::domain::value_objects::{PatchId, PATCH_INTERNAL_ID_HEADER, U256};
use siteforge::infrastructure::ChannelEventSink;
use siteforge::{ChainSiteReader, DeployPhase, DeploymentFlow, Epochs, PrepareOutcome};

#[tokio::test]
async fn first_deploy_publishes_the_whole_site_in_three_transactions() {
    let site = SiteDir::new();
    let network = InMemoryNetwork::new();
    let (sink, mut events) = ChannelEventSink::new();
    let flow = DeploymentFlow::new(network.clients(), PACKAGE, site.request())
        .with_event_sink(Arc::new(sink) as Arc<dyn FlowEventSink>);

    let outcome = flow.prepare().await.unwrap();
    let PrepareOutcome::Prepared { summary } = outcome else {
        panic!("a new site always has changes");
    };
    assert_eq!(summary.created, 3, "drafts are ignored");
    assert_eq!(summary.deleted, 0);

    flow.upload(Epochs::Count(5), false).await.unwrap();
    flow.certify().await.unwrap();
    let written = flow.write_site().await.unwrap();
    assert_eq!(flow.phase(), DeployPhase::Deployed);

    let executed = network.executed();
    assert_eq!(executed.len(), 3);
    assert!(executed[0].starts_with("register quilt-100 for 5 epochs"));
    assert!(executed[0].ends_with("(deletable: true)"));
    assert_eq!(executed[1], "certify quilt-100");
    assert!(executed[2].starts_with("create site"));
    assert_eq!(flow.transactions().len(), 3);

    let stored = network.site(&written.site_id).unwrap();
    assert_eq!(stored.name, "Demo Site");
    assert_eq!(stored.owner, Some(OWNER));
    assert_eq!(
        stored.resources.keys().cloned().collect::<Vec<_>>(),
        vec!["/blog/index.html", "/css/site.css", "/index.html"]
    );
    let index = &stored.resources["/index.html"];
    assert_eq!(index.blob_id, U256::from(100u64));
    assert!(index
        .headers
        .iter()
        .any(|(k, v)| k == "Cache-Control" && v == "no-cache"));
    assert!(index
        .headers
        .iter()
        .any(|(k, _)| k == PATCH_INTERNAL_ID_HEADER));
    assert_eq!(stored.routes.as_ref().map(Vec::len), Some(2));

    let mut progress = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let FlowEvent::Progress(p) = event {
            progress.push((p.phase, p.status));
        }
    }
    assert!(progress.contains(&(DeployPhase::Deployed, PhaseStatus::Completed)));
    assert!(!progress
        .iter()
        .any(|(_, status)| matches!(status, PhaseStatus::Failed { .. })));
}

#[tokio::test]
async fn published_site_reads_back_with_patch_locators() {
    let site = SiteDir::new();
    let network = InMemoryNetwork::new();
    let flow = DeploymentFlow::new(network.clients(), PACKAGE, site.request());
    flow.prepare().await.unwrap();
    flow.upload(Epochs::Max, true).await.unwrap();
    flow.certify().await.unwrap();
    let written = flow.write_site().await.unwrap();

    let reader = ChainSiteReader::new(network.clone());
    let published = reader.fetch_current(Some(&written.site_id)).await.unwrap();

    assert_eq!(published.site_name.as_deref(), Some("Demo Site"));
    let metadata = published.metadata.unwrap();
    assert_eq!(metadata.description.as_deref(), Some("A demo"));
    assert_eq!(metadata.creator.as_deref(), Some("siteforge tests"));
    assert_eq!(metadata.link, None);

    let routes = published.routes.unwrap();
    assert_eq!(routes[0].route, "/blog/*");
    assert_eq!(routes[1].target, "/index.html");

    assert_eq!(published.resources.len(), 3);
    let local = flow.snapshot().manifest.unwrap();
    for resource in &published.resources {
        let patch = PatchId::parse(&resource.content_locator).unwrap();
        assert_eq!(patch.blob_id_u256(), U256::from(100u64));
        let expected = local.resource(&resource.path).unwrap();
        assert_eq!(resource.content_locator, expected.content_locator);
        assert_eq!(resource.content_hash, expected.content_hash);
    }

    assert!(network.executed()[0].ends_with("(deletable: false)"));
}
