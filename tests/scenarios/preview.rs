//! Scenario: previewing a deployment before running it.

use crate::common::*;
use siteforge::domain::services::SiteCall;
use siteforge::{ChainSiteReader, DeploymentFlow, Epochs, PreviewUseCase, U256};

#[tokio::test]
async fn preview_of_new_site_plans_every_resource() {
    let site = SiteDir::new();
    let network = InMemoryNetwork::new();
    let request = site.request();

    let preview = PreviewUseCase::new(ChainSiteReader::new(network.clone()), PACKAGE)
        .execute(&request.assets, &request.settings, None, OWNER)
        .await
        .unwrap();

    assert!(!preview.is_up_to_date());
    assert_eq!(preview.summary().created, 3);
    let plan = preview.plan.unwrap();
    assert_eq!(plan.targets()[0], "metadata::new_metadata");
    assert_eq!(plan.targets()[1], "site::new_site");
    let new_resources: Vec<_> = plan
        .calls
        .iter()
        .filter_map(|call| match call {
            SiteCall::NewResource { path, blob_id, .. } => Some((path.as_str(), *blob_id)),
            _ => None,
        })
        .collect();
    assert_eq!(new_resources.len(), 3);
    // content is not uploaded yet
    assert!(new_resources.iter().all(|(_, id)| *id == U256::ZERO));
    assert_eq!(plan.targets().last(), Some(&"transfer_objects"));
    assert!(network.executed().is_empty());
}

#[tokio::test]
async fn preview_after_deploy_is_up_to_date_and_lists_unchanged() {
    let site = SiteDir::new();
    let network = InMemoryNetwork::new();
    let flow = DeploymentFlow::new(network.clients(), PACKAGE, site.request());
    flow.prepare().await.unwrap();
    flow.upload(Epochs::Count(1), false).await.unwrap();
    flow.certify().await.unwrap();
    let site_id = flow.write_site().await.unwrap().site_id;

    let request = site.request();
    let preview = PreviewUseCase::new(ChainSiteReader::new(network.clone()), PACKAGE)
        .with_unchanged(true)
        .execute(&request.assets, &request.settings, Some(&site_id), OWNER)
        .await
        .unwrap();

    assert!(preview.is_up_to_date());
    assert_eq!(preview.summary().unchanged, 3);
    assert_eq!(preview.current.resources.len(), 3);
    assert!(preview.plan.unwrap().is_empty());
}
