//! Entity CRUD scenarios across several users.

use haulmark_core::error::ErrorKind;
use haulmark_core::traits::Severity;
use haulmark_entity::load::{LoadPatch, LoadStatus};
use haulmark_entity::user::UserRole;

use crate::helpers::{TestMarketplace, load_draft, truck_draft};

#[tokio::test]
async fn test_new_user_sees_empty_lists() {
    let market = TestMarketplace::new();
    let owner = market.user(UserRole::FleetOwner);

    owner.fleet.refresh(&owner.ctx).await.unwrap();
    assert!(owner.fleet.trucks().is_empty());
    assert!(owner.fleet.drivers().is_empty());
    assert!(owner.notifier.is_empty());
}

#[tokio::test]
async fn test_create_adds_exactly_one_owned_record() {
    let market = TestMarketplace::new();
    let owner = market.user(UserRole::FleetOwner);

    let truck = owner
        .fleet
        .trucks()
        .create(&owner.ctx, &truck_draft("MH12AB1234"))
        .await
        .unwrap();

    assert_eq!(owner.fleet.trucks().len(), 1);
    assert_eq!(truck.owner_id, Some(owner.id));
    assert!(truck.created_at.is_some());
    assert_eq!(owner.notifier.count(Severity::Success), 1);
    assert_eq!(owner.notifier.count(Severity::Error), 0);
}

#[tokio::test]
async fn test_anonymous_create_never_reaches_store() {
    let market = TestMarketplace::new();
    let anon = market.anonymous();

    let err = anon
        .fleet
        .trucks()
        .create(&anon.ctx, &truck_draft("MH12AB1234"))
        .await
        .unwrap_err();

    assert!(err.is_unauthenticated());
    assert_eq!(market.store.call_count(), 0);
    assert_eq!(anon.notifier.count(Severity::Error), 1);
}

#[tokio::test]
async fn test_lists_are_scoped_to_their_owner() {
    let market = TestMarketplace::new();
    let alice = market.user(UserRole::FleetOwner);
    let bob = market.user(UserRole::FleetOwner);

    alice
        .fleet
        .trucks()
        .create(&alice.ctx, &truck_draft("KA01AA0001"))
        .await
        .unwrap();
    bob.fleet
        .trucks()
        .create(&bob.ctx, &truck_draft("KA01BB0002"))
        .await
        .unwrap();

    alice.fleet.refresh(&alice.ctx).await.unwrap();
    let registrations: Vec<_> = alice
        .fleet
        .trucks()
        .records()
        .into_iter()
        .filter_map(|t| t.registration_number)
        .collect();
    assert_eq!(registrations, vec!["KA01AA0001".to_string()]);
}

#[tokio::test]
async fn test_foreign_load_update_is_rejected() {
    let market = TestMarketplace::new();
    let shipper = market.user(UserRole::Shipper);
    let intruder = market.user(UserRole::Shipper);

    let load = shipper
        .loads
        .post(&shipper.ctx, &load_draft("Mumbai", "Delhi"))
        .await
        .unwrap();

    intruder
        .loads
        .marketplace()
        .fetch_list(&intruder.ctx)
        .await
        .unwrap();
    let before = intruder.loads.marketplace().records();

    let err = intruder
        .loads
        .mine()
        .update(&intruder.ctx, load.id, &LoadPatch::status(LoadStatus::Delivered))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Authorization);
    assert_eq!(intruder.notifier.count(Severity::Error), 1);
    assert_eq!(intruder.loads.marketplace().records(), before);

    shipper.loads.mine().fetch_list(&shipper.ctx).await.unwrap();
    let stored = shipper.loads.mine().get(load.id).unwrap();
    assert_eq!(stored.effective_status(), LoadStatus::Posted);
}

#[tokio::test]
async fn test_marketplace_shows_only_posted_loads() {
    let market = TestMarketplace::new();
    let shipper = market.user(UserRole::Shipper);
    let carrier = market.user(UserRole::FleetOwner);

    let open = shipper
        .loads
        .post(&shipper.ctx, &load_draft("Chennai", "Bengaluru"))
        .await
        .unwrap();
    let withdrawn = shipper
        .loads
        .post(&shipper.ctx, &load_draft("Chennai", "Hyderabad"))
        .await
        .unwrap();
    shipper.loads.cancel(&shipper.ctx, withdrawn.id).await.unwrap();

    carrier
        .loads
        .marketplace()
        .fetch_list(&carrier.ctx)
        .await
        .unwrap();
    let found = carrier.loads.search_open(Some("chennai"), None);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, open.id);
    assert!(carrier.loads.search_open(None, Some("hyderabad")).is_empty());
}

#[tokio::test]
async fn test_delete_removes_record_from_list() {
    let market = TestMarketplace::new();
    let owner = market.user(UserRole::FleetOwner);

    let truck = owner
        .fleet
        .trucks()
        .create(&owner.ctx, &truck_draft("DL01CC0003"))
        .await
        .unwrap();
    owner.fleet.trucks().delete(&owner.ctx, truck.id).await.unwrap();

    assert!(owner.fleet.trucks().is_empty());
    assert_eq!(owner.notifier.count(Severity::Success), 2);
}
