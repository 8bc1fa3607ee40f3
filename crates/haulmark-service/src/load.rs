//! Load posting for shippers and the open-load marketplace for fleets.

use std::sync::Arc;

use haulmark_core::result::AppResult;
use haulmark_core::traits::{NotificationSink, RecordStore};
use haulmark_core::types::{DriverId, FilterField, LoadId, TruckId};
use haulmark_entity::load::{Load, LoadPatch, LoadStatus, NewLoad};

use crate::context::RequestContext;
use crate::entity::{EntityService, ListScope};

/// A shipper's own loads plus the marketplace of posted loads.
#[derive(Debug)]
pub struct LoadService {
    mine: EntityService<Load>,
    marketplace: EntityService<Load>,
}

impl LoadService {
    /// Creates a load service over the given store.
    pub fn new(store: Arc<dyn RecordStore>, notifier: Arc<dyn NotificationSink>) -> Self {
        let open = vec![FilterField::eq("status", LoadStatus::Posted.as_str())];
        Self {
            mine: EntityService::with_scope(
                Arc::clone(&store),
                Arc::clone(&notifier),
                ListScope::Owned,
            ),
            marketplace: EntityService::with_scope(store, notifier, ListScope::Filtered(open)),
        }
    }

    /// Loads posted by the caller.
    pub fn mine(&self) -> &EntityService<Load> {
        &self.mine
    }

    /// Loads open for booking.
    pub fn marketplace(&self) -> &EntityService<Load> {
        &self.marketplace
    }

    /// Posts a new load owned by the caller.
    pub async fn post(&self, ctx: &RequestContext, draft: &NewLoad) -> AppResult<Load> {
        self.mine.create(ctx, draft).await
    }

    /// Moves a load to another status.
    pub async fn update_status(
        &self,
        ctx: &RequestContext,
        load_id: LoadId,
        status: LoadStatus,
    ) -> AppResult<Load> {
        self.mine
            .update(ctx, load_id, &LoadPatch::status(status))
            .await
    }

    /// Assigns a truck and driver and marks the load assigned.
    pub async fn assign(
        &self,
        ctx: &RequestContext,
        load_id: LoadId,
        truck_id: TruckId,
        driver_id: DriverId,
    ) -> AppResult<Load> {
        let patch = LoadPatch {
            status: Some(LoadStatus::Assigned),
            assigned_truck_id: Some(truck_id),
            assigned_driver_id: Some(driver_id),
            ..LoadPatch::default()
        };
        self.mine.update(ctx, load_id, &patch).await
    }

    /// Withdraws a load.
    pub async fn cancel(&self, ctx: &RequestContext, load_id: LoadId) -> AppResult<Load> {
        self.update_status(ctx, load_id, LoadStatus::Cancelled)
            .await
    }

    /// Cached open loads whose route matches, case-insensitively.
    pub fn search_open(&self, origin: Option<&str>, destination: Option<&str>) -> Vec<Load> {
        let matches = |field: &Option<String>, wanted: Option<&str>| match wanted {
            None => true,
            Some(wanted) => field
                .as_deref()
                .is_some_and(|value| value.to_lowercase().contains(&wanted.to_lowercase())),
        };
        self.marketplace
            .records()
            .into_iter()
            .filter(|load| matches(&load.origin, origin) && matches(&load.destination, destination))
            .collect()
    }

    /// Cancels in-flight fetches of both lists.
    pub fn shutdown(&self) {
        self.mine.shutdown();
        self.marketplace.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use haulmark_core::error::ErrorKind;
    use haulmark_core::types::UserId;
    use haulmark_database::MemoryRecordStore;
    use haulmark_entity::user::UserRole;

    use crate::notification::MemoryNotifier;

    fn draft(origin: &str, destination: &str) -> NewLoad {
        NewLoad {
            origin: origin.to_string(),
            destination: destination.to_string(),
            pickup_date: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
            material: "Cement".to_string(),
            weight_tons: 18.0,
            price: 32_000.0,
            status: LoadStatus::Posted,
        }
    }

    #[tokio::test]
    async fn test_marketplace_shows_only_posted_loads() {
        let shipper = UserId::new();
        let fleet_owner = UserId::new();
        let shared = MemoryRecordStore::with_marketplace_policy();
        let shipper_ctx = RequestContext::authenticated(shipper, UserRole::Shipper);

        let loads = LoadService::new(
            Arc::new(shared.as_principal(Some(shipper))),
            Arc::new(MemoryNotifier::new()),
        );
        loads.post(&shipper_ctx, &draft("Mumbai", "Pune")).await.unwrap();
        let delivered = loads.post(&shipper_ctx, &draft("Surat", "Indore")).await.unwrap();
        loads
            .update_status(&shipper_ctx, delivered.id, LoadStatus::Delivered)
            .await
            .unwrap();
        assert_eq!(loads.mine().len(), 2);

        let market = LoadService::new(
            Arc::new(shared.as_principal(Some(fleet_owner))),
            Arc::new(MemoryNotifier::new()),
        );
        market
            .marketplace()
            .fetch_list(&RequestContext::authenticated(fleet_owner, UserRole::FleetOwner))
            .await
            .unwrap();
        assert_eq!(market.marketplace().len(), 1);
        assert_eq!(market.search_open(Some("mumbai"), None).len(), 1);
        assert!(market.search_open(None, Some("indore")).is_empty());
    }

    #[tokio::test]
    async fn test_only_shipper_can_assign() {
        let shipper = UserId::new();
        let intruder = UserId::new();
        let shared = MemoryRecordStore::with_marketplace_policy();

        let loads = LoadService::new(
            Arc::new(shared.as_principal(Some(shipper))),
            Arc::new(MemoryNotifier::new()),
        );
        let shipper_ctx = RequestContext::authenticated(shipper, UserRole::Shipper);
        let load = loads.post(&shipper_ctx, &draft("Chennai", "Bengaluru")).await.unwrap();

        let notifier = MemoryNotifier::new();
        let other = LoadService::new(
            Arc::new(shared.as_principal(Some(intruder))),
            Arc::new(notifier.clone()),
        );
        let err = other
            .cancel(
                &RequestContext::authenticated(intruder, UserRole::Shipper),
                load.id,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        assert_eq!(notifier.len(), 1);

        let assigned = loads
            .assign(&shipper_ctx, load.id, TruckId::new(), DriverId::new())
            .await
            .unwrap();
        assert_eq!(assigned.effective_status(), LoadStatus::Assigned);
        assert!(assigned.assigned_truck_id.is_some());
    }
}
