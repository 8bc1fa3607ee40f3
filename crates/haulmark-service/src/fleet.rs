//! Fleet management: a fleet owner's trucks and drivers.

use std::sync::Arc;

use chrono::NaiveDate;

use haulmark_core::result::AppResult;
use haulmark_core::traits::{NotificationSink, RecordStore};
use haulmark_core::types::{DriverId, TruckId};
use haulmark_entity::driver::{Driver, DriverPatch, DriverStatus};
use haulmark_entity::truck::{Truck, TruckPatch, TruckStatus};

use crate::context::RequestContext;
use crate::entity::{EntityService, ListScope};

/// The caller's trucks and drivers.
#[derive(Debug)]
pub struct FleetService {
    trucks: EntityService<Truck>,
    drivers: EntityService<Driver>,
}

impl FleetService {
    /// Creates a fleet service listing the caller's own records.
    pub fn new(store: Arc<dyn RecordStore>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            trucks: EntityService::with_scope(
                Arc::clone(&store),
                Arc::clone(&notifier),
                ListScope::Owned,
            ),
            drivers: EntityService::with_scope(store, notifier, ListScope::Owned),
        }
    }

    /// Truck CRUD.
    pub fn trucks(&self) -> &EntityService<Truck> {
        &self.trucks
    }

    /// Driver CRUD.
    pub fn drivers(&self) -> &EntityService<Driver> {
        &self.drivers
    }

    /// Refreshes trucks and drivers concurrently.
    pub async fn refresh(&self, ctx: &RequestContext) -> AppResult<()> {
        tokio::try_join!(self.trucks.fetch_list(ctx), self.drivers.fetch_list(ctx))?;
        Ok(())
    }

    /// Changes a truck's operational status.
    pub async fn set_truck_status(
        &self,
        ctx: &RequestContext,
        truck_id: TruckId,
        status: TruckStatus,
    ) -> AppResult<Truck> {
        let patch = TruckPatch {
            status: Some(status),
            ..TruckPatch::default()
        };
        self.trucks.update(ctx, truck_id, &patch).await
    }

    /// Puts a driver on a truck.
    pub async fn assign_driver(
        &self,
        ctx: &RequestContext,
        driver_id: DriverId,
        truck_id: TruckId,
    ) -> AppResult<Driver> {
        let patch = DriverPatch {
            assigned_truck_id: Some(truck_id),
            ..DriverPatch::default()
        };
        self.drivers.update(ctx, driver_id, &patch).await
    }

    /// Cached trucks that can take a load.
    pub fn available_trucks(&self) -> Vec<Truck> {
        self.trucks
            .records()
            .into_iter()
            .filter(|truck| truck.status.unwrap_or_default().is_assignable())
            .collect()
    }

    /// Cached drivers who are free and not on any truck.
    pub fn unassigned_drivers(&self) -> Vec<Driver> {
        self.drivers
            .records()
            .into_iter()
            .filter(|driver| driver.assigned_truck_id.is_none())
            .filter(|driver| driver.status.unwrap_or_default() == DriverStatus::Available)
            .collect()
    }

    /// Cached drivers whose licence has lapsed by `today`.
    pub fn expired_licenses(&self, today: NaiveDate) -> Vec<Driver> {
        self.drivers
            .records()
            .into_iter()
            .filter(|driver| driver.license_expired(today))
            .collect()
    }

    /// Whether either list is waiting on the store.
    pub fn is_loading(&self) -> bool {
        self.trucks.is_loading() || self.drivers.is_loading()
    }

    /// Cancels in-flight fetches of both lists.
    pub fn shutdown(&self) {
        self.trucks.shutdown();
        self.drivers.shutdown();
    }
}
