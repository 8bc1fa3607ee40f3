//! Shared test helpers for integration tests.

use std::sync::Arc;

use chrono::NaiveDate;

use haulmark_core::config::StorageConfig;
use haulmark_core::types::UserId;
use haulmark_database::MemoryRecordStore;
use haulmark_entity::document::{Kyc, LoadPaperwork};
use haulmark_entity::load::{LoadStatus, NewLoad};
use haulmark_entity::truck::{NewTruck, TruckStatus};
use haulmark_entity::user::UserRole;
use haulmark_service::{
    DocumentTracker, FleetService, LoadService, MemoryNotifier, RequestContext,
};
use haulmark_storage::MemoryBlobStore;

/// One shared marketplace backend that several users act against.
pub struct TestMarketplace {
    /// Shared record tables
    pub store: MemoryRecordStore,
    /// Shared blob buckets
    pub blobs: MemoryBlobStore,
    /// Upload limits and bucket names
    pub storage: StorageConfig,
}

/// Services and identity for one signed-in user.
pub struct TestUser {
    pub id: UserId,
    pub ctx: RequestContext,
    pub notifier: Arc<MemoryNotifier>,
    pub fleet: FleetService,
    pub loads: LoadService,
    pub kyc: DocumentTracker<Kyc>,
    pub paperwork: DocumentTracker<LoadPaperwork>,
}

impl TestMarketplace {
    /// Create an empty marketplace
    pub fn new() -> Self {
        Self {
            store: MemoryRecordStore::with_marketplace_policy(),
            blobs: MemoryBlobStore::default(),
            storage: StorageConfig::default(),
        }
    }

    /// Sign in a fresh user with the given role
    pub fn user(&self, role: UserRole) -> TestUser {
        let id = UserId::new();
        let records = Arc::new(self.store.as_principal(Some(id)));
        let blobs = Arc::new(self.blobs.clone());
        let notifier = Arc::new(MemoryNotifier::new());

        TestUser {
            id,
            ctx: RequestContext::authenticated(id, role),
            fleet: FleetService::new(records.clone(), notifier.clone()),
            loads: LoadService::new(records.clone(), notifier.clone()),
            kyc: DocumentTracker::kyc(
                records.clone(),
                blobs.clone(),
                notifier.clone(),
                &self.storage,
            ),
            paperwork: DocumentTracker::load_paperwork(
                records,
                blobs,
                notifier.clone(),
                &self.storage,
            ),
            notifier,
        }
    }

    /// Services for a caller that has not signed in
    pub fn anonymous(&self) -> TestUser {
        let records = Arc::new(self.store.as_principal(None));
        let blobs = Arc::new(self.blobs.clone());
        let notifier = Arc::new(MemoryNotifier::new());

        TestUser {
            id: UserId::new(),
            ctx: RequestContext::anonymous(),
            fleet: FleetService::new(records.clone(), notifier.clone()),
            loads: LoadService::new(records.clone(), notifier.clone()),
            kyc: DocumentTracker::kyc(
                records.clone(),
                blobs.clone(),
                notifier.clone(),
                &self.storage,
            ),
            paperwork: DocumentTracker::load_paperwork(
                records,
                blobs,
                notifier.clone(),
                &self.storage,
            ),
            notifier,
        }
    }
}

/// A valid truck draft
pub fn truck_draft(registration: &str) -> NewTruck {
    NewTruck {
        registration_number: registration.to_string(),
        truck_type: "open".to_string(),
        capacity_tons: 16.0,
        current_location: Some("Pune".to_string()),
        status: TruckStatus::Available,
    }
}

/// A valid load draft
pub fn load_draft(origin: &str, destination: &str) -> NewLoad {
    NewLoad {
        origin: origin.to_string(),
        destination: destination.to_string(),
        pickup_date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
        material: "Steel coils".to_string(),
        weight_tons: 12.5,
        price: 42_000.0,
        status: LoadStatus::Posted,
    }
}
