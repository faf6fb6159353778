//! In-process store mirroring the Postgres one: unique emails and tracking
//! numbers, the same ordering and paging, and text search on the same stems.
//! Filter patterns run on the `regex` crate instead of Postgres ARE, so the
//! two engines can disagree on exotic syntax.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ShipmentStore, StoreError, UserStore};
use crate::models::{NewShipment, NewUser, Shipment, ShipmentPatch, User};
use crate::query::{Page, ShipmentQuery, Sort};

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    shipments: HashMap<Uuid, Shipment>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("users_email_key".to_string()));
        }

        let user = User {
            id: Uuid::now_v7(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl ShipmentStore for MemoryStore {
    async fn find_shipment(&self, id: Uuid) -> Result<Option<Shipment>, StoreError> {
        Ok(self.inner.read().await.shipments.get(&id).cloned())
    }

    async fn count_shipments(&self, query: &ShipmentQuery) -> Result<i64, StoreError> {
        let inner = self.inner.read().await;
        let matcher = query.matcher()?;
        let count = inner.shipments.values().filter(|s| matcher.matches(s)).count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn list_shipments(
        &self,
        query: &ShipmentQuery,
        sort: Sort,
        page: Page,
    ) -> Result<Vec<Shipment>, StoreError> {
        let inner = self.inner.read().await;
        let matcher = query.matcher()?;
        let mut matching: Vec<&Shipment> =
            inner.shipments.values().filter(|s| matcher.matches(s)).collect();
        matching.sort_by(|a, b| sort.compare(a, b));

        let offset = usize::try_from(page.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit).unwrap_or(0);
        Ok(matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn create_shipment(&self, shipment: NewShipment) -> Result<Shipment, StoreError> {
        let mut inner = self.inner.write().await;
        if inner
            .shipments
            .values()
            .any(|s| s.tracking_number == shipment.tracking_number)
        {
            return Err(StoreError::Duplicate(
                "shipments_tracking_number_key".to_string(),
            ));
        }

        let shipment = shipment.into_shipment(Uuid::now_v7(), Utc::now());
        inner.shipments.insert(shipment.id, shipment.clone());
        Ok(shipment)
    }

    async fn update_shipment(
        &self,
        id: Uuid,
        patch: &ShipmentPatch,
    ) -> Result<Option<Shipment>, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.shipments.get_mut(&id).map(|shipment| {
            patch.apply(shipment, Utc::now());
            shipment.clone()
        }))
    }

    async fn delete_shipment(&self, id: Uuid) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(u64::from(inner.shipments.remove(&id).is_some()))
    }
}
