use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{shipments, users, ShipmentStore, StoreError, UserStore};
use crate::models::{NewShipment, NewUser, Shipment, ShipmentPatch, User};
use crate::query::{Page, ShipmentQuery, Sort};

/// Postgres-backed store. Cheap to clone; shares the pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(users::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(users::find_by_email(&self.pool, email).await?)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        Ok(users::create(&self.pool, &user).await?)
    }
}

#[async_trait]
impl ShipmentStore for PgStore {
    async fn find_shipment(&self, id: Uuid) -> Result<Option<Shipment>, StoreError> {
        Ok(shipments::find_by_id(&self.pool, id).await?)
    }

    async fn count_shipments(&self, query: &ShipmentQuery) -> Result<i64, StoreError> {
        Ok(shipments::count(&self.pool, query).await?)
    }

    async fn list_shipments(
        &self,
        query: &ShipmentQuery,
        sort: Sort,
        page: Page,
    ) -> Result<Vec<Shipment>, StoreError> {
        Ok(shipments::list(&self.pool, query, sort, page).await?)
    }

    async fn create_shipment(&self, shipment: NewShipment) -> Result<Shipment, StoreError> {
        Ok(shipments::create(&self.pool, &shipment).await?)
    }

    async fn update_shipment(
        &self,
        id: Uuid,
        patch: &ShipmentPatch,
    ) -> Result<Option<Shipment>, StoreError> {
        Ok(shipments::update(&self.pool, id, patch).await?)
    }

    async fn delete_shipment(&self, id: Uuid) -> Result<u64, StoreError> {
        Ok(shipments::delete(&self.pool, id).await?)
    }
}
