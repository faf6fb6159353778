pub mod memory;
pub mod postgres;
pub mod shipments;
pub mod users;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{NewShipment, NewUser, Shipment, ShipmentPatch, User};
use crate::query::{Page, ShipmentQuery, Sort};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// SQLSTATE raised by `~*` for a pattern Postgres cannot compile.
const INVALID_REGULAR_EXPRESSION: &str = "2201B";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write. Carries the constraint name.
    #[error("duplicate key: {0}")]
    Duplicate(String),
    /// A filter pattern the regex engine refused.
    #[error("{0}")]
    InvalidPattern(String),
    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                StoreError::Duplicate(db_err.constraint().unwrap_or("unique").to_string())
            }
            sqlx::Error::Database(ref db_err) if db_err.code().as_deref() == Some(INVALID_REGULAR_EXPRESSION) => {
                StoreError::InvalidPattern(db_err.message().to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Fails with [`StoreError::Duplicate`] when the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;
}

#[async_trait]
pub trait ShipmentStore: Send + Sync {
    async fn find_shipment(&self, id: Uuid) -> Result<Option<Shipment>, StoreError>;

    async fn count_shipments(&self, query: &ShipmentQuery) -> Result<i64, StoreError>;

    async fn list_shipments(
        &self,
        query: &ShipmentQuery,
        sort: Sort,
        page: Page,
    ) -> Result<Vec<Shipment>, StoreError>;

    /// Fails with [`StoreError::Duplicate`] when the tracking number is taken.
    async fn create_shipment(&self, shipment: NewShipment) -> Result<Shipment, StoreError>;

    /// Returns the merged record, or `None` if no shipment has this id.
    async fn update_shipment(
        &self,
        id: Uuid,
        patch: &ShipmentPatch,
    ) -> Result<Option<Shipment>, StoreError>;

    /// Returns the number of removed records.
    async fn delete_shipment(&self, id: Uuid) -> Result<u64, StoreError>;
}

/// Everything the API needs from persistence.
pub trait Store: UserStore + ShipmentStore {}

impl<T: UserStore + ShipmentStore> Store for T {}
