//! Wire representation of the schema and the mapping from stored records.

use chrono::{DateTime, SecondsFormat, Utc};
use juniper::{GraphQLInputObject, GraphQLObject, ID};

use crate::auth::Identity;
use crate::models::{Role, Shipment, ShipmentStatus, User};

#[derive(Debug, Clone, PartialEq, GraphQLObject)]
#[graphql(name = "User")]
pub struct UserNode {
    pub id: ID,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<Identity> for UserNode {
    fn from(identity: Identity) -> Self {
        Self {
            id: ID::from(identity.id.to_string()),
            name: identity.name,
            email: identity.email,
            role: identity.role,
        }
    }
}

impl From<User> for UserNode {
    fn from(user: User) -> Self {
        Identity::from(user).into()
    }
}

#[derive(Debug, Clone, GraphQLObject)]
pub struct AuthPayload {
    /// Bearer token for the `Authorization` header.
    pub token: String,
    pub user: UserNode,
}

#[derive(Debug, Clone, PartialEq, GraphQLObject)]
#[graphql(name = "Shipment")]
pub struct ShipmentNode {
    pub id: ID,
    pub shipper_name: String,
    pub carrier_name: String,
    pub pickup_location: String,
    pub delivery_location: String,
    pub pickup_date: String,
    pub delivery_date: String,
    pub status: ShipmentStatus,
    pub rate_usd: f64,
    pub tracking_number: String,
    pub reference: Option<String>,
    pub weight_kg: Option<f64>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Canonical timestamp text: RFC 3339, UTC, millisecond precision, `Z` suffix.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl From<Shipment> for ShipmentNode {
    fn from(s: Shipment) -> Self {
        Self {
            id: ID::from(s.id.to_string()),
            shipper_name: s.shipper_name,
            carrier_name: s.carrier_name,
            pickup_location: s.pickup_location,
            delivery_location: s.delivery_location,
            pickup_date: format_timestamp(s.pickup_date),
            delivery_date: format_timestamp(s.delivery_date),
            status: s.status,
            rate_usd: s.rate_usd,
            tracking_number: s.tracking_number,
            reference: Some(s.reference),
            weight_kg: Some(s.weight_kg),
            notes: Some(s.notes),
            created_at: format_timestamp(s.created_at),
            updated_at: format_timestamp(s.updated_at),
        }
    }
}

#[derive(Debug, Clone, GraphQLObject)]
pub struct ShipmentConnection {
    pub nodes: Vec<ShipmentNode>,
    /// Matches across all pages. Counted separately from the page fetch.
    pub total_count: i32,
    pub limit: i32,
    pub offset: i32,
}

#[derive(Debug, Clone, GraphQLInputObject)]
pub struct AddShipmentInput {
    pub shipper_name: String,
    pub carrier_name: String,
    pub pickup_location: String,
    pub delivery_location: String,
    pub pickup_date: String,
    pub delivery_date: String,
    pub status: ShipmentStatus,
    pub rate_usd: f64,
    pub tracking_number: String,
    pub reference: Option<String>,
    pub weight_kg: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, GraphQLInputObject)]
pub struct UpdateShipmentInput {
    pub shipper_name: Option<String>,
    pub carrier_name: Option<String>,
    pub pickup_location: Option<String>,
    pub delivery_location: Option<String>,
    pub pickup_date: Option<String>,
    pub delivery_date: Option<String>,
    pub status: Option<ShipmentStatus>,
    pub rate_usd: Option<f64>,
    pub reference: Option<String>,
    pub weight_kg: Option<f64>,
    pub notes: Option<String>,
}
