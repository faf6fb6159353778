use std::str::FromStr;

use chrono::{DateTime, Utc};
use juniper::GraphQLEnum;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UnknownVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, GraphQLEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentStatus {
    #[graphql(name = "CREATED")]
    Created,
    #[graphql(name = "IN_TRANSIT")]
    InTransit,
    #[graphql(name = "DELIVERED")]
    Delivered,
    #[graphql(name = "ON_HOLD")]
    OnHold,
}

impl ShipmentStatus {
    pub const ALL: [ShipmentStatus; 4] = [
        ShipmentStatus::Created,
        ShipmentStatus::InTransit,
        ShipmentStatus::Delivered,
        ShipmentStatus::OnHold,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ShipmentStatus::Created => "CREATED",
            ShipmentStatus::InTransit => "IN_TRANSIT",
            ShipmentStatus::Delivered => "DELIVERED",
            ShipmentStatus::OnHold => "ON_HOLD",
        }
    }
}

impl FromStr for ShipmentStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShipmentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "shipment status",
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for ShipmentStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct Shipment {
    pub id: Uuid,
    pub shipper_name: String,
    pub carrier_name: String,
    pub pickup_location: String,
    pub delivery_location: String,
    pub pickup_date: DateTime<Utc>,
    pub delivery_date: DateTime<Utc>,
    #[sqlx(try_from = "String")]
    pub status: ShipmentStatus,
    pub rate_usd: f64,
    pub tracking_number: String,
    pub reference: String,
    pub weight_kg: f64,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a shipment that has not been stored yet. Optional inputs are
/// already resolved to their stored defaults.
#[derive(Debug, Clone)]
pub struct NewShipment {
    pub shipper_name: String,
    pub carrier_name: String,
    pub pickup_location: String,
    pub delivery_location: String,
    pub pickup_date: DateTime<Utc>,
    pub delivery_date: DateTime<Utc>,
    pub status: ShipmentStatus,
    pub rate_usd: f64,
    pub tracking_number: String,
    pub reference: String,
    pub weight_kg: f64,
    pub notes: String,
}

impl NewShipment {
    pub fn into_shipment(self, id: Uuid, now: DateTime<Utc>) -> Shipment {
        Shipment {
            id,
            shipper_name: self.shipper_name,
            carrier_name: self.carrier_name,
            pickup_location: self.pickup_location,
            delivery_location: self.delivery_location,
            pickup_date: self.pickup_date,
            delivery_date: self.delivery_date,
            status: self.status,
            rate_usd: self.rate_usd,
            tracking_number: self.tracking_number,
            reference: self.reference,
            weight_kg: self.weight_kg,
            notes: self.notes,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update. `None` leaves the stored value untouched. The tracking
/// number is not patchable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShipmentPatch {
    pub shipper_name: Option<String>,
    pub carrier_name: Option<String>,
    pub pickup_location: Option<String>,
    pub delivery_location: Option<String>,
    pub pickup_date: Option<DateTime<Utc>>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub status: Option<ShipmentStatus>,
    pub rate_usd: Option<f64>,
    pub reference: Option<String>,
    pub weight_kg: Option<f64>,
    pub notes: Option<String>,
}

impl ShipmentPatch {
    pub fn apply(&self, shipment: &mut Shipment, now: DateTime<Utc>) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }

        set(&mut shipment.shipper_name, &self.shipper_name);
        set(&mut shipment.carrier_name, &self.carrier_name);
        set(&mut shipment.pickup_location, &self.pickup_location);
        set(&mut shipment.delivery_location, &self.delivery_location);
        set(&mut shipment.pickup_date, &self.pickup_date);
        set(&mut shipment.delivery_date, &self.delivery_date);
        set(&mut shipment.status, &self.status);
        set(&mut shipment.rate_usd, &self.rate_usd);
        set(&mut shipment.reference, &self.reference);
        set(&mut shipment.weight_kg, &self.weight_kg);
        set(&mut shipment.notes, &self.notes);
        shipment.updated_at = now;
    }
}
