use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::auth::{Identity, require_auth, require_role};
use crate::error::AppError;
use crate::graphql::types::{AddShipmentInput, ShipmentConnection, ShipmentNode, UpdateShipmentInput};
use crate::models::{NewShipment, Role, ShipmentPatch};
use crate::query::{Page, PaginationInput, ShipmentFilter, ShipmentQuery, Sort, ShipmentSort};
use crate::state::AppState;

const WRITERS: &[Role] = &[Role::Admin];

/// Accepts RFC 3339 with any offset, a naive date-time (taken as UTC), or a
/// bare date (UTC midnight).
pub fn parse_date(field: &str, value: &str) -> Result<DateTime<Utc>, AppError> {
    let value = value.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.with_timezone(&Utc));
    }
    if let Ok(at) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(at.and_utc());
    }
    if let Some(at) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(at.and_utc());
    }
    Err(AppError::BadUserInput(format!("Invalid {field}: {value}")))
}

fn parse_optional_date(field: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>, AppError> {
    value.map(|v| parse_date(field, v)).transpose()
}

/// Ids that are not UUIDs cannot exist in the store.
fn parse_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id).ok()
}

pub async fn get(
    state: &AppState,
    identity: Option<&Identity>,
    id: &str,
) -> Result<Option<ShipmentNode>, AppError> {
    require_auth(identity)?;

    let Some(id) = parse_id(id) else {
        return Ok(None);
    };
    Ok(state.store.find_shipment(id).await?.map(ShipmentNode::from))
}

pub async fn list(
    state: &AppState,
    identity: Option<&Identity>,
    filter: Option<&ShipmentFilter>,
    pagination: Option<&PaginationInput>,
    sort: Option<&ShipmentSort>,
) -> Result<ShipmentConnection, AppError> {
    require_auth(identity)?;

    let page = Page::from_input(pagination);
    let sort = Sort::from_input(sort);
    let query = ShipmentQuery::build(filter);

    // Two independent reads; the count may drift from the page under writes.
    let (total_count, rows) = tokio::try_join!(
        state.store.count_shipments(&query),
        state.store.list_shipments(&query, sort, page),
    )?;

    Ok(ShipmentConnection {
        nodes: rows.into_iter().map(ShipmentNode::from).collect(),
        total_count: i32::try_from(total_count).unwrap_or(i32::MAX),
        limit: i32::try_from(page.limit).unwrap_or(i32::MAX),
        offset: i32::try_from(page.offset).unwrap_or(i32::MAX),
    })
}

pub async fn add(
    state: &AppState,
    identity: Option<&Identity>,
    input: AddShipmentInput,
) -> Result<ShipmentNode, AppError> {
    let caller = require_role(identity, WRITERS)?;

    let shipment = NewShipment {
        pickup_date: parse_date("pickupDate", &input.pickup_date)?,
        delivery_date: parse_date("deliveryDate", &input.delivery_date)?,
        shipper_name: input.shipper_name,
        carrier_name: input.carrier_name,
        pickup_location: input.pickup_location,
        delivery_location: input.delivery_location,
        status: input.status,
        rate_usd: input.rate_usd,
        tracking_number: input.tracking_number,
        reference: input.reference.unwrap_or_default(),
        weight_kg: input.weight_kg.unwrap_or(0.0),
        notes: input.notes.unwrap_or_default(),
    };

    let created = state.store.create_shipment(shipment).await?;
    tracing::info!(shipment_id = %created.id, user_id = %caller.id, "Shipment created");
    Ok(created.into())
}

pub async fn update(
    state: &AppState,
    identity: Option<&Identity>,
    id: &str,
    input: UpdateShipmentInput,
) -> Result<ShipmentNode, AppError> {
    let caller = require_role(identity, WRITERS)?;

    let patch = ShipmentPatch {
        pickup_date: parse_optional_date("pickupDate", input.pickup_date.as_deref())?,
        delivery_date: parse_optional_date("deliveryDate", input.delivery_date.as_deref())?,
        shipper_name: input.shipper_name,
        carrier_name: input.carrier_name,
        pickup_location: input.pickup_location,
        delivery_location: input.delivery_location,
        status: input.status,
        rate_usd: input.rate_usd,
        reference: input.reference,
        weight_kg: input.weight_kg,
        notes: input.notes,
    };

    let id = parse_id(id).ok_or(AppError::NotFound)?;
    let updated = state
        .store
        .update_shipment(id, &patch)
        .await?
        .ok_or(AppError::NotFound)?;

    tracing::info!(shipment_id = %updated.id, user_id = %caller.id, "Shipment updated");
    Ok(updated.into())
}

pub async fn delete(
    state: &AppState,
    identity: Option<&Identity>,
    id: &str,
) -> Result<bool, AppError> {
    let caller = require_role(identity, WRITERS)?;

    let Some(id) = parse_id(id) else {
        return Ok(false);
    };
    let removed = state.store.delete_shipment(id).await?;
    if removed == 1 {
        tracing::info!(shipment_id = %id, user_id = %caller.id, "Shipment deleted");
    }
    Ok(removed == 1)
}
