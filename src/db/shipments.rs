use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{NewShipment, Shipment, ShipmentPatch};
use crate::query::{Page, ShipmentQuery, Sort};

const COLUMNS: &str = "id, shipper_name, carrier_name, pickup_location, delivery_location, \
     pickup_date, delivery_date, status, rate_usd, tracking_number, reference, weight_kg, \
     notes, created_at, updated_at";

const INSERT_COLUMNS: &str = "id, shipper_name, carrier_name, pickup_location, \
     delivery_location, pickup_date, delivery_date, status, rate_usd, tracking_number, \
     reference, weight_kg, notes";

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    shipment: &NewShipment,
) -> Result<Shipment, sqlx::Error> {
    sqlx::query_as::<_, Shipment>(&format!(
        "INSERT INTO shipments ({INSERT_COLUMNS})
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
         RETURNING {COLUMNS}"
    ))
    .bind(Uuid::now_v7())
    .bind(&shipment.shipper_name)
    .bind(&shipment.carrier_name)
    .bind(&shipment.pickup_location)
    .bind(&shipment.delivery_location)
    .bind(shipment.pickup_date)
    .bind(shipment.delivery_date)
    .bind(shipment.status.as_str())
    .bind(shipment.rate_usd)
    .bind(&shipment.tracking_number)
    .bind(&shipment.reference)
    .bind(shipment.weight_kg)
    .bind(&shipment.notes)
    .fetch_one(executor)
    .await
}

/// Bulk insert in a single statement.
pub async fn insert_many<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    shipments: &[NewShipment],
) -> Result<u64, sqlx::Error> {
    if shipments.is_empty() {
        return Ok(0);
    }

    let mut builder = QueryBuilder::<Postgres>::new(format!("INSERT INTO shipments ({INSERT_COLUMNS}) "));
    builder.push_values(shipments, |mut row, s| {
        row.push_bind(Uuid::now_v7())
            .push_bind(s.shipper_name.clone())
            .push_bind(s.carrier_name.clone())
            .push_bind(s.pickup_location.clone())
            .push_bind(s.delivery_location.clone())
            .push_bind(s.pickup_date)
            .push_bind(s.delivery_date)
            .push_bind(s.status.as_str())
            .push_bind(s.rate_usd)
            .push_bind(s.tracking_number.clone())
            .push_bind(s.reference.clone())
            .push_bind(s.weight_kg)
            .push_bind(s.notes.clone());
    });

    let result = builder.build().execute(executor).await?;
    Ok(result.rows_affected())
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Shipment>, sqlx::Error> {
    sqlx::query_as::<_, Shipment>(&format!("SELECT {COLUMNS} FROM shipments WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Appends the WHERE clause for `query`. Nothing is appended when the query
/// is unconstrained.
fn push_conditions(builder: &mut QueryBuilder<'_, Postgres>, query: &ShipmentQuery) {
    let mut keyword = " WHERE ";

    if let Some(status) = query.status {
        builder.push(keyword).push("status = ").push_bind(status.as_str());
        keyword = " AND ";
    }

    for pattern in &query.patterns {
        builder
            .push(keyword)
            .push(pattern.field.column())
            .push(" ~* ")
            .push_bind(pattern.pattern.clone());
        keyword = " AND ";
    }

    if let Some(tsquery) = query.tsquery() {
        builder
            .push(keyword)
            .push("search_vector @@ to_tsquery('english', ")
            .push_bind(tsquery)
            .push(")");
    }
}

pub async fn count(pool: &PgPool, query: &ShipmentQuery) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM shipments");
    push_conditions(&mut builder, query);
    builder.build_query_scalar::<i64>().fetch_one(pool).await
}

pub async fn list(
    pool: &PgPool,
    query: &ShipmentQuery,
    sort: Sort,
    page: Page,
) -> Result<Vec<Shipment>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM shipments"));
    push_conditions(&mut builder, query);

    // Column and direction come from closed enums, never from caller text.
    builder
        .push(format!(
            " ORDER BY {} {}, id ASC LIMIT ",
            sort.field.column(),
            sort.order.as_sql()
        ))
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset);

    builder.build_query_as::<Shipment>().fetch_all(pool).await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    patch: &ShipmentPatch,
) -> Result<Option<Shipment>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new("UPDATE shipments SET updated_at = now()");

    macro_rules! set_if_present {
        ($column:literal, $value:expr) => {
            if let Some(value) = $value {
                builder.push(concat!(", ", $column, " = ")).push_bind(value);
            }
        };
    }

    set_if_present!("shipper_name", patch.shipper_name.clone());
    set_if_present!("carrier_name", patch.carrier_name.clone());
    set_if_present!("pickup_location", patch.pickup_location.clone());
    set_if_present!("delivery_location", patch.delivery_location.clone());
    set_if_present!("pickup_date", patch.pickup_date);
    set_if_present!("delivery_date", patch.delivery_date);
    set_if_present!("status", patch.status.map(|s| s.as_str()));
    set_if_present!("rate_usd", patch.rate_usd);
    set_if_present!("reference", patch.reference.clone());
    set_if_present!("weight_kg", patch.weight_kg);
    set_if_present!("notes", patch.notes.clone());

    builder
        .push(" WHERE id = ")
        .push_bind(id)
        .push(format!(" RETURNING {COLUMNS}"));

    builder.build_query_as::<Shipment>().fetch_optional(pool).await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM shipments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_all<'e, E: sqlx::PgExecutor<'e>>(executor: E) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM shipments").execute(executor).await?;
    Ok(result.rows_affected())
}
