//! Resets the database to a demo data set: one admin, one employee and 100
//! randomized shipments.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use shipment_tracker::auth::password;
use shipment_tracker::db::{shipments, users};
use shipment_tracker::models::{NewShipment, NewUser, Role, ShipmentStatus};

const CARRIERS: [&str; 5] = [
    "BlueLine Logistics",
    "NorthStar Freight",
    "SwiftHaul",
    "Apex Carriers",
    "ZenRoute",
];

const LOCATIONS: [&str; 6] = [
    "Seattle, WA",
    "Los Angeles, CA",
    "Dallas, TX",
    "Chicago, IL",
    "Miami, FL",
    "New York, NY",
];

const SHIPMENT_COUNT: u32 = 100;

const ACCOUNTS: [(&str, &str, &str, Role); 2] = [
    ("Admin", "admin@tms.com", "Admin@123", Role::Admin),
    ("Employee", "employee@tms.com", "Emp@123", Role::Employee),
];

fn pick<'a, R: Rng>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items[rng.random_range(0..items.len())]
}

fn shipment<R: Rng>(rng: &mut R, i: u32, now: DateTime<Utc>) -> NewShipment {
    let pickup = pick(rng, &LOCATIONS);
    let mut delivery = pick(rng, &LOCATIONS);
    // One re-roll, so the same city can still occasionally appear twice.
    if delivery == pickup {
        delivery = pick(rng, &LOCATIONS);
    }

    NewShipment {
        shipper_name: format!("Shipper {}", (i - 1) % 10 + 1),
        carrier_name: pick(rng, &CARRIERS).to_string(),
        pickup_location: pickup.to_string(),
        delivery_location: delivery.to_string(),
        pickup_date: now - Duration::days(rng.random_range(0..20)),
        delivery_date: now + Duration::days(rng.random_range(0..12)),
        status: ShipmentStatus::ALL[rng.random_range(0..ShipmentStatus::ALL.len())],
        rate_usd: f64::from(120 + rng.random_range(0..=1800_u32)),
        tracking_number: format!("TRK-{i:05}-{}", 1000 + i),
        reference: format!("REF-{}-{i}", now.timestamp_millis()),
        weight_kg: f64::from(10 + rng.random_range(0..=200_u32)),
        notes: "Seeded shipment record".to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let mut tx = pool.begin().await?;

    let removed_users = users::delete_all(&mut *tx).await?;
    let removed_shipments = shipments::delete_all(&mut *tx).await?;
    tracing::info!(removed_users, removed_shipments, "Cleared existing data");

    for (name, email, pass, role) in ACCOUNTS {
        let password_hash = password::hash(pass)?;
        users::create(
            &mut *tx,
            &NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash,
                role,
            },
        )
        .await?;
    }

    let docs: Vec<NewShipment> = {
        let mut rng = rand::rng();
        let now = Utc::now();
        (1..=SHIPMENT_COUNT).map(|i| shipment(&mut rng, i, now)).collect()
    };
    let inserted = shipments::insert_many(&mut *tx, &docs).await?;

    tx.commit().await?;

    tracing::info!(inserted, "Seed complete");
    for (_, email, pass, role) in ACCOUNTS {
        tracing::info!("{}: {email} / {pass}", role.as_str());
    }

    Ok(())
}
