#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde_json::{Value, json};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use shipment_tracker::config::Config;
use shipment_tracker::db::{MemoryStore, PgStore, Store};
use shipment_tracker::models::{NewShipment, Shipment, ShipmentStatus};
use shipment_tracker::query::ShipmentQuery;

pub const JWT_SECRET: &str = "test-jwt-secret-that-is-long-enough";

pub const SHIPMENT_FIELDS: &str = "id shipperName carrierName pickupLocation deliveryLocation \
    pickupDate deliveryDate status rateUsd trackingNumber reference weightKg notes \
    createdAt updatedAt";

/// A running test server, backed by an in-memory store or by a dedicated
/// Postgres test database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub store: Arc<dyn Store>,
    pub database: Option<TestDatabase>,
}

pub struct TestDatabase {
    pub pool: PgPool,
    pub name: String,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn shipment_count(&self) -> i64 {
        self.store
            .count_shipments(&ShipmentQuery::default())
            .await
            .expect("count failed")
    }

    /// POST a GraphQL document and return the response body.
    pub async fn graphql(&self, query: &str, variables: Value, token: Option<&str>) -> Value {
        let mut request = self
            .client
            .post(self.url("/graphql"))
            .json(&json!({ "query": query, "variables": variables }));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let resp = request.send().await.expect("graphql request failed");
        resp.json().await.expect("graphql response was not JSON")
    }

    pub async fn register(&self, name: &str, email: &str, password: &str, role: Option<&str>) -> Value {
        self.graphql(
            "mutation($name: String!, $email: String!, $password: String!, $role: Role) {
                register(name: $name, email: $email, password: $password, role: $role) {
                    token
                    user { id name email role }
                }
            }",
            json!({ "name": name, "email": email, "password": password, "role": role }),
            None,
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Value {
        self.graphql(
            "mutation($email: String!, $password: String!) {
                login(email: $email, password: $password) {
                    token
                    user { id name email role }
                }
            }",
            json!({ "email": email, "password": password }),
            None,
        )
        .await
    }

    /// Register an admin and return its token.
    pub async fn admin_token(&self) -> String {
        let body = self.register("Admin", "admin@tms.com", "Admin@123", Some("admin")).await;
        body["data"]["register"]["token"]
            .as_str()
            .unwrap_or_else(|| panic!("admin register failed: {body}"))
            .to_string()
    }

    /// Register an employee and return its token.
    pub async fn employee_token(&self) -> String {
        let body = self.register("Employee", "employee@tms.com", "Emp@123", None).await;
        body["data"]["register"]["token"]
            .as_str()
            .unwrap_or_else(|| panic!("employee register failed: {body}"))
            .to_string()
    }

    pub async fn add_shipment(&self, token: &str, input: Value) -> Value {
        self.graphql(
            &format!(
                "mutation($input: AddShipmentInput!) {{ addShipment(input: $input) {{ {SHIPMENT_FIELDS} }} }}"
            ),
            json!({ "input": input }),
            Some(token),
        )
        .await
    }

    pub async fn get_shipment(&self, token: &str, id: &str) -> Value {
        self.graphql(
            &format!("query($id: ID!) {{ shipment(id: $id) {{ {SHIPMENT_FIELDS} }} }}"),
            json!({ "id": id }),
            Some(token),
        )
        .await
    }

    pub async fn list_shipments(&self, token: &str, variables: Value) -> Value {
        self.graphql(
            "query($filter: ShipmentFilter, $pagination: PaginationInput, $sort: ShipmentSort) {
                shipments(filter: $filter, pagination: $pagination, sort: $sort) {
                    nodes { id shipperName carrierName status rateUsd deliveryDate trackingNumber }
                    totalCount
                    limit
                    offset
                }
            }",
            variables,
            Some(token),
        )
        .await
    }

    /// Insert `count` shipments straight into the store, bypassing the API.
    pub async fn seed_shipments(&self, count: u32) -> Vec<Shipment> {
        let carriers = ["BlueLine Logistics", "NorthStar Freight", "SwiftHaul"];
        let base = "2024-05-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let mut created = Vec::new();
        for i in 0..count {
            let shipment = NewShipment {
                shipper_name: format!("Shipper {}", i % 10 + 1),
                carrier_name: carriers[(i % 3) as usize].to_string(),
                pickup_location: "Seattle, WA".to_string(),
                delivery_location: if i % 2 == 0 { "Miami, FL" } else { "Dallas, TX" }.to_string(),
                pickup_date: base,
                delivery_date: base + Duration::hours(i64::from(i * 7 % 97)),
                status: ShipmentStatus::ALL[(i % 4) as usize],
                rate_usd: f64::from(120 + (i * 37) % 1800),
                tracking_number: format!("TRK-{:05}-{}", i + 1, 1001 + i),
                reference: format!("REF-{i}"),
                weight_kg: f64::from(10 + i),
                notes: "Seeded shipment record".to_string(),
            };
            created.push(self.store.create_shipment(shipment).await.unwrap());
        }
        created
    }
}

pub fn sample_input() -> Value {
    json!({
        "shipperName": "Acme Foods",
        "carrierName": "SwiftHaul",
        "pickupLocation": "Seattle, WA",
        "deliveryLocation": "Chicago, IL",
        "pickupDate": "2024-05-01T10:00:00.000Z",
        "deliveryDate": "2024-05-04T16:30:00.000Z",
        "status": "CREATED",
        "rateUsd": 1250.5,
        "trackingNumber": "TRK-90001-9001",
        "reference": "PO-7781",
        "weightKg": 340.0,
        "notes": "Keep refrigerated"
    })
}

/// `extensions.code` of the first GraphQL error, if any.
pub fn error_code(body: &Value) -> Option<&str> {
    body["errors"][0]["extensions"]["code"].as_str()
}

pub fn test_config(cors_origins: Vec<String>) -> Config {
    Config {
        database_url: "unused".to_string(),
        database_max_connections: 1,
        jwt_secret: JWT_SECRET.to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        cors_origins,
        log_level: "warn".to_string(),
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config(vec![])).await
}

pub async fn spawn_app_with(config: Config) -> TestApp {
    serve(Arc::new(MemoryStore::new()), config, None).await
}

/// Spawn a test app on a fresh temporary Postgres database. Returns `None`
/// when `DATABASE_URL` is not set, so callers can skip.
pub async fn spawn_pg_app() -> Option<TestApp> {
    let _ = dotenvy::dotenv();

    let Ok(base_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping Postgres test");
        return None;
    };

    let db_name = format!("shipments_test_{}", Uuid::now_v7().simple());

    // Connect to default postgres DB to create test DB
    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&sibling_url(&base_url, "postgres"))
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = sibling_url(&base_url, &db_name);
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let mut config = test_config(vec![]);
    config.database_url = test_url;

    let database = TestDatabase {
        pool: pool.clone(),
        name: db_name,
    };
    Some(serve(Arc::new(PgStore::new(pool)), config, Some(database)).await)
}

/// Drop the test database, if the app has one.
pub async fn cleanup(app: TestApp) {
    let Some(database) = app.database else {
        return;
    };
    database.pool.close().await;

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for cleanup");
    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&sibling_url(&base_url, "postgres"))
        .await
        .expect("Failed to connect for cleanup");
    let _ = sqlx::query(&format!(
        "DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)",
        database.name
    ))
    .execute(&admin_pool)
    .await;
    admin_pool.close().await;
}

/// Same server and credentials as `url`, different database.
fn sibling_url(url: &str, db_name: &str) -> String {
    url.rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| url.to_string())
}

async fn serve(store: Arc<dyn Store>, config: Config, database: Option<TestDatabase>) -> TestApp {
    let app = shipment_tracker::build_app(store.clone(), config);

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        client: Client::new(),
        store,
        database,
    }
}
