//! Integration tests against `PgStore`. Each test gets its own database;
//! they are skipped when `DATABASE_URL` is not set.

mod common;

use serde_json::{Value, json};

use shipment_tracker::db::StoreError;
use shipment_tracker::models::{NewUser, Role};

use common::{error_code, sample_input};

fn total(body: &Value) -> i64 {
    body["data"]["shipments"]["totalCount"]
        .as_i64()
        .unwrap_or_else(|| panic!("no totalCount in {body}"))
}

fn nodes(body: &Value) -> &Vec<Value> {
    body["data"]["shipments"]["nodes"].as_array().unwrap()
}

// ── Filtering ───────────────────────────────────────────────────

#[tokio::test]
async fn pg_filters_combine_with_and() {
    let Some(app) = common::spawn_pg_app().await else { return };
    let seeded = app.seed_shipments(12).await;
    let token = app.employee_token().await;

    let carrier = app
        .list_shipments(&token, json!({ "filter": { "carrierName": "swift" } }))
        .await;
    let swift = seeded.iter().filter(|s| s.carrier_name == "SwiftHaul").count();
    assert_eq!(total(&carrier), swift as i64);

    let combined = app
        .list_shipments(
            &token,
            json!({ "filter": { "deliveryLocation": "MIAMI", "carrierName": "blue", "status": "CREATED" } }),
        )
        .await;
    let expected = seeded
        .iter()
        .filter(|s| {
            s.delivery_location == "Miami, FL"
                && s.carrier_name == "BlueLine Logistics"
                && s.status.as_str() == "CREATED"
        })
        .count();
    assert!(expected > 0);
    assert_eq!(total(&combined), expected as i64);
    for node in nodes(&combined) {
        assert_eq!(node["status"], "CREATED");
    }

    common::cleanup(app).await;
}

#[tokio::test]
async fn pg_patterns_use_the_database_regex_engine() {
    let Some(app) = common::spawn_pg_app().await else { return };
    app.seed_shipments(12).await;
    let token = app.employee_token().await;

    let lookahead = app
        .list_shipments(&token, json!({ "filter": { "shipperName": "(?=Ship)Shipper 1$" } }))
        .await;
    assert!(lookahead["errors"].is_null(), "{lookahead}");
    assert_eq!(total(&lookahead), 2);

    for pattern in ["\\p{Lu}cme", "(["] {
        let body = app
            .list_shipments(&token, json!({ "filter": { "shipperName": pattern } }))
            .await;
        assert_eq!(error_code(&body), Some("BAD_USER_INPUT"), "{pattern}: {body}");
    }

    common::cleanup(app).await;
}

#[tokio::test]
async fn pg_text_search_matches_stems() {
    let Some(app) = common::spawn_pg_app().await else { return };
    let admin = app.admin_token().await;

    for (i, shipper) in ["Shipping Co", "Acme Shipments", "Straße GmbH"].into_iter().enumerate() {
        let mut input = sample_input();
        input["shipperName"] = json!(shipper);
        input["trackingNumber"] = json!(format!("TRK-7000{i}-700{i}"));
        let body = app.add_shipment(&admin, input).await;
        assert!(body["errors"].is_null(), "{body}");
    }

    let shipment = app
        .list_shipments(&admin, json!({ "filter": { "q": "shipment" } }))
        .await;
    assert_eq!(total(&shipment), 1);
    assert_eq!(nodes(&shipment)[0]["shipperName"], "Acme Shipments");

    let ships = app
        .list_shipments(&admin, json!({ "filter": { "q": "ships" } }))
        .await;
    assert_eq!(total(&ships), 1);
    assert_eq!(nodes(&ships)[0]["shipperName"], "Shipping Co");

    let either = app
        .list_shipments(&admin, json!({ "filter": { "q": "gmbh acme" } }))
        .await;
    assert_eq!(total(&either), 2);

    let stop_words = app
        .list_shipments(&admin, json!({ "filter": { "q": "the and" } }))
        .await;
    assert_eq!(total(&stop_words), 3);

    common::cleanup(app).await;
}

// ── Sorting & pagination ────────────────────────────────────────

#[tokio::test]
async fn pg_pagination_is_clamped_and_stable() {
    let Some(app) = common::spawn_pg_app().await else { return };
    app.seed_shipments(105).await;
    let token = app.employee_token().await;

    let capped = app
        .list_shipments(&token, json!({ "pagination": { "limit": 150, "offset": -3 } }))
        .await;
    assert_eq!(nodes(&capped).len(), 100);
    assert_eq!(total(&capped), 105);
    assert_eq!(capped["data"]["shipments"]["limit"], 100);
    assert_eq!(capped["data"]["shipments"]["offset"], 0);

    let tail = app
        .list_shipments(&token, json!({ "pagination": { "limit": 100, "offset": 100 } }))
        .await;
    assert_eq!(nodes(&tail).len(), 5);

    let mut ids: Vec<&str> = nodes(&capped)
        .iter()
        .chain(nodes(&tail))
        .map(|n| n["id"].as_str().unwrap())
        .collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 105);

    common::cleanup(app).await;
}

#[tokio::test]
async fn pg_sort_allow_list() {
    let Some(app) = common::spawn_pg_app().await else { return };
    app.seed_shipments(25).await;
    let token = app.employee_token().await;
    let page = json!({ "limit": 25 });

    let by_rate = app
        .list_shipments(&token, json!({ "sort": { "sortBy": "rateUsd", "order": "asc" }, "pagination": page }))
        .await;
    let rates: Vec<f64> = nodes(&by_rate).iter().map(|n| n["rateUsd"].as_f64().unwrap()).collect();
    assert!(rates.windows(2).all(|w| w[0] <= w[1]), "{rates:?}");

    let by_delivery = app
        .list_shipments(&token, json!({ "pagination": page }))
        .await;
    let by_unknown = app
        .list_shipments(&token, json!({ "sort": { "sortBy": "password_hash" }, "pagination": page }))
        .await;
    assert!(by_unknown["errors"].is_null(), "{by_unknown}");
    assert_eq!(nodes(&by_delivery), nodes(&by_unknown));

    let dates: Vec<&str> = nodes(&by_delivery)
        .iter()
        .map(|n| n["deliveryDate"].as_str().unwrap())
        .collect();
    assert!(dates.windows(2).all(|w| w[0] >= w[1]), "{dates:?}");

    common::cleanup(app).await;
}

// ── Writes ──────────────────────────────────────────────────────

#[tokio::test]
async fn pg_update_patches_only_given_fields() {
    let Some(app) = common::spawn_pg_app().await else { return };
    let admin = app.admin_token().await;
    let added = app.add_shipment(&admin, sample_input()).await;
    let before = added["data"]["addShipment"].clone();
    let id = before["id"].as_str().unwrap();

    let body = app
        .graphql(
            &format!(
                "mutation($id: ID!, $input: UpdateShipmentInput!) {{
                    updateShipment(id: $id, input: $input) {{ {} }}
                }}",
                common::SHIPMENT_FIELDS
            ),
            json!({ "id": id, "input": { "status": "IN_TRANSIT", "deliveryDate": "2024-06-10" } }),
            Some(&admin),
        )
        .await;
    let after = &body["data"]["updateShipment"];
    assert_eq!(after["status"], "IN_TRANSIT");
    assert_eq!(after["deliveryDate"], "2024-06-10T00:00:00.000Z");

    let mut expected = before.clone();
    expected["status"] = after["status"].clone();
    expected["deliveryDate"] = after["deliveryDate"].clone();
    expected["updatedAt"] = after["updatedAt"].clone();
    assert_eq!(after, &expected);

    let missing = app
        .graphql(
            "mutation($id: ID!) { updateShipment(id: $id, input: { notes: \"x\" }) { id } }",
            json!({ "id": "0190a1b2-0000-7000-8000-000000000000" }),
            Some(&admin),
        )
        .await;
    assert_eq!(error_code(&missing), Some("NOT_FOUND"));

    let delete = "mutation($id: ID!) { deleteShipment(id: $id) }";
    let first = app.graphql(delete, json!({ "id": id }), Some(&admin)).await;
    assert_eq!(first["data"]["deleteShipment"], true);
    let second = app.graphql(delete, json!({ "id": id }), Some(&admin)).await;
    assert_eq!(second["data"]["deleteShipment"], false);
    assert_eq!(app.shipment_count().await, 0);

    common::cleanup(app).await;
}

#[tokio::test]
async fn pg_duplicate_tracking_number_is_a_store_error() {
    let Some(app) = common::spawn_pg_app().await else { return };
    let admin = app.admin_token().await;

    app.add_shipment(&admin, sample_input()).await;
    let again = app.add_shipment(&admin, sample_input()).await;
    assert_eq!(error_code(&again), Some("INTERNAL_SERVER_ERROR"));
    let message = again["errors"][0]["message"].as_str().unwrap();
    assert!(message.contains("duplicate key"), "{message}");
    assert!(message.contains("shipments_tracking_number_key"), "{message}");
    assert_eq!(app.shipment_count().await, 1);

    common::cleanup(app).await;
}

// ── Accounts ────────────────────────────────────────────────────

#[tokio::test]
async fn pg_email_uniqueness_is_enforced_by_the_database() {
    let Some(app) = common::spawn_pg_app().await else { return };

    let new_user = || NewUser {
        name: "Ann".to_string(),
        email: "ann@example.com".to_string(),
        password_hash: "unused".to_string(),
        role: Role::Employee,
    };
    app.store.create_user(new_user()).await.unwrap();
    let err = app.store.create_user(new_user()).await.unwrap_err();
    assert!(matches!(err, StoreError::Duplicate(ref c) if c == "users_email_key"), "{err}");

    let dup = app.register("Ann", "ANN@example.com", "pw1", None).await;
    assert_eq!(error_code(&dup), Some("EMAIL_ALREADY_EXISTS"));

    // Concurrent registrations may both pass the pre-check; the index decides.
    let (a, b) = tokio::join!(
        app.register("Bo", "bo@example.com", "pw1", None),
        app.register("Bo", "BO@example.com", "pw2", Some("admin")),
    );
    let winners = [&a, &b].iter().filter(|r| r["errors"].is_null()).count();
    assert_eq!(winners, 1, "{a} {b}");
    let loser = if a["errors"].is_null() { &b } else { &a };
    assert_eq!(error_code(loser), Some("EMAIL_ALREADY_EXISTS"));

    let login = app.login("bo@example.com", "pw1").await;
    let login_other = app.login("bo@example.com", "pw2").await;
    assert_ne!(login["errors"].is_null(), login_other["errors"].is_null());

    common::cleanup(app).await;
}
