mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinSet;

#[tokio::test]
async fn test_publish_binds_caller_and_rejects_duplicates() {
    let app = TestApp::new().await;

    let house = app.doctor("dr_house");
    let wilson = app.doctor("dr_wilson");
    let house_id = app.doctor_id(&house).await;
    let wilson_id = app.doctor_id(&wilson).await;
    let slot = app.slot_id(0).await;

    // doctor_id in the body is ignored
    let (status, created) = app.post("/api/v1/availabilities", &house, json!({
        "date": "2030-06-01", "time_slot_id": slot, "doctor_id": wilson_id,
    })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["doctor_id"], house_id.as_str());

    let (status, body) = app.post("/api/v1/availabilities", &house, json!({
        "date": "2030-06-01", "time_slot_id": slot,
    })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already exists"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_publish_of_same_key() {
    let app = Arc::new(TestApp::new().await);

    let house = app.doctor("dr_house");
    app.me(&house).await;
    let slot = app.slot_id(4).await;

    let mut set = JoinSet::new();
    for _ in 0..8 {
        let app = app.clone();
        let house = house.clone();
        let slot = slot.clone();
        set.spawn(async move {
            app.post("/api/v1/availabilities", &house, json!({
                "date": "2030-06-15", "time_slot_id": slot,
            })).await.0
        });
    }

    let mut statuses = Vec::new();
    while let Some(res) = set.join_next().await {
        statuses.push(res.unwrap());
    }

    let created = statuses.iter().filter(|s| **s == StatusCode::CREATED).count();
    let conflicts = statuses.iter().filter(|s| **s == StatusCode::CONFLICT).count();
    assert_eq!(created, 1, "statuses: {:?}", statuses);
    assert_eq!(conflicts, 7, "statuses: {:?}", statuses);
    assert_eq!(app.count("availabilities").await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_moves_onto_same_key() {
    let app = Arc::new(TestApp::new().await);

    let house = app.doctor("dr_house");
    let target = app.slot_id(8).await;

    let mut uris = Vec::new();
    for index in 0..4 {
        let slot = app.slot_id(index).await;
        let created = app.publish(&house, "2030-06-16", &slot).await;
        uris.push(format!("/api/v1/availabilities/{}", created["id"].as_str().unwrap()));
    }

    let mut set = JoinSet::new();
    for uri in uris {
        let app = app.clone();
        let house = house.clone();
        let target = target.clone();
        set.spawn(async move {
            app.send("PUT", &uri, Some(&house), Some(json!({ "time_slot_id": target }))).await.0
        });
    }

    let mut statuses = Vec::new();
    while let Some(res) = set.join_next().await {
        statuses.push(res.unwrap());
    }

    let moved = statuses.iter().filter(|s| **s == StatusCode::OK).count();
    let conflicts = statuses.iter().filter(|s| **s == StatusCode::CONFLICT).count();
    assert_eq!(moved, 1, "statuses: {:?}", statuses);
    assert_eq!(conflicts, 3, "statuses: {:?}", statuses);
    assert_eq!(app.count("availabilities").await, 4);
}

#[tokio::test]
async fn test_publish_validation() {
    let app = TestApp::new().await;

    let house = app.doctor("dr_house");
    let alice = app.patient("alice");
    let slot = app.slot_id(0).await;

    let (status, _) = app.post("/api/v1/availabilities", &alice, json!({
        "date": "2030-06-01", "time_slot_id": slot,
    })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.post("/api/v1/availabilities", &house, json!({
        "date": "2030-06-01", "time_slot_id": "unknown-slot",
    })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.post("/api/v1/availabilities", &house, json!({
        "date": "June 1st", "time_slot_id": slot,
    })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.count("availabilities").await, 0);
}

#[tokio::test]
async fn test_listing_is_public_open_only_and_sorted() {
    let app = TestApp::new().await;

    let house = app.doctor("dr_house");
    let wilson = app.doctor("dr_wilson");
    let alice = app.patient("alice");
    let house_id = app.doctor_id(&house).await;
    let early = app.slot_id(0).await;
    let late = app.slot_id(10).await;

    app.publish(&house, "2030-06-02", &late).await;
    app.publish(&house, "2030-06-02", &early).await;
    app.publish(&house, "2030-06-01", &late).await;
    app.publish(&wilson, "2030-06-01", &early).await;
    let booked = app.publish(&house, "2030-06-03", &early).await;
    app.book(&alice, &house_id, "2030-06-03", &early).await;

    let (status, list) = app.get("/api/v1/availabilities", None).await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 4);
    assert!(list.iter().all(|a| a["is_available"] == true));
    assert!(list.iter().all(|a| a["id"] != booked["id"]));

    let order: Vec<(String, String)> = list.iter()
        .map(|a| (a["date"].as_str().unwrap().to_string(), a["time_slot_id"].as_str().unwrap().to_string()))
        .collect();
    assert_eq!(order[0].0, "2030-06-01");
    assert_eq!(order[0].1, early);
    assert_eq!(order[1], ("2030-06-01".to_string(), late.clone()));
    assert_eq!(order[2], ("2030-06-02".to_string(), early.clone()));
    assert_eq!(order[3], ("2030-06-02".to_string(), late.clone()));

    let (_, filtered) = app.get(&format!("/api/v1/availabilities?doctor={}&date=2030-06-02", house_id), None).await;
    assert_eq!(filtered.as_array().unwrap().len(), 2);

    let (status, _) = app.get("/api/v1/availabilities?date=garbage", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_owner_can_move_open_availability() {
    let app = TestApp::new().await;

    let house = app.doctor("dr_house");
    let wilson = app.doctor("dr_wilson");
    let slot = app.slot_id(0).await;
    let other_slot = app.slot_id(1).await;

    let created = app.publish(&house, "2030-06-01", &slot).await;
    let uri = format!("/api/v1/availabilities/{}", created["id"].as_str().unwrap());

    let (status, _) = app.send("PUT", &uri, Some(&wilson), Some(json!({ "date": "2030-06-09" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, moved) = app.send("PUT", &uri, Some(&house), Some(json!({
        "date": "2030-06-09", "time_slot_id": other_slot,
    }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["date"], "2030-06-09");
    assert_eq!(moved["time_slot_id"], other_slot.as_str());

    // Moving onto an existing key collides
    app.publish(&house, "2030-06-10", &slot).await;
    let (status, _) = app.send("PUT", &uri, Some(&house), Some(json!({
        "date": "2030-06-10", "time_slot_id": slot,
    }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, fetched) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["date"], "2030-06-09");
}

#[tokio::test]
async fn test_booked_availability_is_locked() {
    let app = TestApp::new().await;

    let house = app.doctor("dr_house");
    let alice = app.patient("alice");
    let house_id = app.doctor_id(&house).await;
    let slot = app.slot_id(2).await;

    let created = app.publish(&house, "2030-06-01", &slot).await;
    app.book(&alice, &house_id, "2030-06-01", &slot).await;
    let uri = format!("/api/v1/availabilities/{}", created["id"].as_str().unwrap());

    let (status, _) = app.send("PUT", &uri, Some(&house), Some(json!({ "date": "2030-06-02" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.delete(&uri, &house).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_delete_drops_waitlist_for_key() {
    let app = TestApp::new().await;

    let house = app.doctor("dr_house");
    let alice = app.patient("alice");
    let house_id = app.doctor_id(&house).await;
    let alice_id = app.patient_id(&alice).await;
    let slot = app.slot_id(3).await;

    let created = app.publish(&house, "2030-06-01", &slot).await;

    // a leftover entry against an open slot
    sqlx::query("INSERT INTO waitlist (id, patient_id, doctor_id, date, time_slot_id, added_at) VALUES ('stale', ?, ?, '2030-06-01', ?, '2030-01-01T00:00:00+00:00')")
        .bind(&alice_id).bind(&house_id).bind(&slot)
        .execute(&app.pool).await.unwrap();
    assert_eq!(app.count("waitlist").await, 1);

    let uri = format!("/api/v1/availabilities/{}", created["id"].as_str().unwrap());
    let (status, _) = app.delete(&uri, &house).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(app.count("waitlist").await, 0);
    assert_eq!(app.count("availabilities").await, 0);

    let (status, _) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
