//! End-to-end tests over HTTP.

use reqwest::StatusCode;
use serde_json::{json, Value};

mod common;

use common::{config_with_rooms, cpf, start_server, SUBJECT};

async fn check_in(server: &common::TestServer, room_id: &str, name: &str, n: u32) -> reqwest::Response {
    server
        .post("/visitors")
        .json(&json!({ "roomId": room_id, "name": name, "cpf": cpf(n) }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let server = start_server(config_with_rooms(&[("Lab", 2)])).await;

    let res = server.client.get(server.url("/rooms")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Unauthorized", "statusCode": 401 }));

    let res = server
        .client
        .get(server.url("/rooms"))
        .bearer_auth("wrong")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let logs: Value = server
        .get("/logs?level=warn")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(logs["total"], 2);
    assert_eq!(logs["items"][0]["message"], "GET /rooms - 401");
}

#[tokio::test]
async fn test_healthz_is_public_and_not_logged() {
    let server = start_server(config_with_rooms(&[])).await;

    let res = server.client.get(server.url("/healthz")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));

    let logs: Value = server
        .get("/logs?search=healthz")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(logs["total"], 0);
}

#[tokio::test]
async fn test_capacity_is_enforced_until_checkout() {
    let server = start_server(config_with_rooms(&[("Lab", 1)])).await;
    let room_id = server.room_id("Lab").await;

    let res = check_in(&server, &room_id, "Ana", 1).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let first: Value = res.json().await.unwrap();
    let first_id = first["id"].as_str().unwrap().to_string();

    let res = check_in(&server, &room_id, "Bruno", 2).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Room at capacity (1/1)");
    assert_eq!(body["statusCode"], 409);

    let res = server
        .post(&format!("/visitors/{first_id}/checkout"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({ "ok": true }));

    let res = check_in(&server, &room_id, "Bruno", 2).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let active: Value = server
        .get("/visitors/active")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let active = active.as_array().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["name"], "Bruno");
    assert_eq!(active[0]["roomName"], "Lab");

    let rooms: Value = server.get("/rooms").send().await.unwrap().json().await.unwrap();
    assert_eq!(rooms[0]["activeCount"], 1);
}

#[tokio::test]
async fn test_checkout_is_idempotent() {
    let server = start_server(config_with_rooms(&[("Lab", 3)])).await;
    let room_id = server.room_id("Lab").await;

    let created: Value = check_in(&server, &room_id, "Ana", 1).await.json().await.unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    for _ in 0..2 {
        let res = server
            .post(&format!("/visitors/{id}/checkout"))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
    let first: Value = server
        .get(&format!("/visitors/{id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(first["checkOutAt"].is_string());
    assert_eq!(first["createdBy"], SUBJECT);

    let res = server
        .post(&format!("/visitors/{id}/checkout"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let again: Value = server
        .get(&format!("/visitors/{id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first["checkOutAt"], again["checkOutAt"]);

    let logs: Value = server
        .get("/logs?search=check-out%20completed")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(logs["total"], 1);
}

#[tokio::test]
async fn test_error_mapping() {
    let server = start_server(config_with_rooms(&[("Lab", 3)])).await;
    let room_id = server.room_id("Lab").await;

    let res = server
        .post("/visitors")
        .json(&json!({ "roomId": room_id, "name": "Ana", "cpf": "123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .post("/visitors")
        .json(&json!({ "roomId": room_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = check_in(&server, &uuid::Uuid::new_v4().to_string(), "Ana", 1).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server.get("/visitors/not-a-uuid").send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server
        .post(&format!("/visitors/{}/checkout", uuid::Uuid::new_v4()))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server.get("/visits/history?page=0").send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server.get("/logs?level=loud").send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_room_administration() {
    let server = start_server(config_with_rooms(&[])).await;

    let res = server
        .post("/rooms")
        .json(&json!({ "name": "Studio", "capacity": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let room: Value = res.json().await.unwrap();
    let id = room["id"].as_str().unwrap().to_string();

    let res = server
        .post("/rooms")
        .json(&json!({ "name": "Studio", "capacity": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = server
        .patch(&format!("/rooms/{id}"))
        .json(&json!({ "capacity": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .patch(&format!("/rooms/{id}"))
        .json(&json!({ "capacity": 4 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap()["capacity"], 4);
}

#[tokio::test]
async fn test_history_pagination_and_search() {
    let server = start_server(config_with_rooms(&[("Hall", 100)])).await;
    let room_id = server.room_id("Hall").await;

    for n in 1..=25 {
        let res = check_in(&server, &room_id, &format!("Visitor {n:02}"), n).await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let page: Value = server
        .get("/visits/history?page=2&pageSize=10")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["total"], 25);
    assert_eq!(page["page"], 2);
    assert_eq!(page["pageSize"], 10);
    let items = page["items"].as_array().unwrap();
    assert_eq!(items.len(), 10);
    assert_eq!(items[0]["name"], "Visitor 15");

    let found: Value = server
        .get("/visits/history?search=visitor%2007")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(found["total"], 1);
    assert_eq!(found["items"][0]["name"], "Visitor 07");

    let by_cpf: Value = server
        .get(&format!("/visits/history?search={}", &cpf(3)[6..]))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(by_cpf["total"], 1);
}

#[tokio::test]
async fn test_audit_trail_records_actions_and_requests() {
    let server = start_server(config_with_rooms(&[("Lab", 1)])).await;
    let room_id = server.room_id("Lab").await;

    check_in(&server, &room_id, "Ana", 1).await;
    check_in(&server, &room_id, "Bruno", 2).await;

    let logs: Value = server
        .get("/logs?pageSize=100")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let items = logs["items"].as_array().unwrap();

    let checkin = items
        .iter()
        .find(|e| e["message"] == "Check-in completed")
        .unwrap();
    assert_eq!(checkin["userId"], SUBJECT);
    assert_eq!(checkin["roomId"], room_id.as_str());
    assert_eq!(checkin["meta"]["action"], "visit.checkin");

    let rejected = items
        .iter()
        .find(|e| e["message"] == "POST /visitors - 409")
        .unwrap();
    assert_eq!(rejected["level"], "warn");
    assert_eq!(rejected["meta"]["error"], "Room at capacity (1/1)");
    assert_eq!(rejected["userId"], SUBJECT);

    assert!(items
        .iter()
        .any(|e| e["meta"]["action"] == "system.seed"));
}
