// tests/api_tests.rs
#[macro_use]
mod common;

use actix_web::http::{header, StatusCode};
use actix_web::test;
use chrono::Duration;
use common::*;
use partsdesk_server::web::auth::issue_admin_token;
use serde_json::{json, Value};

#[actix_web::test]
async fn health_reports_store_backend() {
  let server = test_server(&[]);
  let app = init_app!(server);
  let resp: Value = test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/health").to_request()).await;
  assert_eq!(resp, json!({"status": "ok", "store": "memory"}));
}

#[actix_web::test]
async fn create_then_price_an_order() {
  let server = test_server(&[]);
  let app = init_app!(server);

  let req = test::TestRequest::post().uri("/orders").set_json(parts_order_json()).to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["persistence"], "database");
  assert_eq!(body["order"]["orderNumber"], "ORD-100");
  assert_eq!(body["order"]["deliveryFee"], 50.0);
  assert_eq!(body["order"]["totalAmount"], 50.0);
  assert_eq!(body["order"]["carInfo"]["make"], "Toyota");
  assert_eq!(body["order"]["carInfo"]["model"], "Camry");
  assert_eq!(body["order"]["status"], "pending");
  assert_eq!(body["order"]["timeline"].as_array().unwrap().len(), 1);
  assert_eq!(body["driverNotify"]["ok"], true);
  assert_eq!(body["customerNotify"]["ok"], true);
  assert_eq!(body["emailNotify"]["reason"], "not_configured");

  let id = body["order"]["id"].as_str().unwrap().to_string();
  let req = test::TestRequest::put()
    .uri(&format!("/orders/admin/{id}/pricing"))
    .set_json(json!({"price": 300, "warranty": true, "warrantyDuration": "90"}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["order"]["totalAmount"], 350.0);
  assert_eq!(body["persisted"], true);
  let timeline = body["order"]["timeline"].as_array().unwrap();
  assert_eq!(timeline.len(), 2);
  assert_eq!(timeline[1]["status"], "pricing_updated");
  assert!(body["order"]["items"][0]["warrantyEndDate"].is_string());
}

#[actix_web::test]
async fn oversized_warranty_is_a_bad_request() {
  let server = test_server(&[]);
  let app = init_app!(server);
  test::call_service(&app, test::TestRequest::post().uri("/orders").set_json(parts_order_json()).to_request()).await;

  let req = test::TestRequest::put()
    .uri("/orders/admin/ORD-100/pricing")
    .set_json(json!({"price": 300, "warranty": true, "warrantyDuration": "100000000"}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["fields"][0]["field"], "warrantyDuration");

  let order: Value = test::call_and_read_body_json(&app, test::TestRequest::get().uri("/orders/ORD-100").to_request()).await;
  assert_eq!(order["totalAmount"], 50.0);
  assert_eq!(order["timeline"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn invalid_order_lists_every_field() {
  let server = test_server(&[]);
  let app = init_app!(server);
  let req = test::TestRequest::post()
    .uri("/orders")
    .set_json(json!({"phone": "0551234567", "carYear": "soon"}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  let fields: Vec<&str> = body["fields"]
    .as_array()
    .unwrap()
    .iter()
    .map(|f| f["field"].as_str().unwrap())
    .collect();
  assert_eq!(fields, vec!["fullName", "carNameCategory", "carYear", "partDetails"]);
  assert_eq!(server.store.order_count(), 0);
}

#[actix_web::test]
async fn store_outage_still_answers_created() {
  let server = test_server(&[]);
  server.store.set_available(false);
  let app = init_app!(server);
  let req = test::TestRequest::post().uri("/orders").set_json(parts_order_json()).to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["persistence"], "backup");

  let entries = server.state.desk.backup().read_all().await.unwrap();
  assert_eq!(entries.len(), 1);
  assert_eq!(entries[0].source, "backup_due_to_db_error");

  let resp = test::call_service(&app, test::TestRequest::get().uri("/orders/admin").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let listed: Value = test::read_body_json(resp).await;
  assert_eq!(listed, json!([]));
}

#[actix_web::test]
async fn status_update_by_number_and_unknown_order() {
  let server = test_server(&[]);
  let app = init_app!(server);
  test::call_service(&app, test::TestRequest::post().uri("/orders").set_json(parts_order_json()).to_request()).await;

  let req = test::TestRequest::put()
    .uri("/orders/ORD-100/status")
    .set_json(json!({"status": "shipped"}))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["order"]["status"], "shipped");
  assert_eq!(body["customerNotify"]["ok"], true);

  let req = test::TestRequest::put()
    .uri("/orders/ORD-404/status")
    .set_json(json!({"status": "shipped"}))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

  let req = test::TestRequest::put()
    .uri("/orders/ORD-100/status")
    .set_json(json!({"status": "lost"}))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn strict_policy_answers_conflict() {
  let server = test_server(&[("STATUS_TRANSITIONS", "strict")]);
  let app = init_app!(server);
  test::call_service(&app, test::TestRequest::post().uri("/orders").set_json(parts_order_json()).to_request()).await;
  let req = test::TestRequest::put()
    .uri("/orders/admin/ORD-100/status")
    .set_json(json!({"status": "delivered"}))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn archive_restore_and_listings() {
  let server = test_server(&[]);
  let app = init_app!(server);
  test::call_service(&app, test::TestRequest::post().uri("/orders").set_json(parts_order_json()).to_request()).await;

  let req = test::TestRequest::put().uri("/orders/admin/ORD-100/archive").to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["order"]["archived"], true);
  assert_eq!(body["changed"], true);

  let archived: Value =
    test::call_and_read_body_json(&app, test::TestRequest::get().uri("/orders/admin/archived").to_request()).await;
  assert_eq!(archived.as_array().unwrap().len(), 1);
  let active: Value = test::call_and_read_body_json(&app, test::TestRequest::get().uri("/orders/admin").to_request()).await;
  assert_eq!(active, json!([]));

  let req = test::TestRequest::put().uri("/orders/admin/ORD-100/restore").to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["order"]["archived"], false);
  assert_eq!(body["order"]["archivedAt"], Value::Null);

  let tracked: Value =
    test::call_and_read_body_json(&app, test::TestRequest::get().uri("/orders/track/0551234567").to_request()).await;
  assert_eq!(tracked.as_array().unwrap().len(), 1);
  let filtered: Value =
    test::call_and_read_body_json(&app, test::TestRequest::get().uri("/orders?status=delivered").to_request()).await;
  assert_eq!(filtered, json!([]));

  let resp = test::call_service(&app, test::TestRequest::delete().uri("/orders/admin/ORD-100").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let resp = test::call_service(&app, test::TestRequest::get().uri("/orders/ORD-100").to_request()).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn customer_cancel_by_number() {
  let server = test_server(&[]);
  let app = init_app!(server);
  test::call_service(&app, test::TestRequest::post().uri("/orders").set_json(parts_order_json()).to_request()).await;
  let body: Value =
    test::call_and_read_body_json(&app, test::TestRequest::delete().uri("/orders/ORD-100").to_request()).await;
  assert_eq!(body["order"]["status"], "cancelled");
  assert_eq!(body["order"]["timeline"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn send_to_delivery_uses_configured_number() {
  let server = test_server(&[]);
  let app = init_app!(server);
  test::call_service(&app, test::TestRequest::post().uri("/orders").set_json(parts_order_json()).to_request()).await;
  let req = test::TestRequest::post()
    .uri("/orders/admin/send-to-delivery")
    .set_json(json!({"orderIds": ["ORD-100", "ORD-555"]}))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["included"], json!(["ORD-100"]));
  assert_eq!(body["missing"], json!(["ORD-555"]));
  assert_eq!(body["sent"], true);
  let sent = server.whatsapp.sent.lock();
  assert_eq!(sent.last().unwrap().to, "whatsapp:+966500000009");
}

#[actix_web::test]
async fn admin_routes_require_a_valid_token_when_configured() {
  let server = test_server(&[("ADMIN_JWT_SECRET", JWT_SECRET)]);
  let app = init_app!(server);

  let resp = test::call_service(&app, test::TestRequest::get().uri("/orders/admin").to_request()).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

  let req = test::TestRequest::get()
    .uri("/orders/admin")
    .insert_header((header::AUTHORIZATION, "Bearer not-a-jwt"))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

  let token = issue_admin_token(JWT_SECRET, "ops", Duration::minutes(5)).unwrap();
  let req = test::TestRequest::get()
    .uri("/orders/admin")
    .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

  // Customer routes stay open.
  let resp = test::call_service(&app, test::TestRequest::get().uri("/orders/track/0551234567").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn multipart_sell_car_order_stores_images() {
  let server = test_server(&[]);
  let app = init_app!(server);

  let boundary = "XBOUNDARYX";
  let mut body = String::new();
  for (name, value) in [
    ("fullName", "Sara"),
    ("phone", "0554444444"),
    ("carMake", "Hyundai"),
    ("carModel", "Elantra"),
    ("carYear", "2016"),
    ("expectedPrice", "18000"),
  ] {
    body.push_str(&format!(
      "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
    ));
  }
  for file in ["front.PNG", "back.jpg"] {
    body.push_str(&format!(
      "--{boundary}\r\nContent-Disposition: form-data; name=\"images\"; filename=\"{file}\"\r\nContent-Type: image/png\r\n\r\nfakeimagebytes\r\n"
    ));
  }
  body.push_str(&format!("--{boundary}--\r\n"));

  let req = test::TestRequest::post()
    .uri("/orders/sell-car")
    .insert_header((header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}")))
    .set_payload(body)
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["order"]["orderType"], "sell_car");
  assert_eq!(body["order"]["totalAmount"], 18000.0);

  let images: Vec<String> = serde_json::from_value(body["order"]["images"].clone()).unwrap();
  assert_eq!(images.len(), 2);
  assert!(images[0].starts_with("/uploads/") && images[0].ends_with(".png"));
  let stored = server.state.config.upload_dir.join(images[0].trim_start_matches("/uploads/"));
  assert_eq!(std::fs::read(stored).unwrap(), b"fakeimagebytes");

  let resp = test::call_service(&app, test::TestRequest::get().uri(&images[1]).to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(test::read_body(resp).await.as_ref(), b"fakeimagebytes");
}

#[actix_web::test]
async fn webhooks_feed_the_inbox() {
  let server = test_server(&[]);
  let app = init_app!(server);

  let req = test::TestRequest::post()
    .uri("/webhooks/whatsapp/inbound")
    .set_form([("MessageSid", "SMin1"), ("From", "whatsapp:+966551234567"), ("To", "whatsapp:+966500000000"), ("Body", "Any update?")])
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let unread: Value =
    test::call_and_read_body_json(&app, test::TestRequest::get().uri("/admin/messages?unread=true").to_request()).await;
  assert_eq!(unread.as_array().unwrap().len(), 1);
  assert_eq!(unread[0]["body"], "Any update?");
  assert_eq!(unread[0]["read"], false);

  let resp = test::call_service(&app, test::TestRequest::put().uri("/admin/messages/SMin1/read").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let unread: Value =
    test::call_and_read_body_json(&app, test::TestRequest::get().uri("/admin/messages?unread=true").to_request()).await;
  assert_eq!(unread, json!([]));

  let req = test::TestRequest::post()
    .uri("/webhooks/whatsapp/status")
    .set_form([("MessageSid", "SMunknown"), ("MessageStatus", "delivered")])
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["updated"], false);
}

#[actix_web::test]
async fn broadcast_reports_summary() {
  let server = test_server(&[]);
  let app = init_app!(server);
  let req = test::TestRequest::post()
    .uri("/admin/whatsapp/broadcast")
    .set_json(json!({"recipients": ["0561111111", "0562222222", "bad"], "body": "New stock arrived"}))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body, json!({"total": 3, "sent": 2, "failed": 1, "sample": ["0561111111", "0562222222"]}));

  let req = test::TestRequest::post()
    .uri("/admin/whatsapp/broadcast")
    .set_json(json!({"recipients": ["0561111111"]}))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}
