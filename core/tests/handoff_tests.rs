// tests/handoff_tests.rs
mod common;
use common::*;
use partsdesk::model::OrderStatus;
use partsdesk::notify::reason;
use partsdesk::requests::HandoffRequest;
use partsdesk::{Channel, DeskError, MessageContent, OrderKey};

fn handoff(ids: &[&str], phone: Option<&str>) -> HandoffRequest {
  HandoffRequest {
    order_ids: ids.iter().map(|s| s.to_string()).collect(),
    phone: phone.map(str::to_string),
  }
}

fn delivered_text(t: &TestDesk, digits: &str) -> String {
  let sent = t.whatsapp.sent_to(digits);
  match &sent.last().expect("a hand-off message").content {
    MessageContent::Freeform(text) => text.clone(),
    other => panic!("expected freeform hand-off, got {other:?}"),
  }
}

#[tokio::test]
async fn batches_found_orders_and_reports_missing_ones() {
  let t = test_desk_with(|c| c.notify.admin_numbers.clear());
  let a = t.desk.orders.create_order(&parts_request_for("0551111111", "Mirror"), vec![]).await.unwrap();
  let b = t
    .desk
    .orders
    .create_order(&parts_request_for("0552222222", "Headlamp"), vec!["/uploads/lamp.jpg".to_string()])
    .await
    .unwrap();

  let b_id = b.order.id.to_string();
  let request = handoff(
    &[
      a.order.order_number.as_str(),
      b_id.as_str(),
      "ORD-999",
      a.order.order_number.as_str(),
    ],
    Some("0559999999"),
  );
  let outcome = t.desk.handoff.send(&request).await.unwrap();

  assert_eq!(outcome.included, vec![a.order.order_number.clone(), b.order.order_number.clone()]);
  assert_eq!(outcome.missing, vec!["ORD-999".to_string()]);
  assert!(outcome.sent);
  assert_eq!(outcome.notify.channel, Channel::WhatsappDelivery);

  let text = delivered_text(&t, "0559999999");
  assert!(text.starts_with("Delivery batch: 2 order(s)"));
  assert!(text.contains("Part: Mirror"));
  assert!(text.contains("Part: Headlamp"));
  assert!(text.contains("https://desk.example.com/uploads/lamp.jpg"));
  assert_eq!(text.matches("----------").count(), 1);
}

#[tokio::test]
async fn falls_back_to_configured_delivery_number() {
  let t = test_desk();
  let a = t.desk.orders.create_order(&parts_request(), vec![]).await.unwrap();
  let outcome = t.desk.handoff.send(&handoff(&[a.order.order_number.as_str()], None)).await.unwrap();
  assert!(outcome.sent);
  assert!(delivered_text(&t, DELIVERY).contains(&a.order.order_number));
}

#[tokio::test]
async fn requires_a_phone_when_none_is_configured() {
  let t = test_desk_with(|c| c.notify.delivery_number = None);
  let a = t.desk.orders.create_order(&parts_request(), vec![]).await.unwrap();
  match t.desk.handoff.send(&handoff(&[a.order.order_number.as_str()], None)).await {
    Err(DeskError::Validation(v)) => assert!(v.has_field("phone")),
    other => panic!("expected validation error, got {other:?}"),
  }
}

#[tokio::test]
async fn nothing_matching_is_not_found() {
  let t = test_desk();
  let err = t
    .desk
    .handoff
    .send(&handoff(&["ORD-404", "ORD-405"], None))
    .await
    .unwrap_err();
  assert!(err.is_not_found());
  assert!(err.to_string().contains("ORD-404"));
  assert_eq!(t.whatsapp.sent_to(DELIVERY).len(), 0);
}

#[tokio::test]
async fn empty_id_list_is_rejected() {
  let t = test_desk();
  match t.desk.handoff.send(&handoff(&["  "], None)).await {
    Err(DeskError::Validation(v)) => assert_eq!(v.fields(), vec!["orderIds"]),
    other => panic!("expected validation error, got {other:?}"),
  }
}

#[tokio::test]
async fn handoff_leaves_order_status_alone() {
  let t = test_desk();
  let a = t.desk.orders.create_order(&parts_request(), vec![]).await.unwrap();
  t.desk.handoff.send(&handoff(&[a.order.order_number.as_str()], None)).await.unwrap();

  let stored = t.desk.orders.get(&OrderKey::Id(a.order.id)).await.unwrap();
  assert_eq!(stored.status, OrderStatus::Pending);
  assert_eq!(stored.timeline.len(), 1);
}

#[tokio::test]
async fn provider_failure_is_reported_not_raised() {
  let t = test_desk();
  let a = t.desk.orders.create_order(&parts_request(), vec![]).await.unwrap();
  t.whatsapp.fail_all(true);
  let outcome = t.desk.handoff.send(&handoff(&[a.order.order_number.as_str()], None)).await.unwrap();
  assert!(!outcome.sent);
  assert_eq!(outcome.notify.reason.as_deref(), Some(reason::PROVIDER_ERROR));
  assert_eq!(outcome.included.len(), 1);
}
