// tests/broadcast_tests.rs
mod common;
use common::*;
use partsdesk::notify::broadcast::SAMPLE_SIZE;
use partsdesk::requests::BroadcastRequest;
use partsdesk::{Desk, DeskError, MemoryStore, MessageContent};
use std::collections::BTreeMap;
use std::sync::Arc;

fn recipients(n: usize) -> Vec<String> {
  (0..n).map(|i| format!("05600000{i:02}")).collect()
}

#[tokio::test]
async fn sends_every_recipient_in_batches() {
  let t = test_desk();
  let request = BroadcastRequest {
    recipients: recipients(7),
    body: Some("Eid sale on brake pads".to_string()),
    ..BroadcastRequest::default()
  };
  let summary = t.desk.broadcast(&request).await.unwrap();

  assert_eq!(summary.total, 7);
  assert_eq!(summary.sent, 7);
  assert_eq!(summary.failed, 0);
  assert_eq!(summary.sample.len(), SAMPLE_SIZE);
  assert_eq!(t.whatsapp.sent_count(), 7);
}

#[tokio::test]
async fn failures_are_counted_not_raised() {
  let t = test_desk();
  t.whatsapp.fail_for("0560000001");
  t.whatsapp.fail_for("0560000003");
  let mut list = recipients(4);
  list.push("not a phone".to_string());
  let request = BroadcastRequest {
    recipients: list,
    body: Some("Weekend hours changed".to_string()),
    ..BroadcastRequest::default()
  };
  let summary = t.desk.broadcast(&request).await.unwrap();
  assert_eq!(summary.total, 5);
  assert_eq!(summary.sent, 2);
  assert_eq!(summary.failed, 3);
  assert_eq!(summary.sample, vec!["0560000000".to_string(), "0560000002".to_string()]);
}

#[tokio::test]
async fn template_from_request_wins() {
  let t = test_desk_with(|c| c.notify.templates.broadcast = Some("HXdefault".to_string()));
  let request = BroadcastRequest {
    recipients: recipients(1),
    template_sid: Some("HXpromo".to_string()),
    variables: BTreeMap::from([("1".to_string(), "20%".to_string())]),
    body: Some("ignored".to_string()),
  };
  t.desk.broadcast(&request).await.unwrap();

  let sent = t.whatsapp.sent.lock();
  match &sent[0].content {
    MessageContent::Template { content_sid, variables } => {
      assert_eq!(content_sid, "HXpromo");
      assert_eq!(variables["1"], "20%");
    }
    other => panic!("expected template, got {other:?}"),
  }
}

#[tokio::test]
async fn configured_template_is_used_when_request_names_none() {
  let t = test_desk_with(|c| c.notify.templates.broadcast = Some("HXdefault".to_string()));
  let request = BroadcastRequest {
    recipients: recipients(1),
    ..BroadcastRequest::default()
  };
  t.desk.broadcast(&request).await.unwrap();
  assert!(matches!(
    &t.whatsapp.sent.lock()[0].content,
    MessageContent::Template { content_sid, .. } if content_sid == "HXdefault"
  ));
}

#[tokio::test]
async fn needs_a_template_or_a_body() {
  let t = test_desk();
  let request = BroadcastRequest {
    recipients: recipients(2),
    body: Some("   ".to_string()),
    ..BroadcastRequest::default()
  };
  match t.desk.broadcast(&request).await {
    Err(DeskError::Validation(v)) => assert!(v.has_field("templateSid")),
    other => panic!("expected validation error, got {other:?}"),
  }
  assert_eq!(t.whatsapp.sent_count(), 0);
}

#[tokio::test]
async fn blank_recipient_list_is_rejected() {
  let t = test_desk();
  let request = BroadcastRequest {
    recipients: vec!["".to_string(), "  ".to_string()],
    body: Some("hello".to_string()),
    ..BroadcastRequest::default()
  };
  match t.desk.broadcast(&request).await {
    Err(DeskError::Validation(v)) => assert_eq!(v.fields(), vec!["recipients"]),
    other => panic!("expected validation error, got {other:?}"),
  }
}

#[tokio::test]
async fn broadcast_without_whatsapp_is_not_configured() {
  setup_tracing();
  let dir = tempfile::tempdir().unwrap();
  let desk = Desk::builder(test_config(&dir))
    .store(Arc::new(MemoryStore::new()))
    .build()
    .unwrap();
  let request = BroadcastRequest {
    recipients: recipients(1),
    body: Some("hello".to_string()),
    ..BroadcastRequest::default()
  };
  assert!(matches!(
    desk.broadcast(&request).await,
    Err(DeskError::NotConfigured(channel)) if channel == "whatsapp"
  ));
}
