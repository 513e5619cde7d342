// tests/sequence_tests.rs
mod common;
use common::*;
use partsdesk::sequence::{SequenceAllocator, ORDER_COUNTER, SEQUENCE_FLOOR};
use partsdesk::store::{MemoryStore, OrderStore};
use partsdesk::{OrderKey, Persistence};
use std::collections::HashSet;
use std::sync::Arc;

#[tokio::test]
async fn first_number_is_one_past_the_floor() {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  let allocator = SequenceAllocator::new(store.clone());
  assert_eq!(allocator.next_order_number().await.unwrap(), SEQUENCE_FLOOR + 1);
  assert_eq!(allocator.next_order_number().await.unwrap(), 101);
  assert_eq!(store.increment_counter(ORDER_COUNTER, SEQUENCE_FLOOR).await.unwrap(), 102);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_allocations_never_repeat() {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  let allocator = SequenceAllocator::new(store);

  let handles: Vec<_> = (0..200)
    .map(|_| {
      let allocator = allocator.clone();
      tokio::spawn(async move { allocator.next_order_number().await.unwrap() })
    })
    .collect();

  let mut seen = HashSet::new();
  for handle in handles {
    assert!(seen.insert(handle.await.unwrap()), "duplicate order number");
  }
  assert_eq!(seen.len(), 200);
  assert_eq!(seen.iter().min(), Some(&100));
  assert_eq!(seen.iter().max(), Some(&299));
}

#[tokio::test]
async fn unavailable_counter_falls_back_to_unique_identifier() {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  store.set_available(false);
  let allocator = SequenceAllocator::new(store);

  let a = allocator.assign().await;
  let b = allocator.assign().await;
  assert_eq!(a.number, None);
  assert!(a.order_number.starts_with("ORD-"));
  assert_ne!(a.order_number, b.order_number);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_order_creation_yields_distinct_order_numbers() {
  let t = test_desk_with(|c| c.notify.admin_numbers.clear());
  let handles: Vec<_> = (0..25)
    .map(|i| {
      let orders = t.desk.orders.clone();
      tokio::spawn(async move {
        orders
          .create_order(&parts_request_for("0551234567", &format!("Part {i}")), vec![])
          .await
          .unwrap()
      })
    })
    .collect();

  let mut numbers = HashSet::new();
  for handle in handles {
    let outcome = handle.await.unwrap();
    assert_eq!(outcome.persistence, Persistence::Database);
    assert!(numbers.insert(outcome.order.order_number.clone()));
    let stored = t.desk.orders.get(&OrderKey::parse(&outcome.order.order_number)).await.unwrap();
    assert_eq!(stored.number, outcome.order.number);
  }
  assert_eq!(t.store.order_count(), 25);
}
