// server/src/db/pg_store.rs

//! PostgreSQL implementation of the order, counter and message stores.
//!
//! Orders are kept as a JSONB document next to the handful of columns the
//! listings filter and sort on.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use partsdesk::model::{Direction, Message, Order};
use partsdesk::store::{MessageStore, OrderQuery, OrderSort, OrderStore};
use partsdesk::{DeskError, DeskResult};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument};
use uuid::Uuid;

const SCHEMA: &[&str] = &[
  r#"
  CREATE TABLE IF NOT EXISTS orders (
    id UUID PRIMARY KEY,
    order_number TEXT NOT NULL UNIQUE,
    number BIGINT UNIQUE,
    customer_phone TEXT NOT NULL,
    status TEXT NOT NULL,
    archived BOOLEAN NOT NULL DEFAULT FALSE,
    archived_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL,
    doc JSONB NOT NULL
  )
  "#,
  "CREATE INDEX IF NOT EXISTS orders_phone_idx ON orders (customer_phone, created_at DESC)",
  r#"
  CREATE TABLE IF NOT EXISTS counters (
    id TEXT PRIMARY KEY,
    seq BIGINT NOT NULL
  )
  "#,
  r#"
  CREATE TABLE IF NOT EXISTS messages (
    message_sid TEXT PRIMARY KEY,
    from_addr TEXT NOT NULL,
    to_addr TEXT NOT NULL,
    direction TEXT NOT NULL,
    body TEXT NOT NULL,
    status TEXT NOT NULL,
    error_code TEXT,
    ts TIMESTAMPTZ NOT NULL,
    read BOOLEAN NOT NULL DEFAULT FALSE
  )
  "#,
];

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
    let pool = PgPool::connect(database_url).await?;
    Ok(Self::new(pool))
  }

  /// Creates the tables when missing. Safe to run on every start.
  pub async fn migrate(&self) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
      sqlx::query(statement).execute(&self.pool).await?;
    }
    info!("Database schema ensured.");
    Ok(())
  }
}

#[derive(FromRow)]
struct DocRow {
  doc: Json<Order>,
}

#[derive(FromRow)]
struct MessageRow {
  message_sid: String,
  from_addr: String,
  to_addr: String,
  direction: String,
  body: String,
  status: String,
  error_code: Option<String>,
  ts: DateTime<Utc>,
  read: bool,
}

impl From<MessageRow> for Message {
  fn from(row: MessageRow) -> Self {
    Message {
      message_sid: row.message_sid,
      from: row.from_addr,
      to: row.to_addr,
      direction: if row.direction == "inbound" {
        Direction::Inbound
      } else {
        Direction::Outbound
      },
      body: row.body,
      status: row.status,
      error_code: row.error_code,
      timestamp: row.ts,
      read: row.read,
    }
  }
}

fn db_err(operation: &'static str) -> impl FnOnce(sqlx::Error) -> DeskError {
  move |e| DeskError::storage(operation, e)
}

#[async_trait]
impl OrderStore for PgStore {
  #[instrument(name = "PgStore::insert_order", skip_all, fields(order_number = %order.order_number), err(Display))]
  async fn insert_order(&self, order: &Order) -> DeskResult<()> {
    sqlx::query(
      "INSERT INTO orders (id, order_number, number, customer_phone, status, archived, archived_at, created_at, doc)
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(order.id)
    .bind(&order.order_number)
    .bind(order.number)
    .bind(&order.customer_phone)
    .bind(order.status.as_str())
    .bind(order.archived)
    .bind(order.archived_at)
    .bind(order.created_at)
    .bind(Json(order))
    .execute(&self.pool)
    .await
    .map_err(db_err("insert_order"))?;
    Ok(())
  }

  #[instrument(name = "PgStore::save_order", skip_all, fields(order_number = %order.order_number), err(Display))]
  async fn save_order(&self, order: &Order) -> DeskResult<()> {
    let result = sqlx::query(
      "UPDATE orders SET status = $2, archived = $3, archived_at = $4, customer_phone = $5, doc = $6 WHERE id = $1",
    )
    .bind(order.id)
    .bind(order.status.as_str())
    .bind(order.archived)
    .bind(order.archived_at)
    .bind(&order.customer_phone)
    .bind(Json(order))
    .execute(&self.pool)
    .await
    .map_err(db_err("save_order"))?;
    if result.rows_affected() == 0 {
      return Err(DeskError::order_not_found(order.id));
    }
    Ok(())
  }

  async fn find_order(&self, id: Uuid) -> DeskResult<Option<Order>> {
    let row: Option<DocRow> = sqlx::query_as("SELECT doc FROM orders WHERE id = $1")
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(db_err("find_order"))?;
    Ok(row.map(|r| r.doc.0))
  }

  async fn find_by_number(&self, order_number: &str) -> DeskResult<Option<Order>> {
    let row: Option<DocRow> = sqlx::query_as("SELECT doc FROM orders WHERE order_number = $1")
      .bind(order_number)
      .fetch_optional(&self.pool)
      .await
      .map_err(db_err("find_by_number"))?;
    Ok(row.map(|r| r.doc.0))
  }

  async fn query_orders(&self, query: &OrderQuery) -> DeskResult<Vec<Order>> {
    let mut sql: QueryBuilder<Postgres> = QueryBuilder::new("SELECT doc FROM orders WHERE TRUE");
    if let Some(archived) = query.archived {
      sql.push(" AND archived = ").push_bind(archived);
    }
    if let Some(status) = query.status {
      sql.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(phone) = &query.customer_phone {
      sql.push(" AND customer_phone = ").push_bind(phone.clone());
    }
    sql.push(match query.sort {
      OrderSort::CreatedDesc => " ORDER BY created_at DESC",
      OrderSort::ArchivedDesc => " ORDER BY archived_at DESC NULLS LAST",
    });
    if let Some(limit) = query.limit {
      sql.push(" LIMIT ").push_bind(limit as i64);
    }

    let rows: Vec<DocRow> = sql
      .build_query_as()
      .fetch_all(&self.pool)
      .await
      .map_err(db_err("query_orders"))?;
    Ok(rows.into_iter().map(|r| r.doc.0).collect())
  }

  async fn delete_order(&self, id: Uuid) -> DeskResult<bool> {
    let result = sqlx::query("DELETE FROM orders WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await
      .map_err(db_err("delete_order"))?;
    Ok(result.rows_affected() > 0)
  }

  /// One statement, so concurrent callers serialize on the row lock.
  async fn increment_counter(&self, name: &str, floor: i64) -> DeskResult<i64> {
    let seq: i64 = sqlx::query_scalar(
      "INSERT INTO counters (id, seq) VALUES ($1, $2 + 1)
       ON CONFLICT (id) DO UPDATE SET seq = counters.seq + 1
       RETURNING seq",
    )
    .bind(name)
    .bind(floor)
    .fetch_one(&self.pool)
    .await
    .map_err(db_err("increment_counter"))?;
    Ok(seq)
  }

  fn backend_name(&self) -> &'static str {
    "postgres"
  }
}

#[async_trait]
impl MessageStore for PgStore {
  async fn insert_message(&self, message: &Message) -> DeskResult<()> {
    sqlx::query(
      "INSERT INTO messages (message_sid, from_addr, to_addr, direction, body, status, error_code, ts, read)
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
       ON CONFLICT (message_sid) DO NOTHING",
    )
    .bind(&message.message_sid)
    .bind(&message.from)
    .bind(&message.to)
    .bind(message.direction.as_str())
    .bind(&message.body)
    .bind(&message.status)
    .bind(&message.error_code)
    .bind(message.timestamp)
    .bind(message.read)
    .execute(&self.pool)
    .await
    .map_err(db_err("insert_message"))?;
    Ok(())
  }

  async fn update_delivery_status(
    &self,
    message_sid: &str,
    status: &str,
    error_code: Option<&str>,
  ) -> DeskResult<bool> {
    let result = sqlx::query("UPDATE messages SET status = $2, error_code = $3 WHERE message_sid = $1")
      .bind(message_sid)
      .bind(status)
      .bind(error_code)
      .execute(&self.pool)
      .await
      .map_err(db_err("update_delivery_status"))?;
    Ok(result.rows_affected() > 0)
  }

  async fn list_messages(&self, unread_only: bool, limit: usize) -> DeskResult<Vec<Message>> {
    let rows: Vec<MessageRow> = sqlx::query_as(
      "SELECT message_sid, from_addr, to_addr, direction, body, status, error_code, ts, read
       FROM messages WHERE ($1 = FALSE OR read = FALSE) ORDER BY ts DESC LIMIT $2",
    )
    .bind(unread_only)
    .bind(limit as i64)
    .fetch_all(&self.pool)
    .await
    .map_err(db_err("list_messages"))?;
    Ok(rows.into_iter().map(Message::from).collect())
  }

  async fn mark_read(&self, message_sid: &str) -> DeskResult<bool> {
    let result = sqlx::query("UPDATE messages SET read = TRUE WHERE message_sid = $1")
      .bind(message_sid)
      .execute(&self.pool)
      .await
      .map_err(db_err("mark_read"))?;
    Ok(result.rows_affected() > 0)
  }
}
