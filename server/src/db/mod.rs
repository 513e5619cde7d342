// server/src/db/mod.rs

pub mod pg_store;

pub use pg_store::PgStore;
