//! QRDine core — request coordination and event fanout for multi-device
//! table ordering
//!
//! Anonymous devices at a table concurrently edit a shared cart and
//! promote it, one-way, into an immutable order; staff drive orders
//! through their lifecycle; every transition fans out live to the
//! table's viewers and a venue-wide staff channel.
//!
//! # Request flow
//!
//! ```text
//! request
//!     ├─ 1. auth::authorize_table      (table token + session capability)
//!     ├─ 2. idempotency::execute       (dedup retried mutations)
//!     ├─ 3. cart::CartLock::with_lock  (serialize edits to one cart)
//!     ├─ 4. db::Datastore              (atomic multi-row writes)
//!     ├─ 5. pricing::compute_totals    (submission only)
//!     └─ 6. fanout::EventBus::publish  (table + staff channels)
//! ```
//!
//! Staff actions skip steps 1-3 and go straight through the order state
//! machine. Storage and transport are collaborators behind the traits in
//! [`db`]; the in-memory implementations back tests and single-node use.

pub mod auth;
pub mod cart;
pub mod core;
pub mod db;
pub mod fanout;
pub mod idempotency;
pub mod kv;
pub mod orders;
pub mod pricing;
pub mod utils;

// Re-exports
pub use crate::core::{AppError, AppResult, Config, CoreState};
