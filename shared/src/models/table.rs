//! Table model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One physical seating unit.
///
/// `opaque_uid` is the stable, unguessable public identifier printed in
/// the table's QR code. Immutable once referenced by orders except for
/// the active flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub id: i64,
    pub name: String,
    pub opaque_uid: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
