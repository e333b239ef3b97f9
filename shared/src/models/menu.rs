//! Catalog item model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The slice of a catalog item the ordering engine needs: existence,
/// availability, price and title for order snapshots. Catalog CRUD is
/// collaborator scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub title: String,
    pub price: Decimal,
    pub is_active: bool,
    /// Temporarily unavailable ("86'd" in kitchen slang)
    pub is_86: bool,
}
