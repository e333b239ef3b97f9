//! Structured option selections
//!
//! Cart and order lines carry the diner's chosen options as an
//! order-preserving mapping of option group to selected options with
//! per-option quantities. The mapping is structural (not a free-form
//! JSON blob) so it can be validated at the boundary and trusted
//! downstream.

use serde::{Deserialize, Serialize};

/// Ordered list of option-group selections attached to a cart/order line.
pub type OptionSelections = Vec<OptionGroupSelection>;

/// All options chosen within one option group (e.g. "toppings").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionGroupSelection {
    pub group_id: String,
    pub choices: Vec<OptionChoice>,
}

/// One chosen option and how many of it (e.g. double cheese).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionChoice {
    pub option_id: String,
    pub quantity: i32,
}
