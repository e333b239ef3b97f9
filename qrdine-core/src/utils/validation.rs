//! Input validation helpers
//!
//! Centralized text limits and sanitizers for diner-supplied input.
//! Free text from anonymous devices is hostile input: markup is
//! stripped and lengths are capped before anything reaches storage.

use shared::types::OptionSelections;

use crate::core::{AppError, AppResult};

// ── Limits ──────────────────────────────────────────────────────────

/// Cart/order line notes ("no onions please")
pub const MAX_NOTE_LEN: usize = 280;

/// Staff-entered void reasons
pub const MAX_REASON_LEN: usize = 255;

/// Anonymous device identifiers
pub const MAX_DEVICE_ID_LEN: usize = 64;

/// Per-line quantity ceiling (minimum is clamped, not rejected)
pub const MAX_QUANTITY: i32 = 999;

/// Option structure ceilings
pub const MAX_OPTION_GROUPS: usize = 20;
pub const MAX_OPTION_CHOICES: usize = 20;
pub const MAX_OPTION_ID_LEN: usize = 64;

// ── Sanitizers ──────────────────────────────────────────────────────

/// Remove markup from free text: everything between `<` and `>` is
/// dropped, and an unterminated tag swallows the rest of the string.
pub fn strip_markup(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for ch in input.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

fn sanitize_text(input: &str, max_len: usize) -> Option<String> {
    let cleaned = strip_markup(input);
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    Some(cleaned.chars().take(max_len).collect())
}

/// Sanitize a diner note: markup stripped, trimmed, truncated to
/// [`MAX_NOTE_LEN`] characters. Empty-after-cleaning becomes `None`.
pub fn sanitize_note(note: Option<&str>) -> Option<String> {
    sanitize_text(note?, MAX_NOTE_LEN)
}

/// Sanitize a staff reason the same way, capped at [`MAX_REASON_LEN`].
pub fn sanitize_reason(reason: Option<&str>) -> Option<String> {
    sanitize_text(reason?, MAX_REASON_LEN)
}

// ── Validators ──────────────────────────────────────────────────────

/// Clamp a requested quantity to at least 1; quantities beyond the
/// ceiling are rejected rather than clamped down.
pub fn clamp_quantity(quantity: Option<i32>) -> AppResult<i32> {
    let quantity = quantity.unwrap_or(1).max(1);
    if quantity > MAX_QUANTITY {
        return Err(AppError::validation(format!(
            "quantity exceeds maximum allowed ({MAX_QUANTITY}), got {quantity}"
        )));
    }
    Ok(quantity)
}

pub fn validate_device_id(device_id: &str) -> AppResult<()> {
    if device_id.trim().is_empty() {
        return Err(AppError::validation("missing device id"));
    }
    if device_id.len() > MAX_DEVICE_ID_LEN {
        return Err(AppError::validation(format!(
            "device id is too long ({} chars, max {MAX_DEVICE_ID_LEN})",
            device_id.len()
        )));
    }
    Ok(())
}

/// Structural validation of an options mapping: non-empty bounded ids,
/// positive per-option quantities, bounded group and choice counts.
pub fn validate_options(options: &OptionSelections) -> AppResult<()> {
    if options.len() > MAX_OPTION_GROUPS {
        return Err(AppError::validation(format!(
            "too many option groups ({}, max {MAX_OPTION_GROUPS})",
            options.len()
        )));
    }
    for group in options {
        validate_option_id(&group.group_id, "option group id")?;
        if group.choices.len() > MAX_OPTION_CHOICES {
            return Err(AppError::validation(format!(
                "too many choices in group {} ({}, max {MAX_OPTION_CHOICES})",
                group.group_id,
                group.choices.len()
            )));
        }
        for choice in &group.choices {
            validate_option_id(&choice.option_id, "option id")?;
            if choice.quantity < 1 {
                return Err(AppError::validation(format!(
                    "option {} quantity must be at least 1",
                    choice.option_id
                )));
            }
        }
    }
    Ok(())
}

fn validate_option_id(id: &str, field: &str) -> AppResult<()> {
    if id.is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if id.len() > MAX_OPTION_ID_LEN {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {MAX_OPTION_ID_LEN})",
            id.len()
        )));
    }
    Ok(())
}
