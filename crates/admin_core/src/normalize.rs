//! Payload normalization for bakery profile updates.

use shared::protocol::{BakeryProfilePayload, BakeryProfileUpdate, ImageFileIds};
use serde_json::Value;
use tracing::warn;

/// Resolves the shop image field to a canonical list.
///
/// A raw string starting with `[` is treated as a JSON-encoded array; if it
/// does not decode, the field becomes empty rather than failing the update.
pub fn normalize_image_file_ids(input: Option<ImageFileIds>) -> Vec<String> {
    match input {
        None => Vec::new(),
        Some(ImageFileIds::List(ids)) => ids,
        Some(ImageFileIds::Raw(raw)) if raw.starts_with('[') => {
            match serde_json::from_str::<Vec<Value>>(&raw) {
                Ok(values) => values.into_iter().filter_map(id_from_json).collect(),
                Err(err) => {
                    warn!(error = %err, raw = %raw, "failed to parse shop_image_file_ids");
                    Vec::new()
                }
            }
        }
        Some(ImageFileIds::Raw(raw)) if raw.is_empty() => Vec::new(),
        Some(ImageFileIds::Raw(raw)) => vec![raw],
    }
}

/// Scalars become ids in their JSON text form; nulls and nested values are
/// dropped.
fn id_from_json(value: Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => {
            warn!(value = %other, "dropping non-scalar shop image id");
            None
        }
    }
}

/// Brings `HH:MM` up to `HH:MM:SS`. Anything else is passed through.
pub fn normalize_time(time: &str) -> String {
    if time.is_empty() || is_clock(time, 3) {
        return time.to_string();
    }
    if is_clock(time, 2) {
        return format!("{time}:00");
    }
    time.to_string()
}

fn is_clock(time: &str, fields: usize) -> bool {
    let mut count = 0;
    for part in time.split(':') {
        count += 1;
        if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
    }
    count == fields
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

pub fn build_profile_payload(update: BakeryProfileUpdate) -> BakeryProfilePayload {
    BakeryProfilePayload {
        bakery_name: update.bakery_name,
        bakery_description: update.bakery_description,
        cake_description: update.cake_description,
        price_description: update.price_description,
        // Never synthesized: an absent password leaves the stored one alone.
        password: non_empty(update.password),
        phone: update.phone,
        address: update.address,
        latitude: update.latitude,
        longitude: update.longitude,
        owner_name: update.owner_name,
        tax_code: update.tax_code,
        identity_card_number: update.identity_card_number,
        shop_image_file_ids: normalize_image_file_ids(update.shop_image_file_ids),
        avatar_file_id: update.avatar_file_id,
        front_card_file_id: update.front_card_file_id,
        back_card_file_id: update.back_card_file_id,
        food_safety_certificate_file_id: update.food_safety_certificate_file_id.unwrap_or_default(),
        business_license_file_id: update.business_license_file_id.unwrap_or_default(),
        open_time: normalize_time(&update.open_time),
        close_time: normalize_time(&update.close_time),
        bank_account: non_empty(update.bank_account),
    }
}

#[cfg(test)]
#[path = "tests/normalize_tests.rs"]
mod tests;
