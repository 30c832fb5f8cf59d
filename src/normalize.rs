//! Turns an untrusted payload into a [`ModConfig`].
//!
//! Nothing in here fails. A missing, mistyped or out-of-range field is
//! replaced by its default or clamped into range, so any JSON object yields a
//! usable configuration.

use log::debug;
use serde_json::Value;

use crate::catalog::{self, BaseItem, NameColor, PrimaryEnchantment, SecondaryEnchantment};
use crate::config::{DatapackPayload, ModConfig, RawInput};
use crate::{ForgeError, ForgeResult};

pub const DEFAULT_MOD_NAME: &str = "Custom Arsenal";
pub const DEFAULT_ITEM_NAME: &str = "Arcane Blade";
pub const DEFAULT_ABILITY_NAME: &str = "Arcane Pulse";
pub const DEFAULT_ABILITY_DESCRIPTION: &str = "A bespoke enchantment forged via BlockForge.";
pub const DEFAULT_ABILITY_MESSAGE: &str = "Power courses through your veins.";

pub const MAX_DESCRIPTION_CHARS: usize = 200;
pub const MAX_MESSAGE_CHARS: usize = 160;

pub const FALLBACK_NAMESPACE: &str = "custom_mod";
pub const MAX_NAMESPACE_LEN: usize = 32;

pub const LEVEL_RANGE: (f64, f64) = (1.0, 10.0);
pub const ATTACK_BONUS_RANGE: (f64, f64) = (0.0, 30.0);
pub const DURATION_RANGE: (f64, f64) = (1.0, 120.0);
pub const AMPLIFIER_RANGE: (f64, f64) = (0.0, 10.0);
pub const CUSTOM_MODEL_DATA_RANGE: (f64, f64) = (1.0, 9_999_999.0);

const DEFAULT_PRIMARY_LEVEL: f64 = 5.0;
const DEFAULT_SECONDARY_LEVEL: f64 = 3.0;
const DEFAULT_ATTACK_BONUS: f64 = 0.0;
const DEFAULT_DURATION: f64 = 12.0;
const DEFAULT_AMPLIFIER: f64 = 0.0;

// ============================================================================
// Payload boundary
// ============================================================================

/// Parses a request body into a raw record.
///
/// An empty body, invalid JSON, or a falsy JSON value (`null`, `false`, `0`,
/// `""`) is a missing payload. Any other non-object value carries no fields
/// and becomes an empty record.
pub fn parse_payload(body: &[u8]) -> ForgeResult<RawInput> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ForgeError::MissingPayload);
    }
    match serde_json::from_slice::<Value>(body)? {
        Value::Object(map) => Ok(map),
        value if is_falsy(&value) => Err(ForgeError::MissingPayload),
        other => {
            debug!("[normalize] Ignoring non-object payload: {}", other);
            Ok(RawInput::new())
        }
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

// ============================================================================
// Field coercion
// ============================================================================

/// Two-sided bound. Non-finite values collapse to `min`.
pub fn clamp_number(value: f64, min: f64, max: f64) -> f64 {
    if !value.is_finite() {
        return min;
    }
    value.max(min).min(max)
}

/// Reads a field as a number the way a loose form value would be read:
/// numbers as-is, numeric strings parsed, blank strings and `null` as zero,
/// booleans as 0/1. Anything else, or a non-finite result, is `None`.
fn coerce_number(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Null => 0.0,
        Value::Bool(flag) => f64::from(u8::from(*flag)),
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                0.0
            } else {
                text.parse::<f64>().ok()?
            }
        }
        Value::Array(_) | Value::Object(_) => return None,
    };
    parsed.is_finite().then_some(parsed)
}

fn number_field(raw: &RawInput, key: &str, fallback: f64, (min, max): (f64, f64)) -> f64 {
    clamp_number(coerce_number(raw.get(key)).unwrap_or(fallback), min, max)
}

/// Integer field in a range whose bounds fit in `u8`. Fractions round down.
fn small_int_field(raw: &RawInput, key: &str, fallback: f64, range: (f64, f64)) -> u8 {
    number_field(raw, key, fallback, range).floor() as u8
}

fn custom_model_data_field(raw: &RawInput) -> Option<u32> {
    let value = coerce_number(raw.get("customModelData"))?.floor();
    if value == 0.0 {
        return None;
    }
    let (min, max) = CUSTOM_MODEL_DATA_RANGE;
    Some(clamp_number(value, min, max) as u32)
}

/// Flattens control characters to spaces, trims, falls back on blank input,
/// and caps to `max_chars` characters.
fn text_field(raw: &RawInput, key: &str, fallback: &str, max_chars: Option<usize>) -> String {
    let flattened = raw.get(key).and_then(Value::as_str).map(|text| {
        text.chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect::<String>()
    });
    let text = flattened
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or(fallback);
    match max_chars {
        Some(limit) if text.chars().count() > limit => {
            let capped: String = text.chars().take(limit).collect();
            capped.trim_end().to_string()
        }
        _ => text.to_string(),
    }
}

fn enum_field<T>(raw: &RawInput, key: &str, from_id: fn(&str) -> Option<T>) -> Option<T> {
    raw.get(key).and_then(Value::as_str).and_then(from_id)
}

// ============================================================================
// Namespace
// ============================================================================

/// Derives a datapack namespace from free text.
///
/// Lowercases, collapses every run of characters outside `[a-z0-9]` into a
/// single `_`, strips leading and trailing separators and keeps at most 32
/// characters.
pub fn slugify_namespace(input: &str) -> String {
    let mut slug = String::with_capacity(input.len().min(MAX_NAMESPACE_LEN * 2));
    let mut pending_separator = false;
    for ch in input.to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.push(ch);
        } else {
            pending_separator = true;
        }
    }
    slug.truncate(MAX_NAMESPACE_LEN);
    if slug.is_empty() {
        FALLBACK_NAMESPACE.to_string()
    } else {
        slug
    }
}

/// Namespace for a payload: the explicit `namespace` field when it is not
/// blank, otherwise the (already normalized) mod name.
pub fn resolve_namespace(raw: &RawInput, config: &ModConfig) -> String {
    let source = raw
        .get("namespace")
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .unwrap_or(&config.mod_name);
    slugify_namespace(source)
}

// ============================================================================
// Normalization
// ============================================================================

pub fn normalize(raw: &RawInput) -> ModConfig {
    let secondary_enchantment =
        enum_field(raw, "secondaryEnchantment", SecondaryEnchantment::from_id);
    let secondary_level = secondary_enchantment
        .map(|_| small_int_field(raw, "secondaryLevel", DEFAULT_SECONDARY_LEVEL, LEVEL_RANGE));

    ModConfig {
        mod_name: text_field(raw, "modName", DEFAULT_MOD_NAME, None),
        item_name: text_field(raw, "itemName", DEFAULT_ITEM_NAME, None),
        base_item: enum_field(raw, "baseItem", BaseItem::from_id).unwrap_or_default(),
        name_color: enum_field(raw, "nameColor", NameColor::from_id).unwrap_or_default(),
        ability_name: text_field(raw, "abilityName", DEFAULT_ABILITY_NAME, None),
        ability_description: text_field(
            raw,
            "abilityDescription",
            DEFAULT_ABILITY_DESCRIPTION,
            Some(MAX_DESCRIPTION_CHARS),
        ),
        primary_enchantment: enum_field(raw, "primaryEnchantment", PrimaryEnchantment::from_id)
            .unwrap_or_default(),
        primary_level: small_int_field(raw, "primaryLevel", DEFAULT_PRIMARY_LEVEL, LEVEL_RANGE),
        secondary_enchantment,
        secondary_level,
        attack_bonus: number_field(raw, "attackBonus", DEFAULT_ATTACK_BONUS, ATTACK_BONUS_RANGE),
        ability_effect: raw
            .get("abilityEffect")
            .and_then(Value::as_str)
            .map(|id| catalog::resolve(id).effect)
            .unwrap_or_default(),
        ability_duration: small_int_field(raw, "abilityDuration", DEFAULT_DURATION, DURATION_RANGE),
        ability_amplifier: small_int_field(
            raw,
            "abilityAmplifier",
            DEFAULT_AMPLIFIER,
            AMPLIFIER_RANGE,
        ),
        custom_model_data: custom_model_data_field(raw),
        ability_message: text_field(
            raw,
            "abilityMessage",
            DEFAULT_ABILITY_MESSAGE,
            Some(MAX_MESSAGE_CHARS),
        ),
    }
}

/// Normalizes a payload and resolves the namespace its files live under.
pub fn normalize_payload(raw: &RawInput) -> DatapackPayload {
    let config = normalize(raw);
    let namespace = resolve_namespace(raw, &config);
    DatapackPayload { namespace, config }
}
