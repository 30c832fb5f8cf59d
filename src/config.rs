//! Configuration records flowing through the pipeline.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::catalog::{AbilityEffect, BaseItem, NameColor, PrimaryEnchantment, SecondaryEnchantment};

/// Untrusted request payload: field name to arbitrary JSON value.
pub type RawInput = Map<String, Value>;

/// Validated weapon configuration.
///
/// Produced by [`normalize`](crate::normalize::normalize); field names
/// serialize in camelCase so the record reads back as a raw payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModConfig {
    pub mod_name: String,
    pub item_name: String,
    pub base_item: BaseItem,
    pub name_color: NameColor,
    pub ability_name: String,
    pub ability_description: String,
    pub primary_enchantment: PrimaryEnchantment,
    /// 1..=10
    pub primary_level: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_enchantment: Option<SecondaryEnchantment>,
    /// 1..=10, only present alongside `secondary_enchantment`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_level: Option<u8>,
    /// Extra attack damage, 0..=30. Zero means no attribute modifier.
    pub attack_bonus: f64,
    pub ability_effect: AbilityEffect,
    /// Seconds, 1..=120
    pub ability_duration: u8,
    /// 0..=10
    pub ability_amplifier: u8,
    /// 1..=9_999_999
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_model_data: Option<u32>,
    pub ability_message: String,
}

impl Default for ModConfig {
    fn default() -> Self {
        crate::normalize::normalize(&RawInput::new())
    }
}

/// A validated configuration together with the namespace its files live under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatapackPayload {
    pub namespace: String,
    #[serde(flatten)]
    pub config: ModConfig,
}
