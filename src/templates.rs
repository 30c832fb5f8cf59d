// ============================================================================
// Datapack Templates - give command and mcfunction bodies
// ============================================================================
//
// Every builder here is a pure function of the configuration. The preview
// endpoint and the packager call the same builders, so both always see
// byte-identical text.

use serde_json::Value;

use crate::config::ModConfig;
use crate::normalize::{
    clamp_number, AMPLIFIER_RANGE, ATTACK_BONUS_RANGE, CUSTOM_MODEL_DATA_RANGE, DURATION_RANGE,
    LEVEL_RANGE,
};

/// Hides every tooltip section the item would otherwise show.
pub const HIDE_FLAGS: u8 = 127;

/// Fallback attribute UUID words for namespaces shorter than four characters.
pub const FALLBACK_UUID: [i32; 4] = [14602819, 8319051, 4019287, 9912741];

/// JSON text component for `tellraw`, on a single line.
fn tellraw_component(text: &str, color: &str) -> String {
    format!(
        r#"{{"text":{},"color":{},"italic":false}}"#,
        Value::from(text),
        Value::from(color)
    )
}

/// Control characters would end the command line early.
fn single_line(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Single-quoted SNBT string holding a JSON text component.
pub fn text_component(text: &str, color: &str) -> String {
    format!("'{}'", tellraw_component(text, color).replace('\'', "\\'"))
}

/// Four UUID words for the attack-damage modifier.
///
/// Each word is the UTF-16 code unit at that position times `index + 11`.
/// Not unique: namespaces sharing a four-character prefix collide.
pub fn attribute_uuid(namespace: &str) -> [i32; 4] {
    let mut words = FALLBACK_UUID;
    for (index, unit) in namespace.encode_utf16().take(words.len()).enumerate() {
        words[index] = i32::from(unit) * (index as i32 + 11);
    }
    words
}

fn clamp_level(level: u8) -> u8 {
    let (min, max) = LEVEL_RANGE;
    level.clamp(min as u8, max as u8)
}

fn enchantment_entry(id: &str, level: u8) -> String {
    format!(r#"{{id:"minecraft:{}",lvl:{}s}}"#, id, clamp_level(level))
}

// ============================================================================
// give_item.mcfunction
// ============================================================================

pub fn build_give_command(config: &ModConfig, namespace: &str) -> String {
    let ability = config.ability_effect.entry();
    let color = config.name_color.id();

    let lore = [
        text_component(&config.ability_name, color),
        text_component(&config.ability_description, "gray"),
        text_component(ability.status_lore, "dark_green"),
    ];

    let mut enchantments = vec![enchantment_entry(
        config.primary_enchantment.id(),
        config.primary_level,
    )];
    if let (Some(secondary), Some(level)) = (config.secondary_enchantment, config.secondary_level)
    {
        enchantments.push(enchantment_entry(secondary.id(), level));
    }

    let display = format!(
        "{{Name:{},Lore:[{}]}}",
        text_component(&config.item_name, color),
        lore.join(",")
    );

    let mut root = vec![
        format!("display:{}", display),
        format!("Enchantments:[{}]", enchantments.join(",")),
        format!("HideFlags:{}", HIDE_FLAGS),
    ];

    let (min_bonus, max_bonus) = ATTACK_BONUS_RANGE;
    let attack_bonus = clamp_number(config.attack_bonus, min_bonus, max_bonus);
    if attack_bonus > 0.0 {
        let [a, b, c, d] = attribute_uuid(namespace);
        root.push(format!(
            r#"AttributeModifiers:[{{AttributeName:"generic.attack_damage",Name:"custom.attack_bonus",Amount:{},Operation:0,UUID:[I,{},{},{},{}],Slot:"mainhand"}}]"#,
            attack_bonus, a, b, c, d
        ));
    }

    if let Some(model) = config.custom_model_data.filter(|&model| model > 0) {
        root.push(format!(
            "CustomModelData:{}",
            model.min(CUSTOM_MODEL_DATA_RANGE.1 as u32)
        ));
    }

    format!("give @s minecraft:{}{{{}}}", config.base_item.id(), root.join(","))
}

// ============================================================================
// ability.mcfunction
// ============================================================================

pub fn build_ability_function(config: &ModConfig) -> String {
    let ability = config.ability_effect.entry();
    let (min_duration, max_duration) = DURATION_RANGE;
    let duration = config
        .ability_duration
        .clamp(min_duration as u8, max_duration as u8);
    let amplifier = ability.effective_amplifier(config.ability_amplifier.min(AMPLIFIER_RANGE.1 as u8));

    [
        format!("say {} activated!", single_line(&config.ability_name)),
        format!(
            "tellraw @s {}",
            tellraw_component(&config.ability_message, config.name_color.id())
        ),
        ability.activation_command(duration, amplifier),
    ]
    .join("\n")
}

// ============================================================================
// load.mcfunction
// ============================================================================

pub fn build_load_function(namespace: &str, config: &ModConfig) -> String {
    let text = format!(
        "{} loaded. Use /function {}:give_item to claim the {}.",
        config.mod_name, namespace, config.item_name
    );
    format!("tellraw @a {}", tellraw_component(&text, "aqua"))
}
