//! Static catalog of everything a datapack can be built from.
//!
//! Every allow-list is a closed enum keyed by its Minecraft identifier, so a
//! [`ModConfig`](crate::ModConfig) cannot even hold an unknown base item or
//! enchantment. The ability effects carry the data their activation command
//! is rendered from.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declares a catalog enum whose variants serialize as their Minecraft id.
///
/// Attributes pass through to the enum and to each variant, so a
/// `#[derive(Default)]` on the enum pairs with a `#[default]` variant.
macro_rules! catalog_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => ($id:literal, $label:literal)
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $id)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in display order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn id(self) -> &'static str {
                match self {
                    $($name::$variant => $id,)+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            pub fn from_id(id: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|entry| entry.id() == id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.id())
            }
        }
    };
}

// ============================================================================
// Allow-lists
// ============================================================================

catalog_enum! {
    /// Vanilla item the custom weapon is built on.
    #[derive(Default)]
    BaseItem {
        #[default]
        DiamondSword => ("diamond_sword", "Diamond Sword"),
        NetheriteSword => ("netherite_sword", "Netherite Sword"),
        IronSword => ("iron_sword", "Iron Sword"),
        Trident => ("trident", "Trident"),
    }
}

catalog_enum! {
    /// Text color used for the item name, ability lore and activation message.
    #[derive(Default)]
    NameColor {
        #[default]
        Aqua => ("aqua", "Aqua"),
        Gold => ("gold", "Gold"),
        LightPurple => ("light_purple", "Magenta"),
        Green => ("green", "Emerald"),
        Red => ("red", "Crimson"),
    }
}

catalog_enum! {
    #[derive(Default)]
    PrimaryEnchantment {
        #[default]
        Sharpness => ("sharpness", "Sharpness"),
        Smite => ("smite", "Smite"),
        BaneOfArthropods => ("bane_of_arthropods", "Bane of Arthropods"),
        Looting => ("looting", "Looting"),
        FireAspect => ("fire_aspect", "Fire Aspect"),
        Knockback => ("knockback", "Knockback"),
    }
}

catalog_enum! {
    /// Optional second enchantment. Has no default: an unknown id means "none".
    SecondaryEnchantment {
        Looting => ("looting", "Looting"),
        Sweeping => ("sweeping", "Sweeping Edge"),
        FireAspect => ("fire_aspect", "Fire Aspect"),
        Unbreaking => ("unbreaking", "Unbreaking"),
        Mending => ("mending", "Mending"),
    }
}

catalog_enum! {
    /// Status effect granted when the ability function runs.
    AbilityEffect {
        Strength => ("strength", "Berserker Surge (Strength)"),
        Speed => ("speed", "Windstep (Speed)"),
        Regeneration => ("regeneration", "Emerald Renewal (Regeneration)"),
        NightVision => ("night_vision", "Void Sight (Night Vision)"),
    }
}

impl Default for AbilityEffect {
    fn default() -> Self {
        ABILITY_EFFECTS[0].effect
    }
}

// ============================================================================
// Ability Effects
// ============================================================================

/// Catalog entry for an ability effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectEntry {
    pub effect: AbilityEffect,
    /// Third lore line on the item.
    pub status_lore: &'static str,
    /// Whether the amplifier is passed through to the effect command.
    pub supports_amplifier: bool,
    /// Mob effect id used in `effect give`.
    pub mob_effect: &'static str,
}

/// Declared ability effects. The first entry is the fallback for unknown ids.
pub static ABILITY_EFFECTS: [EffectEntry; 4] = [
    EffectEntry {
        effect: AbilityEffect::Strength,
        status_lore: "Trigger to unleash a Strength boost.",
        supports_amplifier: true,
        mob_effect: "strength",
    },
    EffectEntry {
        effect: AbilityEffect::Speed,
        status_lore: "Trigger to dash forward with Speed.",
        supports_amplifier: true,
        mob_effect: "speed",
    },
    EffectEntry {
        effect: AbilityEffect::Regeneration,
        status_lore: "Trigger instant Regeneration to recover health.",
        supports_amplifier: true,
        mob_effect: "regeneration",
    },
    EffectEntry {
        effect: AbilityEffect::NightVision,
        status_lore: "Trigger to pierce the darkness with Night Vision.",
        supports_amplifier: false,
        mob_effect: "night_vision",
    },
];

impl EffectEntry {
    pub fn id(&self) -> &'static str {
        self.effect.id()
    }

    pub fn label(&self) -> &'static str {
        self.effect.label()
    }

    /// Amplifier actually applied: zero for effects without intensity levels.
    pub fn effective_amplifier(&self, amplifier: u8) -> u8 {
        if self.supports_amplifier {
            amplifier
        } else {
            0
        }
    }

    /// `effect give` command for this effect.
    pub fn activation_command(&self, duration: u8, amplifier: u8) -> String {
        format!(
            "effect give @s minecraft:{} {} {} true",
            self.mob_effect,
            duration,
            self.effective_amplifier(amplifier)
        )
    }
}

impl AbilityEffect {
    pub fn entry(self) -> &'static EffectEntry {
        ABILITY_EFFECTS
            .iter()
            .find(|entry| entry.effect == self)
            .unwrap_or(&ABILITY_EFFECTS[0])
    }
}

/// Looks up an ability effect by its string id, falling back to the first
/// declared entry. `normalize` reads `abilityEffect` through this.
pub fn resolve(id: &str) -> &'static EffectEntry {
    ABILITY_EFFECTS
        .iter()
        .find(|entry| entry.id() == id)
        .unwrap_or(&ABILITY_EFFECTS[0])
}

// ============================================================================
// Listing (served to form front-ends)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogOption {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectOption {
    pub id: &'static str,
    pub label: &'static str,
    pub status_lore: &'static str,
    pub supports_amplifier: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogListing {
    pub base_items: Vec<CatalogOption>,
    pub colors: Vec<CatalogOption>,
    pub primary_enchantments: Vec<CatalogOption>,
    pub secondary_enchantments: Vec<CatalogOption>,
    pub ability_effects: Vec<EffectOption>,
}

fn options<T: Copy>(
    all: &[T],
    id: impl Fn(T) -> &'static str,
    label: impl Fn(T) -> &'static str,
) -> Vec<CatalogOption> {
    all.iter()
        .map(|&entry| CatalogOption {
            value: id(entry),
            label: label(entry),
        })
        .collect()
}

/// Full catalog in display order.
pub fn listing() -> CatalogListing {
    CatalogListing {
        base_items: options(BaseItem::ALL, BaseItem::id, BaseItem::label),
        colors: options(NameColor::ALL, NameColor::id, NameColor::label),
        primary_enchantments: options(
            PrimaryEnchantment::ALL,
            PrimaryEnchantment::id,
            PrimaryEnchantment::label,
        ),
        secondary_enchantments: options(
            SecondaryEnchantment::ALL,
            SecondaryEnchantment::id,
            SecondaryEnchantment::label,
        ),
        ability_effects: ABILITY_EFFECTS
            .iter()
            .map(|entry| EffectOption {
                id: entry.id(),
                label: entry.label(),
                status_lore: entry.status_lore,
                supports_amplifier: entry.supports_amplifier,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_effect() {
        let entry = resolve("regeneration");
        assert_eq!(entry.effect, AbilityEffect::Regeneration);
        assert_eq!(entry.label(), "Emerald Renewal (Regeneration)");
    }

    #[test]
    fn test_resolve_falls_back_to_first_entry() {
        assert_eq!(resolve("levitation").effect, AbilityEffect::Strength);
        assert_eq!(resolve("").effect, AbilityEffect::Strength);
        assert_eq!(AbilityEffect::default(), AbilityEffect::Strength);
    }

    #[test]
    fn test_every_effect_has_an_entry() {
        for effect in AbilityEffect::ALL {
            assert_eq!(effect.entry().effect, *effect);
        }
    }

    #[test]
    fn test_night_vision_ignores_amplifier() {
        let entry = AbilityEffect::NightVision.entry();
        assert!(!entry.supports_amplifier);
        assert_eq!(
            entry.activation_command(30, 7),
            "effect give @s minecraft:night_vision 30 0 true"
        );
    }

    #[test]
    fn test_activation_command_passes_amplifier() {
        assert_eq!(
            AbilityEffect::Speed.entry().activation_command(12, 2),
            "effect give @s minecraft:speed 12 2 true"
        );
    }

    #[test]
    fn test_defaults_are_first_variants() {
        assert_eq!(BaseItem::default(), BaseItem::DiamondSword);
        assert_eq!(NameColor::default(), NameColor::Aqua);
        assert_eq!(PrimaryEnchantment::default(), PrimaryEnchantment::Sharpness);
        assert_eq!(AbilityEffect::default(), resolve("unknown").effect);
    }

    #[test]
    fn test_from_id_is_exact() {
        assert_eq!(BaseItem::from_id("trident"), Some(BaseItem::Trident));
        assert_eq!(BaseItem::from_id("Trident"), None);
        assert_eq!(NameColor::from_id("light_purple"), Some(NameColor::LightPurple));
        assert_eq!(SecondaryEnchantment::from_id("sharpness"), None);
        assert_eq!(PrimaryEnchantment::from_id("sweeping"), None);
    }

    #[test]
    fn test_enum_serializes_as_id() {
        let json = serde_json::to_string(&PrimaryEnchantment::BaneOfArthropods).unwrap();
        assert_eq!(json, "\"bane_of_arthropods\"");
        let back: SecondaryEnchantment = serde_json::from_str("\"sweeping\"").unwrap();
        assert_eq!(back, SecondaryEnchantment::Sweeping);
    }

    #[test]
    fn test_listing_keeps_display_order() {
        let listing = listing();
        let colors: Vec<_> = listing.colors.iter().map(|c| c.value).collect();
        assert_eq!(colors, ["aqua", "gold", "light_purple", "green", "red"]);
        assert_eq!(listing.secondary_enchantments[1].label, "Sweeping Edge");
        assert_eq!(listing.ability_effects.len(), 4);
        assert_eq!(listing.ability_effects[0].id, "strength");
        assert!(!listing.ability_effects[3].supports_amplifier);
    }
}
