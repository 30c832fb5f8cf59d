//! # BlockForge
//!
//! Turns a handful of weapon and ability choices into a Minecraft datapack.
//!
//! The pipeline is strictly one-directional:
//!
//! - [`normalize`] repairs a loosely-typed JSON record into a [`ModConfig`]
//!   (never fails, every bad field falls back to a default)
//! - [`templates`] renders the `give` command and the two `.mcfunction` scripts
//! - [`packager`] lays the artifacts out as a datapack and zips them
//! - [`server`] exposes the whole thing over HTTP
//!
//! Only the edges (payload parsing, archiving, the HTTP loop, settings) can
//! return errors; everything in between is total.

pub mod catalog;
pub mod config;
pub mod normalize;
pub mod packager;
pub mod server;
pub mod settings;
pub mod templates;

pub use catalog::{
    AbilityEffect, BaseItem, CatalogListing, EffectEntry, NameColor, PrimaryEnchantment,
    SecondaryEnchantment,
};
pub use config::{DatapackPayload, ModConfig, RawInput};
pub use normalize::{normalize, normalize_payload, parse_payload, slugify_namespace};
pub use packager::DatapackLayout;
pub use settings::Settings;
pub use templates::{build_ability_function, build_give_command, build_load_function};

/// Errors raised at the edges of the pipeline.
#[derive(thiserror::Error, Debug)]
pub enum ForgeError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON payload or document could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Settings file is not valid YAML for [`Settings`]
    #[error("Settings error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Zip archive could not be written
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Request carried no usable payload
    #[error("Missing payload")]
    MissingPayload,

    /// Namespace cannot be used as a datapack directory
    #[error("Invalid namespace directory: {0:?}")]
    InvalidNamespace(String),

    /// HTTP server could not be started
    #[error("Server error: {0}")]
    Server(String),
}

/// Result type used throughout the crate.
pub type ForgeResult<T> = Result<T, ForgeError>;

/// Crate version, reported by the CLI and the health endpoint.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
