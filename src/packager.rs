//! Datapack layout and archiving.
//!
//! The layout is fixed:
//!
//! ```text
//! pack.mcmeta
//! data/<namespace>/functions/give_item.mcfunction
//! data/<namespace>/functions/ability.mcfunction
//! data/<namespace>/functions/load.mcfunction
//! data/minecraft/tags/functions/load.json
//! ```

use log::{debug, info};
use serde::Serialize;
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::config::DatapackPayload;
use crate::templates::{build_ability_function, build_give_command, build_load_function};
use crate::{ForgeError, ForgeResult};

/// Datapack format understood by the targeted game version.
pub const PACK_FORMAT: u32 = 26;

#[derive(Serialize)]
struct PackMeta<'a> {
    pack: PackSection<'a>,
}

#[derive(Serialize)]
struct PackSection<'a> {
    pack_format: u32,
    description: &'a str,
}

#[derive(Serialize)]
struct FunctionTag {
    values: Vec<String>,
}

/// One archive entry, directories included so extracting tools recreate them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Directory(String),
    File { path: String, contents: String },
}

impl Entry {
    pub fn path(&self) -> &str {
        match self {
            Entry::Directory(path) => path,
            Entry::File { path, .. } => path,
        }
    }
}

fn file(path: impl Into<String>, contents: String) -> Entry {
    Entry::File {
        path: path.into(),
        contents,
    }
}

/// Pretty JSON with a trailing newline, as written to `pack.mcmeta`.
pub fn build_pack_meta(payload: &DatapackPayload) -> ForgeResult<String> {
    let description = format!("{} — {}", payload.config.mod_name, payload.config.item_name);
    let meta = PackMeta {
        pack: PackSection {
            pack_format: PACK_FORMAT,
            description: &description,
        },
    };
    Ok(format!("{}\n", serde_json::to_string_pretty(&meta)?))
}

/// `minecraft:load` function tag registering the namespace's load function.
pub fn build_load_tag(namespace: &str) -> ForgeResult<String> {
    let tag = FunctionTag {
        values: vec![format!("{}:load", namespace)],
    };
    Ok(format!("{}\n", serde_json::to_string_pretty(&tag)?))
}

fn is_valid_namespace(namespace: &str) -> bool {
    !namespace.is_empty()
        && namespace
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// All files of one datapack, in archive order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatapackLayout {
    namespace: String,
    entries: Vec<Entry>,
}

impl DatapackLayout {
    /// Renders every artifact for `payload` and lays them out.
    pub fn assemble(payload: &DatapackPayload) -> ForgeResult<Self> {
        let namespace = payload.namespace.as_str();
        if !is_valid_namespace(namespace) {
            return Err(ForgeError::InvalidNamespace(namespace.to_string()));
        }
        let config = &payload.config;
        let functions = format!("data/{}/functions", namespace);

        let entries = vec![
            file("pack.mcmeta", build_pack_meta(payload)?),
            Entry::Directory("data/".to_string()),
            Entry::Directory(format!("data/{}/", namespace)),
            Entry::Directory(format!("{}/", functions)),
            file(
                format!("{}/give_item.mcfunction", functions),
                format!("{}\n", build_give_command(config, namespace)),
            ),
            file(
                format!("{}/ability.mcfunction", functions),
                format!("{}\n", build_ability_function(config)),
            ),
            file(
                format!("{}/load.mcfunction", functions),
                format!("{}\n", build_load_function(namespace, config)),
            ),
            Entry::Directory("data/minecraft/".to_string()),
            Entry::Directory("data/minecraft/tags/".to_string()),
            Entry::Directory("data/minecraft/tags/functions/".to_string()),
            file(
                "data/minecraft/tags/functions/load.json",
                build_load_tag(namespace)?,
            ),
        ];

        debug!("[Packager] Assembled {} entries for {}", entries.len(), namespace);
        Ok(Self {
            namespace: namespace.to_string(),
            entries,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Contents of the file at `path`, if the layout has one.
    pub fn file(&self, path: &str) -> Option<&str> {
        self.entries.iter().find_map(|entry| match entry {
            Entry::File { path: p, contents } if p == path => Some(contents.as_str()),
            _ => None,
        })
    }

    /// Download name for the zipped pack.
    pub fn archive_name(&self) -> String {
        format!("{}-datapack.zip", self.namespace)
    }

    /// Zips the layout in memory.
    ///
    /// Entry timestamps are pinned to the zip epoch: one configuration, one
    /// byte sequence.
    pub fn to_zip(&self) -> ForgeResult<Vec<u8>> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        for entry in &self.entries {
            match entry {
                Entry::Directory(path) => zip.add_directory(path.as_str(), options)?,
                Entry::File { path, contents } => {
                    zip.start_file(path.as_str(), options)?;
                    zip.write_all(contents.as_bytes())?;
                }
            }
        }

        let bytes = zip.finish()?.into_inner();
        info!("[Packager] Built {} ({} bytes)", self.archive_name(), bytes.len());
        Ok(bytes)
    }

    /// Writes the layout as a plain directory tree under `root`.
    pub fn write_to_dir(&self, root: &Path) -> ForgeResult<()> {
        for entry in &self.entries {
            let target = root.join(entry.path());
            match entry {
                Entry::Directory(_) => fs::create_dir_all(&target)?,
                Entry::File { contents, .. } => {
                    if let Some(parent) = target.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    fs::write(&target, contents)?;
                }
            }
        }
        info!("[Packager] Wrote {} to {}", self.namespace, root.display());
        Ok(())
    }
}

/// Normalized payload → zip bytes and download name.
pub fn package(payload: &DatapackPayload) -> ForgeResult<(String, Vec<u8>)> {
    let layout = DatapackLayout::assemble(payload)?;
    let bytes = layout.to_zip()?;
    Ok((layout.archive_name(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModConfig;
    use std::io::Read;
    use zip::ZipArchive;

    fn payload(namespace: &str) -> DatapackPayload {
        DatapackPayload {
            namespace: namespace.to_string(),
            config: ModConfig {
                mod_name: "Emerald Arsenal".to_string(),
                item_name: "Emerald Saber".to_string(),
                ..ModConfig::default()
            },
        }
    }

    #[test]
    fn test_pack_meta_document() {
        let meta = build_pack_meta(&payload("emerald_arsenal")).unwrap();
        assert_eq!(
            meta,
            "{\n  \"pack\": {\n    \"pack_format\": 26,\n    \"description\": \"Emerald Arsenal — Emerald Saber\"\n  }\n}\n"
        );
    }

    #[test]
    fn test_load_tag_document() {
        assert_eq!(
            build_load_tag("emerald_arsenal").unwrap(),
            "{\n  \"values\": [\n    \"emerald_arsenal:load\"\n  ]\n}\n"
        );
    }

    #[test]
    fn test_layout_paths() {
        let layout = DatapackLayout::assemble(&payload("emerald_arsenal")).unwrap();
        let paths: Vec<_> = layout.entries().iter().map(Entry::path).collect();
        assert_eq!(
            paths,
            [
                "pack.mcmeta",
                "data/",
                "data/emerald_arsenal/",
                "data/emerald_arsenal/functions/",
                "data/emerald_arsenal/functions/give_item.mcfunction",
                "data/emerald_arsenal/functions/ability.mcfunction",
                "data/emerald_arsenal/functions/load.mcfunction",
                "data/minecraft/",
                "data/minecraft/tags/",
                "data/minecraft/tags/functions/",
                "data/minecraft/tags/functions/load.json",
            ]
        );
        assert_eq!(layout.archive_name(), "emerald_arsenal-datapack.zip");
    }

    #[test]
    fn test_function_files_match_builders() {
        let payload = payload("emerald_arsenal");
        let layout = DatapackLayout::assemble(&payload).unwrap();
        assert_eq!(
            layout.file("data/emerald_arsenal/functions/give_item.mcfunction"),
            Some(format!("{}\n", build_give_command(&payload.config, "emerald_arsenal")).as_str())
        );
        assert_eq!(
            layout.file("data/emerald_arsenal/functions/ability.mcfunction"),
            Some(format!("{}\n", build_ability_function(&payload.config)).as_str())
        );
    }

    #[test]
    fn test_rejects_unsafe_namespace() {
        for namespace in ["", "../escape", "Upper", "a/b"] {
            let err = DatapackLayout::assemble(&payload(namespace)).unwrap_err();
            assert!(matches!(err, ForgeError::InvalidNamespace(_)));
        }
    }

    #[test]
    fn test_zip_round_trip_contents() {
        let layout = DatapackLayout::assemble(&payload("emerald_arsenal")).unwrap();
        let bytes = layout.to_zip().unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), layout.entries().len());

        let mut tag = String::new();
        archive
            .by_name("data/minecraft/tags/functions/load.json")
            .unwrap()
            .read_to_string(&mut tag)
            .unwrap();
        assert_eq!(Some(tag.as_str()), layout.file("data/minecraft/tags/functions/load.json"));
        assert!(archive.by_name("data/emerald_arsenal/functions/").unwrap().is_dir());
    }

    #[test]
    fn test_zip_is_deterministic() {
        let (name, first) = package(&payload("emerald_arsenal")).unwrap();
        let (_, second) = package(&payload("emerald_arsenal")).unwrap();
        assert_eq!(name, "emerald_arsenal-datapack.zip");
        assert_eq!(first, second);
    }

    #[test]
    fn test_write_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DatapackLayout::assemble(&payload("emerald_arsenal")).unwrap();
        layout.write_to_dir(dir.path()).unwrap();

        let load = fs::read_to_string(
            dir.path()
                .join("data/emerald_arsenal/functions/load.mcfunction"),
        )
        .unwrap();
        assert!(load.starts_with("tellraw @a "));
        assert!(load.ends_with("\n"));
        assert!(dir.path().join("pack.mcmeta").is_file());
        assert!(dir.path().join("data/minecraft/tags/functions").is_dir());
    }
}
