//! Creature index: joins model, display and template records into the four
//! addon tables.
//!
//! Built once per run from a [`RecordStore`] and then only read. Records
//! added to the store afterwards (see `assets`) reach the output through an
//! [`Overlay`](crate::overlay::Overlay), not through a rebuild.

use crate::lua_table::{LuaTable, LuaValue};
use crate::model_path::normalize_path;
use crate::records::RecordStore;
use std::collections::{BTreeMap, HashMap, HashSet};

pub const DISPLAY_ID_MAP: &str = "CreatureDisplayIdMap";
pub const MODEL_PATH_MAP: &str = "CreatureModelPathMap";
pub const VARIANTS_MAP: &str = "CreatureVariantsMap";
pub const TEXTURES_MAP: &str = "CreatureDisplayTexturesMap";

const DISPLAY_ID_HEADER: &[&str] =
    &["Auto-generated from creature_template (modelid1). Run `cmv-gen generate` to refresh."];
const MODEL_PATH_HEADER: &[&str] =
    &["Auto-generated from CreatureDisplayInfo.dbc + CreatureModelData.dbc."];
const VARIANTS_HEADER: &[&str] =
    &["Auto-generated. Entries with multiple modelids (texture variants) only."];
const TEXTURES_HEADER: &[&str] = &[
    "Auto-generated from CreatureDisplayInfo.dbc Texture1/Texture2/Texture3. Run `cmv-gen generate` to refresh.",
];

#[derive(Debug, Clone)]
pub struct CreatureIndex {
    /// Model data id -> normalized path.
    pub model_paths: HashMap<u32, String>,
    /// Display id -> normalized path of its model.
    pub display_paths: BTreeMap<u32, String>,
    /// Display id -> non-empty texture slots.
    pub display_textures: BTreeMap<u32, Vec<String>>,
    /// Normalized model path -> textures of the first display using it.
    pub path_textures: HashMap<String, Vec<String>>,
    display_id_map: LuaTable,
    model_path_map: LuaTable,
    variants_map: LuaTable,
    textures_map: LuaTable,
}

impl CreatureIndex {
    pub fn build(store: &RecordStore) -> Self {
        let mut model_paths = HashMap::new();
        for model in &store.models {
            if !model.path.is_empty() {
                model_paths.insert(model.id, normalize_path(&model.path));
            }
        }

        let mut display_paths = BTreeMap::new();
        let mut display_textures = BTreeMap::new();
        let mut path_textures: HashMap<String, Vec<String>> = HashMap::new();
        for display in &store.displays {
            let path = model_paths.get(&display.model_id).filter(|p| !p.is_empty());
            if let Some(path) = path {
                display_paths.insert(display.id, path.clone());
            }
            let textures = display.texture_list();
            if textures.is_empty() {
                continue;
            }
            if let Some(path) = path {
                path_textures
                    .entry(path.clone())
                    .or_insert_with(|| textures.clone());
            }
            display_textures.insert(display.id, textures);
        }

        let mut display_id_map = LuaTable::new(DISPLAY_ID_MAP, DISPLAY_ID_HEADER);
        let mut model_path_map = LuaTable::new(MODEL_PATH_MAP, MODEL_PATH_HEADER);
        let mut variants_map = LuaTable::new(VARIANTS_MAP, VARIANTS_HEADER);
        let mut textures_map = LuaTable::new(TEXTURES_MAP, TEXTURES_HEADER);

        let mut seen_paths = HashSet::new();
        let mut seen_textures = HashSet::new();

        for tpl in &store.templates {
            let ids = tpl.valid_display_ids();
            let Some(&first) = ids.first() else {
                continue;
            };

            display_id_map.insert(tpl.entry, LuaValue::Int(first));

            for &id in &ids {
                if seen_paths.insert(id) {
                    if let Some(path) = display_paths.get(&id) {
                        model_path_map.insert(id, LuaValue::Str(path.clone()));
                    }
                }
            }

            if ids.len() > 1 {
                variants_map.insert(tpl.entry, LuaValue::IntList(ids.clone()));
            }

            for &id in &ids {
                if let Some(textures) = display_textures.get(&id) {
                    if seen_textures.insert(id) {
                        textures_map.insert(id, LuaValue::StrList(textures.clone()));
                    }
                }
            }
        }

        // Displays no template points at, in ascending id order.
        for (&id, path) in &display_paths {
            if seen_paths.insert(id) {
                model_path_map.insert(id, LuaValue::Str(path.clone()));
            }
        }
        for (&id, textures) in &display_textures {
            if seen_textures.insert(id) {
                textures_map.insert(id, LuaValue::StrList(textures.clone()));
            }
        }

        tracing::debug!(
            "Index: {} display ids, {} paths, {} variants, {} textures",
            display_id_map.len(),
            model_path_map.len(),
            variants_map.len(),
            textures_map.len()
        );

        Self {
            model_paths,
            display_paths,
            display_textures,
            path_textures,
            display_id_map,
            model_path_map,
            variants_map,
            textures_map,
        }
    }

    /// Textures known for a model path, in any of its spellings.
    pub fn textures_for_model_path(&self, path: &str) -> Option<&[String]> {
        self.path_textures
            .get(&normalize_path(path))
            .map(Vec::as_slice)
    }

    pub fn display_id_map(&self) -> &LuaTable {
        &self.display_id_map
    }

    pub fn model_path_map(&self) -> &LuaTable {
        &self.model_path_map
    }

    pub fn variants_map(&self) -> &LuaTable {
        &self.variants_map
    }

    pub fn textures_map(&self) -> &LuaTable {
        &self.textures_map
    }
}
