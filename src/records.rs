//! Creature record store.
//!
//! Four collections are read from CSV exports in the data directory:
//!   - CreatureModelData.csv (ID, ModelName)
//!   - CreatureDisplayInfo.csv (ID, ModelID, TextureVariation_0..2)
//!   - creature_template.csv (entry, name, modelid1..4)
//!   - creature.csv (id, map, position_x..z, orientation)
//!
//! Rows keep file order; template order drives the order of generated maps.

use crate::csv_util::{CsvTable, csv_line, field, field_u32};
use crate::error::{Error, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub const MODEL_DATA_FILE: &str = "CreatureModelData.csv";
pub const DISPLAY_INFO_FILE: &str = "CreatureDisplayInfo.csv";
pub const TEMPLATE_FILE: &str = "creature_template.csv";
pub const SPAWN_FILE: &str = "creature.csv";

const TEXTURE_COLUMNS: [[&str; 3]; 3] = [
    ["TextureVariation_0", "TextureVariation[0]", "Texture1"],
    ["TextureVariation_1", "TextureVariation[1]", "Texture2"],
    ["TextureVariation_2", "TextureVariation[2]", "Texture3"],
];
const MODEL_ID_COLUMNS: [&str; 4] = ["modelid1", "modelid2", "modelid3", "modelid4"];
const SPAWN_COLUMNS: [&str; 6] = [
    "id",
    "map",
    "position_x",
    "position_y",
    "position_z",
    "orientation",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRecord {
    pub id: u32,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRecord {
    pub id: u32,
    pub model_id: u32,
    pub textures: [String; 3],
}

impl DisplayRecord {
    /// Non-empty texture slots in slot order.
    pub fn texture_list(&self) -> Vec<String> {
        self.textures
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRecord {
    pub entry: u32,
    pub name: String,
    /// Zero means "no model".
    pub display_ids: [u32; 4],
}

impl TemplateRecord {
    pub fn valid_display_ids(&self) -> Vec<u32> {
        self.display_ids.iter().copied().filter(|&id| id > 0).collect()
    }
}

/// A placed creature. Loaded from creature.csv and appended to by the asset spawn grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRecord {
    pub entry: u32,
    pub map: u32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub o: f32,
}

#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    pub models: Vec<ModelRecord>,
    pub displays: Vec<DisplayRecord>,
    pub templates: Vec<TemplateRecord>,
    pub spawns: Vec<SpawnRecord>,
    /// Entries deleted by cleanup. Never handed out again.
    pub retired_entries: Vec<u32>,
}

/// One past the largest id, or an error once the id space is used up.
fn next_id(ids: impl Iterator<Item = u32>, what: &str) -> Result<u32> {
    ids.max()
        .unwrap_or(0)
        .checked_add(1)
        .ok_or_else(|| Error::Other(format!("no free {} id left", what)))
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load all collections from `data_dir`. Missing files load as empty.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let store = Self {
            models: load_models(&data_dir.join(MODEL_DATA_FILE))?,
            displays: load_displays(&data_dir.join(DISPLAY_INFO_FILE))?,
            templates: load_templates(&data_dir.join(TEMPLATE_FILE))?,
            spawns: load_spawns(&data_dir.join(SPAWN_FILE))?,
            retired_entries: Vec::new(),
        };
        tracing::info!(
            "Loaded {} models, {} displays, {} templates, {} spawns from {}",
            store.models.len(),
            store.displays.len(),
            store.templates.len(),
            store.spawns.len(),
            data_dir.display()
        );
        Ok(store)
    }

    pub fn next_model_id(&self) -> Result<u32> {
        next_id(self.models.iter().map(|m| m.id), "model")
    }

    pub fn next_display_id(&self) -> Result<u32> {
        next_id(self.displays.iter().map(|d| d.id), "display")
    }

    /// Skips entries that were retired or still have spawns.
    pub fn next_entry(&self) -> Result<u32> {
        let ids = self
            .templates
            .iter()
            .map(|t| t.entry)
            .chain(self.spawns.iter().map(|s| s.entry))
            .chain(self.retired_entries.iter().copied());
        next_id(ids, "creature entry")
    }

    pub fn add_model(&mut self, path: &str) -> Result<u32> {
        let id = self.next_model_id()?;
        self.models.push(ModelRecord {
            id,
            path: path.to_string(),
        });
        Ok(id)
    }

    pub fn add_display(&mut self, model_id: u32, textures: &[String]) -> Result<u32> {
        let id = self.next_display_id()?;
        let mut slots: [String; 3] = Default::default();
        for (slot, tex) in slots.iter_mut().zip(textures) {
            *slot = tex.clone();
        }
        self.displays.push(DisplayRecord {
            id,
            model_id,
            textures: slots,
        });
        Ok(id)
    }

    pub fn add_template(&mut self, name: &str, display_id: u32) -> Result<u32> {
        let entry = self.next_entry()?;
        self.templates.push(TemplateRecord {
            entry,
            name: name.to_string(),
            display_ids: [display_id, 0, 0, 0],
        });
        Ok(entry)
    }

    /// Drop templates with no model, or with a model that has no display record.
    ///
    /// Spawns of removed templates go with them. Returns the removed entries.
    pub fn remove_invalid_templates(&mut self) -> Vec<u32> {
        let valid: HashSet<u32> = self.displays.iter().map(|d| d.id).collect();
        let mut removed = Vec::new();

        self.templates.retain(|tpl| {
            let ids = tpl.valid_display_ids();
            let ok = !ids.is_empty() && ids.iter().all(|id| valid.contains(id));
            if !ok {
                tracing::warn!("Deleted invalid creature template (entry: {})", tpl.entry);
                removed.push(tpl.entry);
            }
            ok
        });

        if !removed.is_empty() {
            let gone: HashSet<u32> = removed.iter().copied().collect();
            let before = self.spawns.len();
            self.spawns.retain(|s| !gone.contains(&s.entry));
            self.retired_entries.extend(&removed);
            tracing::warn!(
                "Cleaned up {} invalid creature(s) with broken model refs ({} spawns).",
                removed.len(),
                before - self.spawns.len()
            );
        }
        removed
    }

    /// Write the store back out as CSV, using the same column names it reads.
    pub fn write_csv(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;

        let mut lines = vec![csv_line(&["ID", "ModelName"])];
        for m in &self.models {
            lines.push(csv_line(&[m.id.to_string(), m.path.clone()]));
        }
        write_lines(&dir.join(MODEL_DATA_FILE), &lines)?;

        let mut lines = vec![csv_line(&[
            "ID",
            "ModelID",
            TEXTURE_COLUMNS[0][0],
            TEXTURE_COLUMNS[1][0],
            TEXTURE_COLUMNS[2][0],
        ])];
        for d in &self.displays {
            let [t0, t1, t2] = &d.textures;
            lines.push(csv_line(&[
                d.id.to_string(),
                d.model_id.to_string(),
                t0.clone(),
                t1.clone(),
                t2.clone(),
            ]));
        }
        write_lines(&dir.join(DISPLAY_INFO_FILE), &lines)?;

        let mut header = vec!["entry", "name"];
        header.extend(MODEL_ID_COLUMNS);
        let mut lines = vec![csv_line(&header)];
        for t in &self.templates {
            let mut row = vec![t.entry.to_string(), t.name.clone()];
            row.extend(t.display_ids.iter().map(u32::to_string));
            lines.push(csv_line(&row));
        }
        write_lines(&dir.join(TEMPLATE_FILE), &lines)?;

        // Always written so spawns of removed templates do not linger.
        let mut lines = vec![csv_line(&SPAWN_COLUMNS)];
        for s in &self.spawns {
            lines.push(csv_line(&[
                s.entry.to_string(),
                s.map.to_string(),
                s.x.to_string(),
                s.y.to_string(),
                s.z.to_string(),
                s.o.to_string(),
            ]));
        }
        write_lines(&dir.join(SPAWN_FILE), &lines)?;

        tracing::info!("Exported records to {}", dir.display());
        Ok(())
    }
}

fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    let mut out = lines.join("\n");
    out.push('\n');
    fs::write(path, out)?;
    Ok(())
}

/// Keep the first row for each id; later duplicates are logged and dropped.
fn first_wins(seen: &mut HashSet<u32>, id: u32, path: &Path) -> bool {
    if seen.insert(id) {
        true
    } else {
        tracing::warn!("{}: duplicate id {}, keeping first row", path.display(), id);
        false
    }
}

fn load_models(path: &Path) -> Result<Vec<ModelRecord>> {
    let Some(table) = CsvTable::from_file(path)? else {
        return Ok(Vec::new());
    };
    let id_col = table.require_column(&["ID"])?;
    let path_col = table.require_column(&["ModelName", "ModelPath"])?;

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for row in &table.rows {
        let Some(id) = field_u32(row, id_col) else {
            continue;
        };
        if first_wins(&mut seen, id, path) {
            out.push(ModelRecord {
                id,
                path: field(row, path_col).to_string(),
            });
        }
    }
    Ok(out)
}

fn load_displays(path: &Path) -> Result<Vec<DisplayRecord>> {
    let Some(table) = CsvTable::from_file(path)? else {
        return Ok(Vec::new());
    };
    let id_col = table.require_column(&["ID"])?;
    let model_col = table.require_column(&["ModelID", "Model"])?;
    let tex_cols: Vec<Option<usize>> = TEXTURE_COLUMNS.iter().map(|n| table.column(n)).collect();

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for row in &table.rows {
        let Some(id) = field_u32(row, id_col) else {
            continue;
        };
        if !first_wins(&mut seen, id, path) {
            continue;
        }
        let mut textures: [String; 3] = Default::default();
        for (slot, col) in textures.iter_mut().zip(&tex_cols) {
            if let Some(col) = col {
                *slot = field(row, *col).to_string();
            }
        }
        out.push(DisplayRecord {
            id,
            model_id: field_u32(row, model_col).unwrap_or(0),
            textures,
        });
    }
    Ok(out)
}

fn load_templates(path: &Path) -> Result<Vec<TemplateRecord>> {
    let Some(table) = CsvTable::from_file(path)? else {
        return Ok(Vec::new());
    };
    let entry_col = table.require_column(&["entry", "ID"])?;
    let name_col = table.column(&["name"]);
    let model_cols: Vec<Option<usize>> = MODEL_ID_COLUMNS
        .iter()
        .map(|&n| table.column(&[n]))
        .collect();
    if model_cols.iter().all(Option::is_none) {
        return Err(Error::MissingColumn {
            file: path.to_path_buf(),
            column: MODEL_ID_COLUMNS[0].to_string(),
        });
    }

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for row in &table.rows {
        let Some(entry) = field_u32(row, entry_col) else {
            continue;
        };
        if !first_wins(&mut seen, entry, path) {
            continue;
        }
        let mut display_ids = [0u32; 4];
        for (slot, col) in display_ids.iter_mut().zip(&model_cols) {
            if let Some(col) = col {
                *slot = field_u32(row, *col).unwrap_or(0);
            }
        }
        out.push(TemplateRecord {
            entry,
            name: name_col.map(|c| field(row, c).to_string()).unwrap_or_default(),
            display_ids,
        });
    }
    Ok(out)
}

fn load_spawns(path: &Path) -> Result<Vec<SpawnRecord>> {
    let Some(table) = CsvTable::from_file(path)? else {
        return Ok(Vec::new());
    };
    let cols = SPAWN_COLUMNS
        .iter()
        .map(|&n| table.require_column(&[n]))
        .collect::<Result<Vec<_>>>()?;
    let float = |row: &[String], idx: usize| field(row, idx).trim().parse::<f32>().ok();

    let mut out = Vec::new();
    for row in &table.rows {
        let (Some(entry), Some(map)) = (field_u32(row, cols[0]), field_u32(row, cols[1])) else {
            continue;
        };
        let (Some(x), Some(y), Some(z)) = (float(row, cols[2]), float(row, cols[3]), float(row, cols[4]))
        else {
            continue;
        };
        out.push(SpawnRecord {
            entry,
            map,
            x,
            y,
            z,
            o: float(row, cols[5]).unwrap_or(0.0),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_fixture(dir: &Path) {
        fs::write(
            dir.join(MODEL_DATA_FILE),
            "ID,ModelName,SizeClass\n10,\"Creature\\Rat\\Rat.mdx\",1\n11,,1\n10,Dup.mdx,1\n",
        )
        .unwrap();
        fs::write(
            dir.join(DISPLAY_INFO_FILE),
            "ID,ModelID,TextureVariation_0,TextureVariation_1,TextureVariation_2\n\
             100,10,skin1,,\n101,10, ,skin2 ,skin3\n",
        )
        .unwrap();
        fs::write(
            dir.join(TEMPLATE_FILE),
            "entry,name,modelid1,modelid2,modelid3,modelid4\n\
             5000,Rat,100,0,0,0\n5001,\"Rat, Big\",100,101,0,0\n5002,Ghost,0,0,0,0\n5003,Broken,999,0,0,0\n",
        )
        .unwrap();
    }

    #[test]
    fn test_load_fixture() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path());
        let store = RecordStore::load(dir.path()).unwrap();

        assert_eq!(store.models.len(), 2);
        assert_eq!(store.models[0].path, "Creature\\Rat\\Rat.mdx");
        assert_eq!(store.displays.len(), 2);
        assert_eq!(store.displays[1].texture_list(), vec!["skin2", "skin3"]);
        assert_eq!(store.templates.len(), 4);
        assert_eq!(store.templates[1].name, "Rat, Big");
        assert_eq!(store.templates[1].valid_display_ids(), vec![100, 101]);
    }

    #[test]
    fn test_missing_files_load_empty() {
        let dir = tempdir().unwrap();
        let store = RecordStore::load(dir.path()).unwrap();
        assert!(store.models.is_empty());
        assert!(store.displays.is_empty());
        assert!(store.templates.is_empty());
    }

    #[test]
    fn test_missing_required_column() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(MODEL_DATA_FILE), "ID,Scale\n1,2\n").unwrap();
        let err = RecordStore::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("ModelName"), "got: {}", err);
    }

    #[test]
    fn test_remove_invalid_templates() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path());
        let mut store = RecordStore::load(dir.path()).unwrap();
        store.spawns.push(SpawnRecord {
            entry: 5003,
            map: 13,
            x: 0.0,
            y: 0.0,
            z: 0.0,
            o: 0.0,
        });

        let removed = store.remove_invalid_templates();
        assert_eq!(removed, vec![5002, 5003]);
        let entries: Vec<u32> = store.templates.iter().map(|t| t.entry).collect();
        assert_eq!(entries, vec![5000, 5001]);
        assert!(store.spawns.is_empty());
    }

    #[test]
    fn test_id_allocation() {
        let mut store = RecordStore::new();
        assert_eq!(store.next_model_id().unwrap(), 1);
        let model = store.add_model("a\\b.mdx").unwrap();
        let display = store.add_display(model, &["t1".to_string()]).unwrap();
        let entry = store.add_template("b", display).unwrap();
        assert_eq!((model, display, entry), (1, 1, 1));
        assert_eq!(store.displays[0].textures[0], "t1");
        assert_eq!(store.templates[0].display_ids, [1, 0, 0, 0]);
        assert_eq!(store.next_entry().unwrap(), 2);
    }

    #[test]
    fn test_id_space_exhausted_is_error() {
        let mut store = RecordStore::new();
        store.models.push(ModelRecord {
            id: u32::MAX,
            path: "x.mdx".into(),
        });
        assert!(matches!(store.add_model("y.mdx"), Err(Error::Other(_))));
        assert_eq!(store.models.len(), 1);

        store.retired_entries.push(u32::MAX);
        assert!(store.add_template("z", 1).is_err());
        assert!(store.templates.is_empty());
    }

    #[test]
    fn test_cleanup_drops_only_invalid_spawns_and_retires_entry() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path());
        fs::write(
            dir.path().join(SPAWN_FILE),
            "id,map,position_x,position_y,position_z,orientation\n\
             5000,0,1.5,2.5,3.5,0.25\n\
             5003,1,-4,5,6,1\n\
             bad,1,0,0,0,0\n",
        )
        .unwrap();
        let mut store = RecordStore::load(dir.path()).unwrap();
        assert_eq!(store.spawns.len(), 2);

        store.remove_invalid_templates();
        assert_eq!(store.spawns.len(), 1);
        assert_eq!(store.spawns[0].entry, 5000);
        assert_eq!(store.spawns[0].x, 1.5);
        // 5003 was the highest entry before cleanup and stays taken.
        assert_eq!(store.next_entry().unwrap(), 5004);

        let out = tempdir().unwrap();
        store.write_csv(out.path()).unwrap();
        let reloaded = RecordStore::load(out.path()).unwrap();
        assert_eq!(reloaded.spawns, store.spawns);
    }

    #[test]
    fn test_write_csv_reloads() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path());
        let store = RecordStore::load(dir.path()).unwrap();

        let out = tempdir().unwrap();
        store.write_csv(out.path()).unwrap();
        let reloaded = RecordStore::load(out.path()).unwrap();

        assert_eq!(reloaded.models, store.models);
        assert_eq!(reloaded.displays, store.displays);
        assert_eq!(reloaded.templates, store.templates);
        let spawns = fs::read_to_string(out.path().join(SPAWN_FILE)).unwrap();
        assert_eq!(spawns, "id,map,position_x,position_y,position_z,orientation\n");
    }
}
