//! Creature registration from `.m2` files under a module's assets folder.
//!
//! Each model file becomes a CreatureModelData row, a CreatureDisplayInfo row
//! pointing at it, and a creature_template using that display. The new ids
//! are reported as an [`Overlay`] so they can be merged into maps built
//! before registration.

use crate::config::SpawnGrid;
use crate::error::Result;
use crate::index::CreatureIndex;
use crate::model_path::{client_model_path, is_m2, normalize_path, safe_name};
use crate::overlay::Overlay;
use crate::records::{RecordStore, SpawnRecord};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One creature created from an asset.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCreature {
    pub name: String,
    pub safe_name: String,
    pub client_path: String,
    pub model_id: u32,
    pub display_id: u32,
    pub entry: u32,
}

#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub created: Vec<NewCreature>,
    pub skipped: Vec<PathBuf>,
    pub overlay: Overlay,
}

/// Lays spawns out in rows of `per_row`, stepping `dx` along a row and `dy`
/// between rows.
#[derive(Debug, Clone)]
struct SpawnCursor {
    grid: SpawnGrid,
    x: f32,
    y: f32,
    placed: u32,
}

impl SpawnCursor {
    fn new(grid: SpawnGrid) -> Self {
        Self {
            x: grid.x0,
            y: grid.y0,
            grid,
            placed: 0,
        }
    }

    fn next(&mut self, entry: u32) -> SpawnRecord {
        if self.placed > 0 && self.grid.per_row > 0 && self.placed % self.grid.per_row == 0 {
            self.y += self.grid.dy;
            self.x = self.grid.x0;
        }
        let spawn = SpawnRecord {
            entry,
            map: self.grid.map,
            x: self.x,
            y: self.y,
            z: self.grid.z,
            o: self.grid.o,
        };
        self.x += self.grid.dx;
        self.placed += 1;
        spawn
    }
}

pub struct AssetScanner {
    assets_root: PathBuf,
    spawns: Option<SpawnGrid>,
}

impl AssetScanner {
    pub fn new(assets_root: impl Into<PathBuf>) -> Self {
        Self {
            assets_root: assets_root.into(),
            spawns: None,
        }
    }

    /// Also place a spawn for every created creature.
    pub fn with_spawns(mut self, grid: SpawnGrid) -> Self {
        self.spawns = Some(grid);
        self
    }

    /// All `.m2` files under the root, sorted by path.
    pub fn model_files(&self) -> Vec<PathBuf> {
        WalkDir::new(&self.assets_root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| is_m2(&e.path().to_string_lossy()))
            .map(|e| e.into_path())
            .collect()
    }

    /// Register a creature for every model file.
    ///
    /// `index` must have been built from `store` before this call; it is only
    /// used to borrow textures from existing displays of the same model.
    /// Fails only when a record table has no free id left.
    pub fn register_all(&self, store: &mut RecordStore, index: &CreatureIndex) -> Result<ScanResult> {
        let mut result = ScanResult::default();
        if !self.assets_root.exists() {
            tracing::info!(
                "Assets root {} does not exist, skipping creature creation. Maps will still be built from existing records.",
                self.assets_root.display()
            );
            return Ok(result);
        }

        tracing::info!("Scanning recursively for .m2 files under {} ...", self.assets_root.display());

        let mut seen_displays = HashSet::new();
        let mut seen_templates = HashSet::new();
        let mut cursor = self.spawns.clone().map(SpawnCursor::new);

        for path in self.model_files() {
            let Some(rel) = relative_str(&self.assets_root, &path) else {
                continue;
            };
            let file_base = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let safe = safe_name(&rel);
            let display_name = format!("{}_CreatureDisplayInfo", safe);
            let template_name = format!("{}_CreatureTemplate", safe);

            if seen_displays.contains(&display_name) || seen_templates.contains(&template_name) {
                tracing::info!("Skipping duplicate: {}", file_base);
                result.skipped.push(path);
                continue;
            }

            let client_path = client_model_path(&rel);
            let addon_path = normalize_path(&client_path);
            let textures: Vec<String> = index
                .textures_for_model_path(&addon_path)
                .map(<[String]>::to_vec)
                .unwrap_or_default();

            let model_id = store.add_model(&client_path)?;
            let display_id = store.add_display(model_id, &textures)?;
            seen_displays.insert(display_name);

            if !textures.is_empty() {
                result.overlay.display_to_textures.insert(display_id, textures);
            }
            result.overlay.display_to_path.insert(display_id, addon_path);

            let entry = store.add_template(&file_base, display_id)?;
            seen_templates.insert(template_name);
            result.overlay.entry_to_display.insert(entry, display_id);

            if let Some(cursor) = cursor.as_mut() {
                store.spawns.push(cursor.next(entry));
            }

            tracing::debug!("Created creature {} (entry {}, display {})", file_base, entry, display_id);
            result.created.push(NewCreature {
                name: file_base,
                safe_name: safe,
                client_path,
                model_id,
                display_id,
                entry,
            });
        }

        tracing::info!(
            "Finished: created {} creature entries from .m2 files under assets.",
            result.created.len()
        );
        Ok(result)
    }
}

/// `path` relative to `root`, with `/` separators.
fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}
