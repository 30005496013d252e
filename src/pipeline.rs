//! The generation run: load, clean up, index, register assets, write.

use crate::assets::{AssetScanner, NewCreature};
use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::index::CreatureIndex;
use crate::records::RecordStore;
use crate::writer::MapWriter;
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub removed_templates: Vec<u32>,
    pub created: Vec<NewCreature>,
    pub written: Vec<PathBuf>,
    pub display_ids: usize,
    pub model_paths: usize,
    pub variants: usize,
    pub textures: usize,
}

pub fn run(config: &GeneratorConfig) -> Result<RunSummary> {
    let mut store = RecordStore::load(&config.data_dir)?;
    run_with_store(config, &mut store)
}

/// Same as [`run`] for a store that is already in memory.
pub fn run_with_store(config: &GeneratorConfig, store: &mut RecordStore) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    if config.cleanup_invalid {
        summary.removed_templates = store.remove_invalid_templates();
    }

    let index = CreatureIndex::build(store);

    let overlay = if config.scan_assets {
        let mut scanner = AssetScanner::new(config.assets_root());
        if config.enable_spawns {
            scanner = scanner.with_spawns(config.spawn_grid.clone());
        }
        let scan = scanner.register_all(store, &index)?;
        summary.created = scan.created;
        Some(scan.overlay)
    } else {
        None
    };

    if let Some(dir) = &config.export_records {
        store.write_csv(dir)?;
    }

    let writer = MapWriter::new(config.output_dir());
    let written = writer.write_all(&index, overlay.as_ref())?;
    let counts: Vec<usize> = written.iter().map(|w| w.entries).collect();
    if let &[display_ids, model_paths, variants, textures] = counts.as_slice() {
        summary.display_ids = display_ids;
        summary.model_paths = model_paths;
        summary.variants = variants;
        summary.textures = textures;
    }
    summary.written = written.into_iter().map(|w| w.path).collect();
    Ok(summary)
}
