//! Writes the four addon map files.

use crate::error::Result;
use crate::index::CreatureIndex;
use crate::lua_table::LuaTable;
use crate::overlay::{Overlay, merge_display_ids, merge_paths, merge_textures};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A map file on disk and the number of entries it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Written {
    pub path: PathBuf,
    pub entries: usize,
}

pub struct MapWriter {
    out_dir: PathBuf,
}

impl MapWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Write one table to `<out_dir>/<Name>.lua`, creating the directory if needed.
    pub fn write_table(&self, table: &LuaTable) -> Result<Written> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(table.file_name());
        fs::write(&path, table.render())?;
        tracing::info!("Written: {} ({} entries)", table.file_name(), table.len());
        Ok(Written {
            path,
            entries: table.len(),
        })
    }

    pub fn write_display_id_map(
        &self,
        index: &CreatureIndex,
        extra: Option<&BTreeMap<u32, u32>>,
    ) -> Result<Written> {
        let table = index.display_id_map();
        match extra {
            Some(extra) => self.write_table(&merge_display_ids(table, extra)),
            None => self.write_table(table),
        }
    }

    pub fn write_model_path_map(
        &self,
        index: &CreatureIndex,
        extra: Option<&BTreeMap<u32, String>>,
    ) -> Result<Written> {
        let table = index.model_path_map();
        match extra {
            Some(extra) => self.write_table(&merge_paths(table, extra)),
            None => self.write_table(table),
        }
    }

    pub fn write_variants_map(&self, index: &CreatureIndex) -> Result<Written> {
        self.write_table(index.variants_map())
    }

    pub fn write_textures_map(
        &self,
        index: &CreatureIndex,
        extra: Option<&BTreeMap<u32, Vec<String>>>,
    ) -> Result<Written> {
        let table = index.textures_map();
        match extra {
            Some(extra) => self.write_table(&merge_textures(table, extra)),
            None => self.write_table(table),
        }
    }

    /// Write all four maps, merging `overlay` where it applies.
    ///
    /// Results come back in the order display ids, model paths, variants, textures.
    pub fn write_all(&self, index: &CreatureIndex, overlay: Option<&Overlay>) -> Result<Vec<Written>> {
        Ok(vec![
            self.write_display_id_map(index, overlay.map(|o| &o.entry_to_display))?,
            self.write_model_path_map(index, overlay.map(|o| &o.display_to_path))?,
            self.write_variants_map(index)?,
            self.write_textures_map(index, overlay.map(|o| &o.display_to_textures))?,
        ])
    }
}
