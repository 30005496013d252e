//! Loads written map files into Lua 5.1 the way the addon sees them.

use crate::error::{Error, Result};
use crate::index::{DISPLAY_ID_MAP, MODEL_PATH_MAP, TEXTURES_MAP, VARIANTS_MAP};
use crate::lua_table::LuaTable;
use mlua::{Lua, Table, Value};
use std::path::Path;

pub const MAP_NAMES: [&str; 4] = [DISPLAY_ID_MAP, MODEL_PATH_MAP, VARIANTS_MAP, TEXTURES_MAP];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCheck {
    pub name: String,
    /// Keys seen by Lua.
    pub lua_entries: usize,
    /// Entry lines in the file.
    pub line_entries: usize,
}

impl TableCheck {
    pub fn is_consistent(&self) -> bool {
        self.lua_entries == self.line_entries
    }
}

#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub tables: Vec<TableCheck>,
    /// Map files not present in the directory.
    pub missing: Vec<String>,
}

impl CheckReport {
    pub fn is_ok(&self) -> bool {
        self.missing.is_empty() && self.tables.iter().all(TableCheck::is_consistent)
    }
}

/// Evaluate one map file and compare what Lua sees with its entry lines.
pub fn check_table_source(lua: &Lua, name: &str, source: &str) -> Result<TableCheck> {
    lua.load(source).set_name(format!("@{}.lua", name)).exec()?;

    let table = match lua.globals().get::<Value>(name)? {
        Value::Table(t) => t,
        _ => return Err(Error::Other(format!("{} did not define table {}", name, name))),
    };
    let lua_entries = count_pairs(&table)?;
    let line_entries = LuaTable::parse(source).map(|t| t.len()).unwrap_or(0);

    Ok(TableCheck {
        name: name.to_string(),
        lua_entries,
        line_entries,
    })
}

fn count_pairs(table: &Table) -> Result<usize> {
    let mut count = 0;
    for pair in table.clone().pairs::<Value, Value>() {
        pair?;
        count += 1;
    }
    Ok(count)
}

/// Check every map file in `dir`.
pub fn check_output(dir: &Path) -> Result<CheckReport> {
    let lua = Lua::new();
    let mut report = CheckReport::default();

    for name in MAP_NAMES {
        let path = dir.join(format!("{}.lua", name));
        if !path.exists() {
            tracing::warn!("{} not found", path.display());
            report.missing.push(name.to_string());
            continue;
        }
        let source = std::fs::read_to_string(&path)?;
        let check = check_table_source(&lua, name, &source)?;
        if !check.is_consistent() {
            tracing::warn!(
                "{}: Lua sees {} entries but file has {} entry lines",
                name,
                check.lua_entries,
                check.line_entries
            );
        }
        report.tables.push(check);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lua_table::LuaValue;

    #[test]
    fn test_rendered_table_evaluates() {
        let mut table = LuaTable::new(TEXTURES_MAP, &["textures"]);
        table.insert(100, LuaValue::StrList(vec!["a\"b".into(), "c\\d".into()]));
        table.insert(101, LuaValue::StrList(vec!["e".into()]));

        let lua = Lua::new();
        let check = check_table_source(&lua, TEXTURES_MAP, &table.render()).unwrap();
        assert_eq!(check.lua_entries, 2);
        assert!(check.is_consistent());

        let tex: String = lua
            .load("return CreatureDisplayTexturesMap[100][1]")
            .eval()
            .unwrap();
        assert_eq!(tex, "a\"b");
        let tex: String = lua
            .load("return CreatureDisplayTexturesMap[100][2]")
            .eval()
            .unwrap();
        assert_eq!(tex, "c\\d");
    }

    #[test]
    fn test_wrong_global_is_error() {
        let lua = Lua::new();
        let err = check_table_source(&lua, VARIANTS_MAP, "SomethingElse = {}").unwrap_err();
        assert!(matches!(err, Error::Other(_)));
    }

    #[test]
    fn test_missing_files_reported() {
        let dir = tempfile::tempdir().unwrap();
        let report = check_output(dir.path()).unwrap();
        assert_eq!(report.missing.len(), 4);
        assert!(!report.is_ok());
    }
}
