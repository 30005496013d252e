//! Additive merges into generated tables.
//!
//! Records registered after the index was built arrive as an overlay. Keys
//! already in a table always keep their generated value.

use crate::lua_table::{LuaTable, LuaValue};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Extra entries for the display id, model path and texture tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overlay {
    pub entry_to_display: BTreeMap<u32, u32>,
    pub display_to_path: BTreeMap<u32, String>,
    pub display_to_textures: BTreeMap<u32, Vec<String>>,
}

impl Overlay {
    pub fn is_empty(&self) -> bool {
        self.entry_to_display.is_empty()
            && self.display_to_path.is_empty()
            && self.display_to_textures.is_empty()
    }
}

/// Merge `extra` into a copy of `table`.
///
/// Keys already present are skipped, as are empty list values. With nothing
/// to merge the input is handed back borrowed.
pub fn merge<I>(table: &LuaTable, extra: I) -> Cow<'_, LuaTable>
where
    I: IntoIterator<Item = (u32, LuaValue)>,
{
    let mut extra = extra.into_iter().peekable();
    if extra.peek().is_none() {
        return Cow::Borrowed(table);
    }

    let mut merged = table.clone();
    let mut added = 0usize;
    for (key, value) in extra {
        if value.is_empty_list() {
            continue;
        }
        if merged.insert(key, value) {
            added += 1;
        }
    }
    tracing::debug!("{}: merged {} overlay entries", table.name(), added);
    Cow::Owned(merged)
}

pub fn merge_display_ids<'a>(table: &'a LuaTable, extra: &BTreeMap<u32, u32>) -> Cow<'a, LuaTable> {
    merge(table, extra.iter().map(|(&k, &v)| (k, LuaValue::Int(v))))
}

pub fn merge_paths<'a>(table: &'a LuaTable, extra: &BTreeMap<u32, String>) -> Cow<'a, LuaTable> {
    merge(table, extra.iter().map(|(&k, v)| (k, LuaValue::Str(v.clone()))))
}

pub fn merge_textures<'a>(
    table: &'a LuaTable,
    extra: &BTreeMap<u32, Vec<String>>,
) -> Cow<'a, LuaTable> {
    merge(table, extra.iter().map(|(&k, v)| (k, LuaValue::StrList(v.clone()))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_map() -> LuaTable {
        let mut table = LuaTable::new("CreatureModelPathMap", &["paths"]);
        table.insert(100, LuaValue::Str("creature/rat.m2".into()));
        table
    }

    #[test]
    fn test_empty_overlay_borrows() {
        let table = path_map();
        let merged = merge_paths(&table, &BTreeMap::new());
        assert!(matches!(merged, Cow::Borrowed(_)));
        assert!(std::ptr::eq(merged.as_ref(), &table));
    }

    #[test]
    fn test_appends_before_closing_line() {
        let table = path_map();
        let extra = BTreeMap::from([(200, "custom/model.mdx".to_string())]);
        let merged = merge_paths(&table, &extra);

        let lines = merged.lines();
        assert_eq!(lines[lines.len() - 2], "  [200] = \"custom/model.mdx\",");
        assert_eq!(lines[lines.len() - 1], "}");
        // Source table untouched.
        assert!(!table.contains_key(200));

        let again = merge_paths(&merged, &extra);
        assert_eq!(again.render(), merged.render());
    }

    #[test]
    fn test_never_overwrites() {
        let table = path_map();
        let extra = BTreeMap::from([(100, "other.mdx".to_string())]);
        let merged = merge_paths(&table, &extra);
        assert_eq!(merged.render(), table.render());
    }

    #[test]
    fn test_skips_empty_texture_lists() {
        let table = LuaTable::new("CreatureDisplayTexturesMap", &[]);
        let extra = BTreeMap::from([(1, vec![]), (2, vec!["skin".to_string()])]);
        let merged = merge_textures(&table, &extra);
        assert!(!merged.contains_key(1));
        assert_eq!(merged.get(2), Some(&LuaValue::StrList(vec!["skin".into()])));
    }

    #[test]
    fn test_display_ids_in_key_order() {
        let table = LuaTable::new("CreatureDisplayIdMap", &[]);
        let extra = BTreeMap::from([(9, 90), (3, 30)]);
        let merged = merge_display_ids(&table, &extra);
        let keys: Vec<u32> = merged.entries().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![3, 9]);
    }

    #[test]
    fn test_overlay_is_empty() {
        let mut overlay = Overlay::default();
        assert!(overlay.is_empty());
        overlay.entry_to_display.insert(1, 2);
        assert!(!overlay.is_empty());
    }
}
