//! Integer-keyed Lua table files.
//!
//! Every generated file has the same shape:
//!
//! ```text
//! -- header comment
//! CreatureModelPathMap = {
//!   [100] = "creature/rat/rat.mdx",
//! }
//! ```
//!
//! `LuaTable` keeps the entries and their key set as data; text only exists
//! at the edges (`lines`/`render` for output, `parse` for reading a file back).

use std::collections::HashSet;
use std::fmt::Write;

/// Value side of a table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LuaValue {
    Int(u32),
    Str(String),
    IntList(Vec<u32>),
    StrList(Vec<String>),
}

impl LuaValue {
    /// Empty lists are not worth a line.
    pub fn is_empty_list(&self) -> bool {
        match self {
            LuaValue::IntList(v) => v.is_empty(),
            LuaValue::StrList(v) => v.is_empty(),
            _ => false,
        }
    }

    fn write_to(&self, out: &mut String) {
        match self {
            LuaValue::Int(i) => {
                let _ = write!(out, "{}", i);
            }
            LuaValue::Str(s) => write_quoted(out, s),
            LuaValue::IntList(ids) => {
                out.push('{');
                for (i, id) in ids.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    let _ = write!(out, "{}", id);
                }
                out.push('}');
            }
            LuaValue::StrList(items) => {
                out.push('{');
                for (i, s) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write_quoted(out, s);
                }
                out.push('}');
            }
        }
    }
}

/// Escape a string for the inside of a double-quoted Lua literal.
pub fn escape_lua(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c => out.push(c),
        }
    }
    out
}

fn write_quoted(out: &mut String, s: &str) {
    out.push('"');
    out.push_str(&escape_lua(s));
    out.push('"');
}

/// Render one entry line: `  [<key>] = <value>,`
pub fn format_entry(key: u32, value: &LuaValue) -> String {
    let mut line = format!("  [{}] = ", key);
    value.write_to(&mut line);
    line.push(',');
    line
}

/// A named Lua table keyed by integers, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LuaTable {
    name: String,
    header: Vec<String>,
    entries: Vec<(u32, LuaValue)>,
    keys: HashSet<u32>,
}

impl LuaTable {
    pub fn new(name: &str, header: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            header: header.iter().map(|h| h.to_string()).collect(),
            entries: Vec::new(),
            keys: HashSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// File the table is written to.
    pub fn file_name(&self) -> String {
        format!("{}.lua", self.name)
    }

    /// Append an entry. An existing key is kept and the new value dropped.
    pub fn insert(&mut self, key: u32, value: LuaValue) -> bool {
        if !self.keys.insert(key) {
            return false;
        }
        self.entries.push((key, value));
        true
    }

    pub fn contains_key(&self, key: u32) -> bool {
        self.keys.contains(&key)
    }

    pub fn get(&self, key: u32) -> Option<&LuaValue> {
        if !self.keys.contains(&key) {
            return None;
        }
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn entries(&self) -> &[(u32, LuaValue)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.entries.len() + self.header.len() + 2);
        lines.extend(self.header.iter().map(|h| format!("-- {}", h)));
        lines.push(format!("{} = {{", self.name));
        lines.extend(self.entries.iter().map(|(k, v)| format_entry(*k, v)));
        lines.push("}".to_string());
        lines
    }

    /// File contents. No trailing newline.
    pub fn render(&self) -> String {
        self.lines().join("\n")
    }

    /// Rebuild a table from file text by reading entry lines.
    ///
    /// Only keys and raw value text are recovered; values are kept as
    /// `LuaValue::Str` of the text between `=` and the trailing comma.
    pub fn parse(text: &str) -> Option<Self> {
        let mut header = Vec::new();
        let mut name = None;
        let mut table_entries = Vec::new();

        for line in text.lines() {
            if name.is_none() {
                if let Some(comment) = line.strip_prefix("-- ") {
                    header.push(comment.to_string());
                } else if let Some(n) = line.strip_suffix(" = {") {
                    name = Some(n.trim().to_string());
                }
                continue;
            }
            if let Some((key, raw)) = parse_entry_line(line) {
                table_entries.push((key, raw));
            }
        }

        let name = name?;
        let mut table = Self {
            name,
            header,
            entries: Vec::new(),
            keys: HashSet::new(),
        };
        for (key, raw) in table_entries {
            table.insert(key, LuaValue::Str(raw));
        }
        Some(table)
    }
}

/// Split `  [<digits>] = <value>,` into key and raw value text.
fn parse_entry_line(line: &str) -> Option<(u32, String)> {
    let rest = line.trim_start().strip_prefix('[')?;
    let (digits, rest) = rest.split_once(']')?;
    let key = digits.parse().ok()?;
    let value = rest.trim_start().strip_prefix('=')?.trim();
    let value = value.strip_suffix(',').unwrap_or(value);
    Some((key, value.to_string()))
}
