//! Model path normalization and derived names.
//!
//! DBC paths use the client's backslash form (`Creature\Rat\Rat.mdx`). The
//! addon keys everything by the normalized form: forward slashes, no leading
//! slash, lower case.

use regex::Regex;
use std::sync::LazyLock;

static M2_EXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.m2$").expect("invalid regex"));
static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("invalid regex"));

/// Canonical join key for model paths.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/").trim_start_matches('/').to_lowercase()
}

/// Client-side model path for an asset, given its path relative to the assets root.
///
/// The client loads `.mdx` names, so a `.m2` extension is rewritten.
pub fn client_model_path(rel: &str) -> String {
    let rel = rel.replace('/', "\\");
    M2_EXT.replace(&rel, ".mdx").into_owned()
}

/// Identifier-safe name derived from a relative asset path.
pub fn safe_name(rel: &str) -> String {
    let no_ext = M2_EXT.replace(rel, "");
    let flat = no_ext.replace(['\\', '/'], "_");
    UNSAFE_CHARS.replace_all(&flat, "_").into_owned()
}

/// True when the path names an `.m2` model file.
pub fn is_m2(path: &str) -> bool {
    M2_EXT.is_match(path)
}
