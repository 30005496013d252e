//! Creature Model Viewer map generator
//!
//! Builds the Lua lookup tables the CMV addon uses to show creature models:
//! template entry → display id, display id → model path, entry → texture
//! variants, display id → skin textures. Input is CSV exports of
//! CreatureModelData, CreatureDisplayInfo and creature_template; new creatures
//! can be registered from `.m2` files in a module's assets folder.

pub mod assets;
pub mod check;
pub mod config;
pub mod csv_util;
pub mod error;
pub mod index;
pub mod lua_table;
pub mod model_path;
pub mod overlay;
pub mod pipeline;
pub mod records;
pub mod writer;

pub use config::GeneratorConfig;
pub use error::{Error, Result};
pub use index::CreatureIndex;
pub use records::RecordStore;
