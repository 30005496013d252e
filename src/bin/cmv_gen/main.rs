//! Creature Model Viewer map generator CLI.
//!
//! Usage:
//!   cmv-gen generate                      # Build maps using config defaults
//!   cmv-gen generate --module my-module   # Paths derived from modules/my-module
//!   cmv-gen generate --no-assets          # Maps from existing records only
//!   cmv-gen textures Creature\\Wolf\\Wolf.mdx
//!   cmv-gen check --output modules/my-module/addon

use clap::{Parser, Subcommand};
use cmv_maps::check::check_output;
use cmv_maps::{CreatureIndex, GeneratorConfig, RecordStore, pipeline};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cmv-gen")]
#[command(about = "Generate Creature Model Viewer lookup tables from creature records")]
struct Cli {
    /// Config file (JSON). Defaults to ~/.config/cmv-maps/config.json if present
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build all four maps, registering creatures from assets first
    Generate {
        /// Directory with CreatureModelData.csv, CreatureDisplayInfo.csv, creature_template.csv
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Module name used to derive the assets and addon paths
        #[arg(short, long)]
        module: Option<String>,

        /// Assets root to scan for .m2 files
        #[arg(long)]
        assets: Option<PathBuf>,

        /// Output directory for the .lua maps
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not register creatures from assets
        #[arg(long)]
        no_assets: bool,

        /// Keep templates with broken model references
        #[arg(long)]
        no_cleanup: bool,

        /// Place a spawn for every asset creature
        #[arg(long)]
        spawns: bool,

        /// Write the updated records as CSV to this directory
        #[arg(long)]
        export_records: Option<PathBuf>,
    },

    /// Print the textures known for a model path
    Textures {
        /// Model path, any slash style or case
        model_path: String,

        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Load written maps in Lua and report entry counts
    Check {
        /// Directory holding the .lua maps
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// `RUST_LOG` directives when set and valid, otherwise `info`.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn main() {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(directives.as_deref()))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> cmv_maps::Result<()> {
    let mut config = GeneratorConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate {
            data_dir,
            module,
            assets,
            output,
            no_assets,
            no_cleanup,
            spawns,
            export_records,
        } => {
            if let Some(module) = module {
                config.module_name = module;
            }
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            config.assets_root = assets.or(config.assets_root);
            config.output_dir = output.or(config.output_dir);
            config.export_records = export_records.or(config.export_records);
            config.scan_assets &= !no_assets;
            config.cleanup_invalid &= !no_cleanup;
            config.enable_spawns |= spawns;
            generate(&config)
        }
        Commands::Textures { model_path, data_dir } => {
            let data_dir = data_dir.unwrap_or(config.data_dir);
            let store = RecordStore::load(&data_dir)?;
            let index = CreatureIndex::build(&store);
            match index.textures_for_model_path(&model_path) {
                Some(textures) => {
                    for tex in textures {
                        println!("{}", tex);
                    }
                }
                None => println!("No textures known for {}", model_path),
            }
            Ok(())
        }
        Commands::Check { output } => {
            let dir = output.unwrap_or_else(|| config.output_dir());
            let report = check_output(&dir)?;
            for table in &report.tables {
                let mark = if table.is_consistent() { "ok" } else { "MISMATCH" };
                println!("{:<28} {:>6} entries  {}", table.name, table.lua_entries, mark);
            }
            for name in &report.missing {
                println!("{:<28} missing", name);
            }
            if !report.is_ok() {
                std::process::exit(2);
            }
            Ok(())
        }
    }
}

fn generate(config: &GeneratorConfig) -> cmv_maps::Result<()> {
    let summary = pipeline::run(config)?;
    if !summary.removed_templates.is_empty() {
        println!("Removed {} invalid creature templates", summary.removed_templates.len());
    }
    if !summary.created.is_empty() {
        println!("Created {} creatures from assets", summary.created.len());
    }
    println!(
        "Maps: {} display ids, {} model paths, {} variants, {} textures",
        summary.display_ids, summary.model_paths, summary.variants, summary.textures
    );
    println!("Output: {}", config.output_dir().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_log_filter_defaults_to_info() {
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(log_filter(Some("debug")).max_level_hint(), Some(LevelFilter::DEBUG));
    }
}
