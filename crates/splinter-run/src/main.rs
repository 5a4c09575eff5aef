//! Splinter Run - modularize a library source set from the command line.
//!
//! Thin wrapper over `splinter-compiler`: loads the project manifest,
//! reads module sources, runs the pipeline, and writes the rendered
//! files under the output root. All policy lives in the library crates.

use clap::Parser;
use serde::Deserialize;
use splinter_compiler::{modularize, ModuleSource};
use splinter_resolve::Config;
use std::fs;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "splinter")]
#[command(about = "Restructure a monolithic library into per-unit packages")]
struct Cli {
    /// Path to the project manifest (JSON)
    manifest: PathBuf,

    /// Directory containing the module source files
    #[arg(long, default_value = "lib")]
    lib_dir: PathBuf,

    /// Output root for the generated package tree
    #[arg(long, default_value = "release/npm")]
    out_dir: PathBuf,
}

/// Project manifest: the root object name, where its package lives, and
/// the ordered module list.
#[derive(Debug, Deserialize)]
struct Manifest {
    root: String,
    #[serde(rename = "corePath")]
    core_path: String,
    modules: Vec<ManifestModule>,
}

#[derive(Debug, Deserialize)]
struct ManifestModule {
    name: String,
    #[serde(default = "default_bundle")]
    bundle: bool,
}

fn default_bundle() -> bool {
    true
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "splinter=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let manifest: Manifest = match fs::read_to_string(&cli.manifest)
        .map_err(|e| e.to_string())
        .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()))
    {
        Ok(m) => m,
        Err(e) => {
            error!("Failed to load manifest {}: {}", cli.manifest.display(), e);
            std::process::exit(1);
        }
    };

    info!("Modularizing {} modules", manifest.modules.len());

    let mut modules = Vec::new();
    for entry in &manifest.modules {
        let path = cli.lib_dir.join(format!("{}.js", entry.name));
        match fs::read_to_string(&path) {
            Ok(source) => modules.push(ModuleSource {
                name: entry.name.clone(),
                bundle: entry.bundle,
                source,
            }),
            Err(e) => {
                error!("Failed to read {}: {}", path.display(), e);
                std::process::exit(1);
            }
        }
    }

    let config = Config::new(manifest.root.clone(), manifest.core_path.clone());

    let output = match modularize(&modules, &config) {
        Ok(output) => output,
        Err(e) => {
            error!("Modularization failed: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Resolved {} units and {} methods",
        output.unit_count, output.method_count
    );

    for file in &output.files {
        let path = cli.out_dir.join(&file.path);
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create {}: {}", parent.display(), e);
                std::process::exit(1);
            }
        }
        if let Err(e) = fs::write(&path, &file.contents) {
            error!("Failed to write {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }

    info!(
        "Wrote {} files under {}",
        output.files.len(),
        cli.out_dir.display()
    );
}
