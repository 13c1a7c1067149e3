//! tezos-compose CLI
//!
//! Entry point for the `tezos-compose` command-line tool.

use clap::{ArgAction, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use tezos_compose::logging::{init_logging, level_for_verbosity};
use tezos_compose::manifest::MANIFEST_FILE;
use tezos_compose::{
    catalog, compose, lookup, ConfigNode, LogFormat, LoggingConfig, Manifest, MergeSource,
    OutputFormat, SourceStack,
};

/// Composition failed
const EXIT_COMPOSE: i32 = 1;
/// Bad invocation or manifest
const EXIT_USAGE: i32 = 2;

#[derive(Parser)]
#[command(name = "tezos-compose")]
#[command(about = "Compose ingress, service, IAM policy and Helm chart documents", version)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose one component from values files and overrides
    Compose {
        /// Component identifier (see `components`)
        component: String,

        /// Values file, repeatable; later files win. Chart components read
        /// these as plain Helm values.
        #[arg(long = "values", short = 'f')]
        values: Vec<PathBuf>,

        /// Override as path=value, repeatable; applied after every values file
        #[arg(long = "set")]
        set: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,

        /// Composition name used in logs and errors (default: component)
        #[arg(long)]
        name: Option<String>,

        /// Also write the full composition record (JSON) to this path
        #[arg(long)]
        record: Option<PathBuf>,
    },

    /// Merge documents without any component semantics
    Merge {
        /// Documents in precedence order; later files win
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },

    /// Compose every entry of a manifest
    Run {
        /// Path to the manifest
        #[arg(long, short = 'm', default_value = MANIFEST_FILE)]
        manifest: PathBuf,

        /// Write `<name>.<ext>` files here instead of printing
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },

    /// List available components
    Components {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compose {
            component,
            values,
            set,
            format,
            name,
            record,
        } => {
            setup_logging(LoggingConfig::default(), cli.verbose, cli.log_format);
            run_compose(&component, &values, &set, format, name, record);
        }
        Commands::Merge { files, format } => {
            setup_logging(LoggingConfig::default(), cli.verbose, cli.log_format);
            run_merge(&files, format);
        }
        Commands::Run {
            manifest,
            out_dir,
            format,
        } => {
            let manifest = match Manifest::from_file(&manifest) {
                Ok(m) => m,
                Err(e) => {
                    eprintln!("Manifest error ({}): {}", manifest.display(), e);
                    process::exit(EXIT_USAGE);
                }
            };
            setup_logging(manifest.logging.clone(), cli.verbose, cli.log_format);
            run_manifest(&manifest, out_dir.as_deref(), format);
        }
        Commands::Components { json } => {
            run_components(json);
        }
    }
}

fn setup_logging(mut config: LoggingConfig, verbose: u8, format: Option<LogFormat>) {
    config.level = level_for_verbosity(&config.level, verbose).to_string();
    if let Some(format) = format {
        config.format = format;
    }
    if let Err(e) = init_logging(&config) {
        eprintln!("Error initializing logging: {}", e);
        process::exit(EXIT_USAGE);
    }
}

fn render_or_exit(format: OutputFormat, node: &ConfigNode) -> String {
    match format.render(node) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(EXIT_COMPOSE);
        }
    }
}

fn run_compose(
    component_id: &str,
    values: &[PathBuf],
    set: &[String],
    format: OutputFormat,
    name: Option<String>,
    record: Option<PathBuf>,
) {
    let Some(component) = lookup(component_id) else {
        eprintln!(
            "Unknown component '{}'. Run `tezos-compose components` for the list.",
            component_id
        );
        process::exit(EXIT_USAGE);
    };

    let mut stack = SourceStack::new();
    if let Err(e) = stack.push_files(values) {
        eprintln!("{}", e);
        process::exit(EXIT_COMPOSE);
    }
    if !set.is_empty() {
        match MergeSource::from_assignments("--set", set) {
            Ok(source) => stack.push(source),
            Err(e) => {
                eprintln!("{}", e);
                process::exit(EXIT_USAGE);
            }
        }
    }

    let name = name.unwrap_or_else(|| component_id.to_string());
    let composition = match compose(&name, &component, &stack) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(EXIT_COMPOSE);
        }
    };

    if let Some(path) = record {
        if let Err(e) = composition.write_to_file(&path) {
            eprintln!("Error writing composition record {}: {}", path.display(), e);
            process::exit(EXIT_COMPOSE);
        }
    }

    print!("{}", terminated(render_or_exit(format, composition.document())));
}

fn run_merge(files: &[PathBuf], format: OutputFormat) {
    let mut stack = SourceStack::new();
    if let Err(e) = stack.push_files(files) {
        eprintln!("{}", e);
        process::exit(EXIT_COMPOSE);
    }
    print!("{}", terminated(render_or_exit(format, &stack.merged())));
}

fn run_manifest(manifest: &Manifest, out_dir: Option<&Path>, format: OutputFormat) {
    if let Some(dir) = out_dir {
        if let Err(e) = fs::create_dir_all(dir) {
            eprintln!("Error creating output directory {}: {}", dir.display(), e);
            process::exit(EXIT_COMPOSE);
        }
    }

    let mut printed = serde_json::Map::new();
    for entry in &manifest.compositions {
        // Component ids were checked when the manifest was validated
        let Some(component) = lookup(&entry.component) else {
            eprintln!("Unknown component '{}'", entry.component);
            process::exit(EXIT_USAGE);
        };

        let composition = match manifest
            .source_stack(entry)
            .and_then(|stack| compose(&entry.name, &component, &stack))
        {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{}", e);
                process::exit(EXIT_COMPOSE);
            }
        };

        match out_dir {
            Some(dir) => {
                let path = dir.join(format!("{}.{}", entry.name, format.extension()));
                let text = terminated(render_or_exit(format, composition.document()));
                if let Err(e) = fs::write(&path, text) {
                    eprintln!("Error writing {}: {}", path.display(), e);
                    process::exit(EXIT_COMPOSE);
                }
                tracing::info!(composition = %entry.name, path = %path.display(), "wrote document");
            }
            None => {
                printed.insert(entry.name.clone(), composition.output.document);
            }
        }
    }

    if out_dir.is_none() {
        let printed = ConfigNode::Object(printed);
        print!("{}", terminated(render_or_exit(format, &printed)));
    }
}

fn run_components(json: bool) {
    let components = catalog();

    if json {
        let output: Vec<serde_json::Value> = components
            .iter()
            .map(|c| {
                serde_json::json!({
                    "id": c.id(),
                    "schema": c.schema().name(),
                    "summary": c.summary(),
                    "owned": c.owned_paths().iter().map(|p| p.to_string()).collect::<Vec<_>>(),
                    "reserved": c.reserved_paths().iter().map(|p| p.to_string()).collect::<Vec<_>>(),
                    "derivations": c.derivation_names(),
                })
            })
            .collect();
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(EXIT_COMPOSE);
            }
        }
        return;
    }

    for c in &components {
        println!("{:<24} {:<12} {}", c.id(), c.schema().name(), c.summary());
    }
}

fn terminated(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
