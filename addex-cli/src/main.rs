//! Command-line interface for addex
//! This binary extracts every function/type definition from a design-document
//! transcript into its own source file under the configured output tree.
//!
//! Usage:
//!   addex `<transcript>` [--out-dir `<dir>`] [--format `<format>`] [--manifest]   - Run the extraction
//!   addex --list-chapters                                                         - Show the chapter table

use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod emit;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let matches = Command::new("addex")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Extracts per-definition source files from a design-document transcript")
        .arg_required_else_help(true)
        .arg(
            Arg::new("transcript")
                .help("Path to the UTF-8 transcript text file")
                .required_unless_present("list-chapters")
                .index(1),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("TOML configuration file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("out-dir")
                .long("out-dir")
                .short('o')
                .help("Output root directory (overrides the configured root)"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format: 'files' writes the destination tree, 'json' dumps the registry")
                .default_value("files"),
        )
        .arg(
            Arg::new("manifest")
                .long("manifest")
                .help("Also write an include-directive manifest after emitting files")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-chapters")
                .long("list-chapters")
                .help("List the chapter-to-folder table and exit")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let config = load_config(
        matches.get_one::<String>("config"),
        matches.get_one::<String>("out-dir"),
    );

    if matches.get_flag("list-chapters") {
        handle_list_chapters_command(&config);
        return;
    }

    let transcript = matches
        .get_one::<String>("transcript")
        .expect("transcript is required unless listing chapters");
    let format = matches.get_one::<String>("format").unwrap();
    let manifest = matches.get_flag("manifest");
    handle_extract_command(transcript, format, manifest, config);
}

/// Layer the optional user file and CLI overrides over the defaults.
fn load_config(
    config_path: Option<&String>,
    out_dir: Option<&String>,
) -> addex_config::AddexConfig {
    let mut loader = addex_config::Loader::new();
    if let Some(path) = config_path {
        loader = loader.with_file(path);
    }
    if let Some(dir) = out_dir {
        loader = loader
            .set_override("output.root", dir.as_str())
            .unwrap_or_else(|e| {
                eprintln!("Invalid output root override: {}", e);
                std::process::exit(1);
            });
    }
    loader.build().unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    })
}

/// Handle the extract command
fn handle_extract_command(
    transcript: &str,
    format: &str,
    manifest: bool,
    config: addex_config::AddexConfig,
) {
    use addex_extract::extract::Extraction;

    let out_root = PathBuf::from(&config.output.root);
    let chapters = config.chapters.clone();

    let extraction = Extraction::from_path(transcript, config).unwrap_or_else(|e| {
        eprintln!("Cannot read transcript: {}", e);
        std::process::exit(1);
    });
    let output = extraction.run().unwrap_or_else(|e| {
        eprintln!("Extraction error: {}", e);
        std::process::exit(1);
    });

    match format {
        "json" => {
            let dump = serde_json::to_string_pretty(&output).unwrap_or_else(|e| {
                eprintln!("Error formatting registry: {}", e);
                std::process::exit(1);
            });
            println!("{}", dump);
        }
        "files" => {
            let written = emit::emit_files(&out_root, &chapters, &output.definitions)
                .unwrap_or_else(|e| {
                    eprintln!("Error writing output tree: {}", e);
                    std::process::exit(1);
                });
            println!(
                "Wrote {} definitions under {}",
                written.len(),
                out_root.display()
            );
            if manifest {
                let path = emit::write_manifest(&out_root).unwrap_or_else(|e| {
                    eprintln!("Error writing manifest: {}", e);
                    std::process::exit(1);
                });
                println!("Wrote manifest {}", path.display());
            }
        }
        other => {
            eprintln!("Format '{}' not supported", other);
            eprintln!("Available formats: files, json");
            std::process::exit(1);
        }
    }
}

/// Handle the list-chapters command
fn handle_list_chapters_command(config: &addex_config::AddexConfig) {
    println!("Chapter-to-folder table:\n");
    for chapter in &config.chapters {
        println!("  {}", chapter.header);
        println!("    -> {}", chapter.folder);
        println!();
    }
}
