//! Command-line interface for litdoc
//! Generates side-by-side literate-programming documentation: each source
//! file becomes an HTML page of rendered comments next to highlighted code.
//!
//! Usage:
//!   litdoc `<path>`... [--output `<dir>`] [--dirs]   - Generate documentation
//!   litdoc --list-languages                          - List supported extensions

use clap::{Arg, ArgAction, Command};
use litdoc_parser::languages::LanguageRegistry;
use std::path::PathBuf;

mod run;

use run::{run, RunConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    let matches = Command::new("litdoc")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A literate-programming documentation generator")
        .arg_required_else_help(true)
        .arg(
            Arg::new("paths")
                .help("Source files or directories to document")
                .required_unless_present("list-languages")
                .num_args(1..)
                .index(1),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Output directory for the generated pages")
                .default_value("docs"),
        )
        .arg(
            Arg::new("dirs")
                .long("dirs")
                .help("Mirror the input directory structure under the output directory")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("highlighter")
                .long("highlighter")
                .help("Highlighter program to run (expects the pygmentize interface)")
                .default_value("pygmentize"),
        )
        .arg(
            Arg::new("languages")
                .long("languages")
                .help("JSON file replacing the built-in language table"),
        )
        .arg(
            Arg::new("list-languages")
                .long("list-languages")
                .help("List supported file extensions and exit")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let registry = match matches.get_one::<String>("languages") {
        Some(path) => {
            let table = std::fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("Error reading language table {}: {}", path, e);
                std::process::exit(1);
            });
            LanguageRegistry::from_json(&table).unwrap_or_else(|e| {
                eprintln!("Error in language table {}: {}", path, e);
                std::process::exit(1);
            })
        }
        None => LanguageRegistry::with_defaults(),
    };

    if matches.get_flag("list-languages") {
        handle_list_languages_command(&registry);
        return;
    }

    let paths: Vec<PathBuf> = matches
        .get_many::<String>("paths")
        .expect("paths are required unless listing languages")
        .map(PathBuf::from)
        .collect();
    let config = RunConfig {
        paths,
        output: PathBuf::from(matches.get_one::<String>("output").unwrap()),
        mirror_dirs: matches.get_flag("dirs"),
        highlighter: matches.get_one::<String>("highlighter").unwrap().clone(),
        registry,
    };

    let summary = run(&config).await.unwrap_or_else(|e| {
        eprintln!("litdoc error: {}", e);
        std::process::exit(1);
    });
    println!(
        "litdoc: {} page(s) written, {} file(s) skipped",
        summary.pages, summary.skipped
    );
}

/// Handle the list-languages command
fn handle_list_languages_command(registry: &LanguageRegistry) {
    println!("Supported extensions:\n");
    for extension in registry.supported_extensions() {
        let language = registry
            .for_extension(extension)
            .expect("listed extensions are registered");
        println!(
            "  .{:<8} {} (comment symbol '{}')",
            extension,
            language.name(),
            language.symbol()
        );
    }
}
