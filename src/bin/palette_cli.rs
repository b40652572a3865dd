//! CLI tool for colorpalette - extracts or generates a palette and prints it
//!
//! Usage:
//!   palette_cli <image>                  # Palette summary as JSON
//!   palette_cli <image> --css            # CSS custom properties
//!   palette_cli --tailwind --seed 42     # Random palette as Tailwind config
//!   palette_cli <image> --config cfg.json
//!
//! Set `RUST_LOG=debug` for extraction diagnostics.

#![allow(clippy::exit)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use std::env;
use std::fs;
use std::process;

use colorpalette::{PaletteConfig, PaletteError, RngEntropy, Session};

const USAGE: &str =
    "Usage: palette_cli [image] [--css | --tailwind | --json] [--config cfg.json] [--seed N]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Css,
    Tailwind,
}

struct Args {
    image: Option<String>,
    format: Format,
    config: Option<String>,
    seed: Option<u64>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        image: None,
        format: Format::Json,
        config: None,
        seed: None,
    };

    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--css" => args.format = Format::Css,
            "--tailwind" => args.format = Format::Tailwind,
            "--json" => args.format = Format::Json,
            "--config" => {
                args.config = Some(iter.next().ok_or("--config needs a path")?);
            }
            "--seed" => {
                let raw = iter.next().ok_or("--seed needs a number")?;
                args.seed = Some(raw.parse().map_err(|_| format!("invalid seed: {raw}"))?);
            }
            "-h" | "--help" => return Err(String::new()),
            flag if flag.starts_with("--") => return Err(format!("unknown flag: {flag}")),
            path => {
                if args.image.replace(path.to_string()).is_some() {
                    return Err("only one image may be given".to_string());
                }
            }
        }
    }
    Ok(args)
}

fn load_config(path: Option<&str>) -> Result<PaletteConfig, PaletteError> {
    match path {
        Some(path) => PaletteConfig::from_json(&fs::read_to_string(path)?),
        None => Ok(PaletteConfig::default()),
    }
}

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            if !msg.is_empty() {
                eprintln!("{msg}");
            }
            eprintln!("{USAGE}");
            process::exit(1);
        }
    };

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            process::exit(1);
        }
    };

    let entropy = match args.seed {
        Some(seed) => RngEntropy::seeded(seed),
        None => RngEntropy::from_entropy(),
    };
    let session = match Session::new(config, entropy) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    if let Some(path) = &args.image {
        let data = match fs::read(path) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("Error reading {path}: {e}");
                process::exit(1);
            }
        };
        let pending = session.begin_extraction();
        let image = match colorpalette::PaletteExtractor::decode(&data) {
            Ok(image) => image,
            Err(e) => {
                pending.fail(&e);
                eprintln!("Error decoding {path}: {e}");
                process::exit(1);
            }
        };
        if pending.complete(&image).is_none() {
            eprintln!("Extraction from {path} was discarded");
            process::exit(1);
        }
    }

    let output = match args.format {
        Format::Css => session.export_css(),
        Format::Tailwind => session.export_framework_snippet(),
        Format::Json => match serde_json::to_string_pretty(&session.summary()) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("Error serializing JSON: {e}");
                process::exit(1);
            }
        },
    };
    println!("{output}");
}
