use std::path::PathBuf;
use std::process;

use voxstream_core::config::load_config;
use voxstream_core::WorldConfig;
use voxstream_sim::report;
use voxstream_sim::runner::{self, SoakOptions};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    let mut config_path: Option<PathBuf> = None;
    let mut save_root: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut options = SoakOptions::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                config_path = Some(PathBuf::from(value_of(&args, &mut i)));
            }
            "--save-root" => {
                save_root = Some(PathBuf::from(value_of(&args, &mut i)));
            }
            "--output" => {
                output_path = Some(PathBuf::from(value_of(&args, &mut i)));
            }
            "--ticks" => {
                options.ticks = parse_or_exit(value_of(&args, &mut i), "--ticks");
            }
            "--speed" => {
                options.speed = parse_or_exit(value_of(&args, &mut i), "--speed");
            }
            "--edit-every" => {
                options.edit_every = parse_or_exit(value_of(&args, &mut i), "--edit-every");
            }
            "--help" | "-h" => {
                eprintln!("Usage: voxstream-sim [OPTIONS]");
                eprintln!("  --config <path>      World config RON (default: built-in defaults)");
                eprintln!("  --save-root <path>   Override the config's save root");
                eprintln!("  --ticks <n>          Ticks to simulate at 60 Hz (default: 600)");
                eprintln!("  --speed <u/s>        Viewpoint speed along +X (default: 800)");
                eprintln!("  --edit-every <n>     Place a block every n ticks, 0 = never (default: 30)");
                eprintln!("  --output <path>      Save the result as JSON");
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                process::exit(1);
            }
        }
        i += 1;
    }

    let mut config = match config_path {
        Some(ref path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("ERROR: {e}");
                process::exit(1);
            }
        },
        None => WorldConfig::default(),
    };
    if let Some(root) = save_root {
        config.save_root = root;
    }

    log::info!(
        "Soak: {} ticks, radius {}, seed {}, saving under {}",
        options.ticks,
        config.render_radius_chunks,
        config.world_seed,
        config.save_root.display()
    );

    let result = match runner::run_soak(config, &options) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("ERROR: {e}");
            process::exit(1);
        }
    };

    println!("\n## Soak Results\n");
    println!("{}", report::format_markdown(&result));

    if let Some(ref path) = output_path {
        if let Err(e) = report::save_result(path, &result) {
            eprintln!("ERROR: failed to save {}: {e}", path.display());
            process::exit(1);
        }
        log::info!("Saved result to {}", path.display());
    }

    log::info!("Soak complete.");
}

fn value_of<'a>(args: &'a [String], i: &mut usize) -> &'a str {
    *i += 1;
    match args.get(*i) {
        Some(value) => value,
        None => {
            eprintln!("Missing value for {}", args[*i - 1]);
            process::exit(1);
        }
    }
}

fn parse_or_exit<T: std::str::FromStr>(value: &str, flag: &str) -> T {
    match value.parse() {
        Ok(v) => v,
        Err(_) => {
            eprintln!("Invalid {flag} value: {value}");
            process::exit(1);
        }
    }
}
