//! Provides the `modelshot` command-line tool.
//!
//! Usage: `modelshot [options] <gltf/glb>...`
//!
//! Renders the given models into a virtual room and writes a single PNG.
//!
//! # Examples
//! ```text
//! modelshot --width 800 --height 600 --output shot.png model.glb
//! ```

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, CommandFactory, Parser};

use modelshot::config::Config;

// The default clap help short is disabled so -h can mean height, as the
// sibling tooling expects; help stays reachable as --help / -?.
#[derive(Parser)]
#[command(
    name = "modelshot",
    about = "Generates PNGs of glTF models with fixed room framing",
    version,
    disable_help_flag = true
)]
struct Cli {
    /// Prints this message
    #[arg(short = '?', long = "help", action = ArgAction::Help)]
    help: Option<bool>,

    /// Width of the render
    #[arg(short, long, default_value_t = 800)]
    width: u32,

    /// Height of the render
    #[arg(short = 'h', long, default_value_t = 600)]
    height: u32,

    /// Output path where a PNG of the render will be saved
    #[arg(short, long, default_value = "output.png")]
    output: PathBuf,

    /// Applies an IBL generated by cmgen's deploy option
    #[arg(short, long)]
    ibl: Option<PathBuf>,

    /// Model files to render (glTF/GLB)
    #[arg(value_name = "MODEL")]
    inputs: Vec<PathBuf>,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if cli.inputs.is_empty() {
        let _ = Cli::command().print_help();
        process::exit(1);
    }

    for input in &cli.inputs {
        if !input.exists() {
            eprintln!("file {} not found!", input.display());
            process::exit(1);
        }
    }

    let config = Config {
        width: cli.width,
        height: cli.height,
        output: cli.output,
        ibl: cli.ibl,
        inputs: cli.inputs,
    };

    if let Err(e) = modelshot::app::run(&config) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
