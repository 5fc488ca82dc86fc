//! Command-line front end for the separation pipeline.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use image::{GrayImage, ImageError};
use tracing_subscriber::EnvFilter;

use graysep::{Separator, SeparatorConfig};

#[derive(Parser)]
#[command(name = "septool", version, about = "Grayscale/binary separation for scanned pages")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Separate one page and write the composited result
    Separate {
        /// Input image (any format the image crate decodes)
        #[arg(long)]
        input: PathBuf,
        /// Output image (PNG recommended)
        #[arg(long)]
        output: PathBuf,
        /// JSON configuration file; defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print the separation report as JSON on stdout
        #[arg(long)]
        report: bool,
    },
    /// Validate a JSON configuration file and print the effective values
    CheckConfig {
        /// JSON configuration file
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Separate {
            input,
            output,
            config,
            report,
        } => separate_cmd(&input, &output, config.as_deref(), report),
        Command::CheckConfig { config } => check_config_cmd(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn separate_cmd(
    input: &Path,
    output: &Path,
    config_path: Option<&Path>,
    print_report: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let separator = Separator::new(config)?;

    let image = image::open(input)
        .map_err(|err: ImageError| format!("failed to load {}: {err}", input.display()))?
        .into_rgb8();
    let (width, height) = (image.width() as usize, image.height() as usize);

    let (pixels, report) = separator.separate_with_report(image.as_raw(), width, height, 3)?;

    let page = GrayImage::from_raw(width as u32, height as u32, pixels)
        .ok_or("output buffer size mismatch")?;
    page.save(output)
        .map_err(|err| format!("failed to save {}: {err}", output.display()))?;

    if print_report {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

fn check_config_cmd(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(Some(config_path))?;
    config.validate()?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SeparatorConfig, Box<dyn std::error::Error>> {
    match path {
        None => Ok(SeparatorConfig::default()),
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
            let config: SeparatorConfig = serde_json::from_str(&text)
                .map_err(|err| format!("invalid configuration in {}: {err}", path.display()))?;
            Ok(config)
        }
    }
}
