//! # pclview CLI
//!
//! Command-line interface for decoding instrument PCL printouts.
//!
//! ## Usage
//!
//! ```bash
//! # Render a saved printout (writes screenshot.png)
//! pclview render screenshot.pcl
//!
//! # Pick the output name and format
//! pclview render screenshot.pcl -o trace.bmp
//!
//! # Show geometry and command statistics
//! pclview info screenshot.pcl
//! pclview info --json screenshot.pcl
//!
//! # Act as the instrument's printer on a serial port
//! pclview capture --device /dev/ttyUSB0 --baud 9600 --out-dir shots
//!
//! # Also keep the raw stream, to re-render later
//! pclview capture --raw session.pcl
//!
//! # List candidate serial devices
//! pclview capture --list
//!
//! # More logging (or set RUST_LOG)
//! pclview -vv render screenshot.pcl
//! ```

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use pclview::{
    Decoder, DecoderConfig, PclError, Raster,
    config::{DEFAULT_BAUD, DEFAULT_DEVICE, SerialConfig},
    decoder::DecodeStats,
    render,
    transport::{RawDump, SerialCapture, list_devices},
};

/// pclview - Instrument PCL printout decoder
#[derive(Parser, Debug)]
#[command(name = "pclview")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a PCL file and save it as an image
    Render {
        /// PCL file captured from the instrument
        input: PathBuf,

        /// Output image (format from extension; defaults to <input>.png)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Fail on graphics data outside a raster block instead of skipping it
        #[arg(long)]
        strict: bool,
    },

    /// Decode a PCL file and print its geometry and command statistics
    Info {
        /// PCL file captured from the instrument
        input: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        /// Fail on graphics data outside a raster block instead of skipping it
        #[arg(long)]
        strict: bool,
    },

    /// Receive printouts on a serial port and save each one as an image
    Capture {
        /// Serial device path
        #[arg(long, default_value = DEFAULT_DEVICE)]
        device: String,

        /// Line speed in baud
        #[arg(long, default_value_t = DEFAULT_BAUD)]
        baud: u32,

        /// Directory for captured images
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// File name prefix for captured images
        #[arg(long, default_value = "capture")]
        prefix: String,

        /// Image format
        #[arg(
            long,
            default_value = "png",
            value_parser = ["png", "jpg", "jpeg", "bmp", "tif", "tiff"]
        )]
        format: String,

        /// Also write every byte received to this file
        #[arg(long, value_name = "FILE")]
        raw: Option<PathBuf>,

        /// List candidate serial devices and exit
        #[arg(long)]
        list: bool,

        /// Fail on graphics data outside a raster block instead of skipping it
        #[arg(long)]
        strict: bool,
    },
}

/// JSON shape of `info --json`
#[derive(Serialize)]
struct Summary<'a> {
    file: String,
    width_dots: usize,
    width_bytes: usize,
    height_dots: usize,
    stats: &'a DecodeStats,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("warn,pclview={}", level))),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(command: Commands) -> Result<(), PclError> {
    match command {
        Commands::Render {
            input,
            output,
            strict,
        } => {
            let (raster, _) = decode_file(&input, strict)?;
            let output = output.unwrap_or_else(|| input.with_extension("png"));

            let written = render::save(&raster, &output)?;
            println!(
                "Saved {} ({}x{})",
                written.display(),
                raster.width_dots(),
                raster.height_dots()
            );
        }

        Commands::Info {
            input,
            json,
            strict,
        } => {
            let (raster, stats) = decode_file(&input, strict)?;

            if json {
                let summary = Summary {
                    file: input.display().to_string(),
                    width_dots: raster.width_dots(),
                    width_bytes: raster.width_bytes(),
                    height_dots: raster.height_dots(),
                    stats: &stats,
                };
                let text = serde_json::to_string_pretty(&summary).map_err(io::Error::from)?;
                println!("{}", text);
            } else {
                print_info(&input, &raster, &stats);
            }
        }

        Commands::Capture {
            device,
            baud,
            out_dir,
            prefix,
            format,
            raw,
            list,
            strict,
        } => {
            if list {
                for device in list_devices()? {
                    println!("{}", device.display());
                }
                return Ok(());
            }

            let serial = SerialConfig::new(device, baud)?;
            let port = SerialCapture::open(&serial)?;
            fs::create_dir_all(&out_dir)?;

            let sink: Box<dyn Write> = match &raw {
                Some(path) => Box::new(File::create(path).map_err(|e| {
                    io::Error::new(e.kind(), format!("{}: {}", path.display(), e))
                })?),
                None => Box::new(io::sink()),
            };
            let port = RawDump::new(port, sink);
            let mut decoder = Decoder::with_config(BufReader::new(port), decoder_config(strict));

            println!(
                "Waiting for printouts on {} at {} baud (Ctrl-C to stop)...",
                serial.device, serial.baud
            );

            if let Some(path) = &raw {
                println!("Raw stream goes to {}", path.display());
            }

            let mut index = 1;
            loop {
                let page = match decoder.next_page() {
                    Ok(Some(page)) => page,
                    Ok(None) => break,
                    Err(e) => {
                        if let Some(path) = &raw {
                            eprintln!("Raw bytes so far are in {}", path.display());
                        }
                        return Err(e);
                    }
                };
                let (path, next) = next_free_path(&out_dir, &prefix, &format, index);
                index = next;

                let written = render::save(&page, &path)?;
                println!(
                    "Saved {} ({}x{})",
                    written.display(),
                    page.width_dots(),
                    page.height_dots()
                );
            }
        }
    }

    Ok(())
}

fn decoder_config(strict: bool) -> DecoderConfig {
    if strict {
        DecoderConfig::STRICT
    } else {
        DecoderConfig::LENIENT
    }
}

/// Decode a whole file, reporting how far decoding got if it fails.
fn decode_file(path: &Path, strict: bool) -> Result<(Raster, DecodeStats), PclError> {
    let file = File::open(path)
        .map_err(|e| io::Error::new(e.kind(), format!("{}: {}", path.display(), e)))?;

    let mut decoder = Decoder::with_config(BufReader::new(file), decoder_config(strict));
    if let Err(e) = decoder.run() {
        eprintln!(
            "Decoding stopped after {} complete rows",
            decoder.raster().row_count()
        );
        return Err(e);
    }

    let stats = decoder.stats().clone();
    Ok((decoder.finish(), stats))
}

fn print_info(path: &Path, raster: &Raster, stats: &DecodeStats) {
    let or_unset = |value: Option<u32>| value.map_or_else(|| "-".to_string(), |v| v.to_string());

    println!("File:             {}", path.display());
    println!(
        "Size:             {}x{} dots ({} bytes per row)",
        raster.width_dots(),
        raster.height_dots(),
        raster.width_bytes()
    );
    println!("Rows:             {}", stats.rows);
    println!("Graphics blocks:  {}", stats.graphics_blocks);
    println!("Resolution:       {} dpi", or_unset(stats.resolution_dpi));
    println!("Compression mode: {}", or_unset(stats.compression_mode));
    println!(
        "Commands:         {} ({} unknown)",
        stats.commands, stats.unknown_commands
    );
    if stats.discarded_rows > 0 {
        println!("Discarded rows:   {}", stats.discarded_rows);
    }
    println!("Bytes read:       {}", stats.bytes_read);
}

/// First `<prefix>-NNN.<ext>` at or after `index` that does not exist yet.
/// Returns the path and the index to try next time.
fn next_free_path(dir: &Path, prefix: &str, ext: &str, mut index: u32) -> (PathBuf, u32) {
    loop {
        let path = dir.join(format!("{}-{:03}.{}", prefix, index, ext));
        index += 1;
        if !path.exists() {
            return (path, index);
        }
    }
}
