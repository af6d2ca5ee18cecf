//! Nightwave CLI - Command-line tool for Cyberpunk 2077 audio extraction.
//!
//! This is the main entry point for the Nightwave command-line application.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

use nightwave::prelude::*;

/// Nightwave - Cyberpunk 2077 audio extraction tool
#[derive(Parser)]
#[command(name = "nightwave")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Extraction mode for stream payloads.
#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Verbatim stream bytes (bit-exact .wem)
    Passthrough,
    /// Decode to PCM in a WAV container
    Pcm,
}

impl From<Mode> for ExtractMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Passthrough => Self::PassThrough,
            Mode::Pcm => Self::Pcm,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List extractable audio streams in an archive
    List {
        /// Path to the .archive file
        #[arg(short, long, env = "INPUT_ARCHIVE")]
        archive: PathBuf,

        /// Emit the listing as JSON
        #[arg(long)]
        json: bool,

        /// Path listing for resolving ids to resource names
        #[arg(short, long)]
        dict: Option<PathBuf>,
    },

    /// Extract a single audio stream
    Extract {
        /// Path to the .archive file
        #[arg(short, long, env = "INPUT_ARCHIVE")]
        archive: PathBuf,

        /// Content id (hex or decimal) or a resource path to hash
        id: String,

        /// Stream id within the bank
        #[arg(short, long)]
        wem_id: Option<u32>,

        /// Output directory
        #[arg(short, long, env = "OUTPUT_FOLDER")]
        output: PathBuf,

        /// Extraction mode
        #[arg(short, long, value_enum, default_value_t = Mode::Passthrough)]
        mode: Mode,

        /// Dump streams with unrecognized codecs verbatim
        #[arg(long)]
        raw_dump: bool,

        /// Path listing for resolving ids to resource names
        #[arg(short, long)]
        dict: Option<PathBuf>,
    },

    /// Extract every audio stream in an archive
    ExtractAll {
        /// Path to the .archive file
        #[arg(short, long, env = "INPUT_ARCHIVE")]
        archive: PathBuf,

        /// Output directory
        #[arg(short, long, env = "OUTPUT_FOLDER")]
        output: PathBuf,

        /// Extraction mode
        #[arg(short, long, value_enum, default_value_t = Mode::Passthrough)]
        mode: Mode,

        /// Dump streams with unrecognized codecs verbatim
        #[arg(long)]
        raw_dump: bool,

        /// Path listing for resolving ids to resource names
        #[arg(short, long)]
        dict: Option<PathBuf>,

        /// Suppress the progress bar
        #[arg(short, long)]
        quiet: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::List { archive, json, dict } => {
            cmd_list(&archive, json, dict.as_deref())?;
        }
        Commands::Extract {
            archive,
            id,
            wem_id,
            output,
            mode,
            raw_dump,
            dict,
        } => {
            cmd_extract(&archive, &id, wem_id, &output, mode, raw_dump, dict.as_deref())?;
        }
        Commands::ExtractAll {
            archive,
            output,
            mode,
            raw_dump,
            dict,
            quiet,
        } => {
            cmd_extract_all(&archive, &output, mode, raw_dump, dict.as_deref(), quiet)?;
        }
    }

    Ok(())
}

fn cmd_list(archive_path: &Path, json: bool, dict_path: Option<&Path>) -> Result<()> {
    let session = ExtractionSession::open(archive_path).context("Failed to open archive")?;
    let dict = load_dict(dict_path)?;

    let listing = session.list_audio_entries();

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    for info in &listing {
        let wem = info
            .wem_id
            .map_or_else(|| "-".to_string(), |w| w.to_string());
        let name = dict.lookup(info.content_id).unwrap_or("");
        println!(
            "{:#018x} {:>10} {:>15} {:>6} Hz {:>2} ch {:>10} B  {}",
            info.content_id, wem, info.codec, info.sample_rate, info.channels, info.length, name
        );
    }

    println!("\nTotal: {} streams", listing.len());

    Ok(())
}

fn cmd_extract(
    archive_path: &Path,
    id: &str,
    wem_id: Option<u32>,
    output: &Path,
    mode: Mode,
    raw_dump: bool,
    dict_path: Option<&Path>,
) -> Result<()> {
    let session = ExtractionSession::open(archive_path)
        .context("Failed to open archive")?
        .with_raw_dump(raw_dump);
    let dict = load_dict(dict_path)?;

    let content_id = parse_id(id);
    let audio = session
        .extract(content_id, wem_id, mode.into())
        .with_context(|| format!("Failed to extract {content_id:#018x}"))?;

    fs::create_dir_all(output).context("Failed to create output directory")?;
    let path = output.join(stream_name(&dict, audio.content_id, audio.wem_id, mode));
    fs::write(&path, &audio.payload).context("Failed to write output file")?;

    println!(
        "Wrote {} ({} bytes, {} @ {} Hz, {} ch)",
        path.display(),
        audio.payload.len(),
        audio.codec,
        audio.sample_rate,
        audio.channels
    );

    Ok(())
}

fn cmd_extract_all(
    archive_path: &Path,
    output: &Path,
    mode: Mode,
    raw_dump: bool,
    dict_path: Option<&Path>,
    quiet: bool,
) -> Result<()> {
    println!("Opening archive: {}", archive_path.display());

    let start = Instant::now();
    let session = ExtractionSession::open(archive_path)
        .context("Failed to open archive")?
        .with_raw_dump(raw_dump);
    let dict = load_dict(dict_path)?;

    println!(
        "Loaded {} index entries in {:?}",
        session.archive().entry_count(),
        start.elapsed()
    );

    fs::create_dir_all(output).context("Failed to create output directory")?;

    let start = Instant::now();
    let outcomes = session.extract_all(mode.into(), &CancelToken::new());

    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(outcomes.len() as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let mut written = 0;
    let mut errors = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(audio) => {
                let path = output.join(stream_name(&dict, audio.content_id, audio.wem_id, mode));
                fs::write(&path, &audio.payload)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                written += 1;
            }
            Err(e) => {
                let wem = outcome
                    .wem_id
                    .map_or_else(String::new, |w| format!(" stream {w}"));
                eprintln!(
                    "Error extracting {:#018x}{}: {}",
                    outcome.content_id, wem, e
                );
                errors += 1;
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Done");
    println!(
        "Extracted {} streams in {:?} ({} errors)",
        written,
        start.elapsed(),
        errors
    );

    if errors > 0 {
        anyhow::bail!("{} of {} items failed", errors, outcomes.len());
    }

    Ok(())
}

fn load_dict(path: Option<&Path>) -> Result<PathDictionary> {
    match path {
        Some(path) => PathDictionary::load(path)
            .with_context(|| format!("Failed to load path dictionary {}", path.display())),
        None => Ok(PathDictionary::new()),
    }
}

/// Resolve a user-supplied id: hex with `0x`, bare decimal, or a
/// resource path to hash.
fn parse_id(input: &str) -> u64 {
    if let Some(hex) = input.strip_prefix("0x") {
        if let Ok(id) = u64::from_str_radix(hex, 16) {
            return id;
        }
    }
    if let Ok(id) = input.parse::<u64>() {
        return id;
    }
    PathDictionary::hash_path(input)
}

/// Output file name: dictionary name when known, hex id otherwise, with
/// the bank stream id as a suffix.
fn stream_name(
    dict: &PathDictionary,
    content_id: u64,
    wem_id: Option<u32>,
    mode: Mode,
) -> String {
    let ext = match mode {
        Mode::Passthrough => "wem",
        Mode::Pcm => "wav",
    };

    // Resource paths use `\` separators regardless of host platform.
    let base = dict
        .lookup(content_id)
        .map(|path| {
            let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
            name.rsplit_once('.').map_or(name, |(stem, _)| stem).to_string()
        })
        .unwrap_or_else(|| format!("{content_id:016x}"));

    match wem_id {
        Some(wem) => format!("{base}_{wem}.{ext}"),
        None => format!("{base}.{ext}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_forms() {
        assert_eq!(parse_id("0xff"), 255);
        assert_eq!(parse_id("1234"), 1234);
        assert_eq!(
            parse_id("base/sound/music.wem"),
            PathDictionary::hash_path("base\\sound\\music.wem")
        );
    }

    #[test]
    fn test_stream_name_forms() {
        let mut dict = PathDictionary::new();
        let id = dict.add("base\\sound\\soundbanks\\radio_station_01.bnk");

        assert_eq!(
            stream_name(&dict, id, Some(42), Mode::Passthrough),
            "radio_station_01_42.wem"
        );
        assert_eq!(
            stream_name(&PathDictionary::new(), 0xAB, None, Mode::Pcm),
            "00000000000000ab.wav"
        );
    }
}
