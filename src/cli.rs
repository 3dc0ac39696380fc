// ============================================================================
// PhotoJot CLI — headless photo filtering and note rendering
// ============================================================================
//
// Usage examples:
//   photojot edit -i photo.jpg --filter sepia=0.8 --filter pixellate=12 -o out.png
//   photojot edit -i photo.jpg --random --seed 42 -o out.jpg --quality 85
//   photojot edit -i photo.jpg --saturation 1.3 --brightness -0.1 -o out.png
//   photojot edit -i photo.jpg --chain chain.json -o out.png
//   photojot note -o note.png --title "Morning" --content "Clear skies." \
//       --weather 3 --image a.png --image b.png
//
// All processing runs synchronously on the current thread; only the pixel
// loops inside the filter cores fan out over rayon.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use image::Rgba;
use rand::rngs::SmallRng;
use rand::{SeedableRng, thread_rng};
use serde::Deserialize;

use crate::chain::{FilterDescriptor, FilterKind};
use crate::io::{SaveFormat, encode_and_write, load_image};
use crate::note::{Note, Weather, render_note};
use crate::ops::adjustments::ColorAdjustments;
use crate::ops::effects;
use crate::session::EditSession;
use crate::{log_err, log_info, logger, text};

/// PhotoJot headless photo journal.
///
/// Apply filter chains to photos and compose shareable note images without a
/// GUI.
#[derive(Parser, Debug)]
#[command(
    name = "photojot",
    about = "PhotoJot — photo filters and journal notes, headless",
    long_about = "Apply an ordered chain of image filters to a photo, or render a\n\
                  journal note (title, date, weather, text, attached photos) to a\n\
                  shareable image.\n\n\
                  Examples:\n  \
                  photojot edit -i photo.jpg --filter sepia=0.8 -o out.png\n  \
                  photojot edit -i photo.jpg --random -o out.png\n  \
                  photojot note -o note.png --title \"Morning\" --image a.png"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply a filter chain to a photo and export the result.
    Edit(EditArgs),
    /// Compose a journal note and render it to an image.
    Note(NoteArgs),
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Input photo (png, jpeg, bmp, and anything else the decoder knows).
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Output path. Format is inferred from the extension (default png).
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Filter step, applied in the order given. Repeatable.
    /// Specs: sepia=I, pixellate=S, crystallize=R, twirl=R,CX,CY.
    /// Out-of-range values are clamped against the input dimensions.
    #[arg(short, long = "filter", value_name = "SPEC")]
    pub filters: Vec<String>,

    /// JSON chain description file (a list of {kind, arg0, arg1, arg2}).
    /// Mutually additive with --filter; chain file entries come first.
    #[arg(long, value_name = "FILE.json")]
    pub chain: Option<PathBuf>,

    /// Append 2–6 random filters ("Random Effect").
    #[arg(long)]
    pub random: bool,

    /// Saturation multiplier (0–2, 1 = unchanged), applied before the chain.
    #[arg(long, default_value_t = 1.0, value_name = "0-2")]
    pub saturation: f64,

    /// Brightness offset (-1–1, 0 = unchanged), applied before the chain.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true, value_name = "-1-1")]
    pub brightness: f64,

    /// Contrast multiplier (0–2, 1 = unchanged), applied before the chain.
    #[arg(long, default_value_t = 1.0, value_name = "0-2")]
    pub contrast: f64,

    /// Seed for --random; omitted means a fresh draw every run.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// JPEG quality (1–100, default 90).
    #[arg(short, long, default_value_t = 90, value_name = "1-100")]
    pub quality: u8,

    /// Print the applied chain and timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Args, Debug)]
pub struct NoteArgs {
    /// Output path for the rendered note image.
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    #[arg(long, default_value = "")]
    pub title: String,

    /// Display date string, e.g. "2021-12-05 18:30".
    #[arg(long, default_value = "")]
    pub date: String,

    /// Weather stamp: 0 sunny, 1 windy, 2 cloudy, 3 partly cloudy, 4 rainy.
    #[arg(long, default_value_t = 0, value_name = "0-4")]
    pub weather: u8,

    /// Note body text.
    #[arg(long, default_value = "")]
    pub content: String,

    /// Attached photo. Repeatable; order is preserved in the grid.
    #[arg(long = "image", value_name = "FILE")]
    pub images: Vec<PathBuf>,

    /// Text color as RRGGBB hex.
    #[arg(long, default_value = "000000", value_name = "RRGGBB")]
    pub font_color: String,

    /// Background color as RRGGBB hex.
    #[arg(long, default_value = "808080", value_name = "RRGGBB")]
    pub background_color: String,

    /// Rendered note width in pixels.
    #[arg(long, default_value_t = 600, value_name = "PX")]
    pub width: u32,

    /// JPEG quality (1–100, default 90).
    #[arg(short, long, default_value_t = 90, value_name = "1-100")]
    pub quality: u8,
}

/// Entry of a JSON chain description file.
#[derive(Deserialize, Debug)]
struct ChainFileEntry {
    kind: FilterKind,
    #[serde(default)]
    arg0: f64,
    #[serde(default)]
    arg1: f64,
    #[serde(default)]
    arg2: f64,
}

/// Run the parsed CLI and return an OS exit code.
pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Edit(args) => run_edit(args),
        Command::Note(args) => run_note(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log_err!("{}", e);
            eprintln!("error: {}", e);
            if let Some(path) = logger::log_path() {
                eprintln!("session log: {}", path.display());
            }
            ExitCode::FAILURE
        }
    }
}

fn run_edit(args: EditArgs) -> Result<(), String> {
    let start = Instant::now();
    let source = load_image(&args.input)?;
    let (w, h) = (source.width() as f64, source.height() as f64);
    let mut session = EditSession::new(source);

    let grade = ColorAdjustments {
        saturation: args.saturation,
        brightness: args.brightness,
        contrast: args.contrast,
    };
    if !grade.is_identity() {
        session.set_adjustments(grade);
    }

    if let Some(chain_path) = &args.chain {
        let text = std::fs::read_to_string(chain_path)
            .map_err(|e| format!("could not read chain file '{}': {}", chain_path.display(), e))?;
        let entries: Vec<ChainFileEntry> = serde_json::from_str(&text)
            .map_err(|e| format!("bad chain file '{}': {}", chain_path.display(), e))?;
        for entry in entries {
            session.push_filter(FilterDescriptor::with_args(
                entry.kind, w, h, entry.arg0, entry.arg1, entry.arg2,
            ));
        }
    }

    for spec in &args.filters {
        let descriptor = parse_filter_spec(spec, w, h)?;
        session.push_filter(descriptor);
    }

    if args.random {
        match args.seed {
            Some(seed) => session.add_random_filters(&mut SmallRng::seed_from_u64(seed)),
            None => session.add_random_filters(&mut thread_rng()),
        }
    }

    if args.verbose {
        if !session.adjustments().is_identity() {
            let a = session.adjustments();
            println!(
                "  grade sat={:.2} bri={:.2} con={:.2}",
                a.saturation, a.brightness, a.contrast
            );
        }
        for d in session.chain() {
            println!(
                "  {} arg0={:.2} arg1={:.2} arg2={:.2}",
                d.kind.label(),
                d.arg0,
                d.arg1,
                d.arg2
            );
        }
    }

    let format = SaveFormat::from_path(&args.output);
    let output = if format == SaveFormat::Jpeg {
        // JPEG drops alpha; composite over white first.
        effects::flatten_onto(session.output(), Rgba([255, 255, 255, 255]))
    } else {
        session.output().clone()
    };
    encode_and_write(&output, &args.output, format, args.quality)?;
    log_info!(
        "edit: {} -> {} ({} steps)",
        args.input.display(),
        args.output.display(),
        session.chain().len()
    );

    if args.verbose {
        println!(
            "{} ({:.0}ms)",
            args.output.display(),
            start.elapsed().as_secs_f64() * 1000.0
        );
    }
    Ok(())
}

fn run_note(args: NoteArgs) -> Result<(), String> {
    let mut note = Note {
        title: args.title,
        date: args.date,
        weather: Weather::from_index(args.weather),
        content: args.content,
        font_color: parse_hex_color(&args.font_color)?,
        background_color: parse_hex_color(&args.background_color)?,
        images: Vec::new(),
    };
    for path in &args.images {
        note.attach_image(load_image(path)?);
    }

    let font = text::resolve_font()?;
    let rendered = render_note(&note, &font, args.width);

    let format = SaveFormat::from_path(&args.output);
    encode_and_write(&rendered, &args.output, format, args.quality)?;
    log_info!(
        "note: '{}' [{}] ({} photos) -> {}",
        note.title,
        note.weather.label(),
        note.images.len(),
        args.output.display()
    );
    Ok(())
}

/// Parse an inline filter spec (`sepia=0.8`, `twirl=40,100,120`, ...).
/// Values are clamped against the loaded image's bounds, mirroring what the
/// sliders would allow.
fn parse_filter_spec(spec: &str, width: f64, height: f64) -> Result<FilterDescriptor, String> {
    let (name, rest) = spec
        .split_once('=')
        .ok_or_else(|| format!("bad filter spec '{}': expected name=value", spec))?;

    let values: Vec<f64> = rest
        .split(',')
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .map_err(|_| format!("bad filter spec '{}': '{}' is not a number", spec, v))
        })
        .collect::<Result<_, _>>()?;

    let arg = |i: usize| values.get(i).copied().unwrap_or(0.0);
    let (kind, expected) = match name.trim().to_lowercase().as_str() {
        "sepia" | "sepiatone" => (FilterKind::SepiaTone, 1),
        "pixellate" | "pixelate" => (FilterKind::Pixellate, 1),
        "crystallize" => (FilterKind::Crystallize, 1),
        "twirl" | "twirldistortion" => (FilterKind::TwirlDistortion, 3),
        other => return Err(format!("unknown filter '{}'", other)),
    };
    if values.len() != expected {
        return Err(format!(
            "filter '{}' takes {} value(s), got {}",
            name,
            expected,
            values.len()
        ));
    }

    Ok(FilterDescriptor::with_args(
        kind,
        width,
        height,
        arg(0),
        arg(1),
        arg(2),
    ))
}

/// Parse an RRGGBB hex color (an optional leading '#' is tolerated).
fn parse_hex_color(s: &str) -> Result<Rgba<u8>, String> {
    let hex = s.trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("bad color '{}': expected RRGGBB hex", s));
    }
    let r = u8::from_str_radix(&hex[0..2], 16).unwrap();
    let g = u8::from_str_radix(&hex[2..4], 16).unwrap();
    let b = u8::from_str_radix(&hex[4..6], 16).unwrap();
    Ok(Rgba([r, g, b, 255]))
}
