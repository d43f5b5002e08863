use clap::{Parser, Subcommand};
use std::path::PathBuf;

use ghstretch_core::compositor::apply_point_transform;
use ghstretch_core::config::set_verbose;
use ghstretch_core::histogram::{HistogramAnalyzer, HistogramChannel};
use ghstretch_core::mask::{blend_with_original, MaskView};
use ghstretch_core::presets;
use ghstretch_core::{ChannelMode, StretchKind, StretchParameters, TransformEngine};

mod png_io;

#[derive(Parser)]
#[command(name = "ghstretch")]
#[command(version, about = "Generalised hyperbolic stretch for deep-sky images", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stretch an image and write the result
    Apply {
        /// Input PNG file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file (default: <input>_stretched.png)
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,

        /// Stretch preset file
        #[arg(short, long, value_name = "FILE")]
        preset: Option<PathBuf>,

        /// Transform kind: generalised_hyperbolic, histogram_transformation,
        /// arcsinh, linear, inversion, stf
        #[arg(short, long, value_name = "KIND")]
        kind: Option<String>,

        /// Stretch intensity D (0 = identity)
        #[arg(short, long, value_name = "FLOAT")]
        d: Option<f64>,

        /// Local stretch intensity b
        #[arg(short, long, value_name = "FLOAT")]
        b: Option<f64>,

        /// Symmetry point SP
        #[arg(long, value_name = "FLOAT")]
        sp: Option<f64>,

        /// Shadow protection point LP
        #[arg(long, value_name = "FLOAT")]
        lp: Option<f64>,

        /// Highlight protection point HP
        #[arg(long, value_name = "FLOAT")]
        hp: Option<f64>,

        /// Black point (linear stretch)
        #[arg(long, value_name = "FLOAT")]
        bp: Option<f64>,

        /// White point (linear stretch)
        #[arg(long, value_name = "FLOAT")]
        wp: Option<f64>,

        /// Channel mode: red, green, blue, rgb, lightness, saturation,
        /// luminance
        #[arg(short, long, value_name = "MODE")]
        channel: Option<String>,

        /// Apply the inverse transform
        #[arg(long)]
        invert: bool,

        /// Mask PNG blending the stretch against the original
        #[arg(short, long, value_name = "FILE")]
        mask: Option<PathBuf>,

        /// Invert the mask weights
        #[arg(long)]
        invert_mask: bool,

        /// STF: stretch each channel by its own statistics
        #[arg(long)]
        unlinked: bool,
    },

    /// Print image statistics and suggested stretch anchors
    Analyze {
        /// Input PNG file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Sample count for the clip-level suggestions
        #[arg(long, value_name = "COUNT", default_value = "100.0")]
        clip_count: f64,
    },

    /// Manage stretch presets
    Preset {
        #[command(subcommand)]
        action: PresetAction,
    },
}

#[derive(Subcommand)]
enum PresetAction {
    /// List available presets
    List {
        /// Directory to list presets from
        #[arg(short, long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },

    /// Show details of a preset
    Show {
        /// Preset name or file path
        preset: String,
    },

    /// Create a new preset template
    Create {
        /// Output file path
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    set_verbose(cli.verbose);

    let result = match cli.command {
        Commands::Apply {
            input,
            out,
            preset,
            kind,
            d,
            b,
            sp,
            lp,
            hp,
            bp,
            wp,
            channel,
            invert,
            mask,
            invert_mask,
            unlinked,
        } => cmd_apply(
            input, out, preset, kind, d, b, sp, lp, hp, bp, wp, channel, invert, mask,
            invert_mask, unlinked,
        ),

        Commands::Analyze { input, clip_count } => cmd_analyze(input, clip_count),

        Commands::Preset { action } => match action {
            PresetAction::List { dir } => cmd_preset_list(dir),
            PresetAction::Show { preset } => cmd_preset_show(preset),
            PresetAction::Create { output } => cmd_preset_create(output),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Parse a snake_case enum value the same way preset YAML spells it.
fn parse_yaml_enum<T: serde::de::DeserializeOwned>(what: &str, value: &str) -> Result<T, String> {
    serde_yaml::from_str(value).map_err(|_| format!("Unknown {}: {}", what, value))
}

#[allow(clippy::too_many_arguments)]
fn cmd_apply(
    input: PathBuf,
    out: Option<PathBuf>,
    preset: Option<PathBuf>,
    kind: Option<String>,
    d: Option<f64>,
    b: Option<f64>,
    sp: Option<f64>,
    lp: Option<f64>,
    hp: Option<f64>,
    bp: Option<f64>,
    wp: Option<f64>,
    channel: Option<String>,
    invert: bool,
    mask: Option<PathBuf>,
    invert_mask: bool,
    unlinked: bool,
) -> Result<(), String> {
    let mut params = match preset {
        Some(path) => presets::load_preset(path)?,
        None => StretchParameters::default(),
    };
    if let Some(k) = kind {
        params.kind = parse_yaml_enum::<StretchKind>("transform kind", &k)?;
    }
    if let Some(c) = channel {
        params.channel_mode = parse_yaml_enum::<ChannelMode>("channel mode", &c)?;
    }
    if let Some(v) = d {
        params.d = v;
    }
    if let Some(v) = b {
        params.b = v;
    }
    if let Some(v) = sp {
        params.sp = v;
    }
    if let Some(v) = lp {
        params.lp = v;
    }
    if let Some(v) = hp {
        params.hp = v;
    }
    if let Some(v) = bp {
        params.bp = v;
    }
    if let Some(v) = wp {
        params.wp = v;
    }
    params.invert = invert;
    params.stf_linked = !unlinked;

    if params.kind == StretchKind::Blend {
        return Err("The blend kind needs a second live view and is not available here".to_string());
    }

    let image = png_io::read_png(&input)?;
    println!(
        "Loaded {}: {}x{}, {} channel(s)",
        input.display(),
        image.width(),
        image.height(),
        image.channels()
    );

    let mut engine = TransformEngine::new(&params)?;
    if params.kind == StretchKind::Stf {
        let mut analyzer =
            HistogramAnalyzer::new(&image, params.normalized_lum_coefficients());
        engine.set_stf(analyzer.derive_stf_curves(params.stf_linked)?);
    }

    let original = image.clone();
    let mut working = image;
    apply_point_transform(&mut working, &engine)?;

    if let Some(mask_path) = mask {
        let mask_image = png_io::read_png(&mask_path)?;
        let view = MaskView::new(&mask_image, invert_mask);
        blend_with_original(&mut working, &original, &view)?;
    }

    for v in working.data_mut() {
        *v = if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
    }

    let out = out.unwrap_or_else(|| default_output_path(&input));
    png_io::write_png16(&working, &out)?;
    println!("Wrote {}", out.display());
    Ok(())
}

fn default_output_path(input: &PathBuf) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    input.with_file_name(format!("{}_stretched.png", stem))
}

fn cmd_analyze(input: PathBuf, clip_count: f64) -> Result<(), String> {
    let image = png_io::read_png(&input)?;
    println!(
        "{}: {}x{}, {} channel(s)",
        input.display(),
        image.width(),
        image.height(),
        image.channels()
    );

    let coeffs = StretchParameters::default().normalized_lum_coefficients();
    let mut analyzer = HistogramAnalyzer::new(&image, coeffs);

    let names = if image.channels() == 1 {
        vec![("K", HistogramChannel::Direct(0))]
    } else {
        vec![
            ("R", HistogramChannel::Direct(0)),
            ("G", HistogramChannel::Direct(1)),
            ("B", HistogramChannel::Direct(2)),
        ]
    };

    for (name, channel) in &names {
        let (median, mad) = analyzer.median_and_mad(*channel)?;
        let ends = analyzer.histogram_for(*channel)?.ends();
        println!(
            "  {}: median {:.5}  mad {:.5}  range [{:.5}, {:.5}]  populated bins {}",
            name, median, mad, ends.low, ends.high, ends.non_empty_bins
        );
    }

    let channels: Vec<HistogramChannel> = names.iter().map(|&(_, c)| c).collect();
    let low = analyzer.clip_level_from_low_count(clip_count, &channels)?;
    let high = analyzer.clip_level_from_high_count(clip_count, &channels)?;
    println!(
        "Suggested anchors for {} clipped samples: BP {:.5}, WP {:.5}",
        clip_count, low, high
    );

    let curves = analyzer.derive_stf_curves(true)?;
    println!(
        "Linked STF: shadows {:.5}, midtone {:.5}, highlights {:.5}",
        curves[0].shadows, curves[0].midtone, curves[0].highlights
    );
    Ok(())
}

fn cmd_preset_list(dir: Option<PathBuf>) -> Result<(), String> {
    let dir = match dir {
        Some(d) => d,
        None => presets::get_presets_dir()?,
    };
    let mut names = presets::list_presets(&dir)?;
    names.sort();
    if names.is_empty() {
        println!("No presets found in {}", dir.display());
    } else {
        println!("Presets in {}:", dir.display());
        for name in names {
            println!("  {}", name);
        }
    }
    Ok(())
}

fn cmd_preset_show(preset: String) -> Result<(), String> {
    // Direct paths are used as-is; bare names resolve in the presets dir
    let path = if preset.ends_with(".yml") || preset.ends_with(".yaml") {
        PathBuf::from(preset)
    } else {
        presets::validate_preset_name(&preset)?;
        presets::get_presets_dir()?.join(format!("{}.yml", preset))
    };
    let params = presets::load_preset(&path)?;
    let yaml = serde_yaml::to_string(&params)
        .map_err(|e| format!("Failed to serialize preset: {}", e))?;
    println!("{}", yaml);
    Ok(())
}

fn cmd_preset_create(output: PathBuf) -> Result<(), String> {
    let params = StretchParameters {
        kind: StretchKind::GeneralisedHyperbolic,
        d: 2.0,
        b: 1.0,
        sp: 0.1,
        ..StretchParameters::default()
    };
    presets::save_preset(&params, &output)?;
    println!("Created preset template {}", output.display());
    Ok(())
}
