use anyhow::{Context, Result, bail};
use bait_maker::{
    EditorSession, ExportMode,
    config::Config,
    logic::{engine, export, layer_file::LayerFile},
};
use clap::{Args, Parser, Subcommand};
use sketch_effect::{OutlineMode, SketchParams, TextInk, TextLayer};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bait-maker", version, about = "Pencil-sketch bait stencil maker")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sketch an image, burn in text and export transparent PNG stencils
    Sketch(SketchArgs),

    /// Print the active configuration file
    Config {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct SketchArgs {
    /// Input image (png, jpeg, bmp or webp)
    input: PathBuf,

    /// Pencil tip size, 1..=51
    #[arg(long)]
    tip_size: Option<u32>,

    /// Tonal range, -5..=5
    #[arg(long, allow_negative_numbers = true)]
    range: Option<f32>,

    /// Text layer content, repeat for more layers
    #[arg(long = "text")]
    texts: Vec<String>,

    /// Center of the matching --text as X,Y in image pixels
    #[arg(long = "at", value_parser = parse_point)]
    positions: Vec<(i32, i32)>,

    /// Font size of the matching --text
    #[arg(long = "font-size")]
    font_sizes: Vec<u32>,

    /// Ink of the matching --text: bait or erase
    #[arg(long = "ink")]
    inks: Vec<TextInk>,

    /// Outline of the matching --text: none, opposite, black or white
    #[arg(long = "outline")]
    outlines: Vec<OutlineMode>,

    /// TOML file with [[layer]] entries, drawn before the --text layers
    #[arg(long)]
    layers: Option<PathBuf>,

    #[arg(long, value_enum)]
    mode: Option<ExportMode>,

    /// Output directory
    #[arg(long)]
    out: Option<PathBuf>,

    /// TrueType/OpenType font file
    #[arg(long)]
    font: Option<PathBuf>,

    /// Also write the downscaled preview to this file
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Make background colored pixels transparent in the exported stencils
    #[arg(long)]
    color_clearer: bool,

    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_point(s: &str) -> Result<(i32, i32), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got `{s}`"))?;

    let x = x.trim().parse().map_err(|e| format!("bad x `{x}`: {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad y `{y}`: {e}"))?;
    Ok((x, y))
}

fn main() -> Result<()> {
    bait_maker::init_logger();

    match Cli::parse().command {
        Command::Sketch(args) => sketch(args),
        Command::Config { config } => {
            let config = Config::init(config.as_deref())?;
            println!("# {}", config.config_path.display());
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn sketch(args: SketchArgs) -> Result<()> {
    if args.positions.len() > args.texts.len() {
        bail!("{} --at given for {} --text", args.positions.len(), args.texts.len());
    }

    let mut config = Config::init(args.config.as_deref())?;
    if args.color_clearer {
        config.export.color_clearer = true;
    }

    let mut session = EditorSession::new(config.session_config());
    let font_path = args.font.clone().or_else(|| config.overlay.font_path.clone());
    session.install_engine(engine::load_engine(font_path.as_deref()));

    session
        .load_path(&args.input)
        .with_context(|| format!("load {} failed", args.input.display()))?;

    session.set_params(SketchParams::new(
        args.tip_size.unwrap_or(config.sketch.tip_size),
        args.range.unwrap_or(config.sketch.range),
    ));

    if let Some(path) = &args.layers {
        for layer in LayerFile::load(path)?.to_layers(config.overlay.font_size).iter() {
            session.add_layer(layer.clone());
        }
    }

    let (width, height) = session.source_dimensions().context("no image loaded")?;

    for (i, content) in args.texts.iter().enumerate() {
        let (x, y) = args
            .positions
            .get(i)
            .copied()
            .unwrap_or((width as i32 / 2, height as i32 / 2));

        let layer = TextLayer::new(content, x, y)
            .with_font_size(args.font_sizes.get(i).copied().unwrap_or(config.overlay.font_size))
            .with_ink(args.inks.get(i).copied().unwrap_or_default())
            .with_outline(args.outlines.get(i).copied().unwrap_or_default());

        session.add_layer(layer);
    }

    if let Some(path) = &args.preview {
        let preview = session.render_preview()?;
        preview
            .image
            .save(path)
            .with_context(|| format!("save preview {} failed", path.display()))?;
        log::info!("preview written to {}", path.display());
    }

    let mode = args.mode.unwrap_or(config.export.mode);
    let artifacts = session.export(mode)?;

    let out_dir = args.out.unwrap_or(config.export.output_dir);
    for path in export::write_artifacts(&out_dir, &artifacts)? {
        println!("{}", path.display());
    }

    log::info!("{}", session.status());
    Ok(())
}
