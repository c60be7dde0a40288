//! inkgrid CLI — drive the digit pad pipeline from images and stroke recordings.

mod chart;

use clap::{Args, Parser, Subcommand};
use image::GrayImage;
use inkgrid::{
    Classifier, MlpClassifier, Normalized, Normalizer, PadConfig, PadEvent, PassReport,
    PipelineError, Readiness, Renderer, Session,
};
use std::path::{Path, PathBuf};

use chart::TextBarChart;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

const CHART_WIDTH: usize = 40;

#[derive(Parser)]
#[command(name = "inkgrid")]
#[command(about = "Normalize hand-drawn digits to a 28x28 grid and classify them")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a drawing image and classify it.
    Classify(ClassifyArgs),

    /// Replay recorded strokes through a pad session.
    Replay(ReplayArgs),

    /// Normalize a drawing image without classifying.
    Normalize(NormalizeArgs),

    /// Print the default pad configuration (JSON).
    ConfigDump,
}

#[derive(Debug, Clone, Args)]
struct ClassifyArgs {
    /// Path to the drawing image (dark ink on a light background).
    #[arg(long)]
    image: PathBuf,

    /// Path to the classifier weights blob.
    #[arg(long)]
    weights: PathBuf,

    /// Optional pad configuration (JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to write the pass report (JSON).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Path to write the normalized target raster (PNG).
    #[arg(long)]
    target_png: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct ReplayArgs {
    /// Stroke recording: `{"strokes": [[[x, y], ...], ...]}` in surface pixels.
    #[arg(long)]
    strokes: PathBuf,

    /// Path to the classifier weights blob.
    #[arg(long)]
    weights: PathBuf,

    /// Optional pad configuration (JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to write the pass report (JSON).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct NormalizeArgs {
    /// Path to the drawing image.
    #[arg(long)]
    image: PathBuf,

    /// Optional pad configuration (JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to write the pass report (JSON).
    #[arg(long)]
    out: PathBuf,

    /// Path to write the normalized target raster (PNG).
    #[arg(long)]
    target_png: Option<PathBuf>,
}

#[derive(Debug, serde::Deserialize)]
struct StrokeFile {
    strokes: Vec<Vec<[f32; 2]>>,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Classify(args) => run_classify(&args),
        Commands::Replay(args) => run_replay(&args),
        Commands::Normalize(args) => run_normalize(&args),
        Commands::ConfigDump => run_config_dump(),
    }
}

// ── shared helpers ─────────────────────────────────────────────────────

fn load_config(path: Option<&Path>) -> CliResult<PadConfig> {
    match path {
        Some(path) => {
            tracing::info!("Loading config: {}", path.display());
            let config = PadConfig::from_json_file(path).map_err(|e| -> CliError {
                format!("Invalid config {}: {}", path.display(), e).into()
            })?;
            Ok(config)
        }
        None => Ok(PadConfig::default()),
    }
}

fn load_classifier(path: &Path, config: &PadConfig) -> CliResult<MlpClassifier> {
    tracing::info!("Loading weights: {}", path.display());
    let classifier = MlpClassifier::from_file(path).map_err(|e| -> CliError {
        format!("Failed to load weights {}: {}", path.display(), e).into()
    })?;
    if classifier.input_len() != config.tensor_len() {
        return Err(PipelineError::InputLenMismatch {
            tensor: config.tensor_len(),
            classifier: classifier.input_len(),
        }
        .into());
    }
    tracing::info!("Classifier: {} layers", classifier.n_layers());
    Ok(classifier)
}

/// Load an image as a working raster: flattened onto the background and
/// resized to `working_size × working_size`.
fn load_working_raster(path: &Path, config: &PadConfig) -> CliResult<GrayImage> {
    tracing::info!("Loading image: {}", path.display());

    let img = image::open(path).map_err(|e| -> CliError {
        format!("Failed to open image {}: {}", path.display(), e).into()
    })?;
    let (w, h) = (img.width(), img.height());
    tracing::info!("Image size: {}x{}", w, h);

    let gray = if img.color().has_alpha() {
        let bg = config.background as u32;
        let la = img.to_luma_alpha8();
        GrayImage::from_fn(w, h, |x, y| {
            let [l, a] = la.get_pixel(x, y).0;
            let (l, a) = (l as u32, a as u32);
            image::Luma([((l * a + bg * (255 - a) + 127) / 255) as u8])
        })
    } else {
        img.to_luma8()
    };

    if w != h {
        tracing::warn!("Image is not square; it will be stretched to the working raster");
    }
    let size = config.working_size;
    if (w, h) == (size, size) {
        return Ok(gray);
    }
    tracing::debug!("Resizing {}x{} -> {}x{}", w, h, size, size);
    Ok(image::imageops::resize(
        &gray,
        size,
        size,
        image::imageops::FilterType::Triangle,
    ))
}

fn log_pass(normalized: &Normalized) {
    match (&normalized.bbox, &normalized.region) {
        (Some(bbox), Some(region)) => tracing::info!(
            "Ink box: [{}, {}]..[{}, {}], source region {:.1}x{:.1} at ({:.1}, {:.1})",
            bbox.min_x,
            bbox.min_y,
            bbox.max_x,
            bbox.max_y,
            region.width,
            region.height,
            region.x,
            region.y,
        ),
        _ => tracing::info!("No ink found; tensor is all zeros"),
    }
}

fn write_outputs(
    report: &PassReport,
    normalized: &Normalized,
    out: Option<&Path>,
    target_png: Option<&Path>,
) -> CliResult<()> {
    if let Some(out) = out {
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(out, &json)?;
        tracing::info!("Report written to {}", out.display());
    }
    if let Some(png) = target_png {
        normalized.target.save(png)?;
        tracing::info!("Target raster written to {}", png.display());
    }
    Ok(())
}

fn print_scores(chart: &TextBarChart, report: &PassReport) {
    if let Some(scores) = &report.scores {
        print!("{}", chart.draw(scores));
    }
    if let Some(digit) = report.predicted {
        println!("predicted: {}", digit);
    }
}

// ── classify ───────────────────────────────────────────────────────────

fn run_classify(args: &ClassifyArgs) -> CliResult<()> {
    let config = load_config(args.config.as_deref())?;
    let classifier = load_classifier(&args.weights, &config)?;
    let working = load_working_raster(&args.image, &config)?;

    let normalized = Normalizer::new(config).normalize(&working);
    log_pass(&normalized);

    let mut chart = TextBarChart::new(CHART_WIDTH);
    let scores = classifier.predict(&normalized.tensor);
    chart.render(&scores);

    let report = PassReport::new(working.dimensions().into(), &normalized, Some(scores));
    print_scores(&chart, &report);
    write_outputs(
        &report,
        &normalized,
        args.out.as_deref(),
        args.target_png.as_deref(),
    )
}

// ── replay ─────────────────────────────────────────────────────────────

fn run_replay(args: &ReplayArgs) -> CliResult<()> {
    let config = load_config(args.config.as_deref())?;

    tracing::info!("Loading strokes: {}", args.strokes.display());
    let data = std::fs::read_to_string(&args.strokes)?;
    let recording: StrokeFile = serde_json::from_str(&data).map_err(|e| -> CliError {
        format!("Invalid stroke file {}: {}", args.strokes.display(), e).into()
    })?;

    let mut session = Session::new(config.clone(), TextBarChart::new(CHART_WIDTH))?
        .finish_loading(load_classifier(&args.weights, &config));
    if session.readiness() != Readiness::Ready {
        let reason = session.failure().unwrap_or("classifier unavailable");
        return Err(reason.to_string().into());
    }

    let mut moves = 0usize;
    for stroke in &recording.strokes {
        session.handle(PadEvent::Down)?;
        for &point in stroke {
            session.handle(PadEvent::Move(point))?;
            moves += 1;
        }
        session.handle(PadEvent::Up)?;
    }
    tracing::info!(
        "Replayed {} strokes ({} moves, {} frames rendered)",
        recording.strokes.len(),
        moves,
        session.renderer().frames(),
    );

    let pipeline = session
        .pipeline()
        .ok_or_else(|| -> CliError { "session left the ready state".into() })?;
    let normalized = pipeline.inspect();
    log_pass(&normalized);

    let report = PassReport::new(
        pipeline.surface().raster().dimensions().into(),
        &normalized,
        Some(pipeline.scores()),
    );
    print_scores(session.renderer(), &report);
    write_outputs(&report, &normalized, args.out.as_deref(), None)
}

// ── normalize ──────────────────────────────────────────────────────────

fn run_normalize(args: &NormalizeArgs) -> CliResult<()> {
    let config = load_config(args.config.as_deref())?;
    let working = load_working_raster(&args.image, &config)?;

    let normalized = Normalizer::new(config).normalize(&working);
    log_pass(&normalized);

    let report = PassReport::new(working.dimensions().into(), &normalized, None);
    write_outputs(
        &report,
        &normalized,
        Some(args.out.as_path()),
        args.target_png.as_deref(),
    )
}

// ── config-dump ────────────────────────────────────────────────────────

fn run_config_dump() -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(&PadConfig::default())?);
    Ok(())
}
