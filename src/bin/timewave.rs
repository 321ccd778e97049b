use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use timewave::{AnimationId, HandleKind, Inspector, InspectorDoc, KeyframeEngine, Point, RenderMode};

#[derive(Parser, Debug)]
#[command(name = "timewave", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render every animation's property timeline into one PNG, one row per animation.
    Frame(FrameArgs),
    /// Print each animation's easing graph as SVG path data.
    Easing(DocArgs),
    /// Print tracked properties, times and ruler labels as JSON.
    Inspect(DocArgs),
    /// Replay one drag gesture on the easing editor and print the committed timing.
    Drag(DragArgs),
}

#[derive(Parser, Debug)]
struct DocArgs {
    /// Input animation document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input animation document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Draw only this property.
    #[arg(long)]
    focus: Option<String>,

    /// Override the document's render mode.
    #[arg(long, value_enum)]
    mode: Option<ModeChoice>,
}

#[derive(Parser, Debug)]
struct DragArgs {
    /// Input animation document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Animation id (`animation-1`, ...).
    #[arg(long)]
    animation: String,

    #[arg(long, value_enum)]
    handle: HandleChoice,

    /// Press position `x,y` in easing viewport units.
    #[arg(long, value_parser = parse_point)]
    from: Point,

    /// Release position `x,y` in easing viewport units.
    #[arg(long, value_parser = parse_point)]
    to: Point,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeChoice {
    Curve,
    AreaFill,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum HandleChoice {
    Delay,
    Duration,
    ControlPoint1,
    ControlPoint2,
}

impl From<HandleChoice> for HandleKind {
    fn from(h: HandleChoice) -> Self {
        match h {
            HandleChoice::Delay => Self::Delay,
            HandleChoice::Duration => Self::Duration,
            HandleChoice::ControlPoint1 => Self::ControlPoint1,
            HandleChoice::ControlPoint2 => Self::ControlPoint2,
        }
    }
}

fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y, got '{s}'"))?;
    let x: f64 = x.trim().parse().map_err(|_| format!("bad x in '{s}'"))?;
    let y: f64 = y.trim().parse().map_err(|_| format!("bad y in '{s}'"))?;
    Ok(Point::new(x, y))
}

fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Easing(args) => cmd_easing(args),
        Command::Inspect(args) => cmd_inspect(args),
        Command::Drag(args) => cmd_drag(args),
    }
}

fn read_doc_json(path: &Path) -> anyhow::Result<InspectorDoc> {
    let f = File::open(path).with_context(|| format!("open document '{}'", path.display()))?;
    let r = BufReader::new(f);
    let doc: InspectorDoc = serde_json::from_reader(r).with_context(|| "parse document JSON")?;
    doc.opts.validate()?;
    Ok(doc)
}

fn load(path: &Path, mode: Option<ModeChoice>) -> anyhow::Result<Inspector<KeyframeEngine>> {
    let mut doc = read_doc_json(path)?;
    if let Some(m) = mode {
        doc.opts.mode = match m {
            ModeChoice::Curve => RenderMode::Curve,
            ModeChoice::AreaFill => RenderMode::AreaFill,
        };
    }
    let engine = doc.build_engine()?;
    let mut inspector = Inspector::new(engine, doc.opts)?;
    inspector.discover()?;
    Ok(inspector)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut inspector = load(&args.in_path, args.mode)?;
    let ids: Vec<AnimationId> = inspector.contexts().map(|c| c.id.clone()).collect();
    if ids.is_empty() {
        anyhow::bail!("document has no animations");
    }

    let mut rows = Vec::with_capacity(ids.len());
    for id in &ids {
        let row = inspector
            .composite(id, args.focus.as_deref())
            .with_context(|| format!("composite {id}"))?;
        rows.push(row);
    }
    let frame = timewave::raster::composite::stack_rows(&rows)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.to_straight_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_easing(args: DocArgs) -> anyhow::Result<()> {
    let inspector = load(&args.in_path, None)?;
    for ctx in inspector.contexts() {
        let layout = inspector.easing_layout(&ctx.id)?;
        println!("{}\t{}\t{}", ctx.id, ctx.timing.easing, layout.to_svg_path());
    }
    Ok(())
}

fn cmd_inspect(args: DocArgs) -> anyhow::Result<()> {
    let inspector = load(&args.in_path, None)?;
    let summary: Vec<serde_json::Value> = inspector
        .contexts()
        .map(|ctx| {
            serde_json::json!({
                "id": ctx.id,
                "target": ctx.target.label(),
                "timing": ctx.timing,
                "total_time": ctx.total_time(),
                "display_window": ctx.display_window(),
                "ruler": ctx.ruler_labels(),
                "properties": ctx.properties,
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn cmd_drag(args: DragArgs) -> anyhow::Result<()> {
    let mut inspector = load(&args.in_path, None)?;
    let id = AnimationId::new(args.animation);
    inspector.press_handle(&id, args.handle.into(), args.from)?;
    inspector.drag_move(&id, args.to)?;
    let (timing, report) = inspector
        .release(&id, args.to)?
        .context("drag ended without an active session")?;
    for (property, reason) in &report.failed {
        eprintln!("warning: {property}: {reason}");
    }
    println!("{}", serde_json::to_string_pretty(&timing)?);
    Ok(())
}
