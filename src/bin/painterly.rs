use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use painterly::{
    BrushAsset, FlowParams, LayeredPainter, PaintParams, ReliefParams, SlicParams,
    blur_along_flow, compute_flow, kuwahara, load_params, load_raster, normal_map, output_path,
    save_raster, slic, to_lab,
};

#[derive(Parser, Debug)]
#[command(name = "painterly", version, about = "Non-photorealistic image filters")]
struct Cli {
    /// Worker threads for batch inputs (defaults to all cores).
    #[arg(long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Flow-guided layered brush painting.
    Paint(PaintArgs),
    /// Write the edge-weight preview of the flow field.
    Flow(FlowArgs),
    /// Write a flow-blurred height map and its normal map.
    Relief(ReliefArgs),
    /// SLIC superpixels.
    Slic(SlicArgs),
    /// Kuwahara smoothing.
    Kuwahara(KuwaharaArgs),
}

#[derive(Args, Debug)]
struct Io {
    /// Input images.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory.
    #[arg(long, default_value = "out")]
    out_dir: PathBuf,
}

#[derive(Args, Debug)]
struct PaintArgs {
    #[command(flatten)]
    io: Io,

    /// Brush stencil (grayscale image). A soft round brush is used when omitted.
    #[arg(long)]
    brush: Option<PathBuf>,

    /// JSON parameter file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Brush sizes, comma separated (positive, even).
    #[arg(long, value_delimiter = ',')]
    sizes: Option<Vec<u32>>,

    /// Mean Lab distance that triggers a repaint after the first pass.
    #[arg(long)]
    threshold: Option<f32>,

    /// Maximum stamps per stroke.
    #[arg(long)]
    pastes: Option<usize>,

    /// Number of stencil orientations.
    #[arg(long)]
    directions: Option<usize>,

    /// Structure tensor smoothing sigma.
    #[arg(long, default_value_t = 2.0)]
    tensor_sigma: f32,

    /// Secondary rasters painted with the same strokes, one per input.
    #[arg(long)]
    secondary: Vec<PathBuf>,

    /// Also write the stroke log as `<stem>_strokes.json`.
    #[arg(long, default_value_t = false)]
    dump_strokes: bool,
}

#[derive(Args, Debug)]
struct FlowArgs {
    #[command(flatten)]
    io: Io,

    /// Structure tensor smoothing sigma.
    #[arg(long, default_value_t = 2.0)]
    tensor_sigma: f32,
}

#[derive(Args, Debug)]
struct ReliefArgs {
    #[command(flatten)]
    io: Io,

    /// Structure tensor smoothing sigma.
    #[arg(long, default_value_t = 2.0)]
    tensor_sigma: f32,

    /// Blur sigma along the flow.
    #[arg(long, default_value_t = 4.0)]
    sigma_t: f32,

    /// Blur sigma across the flow.
    #[arg(long, default_value_t = 1.0)]
    sigma_n: f32,

    /// Normal map slope scale.
    #[arg(long, default_value_t = 1.0)]
    strength: f32,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SlicMode {
    Random,
    Splots,
}

#[derive(Args, Debug)]
struct SlicArgs {
    #[command(flatten)]
    io: Io,

    /// Superpixel lattice spacing.
    #[arg(long, default_value_t = 32)]
    step: u32,

    #[arg(long, default_value_t = 10)]
    iterations: u32,

    #[arg(long, default_value_t = 10.0)]
    compactness: f32,

    /// Output style.
    #[arg(long, value_enum, default_value_t = SlicMode::Random)]
    mode: SlicMode,

    /// Palette seed for `--mode random`.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[derive(Args, Debug)]
struct KuwaharaArgs {
    #[command(flatten)]
    io: Io,

    /// Quadrant radius.
    #[arg(long, default_value_t = 4)]
    radius: u32,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Paint(args) => cmd_paint(args, cli.threads),
        Command::Flow(args) => cmd_flow(args, cli.threads),
        Command::Relief(args) => cmd_relief(args, cli.threads),
        Command::Slic(args) => cmd_slic(args, cli.threads),
        Command::Kuwahara(args) => cmd_kuwahara(args, cli.threads),
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn cmd_paint(args: PaintArgs, threads: Option<usize>) -> anyhow::Result<()> {
    let mut params = match &args.config {
        Some(path) => load_params(path)
            .with_context(|| format!("load paint config '{}'", path.display()))?,
        None => PaintParams::default(),
    };
    if let Some(sizes) = &args.sizes {
        params.set_brush_sizes(sizes)?;
    }
    if let Some(t) = args.threshold {
        params.refresh_threshold = t;
    }
    if let Some(n) = args.pastes {
        params.pastes_per_stroke = n;
    }
    if let Some(n) = args.directions {
        params.num_directions = n;
    }
    params.validate()?;

    if !args.secondary.is_empty() && args.secondary.len() != args.io.inputs.len() {
        anyhow::bail!(
            "got {} secondary rasters for {} inputs",
            args.secondary.len(),
            args.io.inputs.len()
        );
    }
    let mut planned = HashSet::new();
    for path in args.io.inputs.iter().chain(&args.secondary) {
        let out = output_path(&args.io.out_dir, path, "painted");
        if !planned.insert(out.clone()) {
            anyhow::bail!(
                "'{}' would be written twice; rename inputs with the same file stem",
                out.display()
            );
        }
    }

    let brush = match &args.brush {
        Some(path) => BrushAsset::load(path)?,
        None => BrushAsset::soft_disc(64)?,
    };
    let flow_params = FlowParams {
        tensor_sigma: args.tensor_sigma,
    };

    run_batch(&args.io.inputs, threads, |i, input| {
        let image = load_raster(input)?;
        let flow = compute_flow(&image, &flow_params)?;
        let mut painter = LayeredPainter::new(params.clone(), brush.clone())?;
        let mut written = Vec::new();

        let painting = match args.secondary.get(i) {
            Some(sec_path) => {
                let secondary = load_raster(sec_path)?;
                let painting = painter.paint_with_secondary(&image, &flow, &secondary)?;
                if let Some(sec) = &painting.secondary {
                    let out = output_path(&args.io.out_dir, sec_path, "painted");
                    save_raster(sec, &out)?;
                    written.push(out);
                }
                painting
            }
            None => painter.paint(&image, &flow)?,
        };

        let out = output_path(&args.io.out_dir, input, "painted");
        save_raster(&painting.canvas, &out)?;
        written.push(out);

        if args.dump_strokes {
            let out = output_path(&args.io.out_dir, input, "strokes").with_extension("json");
            let f = std::fs::File::create(&out)
                .with_context(|| format!("create '{}'", out.display()))?;
            serde_json::to_writer_pretty(f, &painting.strokes)
                .with_context(|| format!("write stroke log '{}'", out.display()))?;
            written.push(out);
        }
        tracing::info!(
            input = %input.display(),
            strokes = painting.strokes.len(),
            stamps = painting.stamp_count(),
            "painted"
        );
        Ok(written)
    })
}

fn cmd_flow(args: FlowArgs, threads: Option<usize>) -> anyhow::Result<()> {
    let params = FlowParams {
        tensor_sigma: args.tensor_sigma,
    };
    params.validate()?;
    run_batch(&args.io.inputs, threads, |_, input| {
        let image = load_raster(input)?;
        let flow = compute_flow(&image, &params)?;
        let out = output_path(&args.io.out_dir, input, "flow");
        save_raster(&flow.edge_weight_preview()?, &out)?;
        Ok(vec![out])
    })
}

fn cmd_relief(args: ReliefArgs, threads: Option<usize>) -> anyhow::Result<()> {
    let flow_params = FlowParams {
        tensor_sigma: args.tensor_sigma,
    };
    let relief = ReliefParams {
        sigma_t: args.sigma_t,
        sigma_n: args.sigma_n,
        normal_strength: args.strength,
    };
    flow_params.validate()?;
    relief.validate()?;
    run_batch(&args.io.inputs, threads, |_, input| {
        let image = load_raster(input)?;
        let lab = to_lab(&image);
        let flow = compute_flow(&image, &flow_params)?;
        let height = blur_along_flow(&lab, &flow, &relief)?;
        let normals = normal_map(&height, relief.normal_strength)?;

        let height_out = output_path(&args.io.out_dir, input, "height");
        let normals_out = output_path(&args.io.out_dir, input, "normals");
        save_raster(&height.to_gray8(), &height_out)?;
        save_raster(&normals, &normals_out)?;
        Ok(vec![height_out, normals_out])
    })
}

fn cmd_slic(args: SlicArgs, threads: Option<usize>) -> anyhow::Result<()> {
    let params = SlicParams {
        grid_step: args.step,
        iterations: args.iterations,
        compactness: args.compactness,
    };
    params.validate()?;
    run_batch(&args.io.inputs, threads, |_, input| {
        let image = load_raster(input)?;
        let seg = slic(&image, &params)?;
        let rendered = match args.mode {
            SlicMode::Random => seg.random_colors(args.seed)?,
            SlicMode::Splots => seg.fill_with_center_colors(&image)?,
        };
        let out = output_path(&args.io.out_dir, input, "slic");
        save_raster(&rendered, &out)?;
        Ok(vec![out])
    })
}

fn cmd_kuwahara(args: KuwaharaArgs, threads: Option<usize>) -> anyhow::Result<()> {
    run_batch(&args.io.inputs, threads, |_, input| {
        let image = load_raster(input)?;
        let out = output_path(&args.io.out_dir, input, "kuwahara");
        save_raster(&kuwahara(&image, args.radius)?, &out)?;
        Ok(vec![out])
    })
}

/// Run `job` for every input on a rayon pool. A failing image is logged and
/// counted; its siblings still run.
fn run_batch<F>(inputs: &[PathBuf], threads: Option<usize>, job: F) -> anyhow::Result<()>
where
    F: Fn(usize, &Path) -> anyhow::Result<Vec<PathBuf>> + Sync,
{
    let pool = build_thread_pool(threads)?;
    let failed: usize = pool.install(|| {
        inputs
            .par_iter()
            .enumerate()
            .map(|(i, input)| match job(i, input) {
                Ok(written) => {
                    for out in written {
                        tracing::info!(input = %input.display(), output = %out.display(), "wrote");
                    }
                    0
                }
                Err(e) => {
                    tracing::error!(input = %input.display(), "failed: {e:#}");
                    1
                }
            })
            .sum()
    });
    if failed > 0 {
        anyhow::bail!("{failed} of {} images failed", inputs.len());
    }
    Ok(())
}

fn build_thread_pool(threads: Option<usize>) -> anyhow::Result<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        anyhow::bail!("'--threads' must be >= 1 when set");
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .context("failed to build rayon thread pool")
}
