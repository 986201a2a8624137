use clap::{Parser, Subcommand};
use srcset_resolver::candidate::SourceSet;
use srcset_resolver::element::{ElementSnapshot, parse_multiplier};
use srcset_resolver::host::{MemoryDocument, attr};
use srcset_resolver::markup::{Handling, ImgOptions, render_img};
use srcset_resolver::selection::{SelectionRequest, coverage, select, width_range};
use srcset_resolver::srcset::{StyleCatalog, source_set};
use srcset_resolver::types::{AspectRatio, BoxSize, Dimensions};
use srcset_resolver::{config, output, simulate};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "srcset-resolver")]
#[command(about = "Responsive image source selection and lazy loading")]
#[command(long_about = "\
Responsive image source selection and lazy loading

Images carry a candidate list in data-srcset (\"path 640w, ...\", ascending
by width). The resolver measures each image's box, picks the smallest
candidate that covers it at the device pixel ratio, and writes src, width
and height. Lazy images (loading=\"lazy\") wait until they come within the
preload margin of the viewport.

Element attributes read:
  data-srcset       candidate list (required)
  data-multiplier   density cap, e.g. \"2x\" (default 1x)
  data-cover        fill the parent box, cropping as needed
  data-ratio        fixed display ratio, e.g. \"16:9\"
  width, height     declared box of the current src

Run 'srcset-resolver gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = "srcset-resolver.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the selector for one image box and print the decision
    Select(SelectArgs),
    /// Show which candidate serves each layout width and density
    Coverage(CoverageArgs),
    /// Replay JSON scene files through an in-memory document
    Simulate {
        /// Scene file, or a directory searched for *.json
        path: PathBuf,
    },
    /// Build a candidate list and <img> markup from style names
    Srcset(SrcsetArgs),
    /// Print a stock config file with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct SelectArgs {
    /// Candidate list, e.g. "/a.jpg 320w, /b.jpg 640w"
    #[arg(long)]
    srcset: String,
    /// Parent box
    #[arg(long, default_value = "0x0")]
    parent: Dimensions,
    /// The image's own box
    #[arg(long = "box", default_value = "0x0")]
    own: Dimensions,
    /// Device pixel ratio
    #[arg(long, default_value_t = 1.0)]
    dpr: f64,
    /// data-multiplier token, e.g. "2x"
    #[arg(long)]
    multiplier: Option<String>,
    /// data-ratio, e.g. "16:9"
    #[arg(long)]
    ratio: Option<AspectRatio>,
    /// Cover mode
    #[arg(long)]
    cover: bool,
    /// Currently applied src
    #[arg(long)]
    current: Option<String>,
    /// Declared width/height of the current src
    #[arg(long)]
    declared: Option<Dimensions>,
}

#[derive(clap::Args)]
struct CoverageArgs {
    /// Candidate list, e.g. "/a.jpg 320w, /b.jpg 640w"
    #[arg(long)]
    srcset: SourceSet,
    #[arg(long, default_value_t = 320)]
    from: u32,
    #[arg(long, default_value_t = 1920)]
    to: u32,
    #[arg(long, default_value_t = 160)]
    step: u32,
    /// Device pixel ratios
    #[arg(long, value_delimiter = ',', default_value = "1,2")]
    dpr: Vec<f64>,
    /// data-multiplier token, e.g. "2x"; ratios above it are capped
    #[arg(long)]
    multiplier: Option<String>,
}

#[derive(clap::Args)]
struct SrcsetArgs {
    /// Source image path
    image: String,
    /// Style names, e.g. responsive_16_9_640w,responsive_16_9_1280w
    #[arg(long, value_delimiter = ',', required = true)]
    styles: Vec<String>,
    /// Use the styles cropped to this ratio; scaling styles otherwise
    #[arg(long)]
    ratio: Option<AspectRatio>,
    /// Original image size, for the scaling placeholder
    #[arg(long)]
    original: Option<Dimensions>,
    #[arg(long, default_value = "")]
    alt: String,
    #[arg(long)]
    lazy: bool,
    #[arg(long)]
    cover: bool,
    #[arg(long)]
    multiplier: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging();
    let config = config::load_config(&cli.config)?;

    match cli.command {
        Command::Select(args) => run_select(args)?,
        Command::Coverage(args) => {
            let widths = width_range(args.from, args.to, args.step);
            let multiplier = args.multiplier.as_deref().and_then(parse_multiplier);
            let rows = coverage(&args.srcset, &widths, &args.dpr, multiplier);
            output::print_coverage(&rows);
        }
        Command::Simulate { path } => {
            let scenes = simulate::find_scenes(&path);
            if scenes.is_empty() {
                return Err(format!("no scene files under {}", path.display()).into());
            }
            let mut failed = 0;
            for (scene_path, result) in simulate::run_scenes(&scenes, &config.resolver) {
                match result {
                    Ok(report) => output::print_scene_report(&report),
                    Err(err) => {
                        failed += 1;
                        eprintln!("{}: {}", scene_path.display(), err);
                    }
                }
            }
            if failed > 0 {
                return Err(format!("{failed} of {} scenes failed", scenes.len()).into());
            }
        }
        Command::Srcset(args) => {
            let catalog = StyleCatalog::from_names(&args.styles);
            let (sources, handling) = match args.ratio {
                Some(ratio) => (
                    catalog.by_aspect_ratio(&args.image, ratio, &config.styles)?,
                    Handling::AspectRatio(ratio),
                ),
                None => (
                    catalog.by_scale(&args.image, &config.styles)?,
                    Handling::Scale {
                        original: args.original,
                    },
                ),
            };
            let set = source_set(&sources)?;
            let options = ImgOptions {
                alt: args.alt,
                handling,
                multiplier: args.multiplier,
                cover: args.cover,
                lazy: args.lazy,
            };
            let markup = render_img(&sources, &options)
                .map(|m| m.into_string())
                .unwrap_or_default();
            output::print_srcset(&set, &markup);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Diagnostics go to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Lay the image out in a throwaway document so its attributes are read
/// exactly as the resolver reads them.
fn run_select(args: SelectArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = MemoryDocument::new(args.dpr);
    let parent_box = BoxSize::new(args.parent.width as f64, args.parent.height as f64);
    let own_box = BoxSize::new(args.own.width as f64, args.own.height as f64);
    let container = doc.append(doc.root(), "div", parent_box);
    let img = doc.append(container, "img", own_box);

    doc.seed_attribute(img, attr::SRCSET, &args.srcset);
    if let Some(multiplier) = &args.multiplier {
        doc.seed_attribute(img, attr::MULTIPLIER, multiplier);
    }
    if let Some(ratio) = args.ratio {
        doc.seed_attribute(img, attr::RATIO, &ratio.to_string());
    }
    if args.cover {
        doc.seed_attribute(img, attr::COVER, "1");
    }
    if let Some(current) = &args.current {
        doc.seed_attribute(img, attr::SRC, current);
    }
    if let Some(declared) = args.declared {
        doc.seed_attribute(img, attr::WIDTH, &declared.width.to_string());
        doc.seed_attribute(img, attr::HEIGHT, &declared.height.to_string());
    }

    let snapshot = ElementSnapshot::read(&doc, img)?;
    let request = SelectionRequest::from_snapshot(&snapshot, own_box, parent_box, args.dpr);
    let decision = select(&request);
    output::print_decision(&request, &decision);
    Ok(())
}
