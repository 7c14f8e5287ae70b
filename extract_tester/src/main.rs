use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use object_extract::core_modules::instance_mask::InstanceMask;
use object_extract::core_modules::segmentation::LabelMapService;
use object_extract::core_modules::utils::image_helper::image_helper;
use object_extract::pipeline::{InstanceSelector, MaskReport};
use object_extract::{ObjectRecognizer, PipelineConfig, Point, Size};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Runs the tap-to-mask flow against a picture and a precomputed instance label map.
#[derive(Parser, Debug)]
#[command(name = "extract_tester")]
#[command(
    about = "Select objects from a label map by tapping a letterboxed view",
    long_about = None
)]
struct Cli {
    /// The picture being displayed.
    image: PathBuf,

    /// Instance label map for the picture (same size, one id per pixel, 0 = background).
    labels: PathBuf,

    /// Size of the display view, as WIDTHxHEIGHT.
    #[arg(long, value_parser = parse_size)]
    view: Option<Size>,

    /// Tap position inside the view, as X,Y. Without it every instance is masked.
    #[arg(long, value_parser = parse_point, requires = "view")]
    tap: Option<Point>,

    /// Mask people instead of foreground instances.
    #[arg(long, conflicts_with = "tap", requires = "people_labels")]
    people: bool,

    /// Person label map for the picture (same size, 0 = background, anything else = person).
    #[arg(long)]
    people_labels: Option<PathBuf>,

    /// TOML file with pipeline settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Longest side of the rendition the mask is scanned in. Overrides the config file.
    #[arg(long)]
    max_dimension: Option<f64>,

    /// Where to write the generated mask as PNG.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn parse_size(value: &str) -> Result<Size, String> {
    let (width, height) = value.split_once('x').ok_or("expected WIDTHxHEIGHT")?;
    let width: f64 = width.trim().parse().map_err(|e| format!("bad width: {e}"))?;
    let height: f64 = height.trim().parse().map_err(|e| format!("bad height: {e}"))?;
    Ok(Size::new(width, height))
}

fn parse_point(value: &str) -> Result<Point, String> {
    let (x, y) = value.split_once(',').ok_or("expected X,Y")?;
    let x: f64 = x.trim().parse().map_err(|e| format!("bad x: {e}"))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("bad y: {e}"))?;
    Ok(Point::new(x, y))
}

fn load_config(cli: &Cli) -> anyhow::Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(max_dimension) = cli.max_dimension {
        config.max_dimension = max_dimension;
    }
    config.validate()?;
    Ok(config)
}

fn print_report(report: &MaskReport) {
    println!("mask size: {}x{}", report.mask.width(), report.mask.height());
    println!(
        "downsampled size: {}x{}",
        report.downsampled_size.width, report.downsampled_size.height
    );
    match (report.first_pixel_downsampled, report.first_pixel_original) {
        (Some(small), Some(original)) => {
            println!("first pixel in downsampled mask: ({}, {})", small.x, small.y);
            println!("first pixel in original mask: ({}, {})", original.x, original.y);
        }
        _ => println!("mask is empty"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let picture =
        image::open(&cli.image).with_context(|| format!("opening {}", cli.image.display()))?;
    let labels = image_helper::load_mask(&cli.labels)
        .with_context(|| format!("opening label map {}", cli.labels.display()))?;

    let mut service = LabelMapService::new(InstanceMask::new(labels));
    info!(instances = ?service.labels().all_instances(), "label map loaded");
    if let Some(path) = &cli.people_labels {
        let people = image_helper::load_mask(path)
            .with_context(|| format!("opening person label map {}", path.display()))?;
        service = service.with_people(InstanceMask::new(people));
    }
    let recognizer = ObjectRecognizer::new(service, config);

    let report = if cli.people {
        recognizer.recognize_people(&picture).await?
    } else if let (Some(tap), Some(view)) = (cli.tap, cli.view) {
        match recognizer.recognize_at_tap(&picture, tap, view).await? {
            Some(report) => report,
            None => {
                println!("tap ({}, {}) is outside the picture", tap.x, tap.y);
                return Ok(());
            }
        }
    } else {
        recognizer.recognize_objects(&picture, InstanceSelector::All).await?
    };

    print_report(&report);

    if let Some(output) = &cli.output {
        image_helper::save_mask(output, &report.mask)
            .with_context(|| format!("writing {}", output.display()))?;
        println!("Mask saved to {}", output.display());
    }

    Ok(())
}
