use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cloudsong_color::source::RoutingSource;
use cloudsong_color::{
    AppError, ColorExtractor, Configuration, Palette, StorageResolver, Track, TrackColorCoordinator,
    TrackColors,
};
use futures::future::join_all;
use tracing::Level;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "cloudsong-color", version, about = "Album art color extraction")]
struct Cli {
    /// Configuration file (TOML, JSON or YAML).
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract the dominant color of each image and print its palette.
    Extract {
        /// URLs, storage keys or local paths.
        #[arg(required = true)]
        images: Vec<String>,
    },
    /// Print the palette derived from each `#rrggbb` color.
    Palette {
        #[arg(required = true)]
        colors: Vec<String>,
    },
}

fn init_logging(level: Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    let configuration = Configuration::load(cli.config.as_deref())?;
    init_logging(configuration.log_level.parse().unwrap_or(Level::INFO));

    match cli.command {
        Command::Extract { images } => extract(&configuration, images).await,
        Command::Palette { colors } => {
            for color in colors {
                let palette = Palette::from_hex(&color)?;
                println!("{}", serde_json::to_string(&palette)?);
            }
            Ok(())
        }
    }
}

async fn extract(configuration: &Configuration, images: Vec<String>) -> Result<(), AppError> {
    let resolver = StorageResolver::new(&configuration.storage);
    let extractor = ColorExtractor::new(
        RoutingSource::new(configuration.extraction.max_image_bytes)?,
        &configuration.extraction,
    );
    let coordinator = TrackColorCoordinator::new(extractor, configuration.concurrency_limit);

    let fallback = Palette::generate(configuration.extraction.fallback_color);

    let requests = images.iter().map(|raw| {
        let resolved = resolver.resolve(raw);
        let coordinator = &coordinator;
        async move {
            match resolved {
                Ok(artwork) => coordinator.resolve(&Track::new(Uuid::new_v4(), artwork)).await,
                Err(e) => {
                    tracing::warn!("Skipping extraction, using fallback: {}", e);
                    TrackColors {
                        track_id: Uuid::new_v4(),
                        artwork: raw.clone(),
                        palette: fallback,
                    }
                }
            }
        }
    });

    for colors in join_all(requests).await {
        println!("{}", serde_json::to_string(&colors)?);
    }
    Ok(())
}
