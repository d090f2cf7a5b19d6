/// Rotation Sim - plays a rated catalog on a virtual clock
use anyhow::Context;
use clap::{Parser, Subcommand};
use rotation_selection::ItemLibrary;
use rotation_sim::{load_catalog, CatalogSink, JsonFileStore, SimConfig, Simulation};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rotation-sim")]
#[command(about = "Heavy Rotation headless player", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./rotation.toml if present)
    #[arg(short, long, global = true, env = "ROTATION_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the catalog for a while on a simulated clock
    Run {
        /// Simulated seconds (overrides simulation.duration_secs)
        #[arg(short, long)]
        duration: Option<u64>,
        /// Sampler seed (overrides simulation.seed)
        #[arg(long)]
        seed: Option<u64>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the selection groups and their weights
    Groups,
    /// Rate an item (0-5) and write it back to the catalog
    Rate {
        /// Item id
        id: String,
        /// New rating
        rating: u8,
    },
    /// Mark or unmark an item as favorite
    Favorite {
        /// Item id
        id: String,
        /// Clear the flag instead of setting it
        #[arg(long)]
        clear: bool,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rotation_sim=info,rotation_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = SimConfig::load(cli.config.as_deref())?;
    config.validate()?;

    match cli.command {
        Commands::Run {
            duration,
            seed,
            json,
        } => run(config, duration, seed, json),
        Commands::Groups => groups(&config),
        Commands::Rate { id, rating } => rate(&config, &id, rating),
        Commands::Favorite { id, clear } => favorite(&config, &id, !clear),
    }
}

fn run(mut config: SimConfig, duration: Option<u64>, seed: Option<u64>, json: bool) -> anyhow::Result<()> {
    if let Some(duration) = duration {
        config.simulation.duration_secs = duration;
    }
    if seed.is_some() {
        config.simulation.seed = seed;
    }

    let items = load_catalog(&config.library.catalog_path)?;
    let store = Arc::new(JsonFileStore::new(&config.library.state_path));
    tracing::info!("Catalog: {}", config.library.catalog_path.display());
    tracing::info!("State file: {}", store.path().display());

    let mut simulation = Simulation::new(config, items, store)?;
    let report = simulation.run()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Simulated {:.0}s: {} tracks started, {} favorites",
        report.simulated_secs, report.tracks_started, report.favorite_plays
    );
    for (rating, plays) in &report.plays_by_rating {
        println!("  rating {}: {} plays", rating, plays);
    }
    if let Some(position) = report.last_position {
        println!(
            "Stopped on track {} at {:.1}s",
            position.track, position.position
        );
    }
    Ok(())
}

fn library(config: &SimConfig) -> anyhow::Result<ItemLibrary> {
    let mut library = ItemLibrary::new(config.queue.favorite_ratio()?);
    library.set_items(load_catalog(&config.library.catalog_path)?);
    Ok(library)
}

fn groups(config: &SimConfig) -> anyhow::Result<()> {
    let library = library(config)?;

    println!("{} items, favorite ratio {}", library.len(), library.favorite_ratio().value());
    for group in library.groups() {
        println!(
            "  {:<10} {:>3} items  weight {:.5}  mass {:.3}",
            group.name,
            group.items.len(),
            group.weight,
            group.mass()
        );
    }
    Ok(())
}

fn rate(config: &SimConfig, id: &str, rating: u8) -> anyhow::Result<()> {
    let mut library = library(config)?;
    let sink = CatalogSink::new(&config.library.catalog_path);
    let item = library
        .update_rating(id, rating, &sink)
        .with_context(|| format!("Failed to rate {}", id))?;

    println!(
        "{} ({}) rated {}{}",
        item.title,
        item.id,
        item.rating,
        if item.is_favorite { ", favorite" } else { "" }
    );
    Ok(())
}

fn favorite(config: &SimConfig, id: &str, is_favorite: bool) -> anyhow::Result<()> {
    let mut library = library(config)?;
    let sink = CatalogSink::new(&config.library.catalog_path);
    let item = library
        .set_favorite(id, is_favorite, &sink)
        .with_context(|| format!("Failed to update {}", id))?;

    println!(
        "{} ({}) {}",
        item.title,
        item.id,
        if item.is_favorite { "marked favorite" } else { "no longer favorite" }
    );
    Ok(())
}
