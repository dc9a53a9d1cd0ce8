use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use inquire::{Select, Text};
use windy_core::{
    Config, Favourites, FavouritesSlot, FavouritesStore, SearchEngine, WindFetcher, WindReport,
    search::MIN_QUERY_LEN,
};

use crate::output::{ConsoleEvents, print_favourites};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "windy", version, about = "Current wind for any city")]
pub struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the wind API and city list locations.
    Configure,

    /// List cities matching a query.
    Search {
        /// At least three letters; other characters are ignored.
        query: String,
    },

    /// Show current wind for a city.
    Wind {
        query: String,

        /// 1-based position in the match list; prompts when absent.
        #[arg(long)]
        pick: Option<usize>,

        /// Add the result to favourites.
        #[arg(long)]
        save: bool,
    },

    /// Manage saved locations.
    Favourites {
        #[command(subcommand)]
        action: FavouritesAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum FavouritesAction {
    List,
    Remove { city: String, country: String },
    Clear,
}

pub fn init_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let default = if verbose {
        "windy=debug,windy_core=debug"
    } else {
        "windy=warn,windy_core=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

/// Per-invocation state: config plus the favourites store, once opened.
struct Session {
    config: Config,
    favourites: FavouritesSlot,
}

impl Session {
    fn open() -> anyhow::Result<Self> {
        let config = Config::load()?;
        tracing::debug!(
            api = config.api_base_url.as_deref().unwrap_or("<unset>"),
            "Loaded configuration"
        );

        let storage_dir = config.storage_dir()?;
        let favourites = FavouritesStore::open(config.key_value_store()?);
        tracing::debug!(
            dir = %storage_dir.display(),
            count = favourites.len(),
            "Opened favourites store"
        );

        Ok(Self { config, favourites: favourites.into() })
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Search { query } => {
                let session = Session::open()?;
                search(&session.config, &query).await
            }
            Command::Wind { query, pick, save } => {
                let mut session = Session::open()?;
                wind(&mut session, &query, pick, save).await
            }
            Command::Favourites { action } => {
                let mut session = Session::open()?;
                favourites(&mut session.favourites, action)
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_base_url = Text::new("Wind API base URL:")
        .with_initial_value(config.api_base_url.as_deref().unwrap_or(""))
        .prompt()
        .context("Configuration cancelled")?;

    let current_catalog =
        config.catalog_path.as_ref().map(|p| p.display().to_string()).unwrap_or_default();
    let catalog_path = Text::new("City list JSON file (empty for the bundled list):")
        .with_initial_value(&current_catalog)
        .prompt()
        .context("Configuration cancelled")?;

    config.api_base_url = Some(api_base_url.trim().to_string()).filter(|s| !s.is_empty());
    config.catalog_path = Some(catalog_path.trim()).filter(|s| !s.is_empty()).map(Into::into);
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn search(config: &Config, query: &str) -> anyhow::Result<()> {
    let cities = config.catalog_loader()?.cities().await;
    let query = windy_core::search::sanitize(query);
    let matches = windy_core::search::filter_cities(&cities, &query);

    if matches.is_empty() {
        print_no_matches(&query);
    }
    for (i, city) in matches.iter().enumerate() {
        println!("{:>2}. {}", i + 1, city.dropdown_label());
    }
    Ok(())
}

async fn wind(
    session: &mut Session,
    query: &str,
    pick: Option<usize>,
    save: bool,
) -> anyhow::Result<()> {
    let loader = session.config.catalog_loader()?;
    let fetcher = session.config.wind_fetcher()?;
    let mut engine = SearchEngine::with_catalog(&loader, fetcher).await;

    engine.input_changed(query);
    if engine.candidates().is_empty() {
        print_no_matches(engine.input());
        return Ok(());
    }

    let count = engine.candidates().len();
    let index = match pick {
        Some(n) => n
            .checked_sub(1)
            .filter(|i| *i < count)
            .ok_or_else(|| anyhow!("--pick must be between 1 and {count}"))?,
        None if count == 1 => 0,
        None => {
            let labels = engine.candidates().iter().map(|c| c.dropdown_label()).collect();
            Select::new("Pick a city:", labels).raw_prompt().context("No city picked")?.index
        }
    };
    engine.select(index);

    let events = ConsoleEvents::default();
    let report = confirm_selection(&mut engine, &events).await?;

    if save {
        let favourites = session.favourites.get_mut()?;
        favourites.add(report.into());
        println!("Saved to favourites.");
    }
    Ok(())
}

/// Run the confirm action and turn a failed lookup into an error for the exit status.
async fn confirm_selection<F: WindFetcher>(
    engine: &mut SearchEngine<F>,
    events: &ConsoleEvents,
) -> anyhow::Result<WindReport> {
    if !engine.confirm(events).await {
        bail!("No city selected");
    }
    if let Some(message) = engine.last_error() {
        bail!("{message}");
    }
    events.take_report().ok_or_else(|| anyhow!("Wind lookup returned no result"))
}

fn favourites(slot: &mut FavouritesSlot, action: FavouritesAction) -> anyhow::Result<()> {
    let store = slot.get_mut()?;
    tracing::debug!(?action, "Running favourites action");

    match action {
        FavouritesAction::List => print_favourites(store.favourites()),
        FavouritesAction::Remove { city, country } => {
            if store.is_favourited(&city, &country) {
                store.remove(&city, &country);
                println!("Removed {city}, {country}.");
            } else {
                println!("{city}, {country} is not a favourite.");
            }
        }
        FavouritesAction::Clear => {
            store.clear();
            println!("Cleared favourites.");
        }
    }
    Ok(())
}

fn print_no_matches(query: &str) {
    if query.chars().count() < MIN_QUERY_LEN {
        println!("Type at least {MIN_QUERY_LEN} letters to search.");
    } else {
        println!("No results found");
    }
}
