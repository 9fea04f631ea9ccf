use anyhow::Context;
use clap::{Parser, Subcommand};
use dimx::{
    load_catalog, DimensionConstraint, EngineConfig, SearchEngine, SearchQuery, TransactionContext,
    TransactionEngine,
};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Dimensional marketplace search and transactions over a JSON catalog
#[derive(Parser, Debug)]
#[command(name = "dimx")]
#[command(about = "Dimensional product search and trust-weighted transactions", long_about = None)]
struct Args {
    /// Catalog file with `products` and `users`
    #[arg(short, long, default_value = "./catalog.json")]
    catalog: PathBuf,

    /// Engine configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank products against dimension constraints
    Search {
        /// Constraint as NAME=MIN:MAX or NAME=MIN:MAX@PREFERRED; either bound may be empty
        #[arg(long = "dim", value_parser = parse_dimension)]
        dimensions: Vec<(String, DimensionConstraint)>,

        /// Substring matched against name, description and categories
        #[arg(long)]
        text: Option<String>,

        /// Personalise the ranking for this user
        #[arg(long)]
        user: Option<String>,

        #[arg(long, default_value_t = 20)]
        limit: usize,

        #[arg(long, default_value_t = 0)]
        offset: usize,
    },

    /// Type-ahead over product names and categories
    Suggest {
        partial: String,

        /// Only suggest terms from products that carry this dimension
        #[arg(long)]
        dimension: Option<String>,
    },

    /// Show the shape of the search index
    Stats,

    /// Create a transaction and optionally run payment
    Buy {
        #[arg(long)]
        buyer: String,

        #[arg(long)]
        seller: String,

        #[arg(long)]
        product: String,

        #[arg(long, default_value_t = 1)]
        quantity: u32,

        /// Charge the buyer after creation
        #[arg(long)]
        process: bool,
    },
}

fn parse_dimension(s: &str) -> Result<(String, DimensionConstraint), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=MIN:MAX, got '{}'", s))?;
    let (range, preferred) = match value.split_once('@') {
        Some((range, preferred)) => (range, Some(preferred)),
        None => (value, None),
    };
    let (min, max) = range
        .split_once(':')
        .ok_or_else(|| format!("expected MIN:MAX in '{}'", s))?;

    let number = |text: &str| -> Result<Option<f64>, String> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        let value = text
            .parse::<f64>()
            .map_err(|e| format!("invalid number '{}': {}", text, e))?;
        if !value.is_finite() {
            return Err(format!("number must be finite, got '{}'", text));
        }
        Ok(Some(value))
    };

    Ok((
        name.trim().to_string(),
        DimensionConstraint {
            min: number(min)?,
            max: number(max)?,
            preferred: preferred.map(number).transpose()?.flatten(),
            ..DimensionConstraint::default()
        },
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting dimx v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let loaded = load_catalog(&args.catalog)
        .with_context(|| format!("failed to load catalog {}", args.catalog.display()))?;

    match args.command {
        Command::Search {
            dimensions,
            text,
            user,
            limit,
            offset,
        } => {
            let engine = SearchEngine::new(config.search);
            engine.rebuild_from(&loaded.catalog);

            let mut query = SearchQuery::new().page(limit, offset);
            for (name, constraint) in dimensions {
                query = query.dimension(name, constraint);
            }
            if let Some(text) = text {
                query = query.text(text);
            }
            let user = match user {
                Some(id) => Some(
                    loaded
                        .users
                        .get(&id)
                        .with_context(|| format!("unknown user {}", id))?,
                ),
                None => None,
            };

            let results = engine.search(&query, user.as_ref())?;
            let stats = results.stats();
            info!(
                results = stats.results_count,
                avg_score = stats.avg_score,
                best_score = stats.best_score,
                top_dimension = stats.top_contributing_dimension.as_deref().unwrap_or("-"),
                "Search complete"
            );
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Command::Suggest { partial, dimension } => {
            let engine = SearchEngine::new(config.search);
            engine.rebuild_from(&loaded.catalog);
            let suggestions = engine.suggestions(&partial, dimension.as_deref());
            println!("{}", serde_json::to_string_pretty(&suggestions)?);
        }
        Command::Stats => {
            let engine = SearchEngine::new(config.search);
            engine.rebuild_from(&loaded.catalog);
            println!("{}", serde_json::to_string_pretty(&engine.stats()?)?);
        }
        Command::Buy {
            buyer,
            seller,
            product,
            quantity,
            process,
        } => {
            let engine = TransactionEngine::new(config.transaction, loaded.catalog, loaded.users)?;
            let ctx = TransactionContext::new(buyer, seller, product, quantity);
            let outcome = engine.create_transaction(ctx);
            println!("{}", serde_json::to_string_pretty(&outcome)?);

            if process && outcome.success {
                if let Some(tx) = &outcome.transaction {
                    let confirmed = engine.process_transaction(&tx.meta.id).await?;
                    info!(transaction_id = %tx.meta.id, confirmed, "Payment finished");
                    if let Some(settled) = engine.get_transaction(&tx.meta.id) {
                        println!("{}", serde_json::to_string_pretty(&settled)?);
                    }
                }
            }
        }
    }

    Ok(())
}
