//! Storefront CLI
//!
//! Browse the catalogue and inspect orders from a terminal.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use storefront::{
    App,
    config::{DEFAULT_CONFIG_PATH, load_config},
    error::{AppError, Result},
    models::{CategoryNode, Listing, ListingsRequest, SortOrder},
    pages::ListingFilter,
};

/// Storefront - secondhand book marketplace client
#[derive(Parser, Debug)]
#[command(name = "storefront", version, about = "Secondhand book storefront client")]

struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Bearer token for account commands
    #[arg(long, global = true)]
    token: Option<String>,

    /// User id the token belongs to
    #[arg(long, global = true)]
    user_id: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the category tree
    Categories,

    /// List books on a shelf or in a category
    Listings {
        /// Shelf name, e.g. bestSellers or newArrivals
        #[arg(long)]
        shelf: Option<String>,
        /// Category slug or name
        #[arg(long)]
        category: Option<String>,
        /// Subcategory slug or name
        #[arg(long)]
        subcategory: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Sort field
        #[arg(long, default_value = "listedAt")]
        sort: String,
        /// Sort direction: asc or desc
        #[arg(long, default_value = "desc")]
        order: SortOrder,
        /// Page size (default: pagination.page_size from config)
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Search books by keyword
    Search { query: String },

    /// List orders for the logged-in user
    Orders,

    /// Show a single order
    Order { id: String },

    /// Validate the configuration file
    Validate,

    /// Show effective configuration
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn print_tree(nodes: &[CategoryNode], depth: usize) {
    for node in nodes {
        println!("{}{} ({}) [{}]", "  ".repeat(depth), node.name, node.count, node.slug);
        print_tree(&node.children, depth + 1);
    }
}

fn print_listings(listings: &[Listing]) {
    for book in listings {
        let price = match book.discounted_price {
            Some(discounted) => format!("{} (was {})", discounted, book.price),
            None => book.price.to_string(),
        };
        println!("{:<24} {:<40} {:<24} {}", book.id, book.title, book.author, price);
    }
}

fn login(app: &App, cli: &Cli) -> Result<()> {
    match (&cli.token, &cli.user_id) {
        (Some(token), Some(user_id)) => {
            app.session().login(token.as_str(), user_id.as_str());
            Ok(())
        }
        _ => Err(AppError::unauthorized("--token and --user-id are required")),
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli.config)
        .inspect_err(|e| log::error!("Config validation failed: {}", e))?;
    let app = App::new(config)?;

    match &cli.command {
        Command::Categories => {
            let categories = app.catalog().fetch_categories(None).await?;
            print_tree(&categories, 0);
            let total: usize = categories.iter().map(CategoryNode::node_count).sum();
            log::info!("{} top-level categories, {} in total", categories.len(), total);
        }

        Command::Listings {
            shelf,
            category,
            subcategory,
            page,
            sort,
            order,
            limit,
        } => {
            let base = match shelf {
                Some(shelf) => ListingsRequest::shelf(shelf.as_str()),
                None => ListingsRequest::default(),
            };
            let filter = match category {
                Some(slug) => {
                    let tree = app.catalog().fetch_categories_or_empty(None).await;
                    ListingFilter::from_slugs(&tree, slug, subcategory.as_deref()).unwrap_or_else(|| {
                        log::debug!("'{}' is not a category slug, using it as a name", slug);
                        ListingFilter::new(category.clone(), subcategory.clone())
                    })
                }
                None => ListingFilter::default(),
            };
            let request = filter
                .apply(base)
                .with_sort(sort.as_str(), *order)
                .with_page(*page)
                .with_limit(limit.unwrap_or(app.config().pagination.page_size));

            if let Some(response) = app.catalog().fetch_listings(&request, None).await? {
                print_listings(&response.listings);
                let meta = &response.meta;
                log::info!(
                    "Page {}/{} ({} books{})",
                    meta.page,
                    meta.pages,
                    meta.count,
                    if meta.estimated { ", estimated" } else { "" }
                );
            }
        }

        Command::Search { query } => {
            let results = app.catalog().search(query, None).await?;
            print_listings(&results);
            log::info!("{} results for '{}'", results.len(), query.trim());
        }

        Command::Orders => {
            login(&app, &cli)?;
            let orders = app.account().orders().await?;
            for order in &orders {
                let placed = order
                    .created_at
                    .map(|t| t.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("{:<24} {:<10} {:<12} {}", order.id, order.status.as_str(), placed, order.total);
            }
            log::info!("{} orders", orders.len());
        }

        Command::Order { id } => {
            login(&app, &cli)?;
            let order = app.account().order(id).await?;
            println!("{}", serde_json::to_string_pretty(&order)?);
        }

        Command::Info => {
            log::info!("Config file: {}", cli.config.display());
            let rendered =
                toml::to_string_pretty(app.config()).map_err(|e| AppError::config(e.to_string()))?;
            println!("{}", rendered);
        }

        Command::Validate => {
            log::info!("✓ Config OK ({})", app.config().api.base_url);
        }
    }

    Ok(())
}
