//! Campus Market CLI - Browse, sell, check out and administer the marketplace.
//!
//! # Usage
//!
//! ```bash
//! # Seed sample data (also happens on first run unless MARKET_SEED_ON_START=false)
//! market-cli data init
//!
//! # Create an account and log in
//! market-cli account register -n "Roadrunner" -e rowdy@my.utsa.edu -p secret1
//! market-cli account login -e rowdy@my.utsa.edu -p secret1
//!
//! # Shop
//! market-cli products list --category Books --sort price-low
//! market-cli cart add 3
//! market-cli cart show --code ROWDY10
//! market-cli cart checkout
//!
//! # Sell
//! market-cli products create -t "Desk Lamp" -d "USB port" --price 20 \
//!     --category "Dorm Essentials" --condition used-good
//! market-cli orders sales
//! market-cli orders complete <order-id>
//! ```
//!
//! # Commands
//!
//! - `data` - Seed, reset, backfill and export the data directory
//! - `account` - Register, log in and out, edit the profile
//! - `products` - Browse and manage listings
//! - `cart` - Session cart, quotes and checkout
//! - `orders` - Purchases, sales and status changes
//! - `discounts` / `sales` - Price adjustments (admin)
//! - `users` - Accounts and admin rights (admin)
//! - `forum` - Ask and answer questions
//!
//! The logged-in user and the cart are kept in `session.json` inside the data
//! directory and refreshed from the record store before every command.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use campus_market::services::listings::{BrowseQuery, SortOrder};
use campus_market::{AppState, Collection, MarketConfig};
use campus_market_core::{Price, QuestionStatus};

mod commands;

use commands::{CliError, Context};

#[derive(Parser)]
#[command(name = "market-cli")]
#[command(author, version, about = "Campus Market command-line client")]
struct Cli {
    /// Data directory (overrides `MARKET_DATA_DIR`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed, reset and inspect the data directory
    Data {
        #[command(subcommand)]
        action: DataAction,
    },
    /// Register, log in and manage your profile
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Browse and manage listings
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage the cart and check out
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// View orders and change their status
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Manage discount codes (admin)
    Discounts {
        #[command(subcommand)]
        action: AdjustmentAction,
    },
    /// Manage sale promotions (admin)
    Sales {
        #[command(subcommand)]
        action: AdjustmentAction,
    },
    /// Manage accounts (admin)
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Ask and answer questions
    Forum {
        #[command(subcommand)]
        action: ForumAction,
    },
}

#[derive(Subcommand)]
enum DataAction {
    /// Seed sample data if the store has never been initialized
    Init,
    /// Overwrite users, products, orders and discounts with sample data
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
    /// Fill missing buyer/seller emails on orders
    Backfill,
    /// Print one collection as stored
    Export {
        /// Collection name (users, products, orders, discounts, questions, sales)
        collection: Collection,

        /// Write to this file instead of the log
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Create a student account
    Register {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        /// Defaults to `--password`
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Log in
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Log out (the cart is kept)
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Change name, email or password
    Update {
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
        #[arg(long)]
        current_password: Option<String>,
        #[arg(long)]
        new_password: Option<String>,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// Browse the catalogue
    List {
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        min_price: Option<Price>,
        #[arg(long)]
        max_price: Option<Price>,
        /// latest, oldest, price-low or price-high
        #[arg(long, default_value = "latest")]
        sort: SortOrder,
    },
    /// Show one listing
    Show { id: String },
    /// Your listings
    Mine,
    /// Post a listing
    Create {
        #[command(flatten)]
        fields: commands::products::ListingArgs,
    },
    /// Edit one of your listings
    Edit {
        id: String,
        #[command(flatten)]
        fields: commands::products::ListingArgs,
    },
    /// Delete one of your listings
    Delete { id: String },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart with a price quote
    Show {
        /// Discount code to apply
        #[arg(long)]
        code: Option<String>,
    },
    /// Add a listing to the cart
    Add { id: String },
    /// Remove a listing from the cart
    Remove { id: String },
    /// Empty the cart
    Clear,
    /// Place one order per cart item
    Checkout,
}

#[derive(Subcommand)]
enum OrderAction {
    /// Orders you placed
    Purchases,
    /// Orders for your listings
    Sales,
    /// Every order (admin)
    All,
    /// Show one order
    Show { id: String },
    /// Mark an order completed (seller or admin)
    Complete { id: String },
    /// Cancel an order
    Cancel { id: String },
}

#[derive(Subcommand)]
enum AdjustmentAction {
    /// List them
    List,
    /// Add one
    Add {
        #[command(flatten)]
        fields: commands::adjustments::AdjustmentArgs,
    },
    /// Delete one
    Delete { id: String },
}

#[derive(Subcommand)]
enum UserAction {
    /// List accounts
    List,
    /// Grant admin rights
    Grant { id: String },
    /// Revoke admin rights
    Revoke { id: String },
}

#[derive(Subcommand)]
enum ForumAction {
    /// Ask a question
    Ask {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        question: String,
        #[arg(short, long, default_value = "General")]
        category: String,
    },
    /// List questions
    List {
        /// pending or answered
        #[arg(long)]
        status: Option<QuestionStatus>,
    },
    /// Answer a question (admin)
    Answer {
        id: String,
        #[arg(short, long)]
        text: String,
    },
}

#[tokio::main]
async fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "campus_market=info,market_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().without_time().with_target(false))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        if e.is_user_facing() {
            tracing::error!("{e}");
        } else {
            tracing::error!(error = ?e, "Command failed: {e}");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = MarketConfig::from_env()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    let state = AppState::from_config(config);
    if state.bootstrap().await? {
        tracing::info!("Seeded sample data into {}", state.config().data_dir.display());
    }

    let mut ctx = Context::open(state).await?;

    match cli.command {
        Commands::Data { action } => match action {
            DataAction::Init => commands::data::init(&ctx).await?,
            DataAction::Reset { yes } => commands::data::reset(&mut ctx, yes).await?,
            DataAction::Backfill => commands::data::backfill(&ctx).await?,
            DataAction::Export { collection, out } => {
                commands::data::export(&ctx, collection, out.as_deref()).await?;
            }
        },
        Commands::Account { action } => match action {
            AccountAction::Register {
                name,
                email,
                password,
                confirm,
            } => commands::account::register(&mut ctx, name, email, password, confirm).await?,
            AccountAction::Login { email, password } => {
                commands::account::login(&mut ctx, &email, password).await?;
            }
            AccountAction::Logout => commands::account::logout(&mut ctx),
            AccountAction::Whoami => commands::account::whoami(&ctx),
            AccountAction::Update {
                name,
                email,
                current_password,
                new_password,
            } => {
                commands::account::update(&mut ctx, name, email, current_password, new_password)
                    .await?;
            }
        },
        Commands::Products { action } => match action {
            ProductAction::List {
                category,
                search,
                min_price,
                max_price,
                sort,
            } => {
                let query = BrowseQuery {
                    category,
                    search,
                    min_price,
                    max_price,
                    sort,
                };
                commands::products::list(&ctx, &query).await?;
            }
            ProductAction::Show { id } => commands::products::show(&ctx, &id).await?,
            ProductAction::Mine => commands::products::mine(&ctx)?,
            ProductAction::Create { fields } => commands::products::create(&mut ctx, fields).await?,
            ProductAction::Edit { id, fields } => {
                commands::products::edit(&mut ctx, &id, fields).await?;
            }
            ProductAction::Delete { id } => commands::products::delete(&mut ctx, &id).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Show { code } => commands::cart::show(&ctx, code.as_deref()).await?,
            CartAction::Add { id } => commands::cart::add(&mut ctx, &id).await?,
            CartAction::Remove { id } => commands::cart::remove(&mut ctx, &id),
            CartAction::Clear => commands::cart::clear(&mut ctx),
            CartAction::Checkout => commands::cart::checkout(&mut ctx).await?,
        },
        Commands::Orders { action } => match action {
            OrderAction::Purchases => commands::orders::purchases(&ctx).await?,
            OrderAction::Sales => commands::orders::sales(&ctx).await?,
            OrderAction::All => commands::orders::all(&ctx).await?,
            OrderAction::Show { id } => commands::orders::show(&ctx, &id)?,
            OrderAction::Complete { id } => {
                commands::orders::complete(&mut ctx, &id).await?;
            }
            OrderAction::Cancel { id } => commands::orders::cancel(&mut ctx, &id).await?,
        },
        Commands::Discounts { action } => match action {
            AdjustmentAction::List => commands::adjustments::list_discounts(&ctx).await?,
            AdjustmentAction::Add { fields } => {
                commands::adjustments::add_discount(&ctx, fields).await?;
            }
            AdjustmentAction::Delete { id } => {
                commands::adjustments::delete_discount(&ctx, &id).await?;
            }
        },
        Commands::Sales { action } => match action {
            AdjustmentAction::List => commands::adjustments::list_sales(&ctx).await?,
            AdjustmentAction::Add { fields } => commands::adjustments::add_sale(&ctx, fields).await?,
            AdjustmentAction::Delete { id } => commands::adjustments::delete_sale(&ctx, &id).await?,
        },
        Commands::Users { action } => match action {
            UserAction::List => commands::users::list(&ctx).await?,
            UserAction::Grant { id } => commands::users::set_admin(&ctx, &id, true).await?,
            UserAction::Revoke { id } => commands::users::set_admin(&ctx, &id, false).await?,
        },
        Commands::Forum { action } => match action {
            ForumAction::Ask {
                name,
                email,
                question,
                category,
            } => commands::forum::ask(&ctx, name, email, question, category).await?,
            ForumAction::List { status } => commands::forum::list(&ctx, status).await?,
            ForumAction::Answer { id, text } => commands::forum::answer(&ctx, &id, &text).await?,
        },
    }

    ctx.save().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_parses_typed_arguments() {
        let cli = Cli::try_parse_from([
            "market-cli",
            "products",
            "list",
            "--sort",
            "price-high",
            "--max-price",
            "$40",
        ])
        .unwrap();
        let Commands::Products {
            action: ProductAction::List { sort, max_price, .. },
        } = cli.command
        else {
            panic!("expected products list");
        };
        assert_eq!(sort, SortOrder::PriceHigh);
        assert_eq!(max_price, Some("40".parse().unwrap()));
    }

    #[test]
    fn test_unknown_condition_rejected() {
        let parsed = Cli::try_parse_from([
            "market-cli",
            "products",
            "create",
            "-t",
            "Lamp",
            "-d",
            "Bright",
            "--price",
            "5",
            "--category",
            "Books",
            "--condition",
            "shattered",
        ]);
        assert!(parsed.is_err());
    }
}
