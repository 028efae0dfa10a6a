use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{Engine, MAX_PAGE_SIZE, Money, NewCreditPackage, NewProduct, Pagination};
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "rewards_admin")]
#[command(about = "Admin utilities for the rewards ledger (bootstrap users and catalog)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./rewards.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Category(Category),
    Package(Package),
    Product(Product),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
    /// Compare the stored balance with the purchase/redemption history.
    Audit(UserAuditArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
struct UserAuditArgs {
    #[arg(long)]
    id: Uuid,
}

#[derive(Args, Debug)]
struct Category {
    #[command(subcommand)]
    command: CategoryCommand,
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    Create(CategoryCreateArgs),
    List,
}

#[derive(Args, Debug)]
struct CategoryCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    description: String,
}

#[derive(Args, Debug)]
struct Package {
    #[command(subcommand)]
    command: PackageCommand,
}

#[derive(Subcommand, Debug)]
enum PackageCommand {
    Create(PackageCreateArgs),
    List,
}

#[derive(Args, Debug)]
struct PackageCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    description: String,
    /// Decimal price, e.g. `25.00`.
    #[arg(long, value_parser = parse_money)]
    price: Money,
    #[arg(long)]
    reward_points: i64,
}

#[derive(Args, Debug)]
struct Product {
    #[command(subcommand)]
    command: ProductCommand,
}

#[derive(Subcommand, Debug)]
enum ProductCommand {
    Create(ProductCreateArgs),
}

#[derive(Args, Debug)]
struct ProductCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    category_id: Option<Uuid>,
    #[arg(long)]
    point_cost: i64,
    #[arg(long, default_value_t = 0)]
    stock: i64,
    /// Make the product redeemable right away.
    #[arg(long)]
    offered: bool,
    #[arg(long, default_value = "")]
    image_url: String,
}

fn parse_money(raw: &str) -> Result<Money, String> {
    raw.parse::<Money>().map_err(|err| err.to_string())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let mut options = ConnectOptions::new(database_url.to_string());
    if database_url.starts_with("sqlite:") {
        options.max_connections(1);
    }
    let db = Database::connect(options).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();
    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let id = engine.new_user(&args.email, &args.name).await?;
            println!("created user: {id}");
        }
        Command::User(User {
            command: UserCommand::Audit(args),
        }) => {
            let audit = engine.audit_user_ledger(args.id).await?;
            println!(
                "balance={} credited={} spent={} consistent={}",
                audit.point_balance, audit.points_credited, audit.points_spent, audit.consistent
            );
            if !audit.consistent {
                std::process::exit(2);
            }
        }
        Command::Category(Category {
            command: CategoryCommand::Create(args),
        }) => {
            let id = engine.new_category(&args.name, &args.description).await?;
            println!("created category: {id}");
        }
        Command::Category(Category {
            command: CategoryCommand::List,
        }) => {
            for category in engine.categories().await? {
                println!("{}\t{}", category.id, category.name);
            }
        }
        Command::Package(Package {
            command: PackageCommand::Create(args),
        }) => {
            let cmd = NewCreditPackage::new(args.name, args.price, args.reward_points)
                .description(args.description);
            let id = engine.new_credit_package(cmd).await?;
            println!("created package: {id}");
        }
        Command::Package(Package {
            command: PackageCommand::List,
        }) => {
            let page = engine
                .credit_packages(Pagination::new(1, MAX_PAGE_SIZE)?)
                .await?;
            for package in page.items {
                println!(
                    "{}\t{}\t{}\t{} pts\t{}",
                    package.id,
                    package.name,
                    package.price,
                    package.reward_points,
                    if package.is_active { "active" } else { "inactive" }
                );
            }
        }
        Command::Product(Product {
            command: ProductCommand::Create(args),
        }) => {
            let mut cmd = NewProduct::new(args.name, args.point_cost, args.stock)
                .description(args.description)
                .in_offer_pool(args.offered)
                .image_url(args.image_url);
            if let Some(category_id) = args.category_id {
                cmd = cmd.category_id(category_id);
            }
            let id = engine.new_product(cmd).await?;
            println!("created product: {id}");
        }
    }

    Ok(())
}
