mod locations;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "plaza-cli")]
#[command(about = "Plaza marketplace location tooling")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Service region inspection
    Regions {
        #[command(subcommand)]
        command: RegionCommands,
    },
    /// Business location queries
    Businesses {
        #[command(subcommand)]
        command: BusinessCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    Ping,
    Migrate,
}

#[derive(Debug, Subcommand)]
enum RegionCommands {
    /// Show the active default region
    Active,
    /// Run the validation ladder for a point
    Validate {
        #[arg(long, allow_negative_numbers = true)]
        longitude: f64,
        #[arg(long, allow_negative_numbers = true)]
        latitude: f64,
    },
}

#[derive(Debug, Subcommand)]
enum BusinessCommands {
    /// Nearest business accepting orders
    Nearest {
        #[arg(long, allow_negative_numbers = true)]
        longitude: f64,
        #[arg(long, allow_negative_numbers = true)]
        latitude: f64,
        /// Restrict the search to this business and its group
        #[arg(long)]
        business_id: Option<Uuid>,
    },
    /// Counts by status and category
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("plaza-cli ready; run with --help for commands");
        return Ok(());
    };

    let config = plaza_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool =
        plaza_db::connect_pool(&config.database_url, plaza_db::PoolConfig::from_app_config(&config))
            .await?;

    match command {
        Commands::Db { command } => match command {
            DbCommands::Ping => {
                plaza_db::ping(&pool).await?;
                let postgis = plaza_db::postgis_installed(&pool).await?;
                println!("database ok (postgis: {})", if postgis { "yes" } else { "no" });
            }
            DbCommands::Migrate => {
                let applied = plaza_db::run_migrations(&pool).await?;
                println!("migrations up to date ({applied} applied)");
            }
        },
        Commands::Regions { command } => {
            let service = plaza_geofence::PgBusinessLocationService::from_pool(pool, &config);
            match command {
                RegionCommands::Active => locations::run_active_region(&service).await?,
                RegionCommands::Validate {
                    longitude,
                    latitude,
                } => locations::run_validate(&service, longitude, latitude).await?,
            }
        }
        Commands::Businesses { command } => {
            let service = plaza_geofence::PgBusinessLocationService::from_pool(pool, &config);
            match command {
                BusinessCommands::Nearest {
                    longitude,
                    latitude,
                    business_id,
                } => locations::run_nearest(&service, longitude, latitude, business_id).await?,
                BusinessCommands::Stats => locations::run_stats(&service).await?,
            }
        }
    }

    Ok(())
}
