use anyhow::{anyhow, Result};
use meetup_companion_bot::config::Config;
use meetup_companion_bot::database::connection::DatabaseManager;
use std::env;
use std::io;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("migrate");

    match command {
        "migrate" | "up" => run_migrations().await,
        "check" => check_database().await,
        "reset" => reset_database().await,
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {command}");
            print_help();
            std::process::exit(1);
        }
    }
}

async fn run_migrations() -> Result<()> {
    println!("Meetup Companion Bot - database migration tool");

    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    println!("Database URL: {}", mask_url(&config.database_url));

    // SQLite needs the data directory to exist before connecting.
    if let Some(db_path) = config.database_url.strip_prefix("sqlite:") {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.exists() {
                println!("Creating directory: {}", parent.display());
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    println!("Running database migrations...");

    let db = DatabaseManager::new(&config.database_url)
        .await
        .map_err(|e| anyhow!("Failed to connect to database: {}", e))?;

    match db.run_migrations().await {
        Ok(()) => println!("Migrations completed successfully"),
        Err(e) => {
            eprintln!("Migration failed: {e}");
            std::process::exit(1);
        }
    }

    Ok(())
}

async fn check_database() -> Result<()> {
    println!("Checking database connection and schema...");

    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    println!("Database URL: {}", mask_url(&config.database_url));

    let db = DatabaseManager::new(&config.database_url)
        .await
        .map_err(|e| anyhow!("Failed to connect to database: {}", e))?;

    match list_tables(&db).await {
        Ok(tables) => {
            println!("Database connection successful, tables:");
            for table in tables {
                println!("  - {table}");
            }
        }
        Err(e) => {
            println!("Database check failed: {e}");
            println!("Try 'migrate up' to create the schema");
        }
    }

    Ok(())
}

async fn reset_database() -> Result<()> {
    println!("WARNING: this will delete ALL data in the database!");
    println!("Type 'yes' to continue:");

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    if input.trim().to_lowercase() != "yes" {
        println!("Reset cancelled");
        return Ok(());
    }

    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let db_path = config
        .database_url
        .strip_prefix("sqlite:")
        .ok_or_else(|| anyhow!("Reset is only supported for SQLite databases"))?;

    if Path::new(db_path).exists() {
        std::fs::remove_file(db_path)?;
        println!("Deleted database file: {db_path}");
    }

    println!("Recreating database schema...");
    run_migrations().await?;

    println!("Database reset completed");
    Ok(())
}

async fn list_tables(db: &DatabaseManager) -> Result<Vec<String>> {
    let tables = sqlx::query_scalar::<_, String>(
        "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
    )
    .fetch_all(&db.pool)
    .await?;

    Ok(tables)
}

fn mask_url(url: &str) -> String {
    // Keep only the file name of SQLite paths in output.
    if let Some(path) = url.strip_prefix("sqlite:") {
        if let Some(filename) = Path::new(path).file_name() {
            return format!("sqlite:.../{}", filename.to_string_lossy());
        }
    }
    url.to_string()
}

fn print_help() {
    println!("Meetup Companion Bot - database migration tool");
    println!();
    println!("USAGE:");
    println!("    migrate [COMMAND]");
    println!();
    println!("COMMANDS:");
    println!("    migrate, up    Run database migrations (default)");
    println!("    check          Check database connection and schema");
    println!("    reset          Reset database (SQLite only) - DESTRUCTIVE!");
    println!("    help           Show this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    DATABASE_URL   Database connection string (default: sqlite:./data/meetup.db)");
}
