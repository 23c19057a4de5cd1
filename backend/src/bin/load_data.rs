//! Import ingredient and tag seed files into the catalogue tables.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use backend::domain::{CatalogueService, NewTag};
use backend::inbound::csv_seed::{parse_ingredients, parse_tags};
use backend::outbound::persistence::{
    DbPool, DieselIngredientRepository, DieselTagRepository, PoolConfig, run_pending_migrations,
};
use cap_std::{ambient_authority, fs::Dir};
use clap::Parser;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

const DATABASE_URL_VAR: &str = "FOODGRAM_DATABASE_URL";

/// `load-data` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "load-data",
    about = "Load ingredients and tags from CSV, skipping rows already stored",
    version
)]
struct CliArgs {
    /// Headerless `name,measurement_unit` file.
    #[arg(long, value_name = "path")]
    ingredients: PathBuf,
    /// `name,color,slug` file, header optional.
    #[arg(long, value_name = "path")]
    tags: Option<PathBuf>,
    /// Database connection URL. Falls back to `FOODGRAM_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    /// Apply pending migrations before importing.
    #[arg(long)]
    migrate: bool,
}

fn main() -> io::Result<()> {
    if let Err(e) = fmt().with_env_filter(EnvFilter::from_default_env()).try_init() {
        warn!(error = %e, "tracing init failed");
    }
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;

    let ingredients = parse_ingredients(read_file(&args.ingredients)?.as_slice())
        .map_err(|error| invalid_file(&args.ingredients, &error))?;
    let tags: Vec<NewTag> = match &args.tags {
        Some(path) => {
            parse_tags(read_file(path)?.as_slice()).map_err(|error| invalid_file(path, &error))?
        }
        None => Vec::new(),
    };

    let database_url = resolve_database_url(args.database_url)?;
    if args.migrate {
        run_pending_migrations(&database_url)
            .await
            .map_err(|error| io::Error::other(format!("apply migrations: {error}")))?;
    }
    let pool = DbPool::new(PoolConfig::new(&database_url))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;

    let catalogue = CatalogueService::new(
        Arc::new(DieselTagRepository::new(pool.clone())),
        Arc::new(DieselIngredientRepository::new(pool)),
    );
    let summary = catalogue
        .import(&tags, &ingredients)
        .await
        .map_err(|error| io::Error::other(format!("import failed: {error}")))?;

    println!("tags: {} read, {} inserted", tags.len(), summary.tags);
    println!(
        "ingredients: {} read, {} inserted",
        ingredients.len(),
        summary.ingredients
    );
    Ok(())
}

fn invalid_file(path: &Path, error: &dyn std::fmt::Display) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("{}: {error}", path.display()),
    )
}

fn read_file(path: &Path) -> io::Result<Vec<u8>> {
    let parent = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "input path must be a file"))?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|error| {
        io::Error::other(format!(
            "open input parent directory '{}': {error}",
            parent.display()
        ))
    })?;
    directory
        .read(Path::new(file_name))
        .map_err(|error| io::Error::other(format!("read '{}': {error}", path.display())))
}

fn resolve_database_url(explicit: Option<String>) -> io::Result<String> {
    if let Some(value) = explicit {
        if value.trim().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "--database-url must not be empty when provided",
            ));
        }
        return Ok(value);
    }

    let from_env = env::var(DATABASE_URL_VAR).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("database URL missing: set --database-url or {DATABASE_URL_VAR}"),
        )
    })?;
    if from_env.trim().is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{DATABASE_URL_VAR} must not be empty"),
        ));
    }
    Ok(from_env)
}
