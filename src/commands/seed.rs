//! Seed command - Inserts demo accounts and catalog without starting the server.

use std::sync::Arc;

use crate::cli::args::{SeedArgs, SeedTarget};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, Persistence};
use crate::services::{SeedService, Seeder};

pub async fn execute(args: SeedArgs, config: Config) -> AppResult<()> {
    let db = Database::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    let seeder = Seeder::new(Arc::new(Persistence::new(db.get_connection())));

    let report = match args.target {
        SeedTarget::Users => seeder.seed_users().await?,
        SeedTarget::Products => seeder.seed_products().await?,
        SeedTarget::All => seeder.seed_all().await?,
    };

    tracing::info!(
        users = report.users_created,
        products = report.products_created,
        "Seeding completed"
    );
    println!(
        "Created {} user(s) and {} product(s)",
        report.users_created, report.products_created
    );

    Ok(())
}
