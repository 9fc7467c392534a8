//! Create an administrator account from the command line

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use auth::{models::NewUser, repositories::UserRepository, validation};
use common::database::{self, DatabaseConfig};

#[derive(Parser, Debug)]
#[command(name = "create_superuser", about = "Create a staff superuser account")]
struct Args {
    /// Email address used to log in
    #[arg(long)]
    email: String,

    /// Initial password
    #[arg(long, env = "SUPERUSER_PASSWORD")]
    password: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    validation::validate_email(args.email.trim()).map_err(anyhow::Error::msg)?;
    validation::validate_password(&args.password).map_err(anyhow::Error::msg)?;

    let db_config = DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;
    database::run_migrations(&pool).await?;

    let new_user = NewUser::superuser(Some(&args.email), &args.password)?;
    let repository = UserRepository::new(pool);

    match repository.create(&new_user).await? {
        Some(user) => info!("Superuser {} created with id {}", user, user.id),
        None => anyhow::bail!("A user with email {} already exists", new_user.email),
    }

    Ok(())
}
