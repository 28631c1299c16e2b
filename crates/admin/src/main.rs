//! Maintenance commands for the training database.
//!
//! ```text
//! mlkids-admin migrate
//! mlkids-admin create-class <classid>
//! mlkids-admin show-class <classid>
//! mlkids-admin counts <projectid>
//! mlkids-admin rename-label <projectid> <before> <after>
//! mlkids-admin purge <projectid>
//! ```

mod config;

use std::sync::Arc;

use anyhow::{bail, Context};
use mlkids_core::ids::UuidIds;
use mlkids_core::types::ProjectType;
use mlkids_core::ObjectFactory;
use mlkids_db::store::{ProjectStore, TenantPolicyStore, TrainingStore};
use mlkids_db::{DbConfig, DbPool, StoreError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: mlkids-admin <migrate | create-class <classid> | show-class <classid> \
    | counts <projectid> | rename-label <projectid> <before> <after> | purge <projectid>>";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Migrate,
    CreateClass(String),
    ShowClass(String),
    Counts(String),
    RenameLabel {
        projectid: String,
        before: String,
        after: String,
    },
    Purge(String),
}

impl Command {
    fn parse(args: &[String]) -> anyhow::Result<Self> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let command = match args.as_slice() {
            ["migrate"] => Self::Migrate,
            ["create-class", classid] => Self::CreateClass(classid.to_string()),
            ["show-class", classid] => Self::ShowClass(classid.to_string()),
            ["counts", projectid] => Self::Counts(projectid.to_string()),
            ["rename-label", projectid, before, after] => Self::RenameLabel {
                projectid: projectid.to_string(),
                before: before.to_string(),
                after: after.to_string(),
            },
            ["purge", projectid] => Self::Purge(projectid.to_string()),
            _ => bail!(USAGE),
        };
        Ok(command)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mlkids_admin=debug,mlkids_db=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = Command::parse(&args)?;

    // --- Configuration ---
    let db_config = DbConfig::from_env()?;
    let limits = config::limits_from_env()?;
    tracing::info!(
        max_connections = db_config.max_connections,
        acquire_timeout_secs = db_config.acquire_timeout_secs,
        "Loaded database configuration"
    );

    // --- Database ---
    let pool = mlkids_db::create_pool(&db_config)
        .await
        .context("Failed to connect to database")?;
    mlkids_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tracing::info!("Database health check passed");

    let factory = ObjectFactory::new(limits, Arc::new(UuidIds));
    run(command, pool, factory).await
}

async fn run(command: Command, pool: DbPool, factory: ObjectFactory) -> anyhow::Result<()> {
    let backend = Arc::new(pool);
    let projects = ProjectStore::new(Arc::clone(&backend), factory.clone());
    let training = TrainingStore::new(Arc::clone(&backend), factory);
    let tenants = TenantPolicyStore::new(Arc::clone(&backend));

    match command {
        Command::Migrate => {
            mlkids_db::run_migrations(&backend)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");
        }
        Command::CreateClass(classid) => {
            let tenant = tenants.store_class_tenant(&classid).await?;
            println!("{}", serde_json::to_string_pretty(&tenant)?);
        }
        Command::ShowClass(classid) => {
            let tenant = tenants.get_class_tenant(&classid).await?;
            println!("{}", serde_json::to_string_pretty(&tenant)?);
        }
        Command::Counts(projectid) => {
            let project = projects
                .get_project(&projectid)
                .await?
                .ok_or_else(|| StoreError::NotFound {
                    entity: "project",
                    id: projectid.clone(),
                })?;
            let counts = match project.project_type {
                ProjectType::Text => training.count_text_training_by_label(&projectid).await?,
                ProjectType::Numbers => training.count_number_training_by_label(&projectid).await?,
                ProjectType::Images => training.count_image_training_by_label(&projectid).await?,
            };
            tracing::info!(project_id = %projectid, labels = counts.len(), "Counted training rows");
            println!("{}", serde_json::to_string_pretty(&counts)?);
        }
        Command::RenameLabel {
            projectid,
            before,
            after,
        } => {
            let renamed = training
                .rename_text_training_label(&projectid, &before, &after)
                .await?;
            println!("{renamed}");
        }
        Command::Purge(projectid) => {
            let deleted = projects.delete_entire_project(&projectid).await?;
            if deleted == 0 {
                tracing::warn!(project_id = %projectid, "Project not found, nothing purged");
            }
        }
    }
    Ok(())
}
