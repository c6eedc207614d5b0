//! Import command handlers

use anyhow::{Context, Result};
use colored::*;
use std::path::Path;
use std::time::Instant;

use super::{FirestoreArgs, RealtimeArgs};
use crate::api::{FirestoreClient, MemoryDocumentStore, MemoryPathStore, RealtimeClient};
use crate::config::{
    FIRESTORE_TOKEN_ENV, FileConfig, FirestoreSettings, RTDB_TOKEN_ENV, RealtimeSettings,
    env_token,
};
use crate::import::{Pipeline, run_firestore_import, run_realtime_import};

/// Handle the `realtime` command
pub async fn handle_realtime_command(args: RealtimeArgs, config_path: Option<&Path>) -> Result<()> {
    let file_config = FileConfig::load(config_path)?;
    let config = args.source.import_config(&file_config);
    let start = Instant::now();

    let summary = if args.dry_run {
        println!("{}", "Dry run: writing to an in-memory database".yellow());
        let store = MemoryPathStore::new();
        let summary = run_realtime_import(&config, &store).await?;
        let brands = store.snapshot().as_object().map(|o| o.len()).unwrap_or(0);
        println!(
            "\nDry run touched {} product nodes under {} brands",
            store.write_count(),
            brands
        );
        log::debug!("dry run peak concurrent writes: {}", store.peak_in_flight());
        summary
    } else {
        let settings =
            RealtimeSettings::resolve(&file_config, args.base_url, env_token(RTDB_TOKEN_ENV))?;
        if settings.auth_token.is_none() {
            log::info!("{} not set, sending unauthenticated requests", RTDB_TOKEN_ENV);
        }
        println!("Target: {}", settings.base_url.bright_green());

        let client = RealtimeClient::new(settings)
            .context("Failed to initialise Realtime Database client")?;
        run_realtime_import(&config, &client).await?
    };

    summary.print(Pipeline::Realtime);
    if summary.has_failures() {
        log::warn!("{} records were not written; re-run once the cause is fixed", summary.failed);
    }
    log::info!("realtime import finished in {:?}", start.elapsed());
    Ok(())
}

/// Handle the `firestore` command
pub async fn handle_firestore_command(args: FirestoreArgs, config_path: Option<&Path>) -> Result<()> {
    let file_config = FileConfig::load(config_path)?;
    let config = args.import_config(&file_config);
    config.validate()?;
    let start = Instant::now();

    let summary = if args.dry_run {
        println!("{}", "Dry run: writing to an in-memory store".yellow());
        let store = MemoryDocumentStore::new();
        let summary = run_firestore_import(&config, &store).await?;
        println!(
            "\nDry run holds {} documents in '{}' after {} commits",
            store.document_count(&config.collection_name),
            config.collection_name,
            store.commit_count()
        );
        log::debug!("dry run peak concurrent commits: {}", store.peak_in_flight());
        summary
    } else {
        let settings = FirestoreSettings::resolve(
            &file_config,
            args.project,
            args.database,
            env_token(FIRESTORE_TOKEN_ENV),
        )?;
        if settings.access_token.is_none() {
            log::warn!(
                "{} not set, Firestore will likely reject the commits",
                FIRESTORE_TOKEN_ENV
            );
        }
        println!(
            "Target: {} / {} / {}",
            settings.project_id.bright_green(),
            settings.database,
            config.collection_name.bright_green()
        );

        let client =
            FirestoreClient::new(settings).context("Failed to initialise Firestore client")?;
        run_firestore_import(&config, &client).await?
    };

    summary.print(Pipeline::Firestore);
    if summary.has_failures() {
        log::warn!("{} records were not written; re-run once the cause is fixed", summary.failed);
    }
    log::info!("firestore import finished in {:?}", start.elapsed());
    Ok(())
}
