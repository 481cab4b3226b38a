use anyhow::Context;
use clap::Args;
use serde_json::json;
use std::path::PathBuf;

use crate::cli::{utils::output_success, OutputFormat};
use crate::config;
use crate::database::{open_stores, WhiskeyFilters};
use crate::transfer::export_csv;

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[arg(long, help = "Owner whose collection is exported")]
    pub user_id: i64,

    #[arg(long, short, help = "Write to this file instead of stdout")]
    pub output: Option<PathBuf>,
}

pub async fn handle(args: ExportArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config::config();
    let store = open_stores(&config.database).await?.whiskeys;

    let records = store.find_all(&WhiskeyFilters::owner(args.user_id)).await?;
    let csv = export_csv(&records)?;

    let Some(path) = args.output else {
        println!("{}", csv);
        return Ok(());
    };

    tokio::fs::write(&path, &csv)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    output_success(
        &output_format,
        &format!("Exported {} whiskeys to {}", records.len(), path.display()),
        Some(json!({ "count": records.len(), "path": path.display().to_string() })),
    )
}
