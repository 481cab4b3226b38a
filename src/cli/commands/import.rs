use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

use crate::cli::{
    utils::{output_list, output_success},
    OutputFormat,
};
use crate::config;
use crate::database::open_stores;
use crate::services::QuantityPolicy;
use crate::transfer::{decode_upload, import_csv, Importer};

#[derive(Debug, Args)]
pub struct ImportArgs {
    #[arg(help = "CSV file to import")]
    pub file: PathBuf,

    #[arg(long, help = "Owner of the imported whiskeys")]
    pub user_id: i64,

    #[arg(long, help = "Username of the owner")]
    pub username: String,
}

pub async fn handle(args: ImportArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config::config();

    let bytes = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    if bytes.len() > config.api.max_upload_bytes {
        anyhow::bail!(
            "{} is larger than the {} byte upload limit",
            args.file.display(),
            config.api.max_upload_bytes
        );
    }

    let store = open_stores(&config.database).await?.whiskeys;
    let policy = QuantityPolicy::from_config(&config.import);
    let importer = Importer {
        owner: args.user_id,
        username: &args.username,
    };

    let text = decode_upload(&bytes);
    let report = import_csv(store.as_ref(), importer, &text, &policy).await?;

    let summary = &report.summary;
    let message = format!(
        "Imported {} of {} rows ({} skipped, {} errors) into {} store",
        summary.imported,
        summary.total,
        summary.skipped,
        summary.errors,
        store.backend()
    );

    output_list(&output_format, "Skipped", &report.skipped);
    output_list(&output_format, "Errors", &report.errors);
    output_success(&output_format, &message, Some(serde_json::to_value(&report)?))
}
