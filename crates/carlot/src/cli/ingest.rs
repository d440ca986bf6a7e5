//! The `carlot ingest` command: gate a listing's photos and store them.

use clap::Args;
use std::path::PathBuf;

use carlot_core::{Config, GateError, ImageIntake, UploadedImage};

/// Arguments for the `ingest` command.
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Photos for one listing; all must pass or none are stored
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Directory to store accepted images in (overrides config)
    #[arg(long)]
    pub image_dir: Option<PathBuf>,
}

/// Execute the ingest command.
pub async fn execute(args: IngestArgs) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if let Some(dir) = &args.image_dir {
        config.intake.image_dir = dir.clone();
    }

    let uploads = read_uploads(&args.files).await?;
    let intake = ImageIntake::from_config(&config)?;

    let refs = match intake.accept(&uploads).await {
        Ok(refs) => refs,
        Err(e) => match hint(&e) {
            Some(hint) => anyhow::bail!("{e}\n\n  Hint: {hint}"),
            None => anyhow::bail!("{e}"),
        },
    };

    tracing::info!("Stored {} image(s) in {:?}", refs.len(), intake.store().dir());
    println!("{}", serde_json::to_string_pretty(&refs)?);
    Ok(())
}

/// Advice for failures the operator can act on.
fn hint(e: &GateError) -> Option<&'static str> {
    match e {
        GateError::RemoteService { .. } if e.is_retryable() => {
            Some("The classifier is unavailable; try again later.")
        }
        GateError::Timeout { stage, .. } if stage == "classify" => {
            Some("The classifier is unavailable; try again later.")
        }
        GateError::Timeout { .. } => {
            Some("Decoding took too long; raise limits.decode_timeout_ms or upload smaller images.")
        }
        _ => None,
    }
}

/// Read each file into an upload named after its file name.
async fn read_uploads(files: &[PathBuf]) -> anyhow::Result<Vec<UploadedImage>> {
    let mut uploads = Vec::with_capacity(files.len());
    for path in files {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| anyhow::anyhow!("Cannot read {:?}: {e}", path))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        uploads.push(UploadedImage::new(name, bytes));
    }
    Ok(uploads)
}
