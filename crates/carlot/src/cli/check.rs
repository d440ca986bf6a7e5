//! The `carlot check` command: report a verdict for each photo.

use clap::{Args, ValueEnum};
use futures_util::stream::{self, StreamExt};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use carlot_core::output::OutputFormat as CoreOutputFormat;
use carlot_core::pipeline::UploadValidator;
use carlot_core::{CheckReport, Config, ImageGate, OutputWriter, SharpnessAnalyzer};

/// Arguments for the `check` command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Image files to check
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "jsonl")]
    pub format: OutputFormat,

    /// Number of files checked concurrently
    #[arg(short, long, default_value = "4")]
    pub parallel: usize,

    /// Run only the local sharpness check (no classifier call)
    #[arg(long)]
    pub sharpness_only: bool,
}

/// Supported output formats.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON array
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => CoreOutputFormat::Json,
            OutputFormat::Jsonl => CoreOutputFormat::JsonLines,
        }
    }
}

/// Which stages a check runs.
#[derive(Clone)]
enum Mode {
    Full(ImageGate),
    SharpnessOnly(SharpnessAnalyzer),
}

/// Checks individual files; cheap to share across concurrent tasks.
struct Checker {
    validator: UploadValidator,
    mode: Mode,
}

impl Checker {
    fn new(config: &Config, sharpness_only: bool) -> anyhow::Result<Self> {
        let mode = if sharpness_only {
            Mode::SharpnessOnly(SharpnessAnalyzer::new(config.sharpness.clone()))
        } else {
            Mode::Full(ImageGate::from_config(config)?)
        };
        Ok(Self {
            validator: UploadValidator::new(config.limits.clone(), &config.intake),
            mode,
        })
    }

    async fn check(&self, path: &Path) -> CheckReport {
        let name = path.display().to_string();

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => return CheckReport::failed(name, format!("Cannot read file: {e}")),
        };

        if let Err(e) = self.validator.check(&name, &bytes) {
            return CheckReport::from_error(name, &e);
        }

        match &self.mode {
            Mode::Full(gate) => match gate.validate(&name, &bytes).await {
                Ok(outcome) => CheckReport::from_outcome(name, outcome),
                Err(e) => CheckReport::from_error(name, &e),
            },
            Mode::SharpnessOnly(analyzer) => {
                let analyzer = analyzer.clone();
                let task_name = name.clone();
                let joined =
                    tokio::task::spawn_blocking(move || analyzer.analyze(&bytes, &task_name)).await;
                match joined {
                    Ok(Ok(sharpness)) => CheckReport::from_sharpness(name, sharpness),
                    Ok(Err(e)) => CheckReport::from_error(name, &e),
                    Err(e) => CheckReport::failed(name, format!("Task join error: {e}")),
                }
            }
        }
    }

    /// Check every file, at most `parallel` at a time, keeping input order.
    async fn check_all(&self, files: &[PathBuf], parallel: usize) -> Vec<CheckReport> {
        stream::iter(files)
            .map(|path| self.check(path))
            .buffered(parallel.max(1))
            .collect()
            .await
    }
}

/// Execute the check command.
pub async fn execute(args: CheckArgs) -> anyhow::Result<()> {
    let config = Config::load()?;
    let checker = Checker::new(&config, args.sharpness_only)?;

    tracing::info!("Checking {} image(s)", args.files.len());
    let start = std::time::Instant::now();
    let reports = checker.check_all(&args.files, args.parallel).await;

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = OutputWriter::new(sink, args.format.into(), args.output.is_none());
    writer.write_all(&reports)?;
    writer.flush()?;
    if let Some(path) = &args.output {
        tracing::info!("Output written to {:?}", path);
    }

    let summary = Summary::of(&reports);
    tracing::info!(
        "Checked {} image(s) in {:.1}s: {} accepted, {} rejected, {} failed",
        reports.len(),
        start.elapsed().as_secs_f64(),
        summary.accepted,
        summary.rejected,
        summary.failed
    );

    if summary.accepted < reports.len() {
        anyhow::bail!(
            "{} of {} image(s) were not accepted",
            reports.len() - summary.accepted,
            reports.len()
        );
    }
    Ok(())
}

/// Counts per report status.
#[derive(Debug, Default, PartialEq, Eq)]
struct Summary {
    accepted: usize,
    rejected: usize,
    failed: usize,
}

impl Summary {
    fn of(reports: &[CheckReport]) -> Self {
        use carlot_core::ReportStatus;

        reports.iter().fold(Self::default(), |mut s, r| {
            match r.status {
                ReportStatus::Accepted => s.accepted += 1,
                ReportStatus::Rejected => s.rejected += 1,
                ReportStatus::Error => s.failed += 1,
            }
            s
        })
    }
}
