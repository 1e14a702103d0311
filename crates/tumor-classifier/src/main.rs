use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::SystemTime;

use burn::prelude::Device;
use clap::{Parser, Subcommand};
use log::{error, info, LevelFilter};
use simple_logger::SimpleLogger;
use tumor_classifier::{AppConfig, AppError, Classifier, Interaction, Session};

#[cfg(not(feature = "tch"))]
type InferenceBackend = burn::backend::NdArray;
#[cfg(feature = "tch")]
type InferenceBackend = burn_tch::LibTorch;

#[derive(Parser, Debug)]
#[command(author, version, about = "Classify brain MRI images into tumor categories")]
struct Args {
    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model artifact, overrides the config
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Classify a single JPEG or PNG and exit instead of reading paths from stdin
    #[arg(short, long)]
    image: Option<PathBuf>,

    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a randomly initialized model artifact, for smoke tests
    ExportUntrained { path: PathBuf },
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(err) = SimpleLogger::new().with_level(args.log_level).init() {
        eprintln!("Could not initialize logger: {err}");
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let mut config = AppConfig::from_file(args.config.as_deref())?;
    if let Some(model) = &args.model {
        config.model_path = model.clone();
    }

    let device = device();

    if let Some(Command::ExportUntrained { path }) = &args.command {
        let model = config.model.init::<InferenceBackend>(&device);
        Classifier::from_model(model, &device)?.save(path)?;
        info!("Wrote untrained model to {}", path.display());
        return Ok(());
    }

    let time = SystemTime::now();
    let classifier = Classifier::<InferenceBackend>::load(config.model_path(), &config.model, &device)?;
    info!("Ready in {:.3}s", time.elapsed().map(|t| t.as_secs_f64()).unwrap_or_default());

    match &args.image {
        Some(image) => {
            let report = Interaction::new(image).run(&classifier)?;
            println!("{report}");
        }
        None => {
            let summary = Session::new(&classifier).run(io::stdin().lock(), io::stdout().lock())?;
            info!("Classified {} images, {} failed", summary.classified, summary.failed);
        }
    }

    Ok(())
}

#[cfg(not(feature = "tch"))]
fn device() -> Device<InferenceBackend> {
    Default::default()
}

#[cfg(feature = "tch")]
fn device() -> Device<InferenceBackend> {
    if tch::utils::has_cuda() {
        burn_tch::LibTorchDevice::Cuda(0)
    } else {
        info!("No CUDA configuration detected, running on CPU");
        burn_tch::LibTorchDevice::Cpu
    }
}
