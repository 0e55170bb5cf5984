use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;

use fakescope::logging::{self, LogTarget};
use fakescope::report::{render_text, JsonReport};
use fakescope::{
    normalize_json, ChartSource, Config, HttpTransport, SubmissionController, SubmissionState,
    VideoFile,
};

#[derive(Parser, Debug)]
#[command(name = "fakescope")]
#[command(author, version, about = "Submit videos to a deepfake detection backend and inspect the per-frame verdicts")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Backend base URL (overrides config and FAKESCOPE_SERVER_URL)
    #[arg(long, global = true, value_name = "URL")]
    server: Option<String>,

    /// Debug logging to stderr and the configured log file (TUI: file only)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a video and print the analysis
    Analyze {
        /// Video file to analyze
        video: PathBuf,

        /// Print machine-readable JSON instead of text
        #[arg(long)]
        json: bool,

        /// Which frames to chart: sampled (anomalies if no series was sent) or anomalies
        #[arg(long, default_value = "sampled")]
        chart: ChartSource,
    },

    /// Normalize a saved backend response without uploading anything
    Inspect {
        /// JSON file holding a response body
        payload: PathBuf,

        /// Print machine-readable JSON instead of text
        #[arg(long)]
        json: bool,

        /// Which frames to chart: sampled (anomalies if no series was sent) or anomalies
        #[arg(long, default_value = "sampled")]
        chart: ChartSource,
    },

    /// Interactive client
    Tui {
        /// Directory the file picker lists (default: current directory)
        dir: Option<PathBuf>,

        /// Preselect this video
        #[arg(long)]
        video: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    Config,

    /// Generate shell completion script
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = Config::load().with_server_url(cli.server.clone());
    let target = match cli.command {
        Command::Tui { .. } => LogTarget::FileOnly,
        _ => LogTarget::Stderr,
    };
    if let Err(e) = logging::init(&config.logging, target, cli.verbose) {
        eprintln!("{} logging disabled: {}", "Warning:".yellow(), e);
    }

    match run(cli.command, config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, config: Config) -> Result<ExitCode> {
    match command {
        Command::Analyze { video, json, chart } => analyze(&config, video, json, chart),
        Command::Inspect {
            payload,
            json,
            chart,
        } => inspect(&payload, json, chart),
        Command::Tui { dir, video } => {
            let dir = match dir {
                Some(dir) => dir,
                None => std::env::current_dir().context("cannot read current directory")?,
            };
            fakescope::tui::run(config, dir, video).map_err(|e| anyhow::anyhow!("{}", e))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Config => {
            let rendered = toml::to_string_pretty(&config).context("cannot render config")?;
            print!("{}", rendered);
            Ok(ExitCode::SUCCESS)
        }
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "fakescope", &mut std::io::stdout());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn analyze(config: &Config, video: PathBuf, json: bool, chart: ChartSource) -> Result<ExitCode> {
    let file = VideoFile::from_path(video);
    let transport = HttpTransport::new(&config.server).context("cannot build HTTP client")?;
    let controller = SubmissionController::new(transport);

    if !json {
        eprintln!(
            "{} {} to {}",
            "Uploading".cyan().bold(),
            file.file_name,
            controller.transport().endpoint()
        );
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("cannot start async runtime")?;
    runtime.block_on(controller.submit(Some(&file)))?;

    match controller.state() {
        SubmissionState::Succeeded(result) => {
            if json {
                let report = JsonReport::new(&result, chart, Some(&file), controller.settled_at());
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                let title = format!("Analysis of {}", file.file_name);
                print!("{}", render_text(&result, chart, &title));
            }
            Ok(ExitCode::SUCCESS)
        }
        SubmissionState::Failed(info) => {
            if json {
                let failure = serde_json::json!({ "video": &file, "error": info });
                println!("{}", serde_json::to_string_pretty(&failure)?);
            } else {
                eprintln!("{} {}", "Analysis failed:".red().bold(), info.message);
            }
            Ok(ExitCode::FAILURE)
        }
        other => anyhow::bail!("submission ended in unexpected state '{}'", other.name()),
    }
}

fn inspect(payload: &Path, json: bool, chart: ChartSource) -> Result<ExitCode> {
    let body = std::fs::read_to_string(payload)
        .with_context(|| format!("cannot read {}", payload.display()))?;
    let result = normalize_json(&body)
        .with_context(|| format!("{} is not a usable analysis payload", payload.display()))?;

    if json {
        let report = JsonReport::new(&result, chart, None, Some(Local::now()));
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let title = format!("Analysis from {}", payload.display());
        print!("{}", render_text(&result, chart, &title));
    }
    Ok(ExitCode::SUCCESS)
}
