use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use autoskip_cli::config::AutoskipConfig;
use autoskip_cli::{logging, run, RunSettings};
use clap::Parser;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(version = env!("VERSION_STRING"), about, long_about = None)]
pub struct Cli {
    /// Directory scripts are resolved against (default: next to the executable)
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Entry module, relative to the base directory
    #[arg(long)]
    entry: Option<String>,

    /// Do not write the bundled scripts into the base directory
    #[arg(long)]
    no_extract: bool,

    /// Also log to a file in the data directory
    #[arg(long)]
    log_file: bool,

    /// Exit right away on error instead of waiting for Enter
    #[arg(long)]
    no_pause: bool,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Compile the entry module and exit without running it
    #[arg(long)]
    check: bool,

    /// Write the default config file if there is none, then exit
    #[arg(long)]
    init_config: bool,
}

impl Cli {
    fn settings(&self, config: &AutoskipConfig) -> RunSettings {
        let mut settings = RunSettings::from_config(&config.scripting);
        if let Some(base_dir) = &self.base_dir {
            settings.base_dir = base_dir.clone();
        }
        if let Some(entry) = &self.entry {
            settings.entry = entry.clone();
        }
        settings.extract_resources &= !self.no_extract;
        settings.check_only = self.check;
        settings
    }
}

fn init_config(explicit: Option<PathBuf>) -> anyhow::Result<()> {
    let path = explicit
        .or_else(AutoskipConfig::config_path)
        .context("Failed to determine config directory")?;
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }
    AutoskipConfig::default().save_to(&path)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

fn start(cli: &Cli) -> anyhow::Result<()> {
    let config = AutoskipConfig::load(cli.config.as_deref())?;
    let _guard = logging::init_logging(config.logging.file || cli.log_file)
        .context("Failed to initialize logging")?;

    info!("Starting autoskip {}", env!("VERSION_STRING"));

    let mut settings = cli.settings(&config);
    settings.base_dir = std::path::absolute(&settings.base_dir)?;

    // Scripts write screenshots and other files relative to the base directory
    std::fs::create_dir_all(&settings.base_dir)?;
    std::env::set_current_dir(&settings.base_dir)
        .with_context(|| format!("Failed to enter {}", settings.base_dir.display()))?;
    run(&settings)
}

fn pause() {
    print!("Press Enter to exit...");
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}

fn main() {
    let cli = Cli::parse();

    if cli.init_config {
        if let Err(err) = init_config(cli.config.clone()) {
            eprintln!("[Error] {:#}", err);
            std::process::exit(1);
        }
        return;
    }

    if let Err(err) = start(&cli) {
        error!("{:#}", err);
        println!("[Error] {:#}", err);
        if !cli.no_pause {
            pause();
        }
        std::process::exit(1);
    }
}
