//! meadow - terminal simulator for the step sequencer firmware
//!
//! Run with: cargo run --bin meadow -- --help

mod app;
mod audio;
mod hardware;
mod store;
mod ui;

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use meadow_seq::Config;

use app::Meadow;

#[derive(Parser, Debug)]
#[command(name = "meadow", about = "Run the sequencer firmware against a simulated panel and grid")]
struct Cli {
    /// Pattern file, read at boot and written on a long press
    #[arg(long, default_value = "meadow-pattern.json")]
    pattern: PathBuf,

    /// Firmware config (TOML); missing keys keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tempo of the simulated external clock
    #[arg(long, default_value_t = 120.0)]
    ext_bpm: f64,

    /// Initial raw tempo knob position (0-1023)
    #[arg(long, default_value_t = 0x200)]
    knob: u16,

    /// Boot with a cable in the clock input
    #[arg(long)]
    cable: bool,

    /// No audio clicks
    #[arg(long)]
    silent: bool,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,

    /// Log file
    #[arg(long, default_value = "meadow.log")]
    log: PathBuf,
}

fn init_logging(path: &Path, verbose: bool) -> EyreResult<()> {
    use simplelog::{LevelFilter, WriteLogger};

    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    let file = File::create(path)
        .wrap_err_with(|| format!("cannot create log file {}", path.display()))?;
    WriteLogger::init(level, simplelog::Config::default(), file)
        .wrap_err("failed to initialize logger")?;

    log::info!("meadow starting (log level: {level:?})");
    Ok(())
}

fn load_config(path: Option<&Path>) -> EyreResult<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("cannot read config {}", path.display()))?;
    let config: Config =
        toml::from_str(&text).wrap_err_with(|| format!("invalid config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    // the terminal belongs to the UI, so logs go to a file
    init_logging(&cli.log, cli.verbose)?;
    let config = load_config(cli.config.as_deref())?;

    Meadow::new(config)
        .pattern_path(cli.pattern)
        .ext_bpm(cli.ext_bpm)
        .knob(cli.knob)
        .cable(cli.cable)
        .audio(!cli.silent)
        .run()
}
