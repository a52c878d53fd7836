use clap::Parser;
use psxemu::{Args, EmulatorCore, SoftwareRenderer, display, load_exe_data};
use std::error::Error;
use tracing::{error, info};

fn start(args: &Args) -> Result<(), Box<dyn Error>> {
    let exe_data = load_exe_data(args).map_err(|e| format!("failed to load EXE: {e}"))?;
    let config = args
        .to_emulator_config()
        .map_err(|e| format!("failed to load boot ROM: {e}"))?;

    info!("=== Creating Emulator ===");
    let emulator = EmulatorCore::new(&exe_data, config, SoftwareRenderer::new())?;

    info!("=== Starting Emulator with Display ===");
    info!("Entry: {:#X}", emulator.pc());
    display::run(emulator)
}

fn main() {
    let args = Args::parse();
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = start(&args) {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }
}
