use clap::Parser;
use psxemu::{Args, EmulatorCore, PrimitiveLog, StopReason, load_exe_data};
use tracing::info;

fn main() {
    // Parse command-line arguments
    let args = Args::parse();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load EXE data
    let exe_data = match load_exe_data(&args) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Failed to load EXE file: {}", e);
            std::process::exit(2);
        }
    };

    // Create emulator config from args
    let config = match args.to_emulator_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load boot ROM: {}", e);
            std::process::exit(2);
        }
    };

    // Create emulator
    info!("=== Creating Emulator ===");
    let mut emulator = match EmulatorCore::new(&exe_data, config, PrimitiveLog::new()) {
        Ok(emu) => emu,
        Err(e) => {
            eprintln!("Failed to create emulator: {}", e);
            std::process::exit(2);
        }
    };

    info!("Entry: {:#X}", emulator.pc());

    // Run emulator
    info!("=== Running Emulator (Headless) ===");
    let stop_reason = emulator.run();

    // Log final state
    info!("=== Emulation Complete ===");
    info!("Stop reason: {:?}", stop_reason);
    info!(
        "PC: {:#X} (stopped: {})",
        emulator.pc(),
        emulator.stopped()
    );
    let primitives = emulator.renderer();
    info!(
        "Primitives: {} quads, {} sprites, {} operations",
        primitives.quads, primitives.sprites, primitives.operations
    );
    emulator.print_final_state();

    // Determine exit code based on stop reason and whether expectations were met
    let exit_code = match stop_reason {
        StopReason::Error(e) => {
            eprintln!("Emulator error: {}", e);
            2
        }
        StopReason::Timeout => {
            eprintln!("Timeout reached before stop conditions met");
            1
        }
        StopReason::StopCondition => {
            let pc_ok = args
                .stop_pc
                .is_none_or(|expected| emulator.stopped() && emulator.pc() == expected);

            if pc_ok {
                info!("PASS: All stop conditions reached");
                0
            } else {
                // max_instructions was hit before the stop PC
                eprintln!(
                    "CPU did not reach expected PC {:#X} (actual: {:#X}, stopped: {})",
                    args.stop_pc.unwrap_or_default(),
                    emulator.pc(),
                    emulator.stopped()
                );
                1
            }
        }
    };

    std::process::exit(exit_code);
}
