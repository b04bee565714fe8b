use clap::{Arg, Command as ClapCommand, ArgAction};
use std::process;
use log::{error, info, LevelFilter};

use rawkit::utils::logger::Logger;
use rawkit::commands::{CommandFactory, RawkitCommandFactory};

fn main() {
    let matches = ClapCommand::new("RawKit")
        .version("1.0")
        .about("Inspect and decode camera RAW files")
        .arg(
            Arg::new("input")
                .help("Input RAW file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("type")
                .short('t')
                .long("type")
                .help("RAW format, overriding the file extension (orf, nef, erf, arw, pef, dng, cr2, rw2)")
                .value_name("TYPE")
                .required(false),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("extract-raw")
                .short('e')
                .long("extract-raw")
                .help("Write the sensor data to this file (image extension for a 16-bit image)")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("thumbnail")
                .long("thumbnail")
                .help("Extract the embedded preview closest to this size")
                .value_name("SIZE")
                .requires("output")
                .required(false),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output file for the thumbnail")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("no-decompress")
                .long("no-decompress")
                .help("Keep compressed sensor data as stored")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let logger = match Logger::new("rawkit.log") {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Error initializing logger: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = Logger::init_global_logger("rawkit-global.log", level) {
        eprintln!("Error setting up global logger: {}", e);
        process::exit(1);
    }

    let factory = RawkitCommandFactory::new();

    let command_result = factory.create_command(&matches, &logger);
    match command_result {
        Ok(command) => {
            info!("Running {} command", command.name());
            if let Err(e) = command.execute() {
                error!("{} command failed: {}", command.name(), e);
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to create command: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
}
