use clap::Parser;
use laser_interlock::{reset_usb, Config, ControlLoop, FileWhitelist, Laser, LogReporter, SerialTransport};
use log::{error, info, warn};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// RFID interlock service for the laser cutter
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// serial device of the interlock controller
    #[arg(short, long)]
    port: Option<String>,

    /// serial baud rate
    #[arg(short, long)]
    baud: Option<u32>,

    /// file with one authorized tag per line
    #[arg(short, long)]
    whitelist: Option<PathBuf>,

    /// power-cycle the USB bus before opening the port
    #[arg(long)]
    reset_usb: bool,

    /// enable debug messages
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if args.verbose {
        builder.filter(None, log::LevelFilter::Debug);
    } else if std::env::var_os("RUST_LOG").is_none() {
        builder.filter(None, log::LevelFilter::Info);
    }
    builder.init();

    let mut cfg = match args.config.as_deref().map(Config::load).transpose() {
        Ok(cfg) => cfg.unwrap_or_default(),
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(port) = args.port {
        cfg.port = port;
    }
    if let Some(baud) = args.baud {
        cfg.baud_rate = baud;
    }
    if let Some(whitelist) = args.whitelist {
        cfg.whitelist_path = whitelist;
    }

    if args.reset_usb {
        if let Err(e) = reset_usb(&cfg.usb_authorized_path, cfg.usb_settle()) {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
        warn!("Could not install signal handler: {}", e);
    }

    info!("Opening {} at {} baud", cfg.port, cfg.baud_rate);
    let transport = match SerialTransport::new(&cfg.port, cfg.baud_rate) {
        Ok(transport) => transport,
        Err(e) => {
            error!("Failed to open {}: {}", cfg.port, e);
            return ExitCode::FAILURE;
        }
    };
    let laser = Laser::new(transport).with_read_timeout(cfg.read_timeout_ms);

    let mut control = ControlLoop::new(laser, FileWhitelist::new(&cfg.whitelist_path), LogReporter)
        .refresh_interval(cfg.refresh_interval())
        .poll_interval(cfg.poll_interval());

    match control.run(&shutdown) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            if let Err(e) = control.shutdown() {
                error!("Could not disable laser: {}", e);
            }
            ExitCode::FAILURE
        }
    }
}
