//! RFID-gated safety interlock for a serial-attached laser cutter controller.
//!
//! The controller speaks a newline-terminated ASCII protocol of single-character
//! commands. [`Laser`] drives it over any [`LinkTransport`], and [`ControlLoop`]
//! polls it, checks scanned tags against a periodically reloaded [`Whitelist`]
//! and enables or blocks the laser accordingly.
//!
//! # Features
//!
//! - `serial` (default) - Serial port transport using the serialport crate
//!
//! # Example
//!
//! ```ignore
//! use laser_interlock::{ControlLoop, FileWhitelist, Laser, LogReporter, SerialTransport};
//! use std::sync::atomic::AtomicBool;
//!
//! let transport = SerialTransport::new("/dev/ttyACM0", 9600)?;
//! let mut control = ControlLoop::new(Laser::new(transport), FileWhitelist::new("whitelist.txt"), LogReporter);
//! control.run(&AtomicBool::new(false))?;
//! ```

mod config;
mod control;
mod link;
mod report;
mod transport;
mod types;
mod usb;
mod whitelist;

#[cfg(feature = "serial")]
mod serial;

// Re-exports
pub use config::{Config, ConfigError};
pub use control::{Clock, ControlError, ControlLoop, SystemClock, DEFAULT_POLL_INTERVAL, DEFAULT_REFRESH_INTERVAL};
pub use link::Laser;
pub use report::{AttemptReporter, LogReporter, ReportError};
pub use transport::LinkTransport;
pub use types::{Command, LinkError, RfidFlag, ScanAttempt, Status};
pub use usb::{reset_usb, DEFAULT_SETTLE, DEFAULT_USB_AUTHORIZED_PATH};
pub use whitelist::{FileWhitelist, Whitelist, WhitelistError, WhitelistSource};

#[cfg(feature = "serial")]
pub use serial::SerialTransport;
