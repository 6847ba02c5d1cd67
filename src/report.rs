//! Forwarding scan attempts

use log::{info, warn};
use thiserror::Error;

use crate::types::ScanAttempt;

#[derive(Debug, Error)]
#[error("failed to report attempt for {tag}: {reason}")]
pub struct ReportError {
    pub tag: String,
    pub reason: String,
}

/// Receives every scan decision made by the control loop
pub trait AttemptReporter {
    fn report(&mut self, attempt: &ScanAttempt) -> Result<(), ReportError>;
}

/// Writes attempts to the log under the `laser_interlock::attempt` target
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl AttemptReporter for LogReporter {
    fn report(&mut self, attempt: &ScanAttempt) -> Result<(), ReportError> {
        if attempt.authorized {
            info!(target: "laser_interlock::attempt", "granted tag={}", attempt.tag);
        } else {
            warn!(target: "laser_interlock::attempt", "denied tag={}", attempt.tag);
        }
        Ok(())
    }
}

impl<F> AttemptReporter for F
where
    F: FnMut(&ScanAttempt) -> Result<(), ReportError>,
{
    fn report(&mut self, attempt: &ScanAttempt) -> Result<(), ReportError> {
        self(attempt)
    }
}
