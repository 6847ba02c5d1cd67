//! The polling loop that ties the device link to the whitelist

use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::link::Laser;
use crate::report::{AttemptReporter, ReportError};
use crate::transport::LinkTransport;
use crate::types::{LinkError, RfidFlag, ScanAttempt};
use crate::whitelist::{Whitelist, WhitelistError, WhitelistSource};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Anything that stops the loop
#[derive(Debug, Error)]
pub enum ControlError {
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error(transparent)]
    Whitelist(#[from] WhitelistError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Time source for the loop, swapped out in tests
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// State of the interlock service.
///
/// Authorization gates enable: a whitelisted scan enables the laser, any
/// other scan disables it. There is no session expiry; once enabled, the
/// laser stays enabled for whoever uses it next until an unknown tag is
/// scanned or the loop shuts down.
pub struct ControlLoop<T, W, R, C = SystemClock>
where
    T: LinkTransport,
    W: WhitelistSource,
    R: AttemptReporter,
    C: Clock,
{
    laser: Laser<T>,
    source: W,
    reporter: R,
    clock: C,
    whitelist: Whitelist,
    last_refresh: Option<Instant>,
    refresh_interval: Duration,
    poll_interval: Duration,
}

impl<T, W, R> ControlLoop<T, W, R, SystemClock>
where
    T: LinkTransport,
    W: WhitelistSource,
    R: AttemptReporter,
{
    pub fn new(laser: Laser<T>, source: W, reporter: R) -> Self {
        Self::with_clock(laser, source, reporter, SystemClock)
    }
}

impl<T, W, R, C> ControlLoop<T, W, R, C>
where
    T: LinkTransport,
    W: WhitelistSource,
    R: AttemptReporter,
    C: Clock,
{
    pub fn with_clock(laser: Laser<T>, source: W, reporter: R, clock: C) -> Self {
        Self {
            laser,
            source,
            reporter,
            clock,
            whitelist: Whitelist::default(),
            last_refresh: None,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn laser(&self) -> &Laser<T> {
        &self.laser
    }

    pub fn laser_mut(&mut self) -> &mut Laser<T> {
        &mut self.laser
    }

    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    pub fn into_laser(self) -> Laser<T> {
        self.laser
    }

    /// One pass: refresh the whitelist if due, poll status, handle a pending scan.
    pub fn step(&mut self) -> Result<Option<ScanAttempt>, ControlError> {
        self.refresh_if_due()?;

        self.laser.status()?;
        if self.laser.rfid_flag() != RfidFlag::Pending {
            return Ok(None);
        }

        let result = self.handle_scan();
        // Cleared even when the tag read failed or came back empty.
        self.laser.clear_rfid_flag();
        result
    }

    /// Poll until `shutdown` is set, then disable the laser.
    pub fn run(&mut self, shutdown: &AtomicBool) -> Result<(), ControlError> {
        info!("Laser service starting");
        while !shutdown.load(Ordering::Relaxed) {
            self.step()?;
            self.clock.sleep(self.poll_interval);
        }
        self.shutdown()
    }

    /// Leave the laser blocked
    pub fn shutdown(&mut self) -> Result<(), ControlError> {
        info!("Shutting down, disabling laser");
        self.laser.disable()?;
        Ok(())
    }

    fn refresh_if_due(&mut self) -> Result<(), ControlError> {
        let now = self.clock.now();
        let due = match self.last_refresh {
            None => true,
            Some(last) => now.duration_since(last) >= self.refresh_interval,
        };
        if due {
            self.whitelist = self.source.load()?;
            self.last_refresh = Some(now);
            info!("Whitelist refreshed: {} tags", self.whitelist.len());
        }
        Ok(())
    }

    fn handle_scan(&mut self) -> Result<Option<ScanAttempt>, ControlError> {
        let tag = self.laser.rfid()?;
        if tag.is_empty() {
            debug!("RFID flag set but no tag returned");
            return Ok(None);
        }

        let attempt = ScanAttempt {
            authorized: self.whitelist.contains(&tag),
            tag,
        };
        self.reporter.report(&attempt)?;

        self.laser.set_authorized(attempt.authorized);
        if attempt.authorized {
            self.laser.enable()?;
            self.laser.display("Access granted", &attempt.tag)?;
        } else {
            self.laser.disable()?;
            self.laser.display("Access denied", &attempt.tag)?;
        }
        Ok(Some(attempt))
    }
}
