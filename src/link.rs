use log::{debug, error, warn};

use crate::transport::LinkTransport;
use crate::types::{Command, LinkError, RfidFlag, Status};

/// Device link to the interlock controller.
///
/// Every request is a single command line; requests that expect an answer
/// read exactly one newline-terminated reply.
pub struct Laser<T: LinkTransport> {
    transport: T,
    read_timeout_ms: u32,
    /// Staging buffer for the reply being read
    rx: Vec<u8>,
    enabled: bool,
    authorized: Option<bool>,
    odometer: String,
    rfid_flag: RfidFlag,
}

impl<T: LinkTransport> Laser<T> {
    const LINE_END: u8 = b'\n';
    const DEFAULT_READ_TIMEOUT_MS: u32 = 1000;

    /// Create a new device link over the given transport
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            read_timeout_ms: Self::DEFAULT_READ_TIMEOUT_MS,
            rx: Vec::new(),
            enabled: false,
            authorized: None,
            odometer: String::new(),
            rfid_flag: RfidFlag::Idle,
        }
    }

    /// How long a reply may take before it is treated as empty
    pub fn with_read_timeout(mut self, timeout_ms: u32) -> Self {
        self.read_timeout_ms = timeout_ms;
        self
    }

    /// Last enable/disable command sent. Not confirmed by the device.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Outcome of the last scan, `None` until a tag has been checked
    pub fn authorized(&self) -> Option<bool> {
        self.authorized
    }

    /// Record the outcome of a scan
    pub fn set_authorized(&mut self, authorized: bool) {
        self.authorized = Some(authorized);
    }

    /// Odometer from the last well-formed status reply. Opaque to the host.
    pub fn odometer(&self) -> &str {
        &self.odometer
    }

    /// RFID flag from the last well-formed status reply, unless cleared since
    pub fn rfid_flag(&self) -> RfidFlag {
        self.rfid_flag
    }

    /// Mark the pending scan as handled
    pub fn clear_rfid_flag(&mut self) {
        self.rfid_flag = RfidFlag::Idle;
    }

    /// Allow the laser to fire
    pub fn enable(&mut self) -> Result<(), LinkError> {
        self.send(Command::Enable)?;
        self.enabled = true;
        Ok(())
    }

    /// Block the laser
    pub fn disable(&mut self) -> Result<(), LinkError> {
        self.send(Command::Disable)?;
        self.enabled = false;
        Ok(())
    }

    /// Show text on the controller's two-line display.
    ///
    /// Empty lines are skipped, not cleared on the device.
    pub fn display(&mut self, line1: &str, line2: &str) -> Result<(), LinkError> {
        if !line1.is_empty() {
            self.send(Command::DisplayLine1(line1))?;
        }
        if !line2.is_empty() {
            self.send(Command::DisplayLine2(line2))?;
        }
        Ok(())
    }

    /// Poll odometer and RFID flag.
    ///
    /// A malformed reply is logged and leaves the previous values untouched;
    /// in that case (and for an empty reply) `Ok(None)` is returned.
    pub fn status(&mut self) -> Result<Option<Status>, LinkError> {
        let reply = self.exec(Command::Status)?;
        if reply.is_empty() {
            debug!("Empty status reply");
            return Ok(None);
        }

        match Status::parse(&reply) {
            Ok(status) => {
                self.odometer.clone_from(&status.odometer);
                self.rfid_flag = status.rfid_flag;
                Ok(Some(status))
            }
            Err(e) => {
                warn!("Error: status - {:?}: {}", reply, e);
                Ok(None)
            }
        }
    }

    /// Read the scanned tag. Empty if the controller sent nothing.
    pub fn rfid(&mut self) -> Result<String, LinkError> {
        let reply = self.exec(Command::Rfid)?;
        let mut chars = reply.chars();
        chars.next();
        Ok(chars.as_str().to_string())
    }

    /// Zero the controller's cut-time counter
    pub fn reset_cut_time(&mut self) -> Result<(), LinkError> {
        self.send(Command::ResetCutTime)
    }

    /// Have the controller persist its cut-time counter
    pub fn update_cut_time(&mut self) -> Result<(), LinkError> {
        self.send(Command::UpdateCutTime)
    }

    /// Request the cut-time counter. The reply is left on the wire and
    /// discarded by the next request.
    pub fn read_cut_time(&mut self) -> Result<(), LinkError> {
        self.send(Command::ReadCutTime)
    }

    /// Give the transport back, e.g. to inspect a mock in tests
    pub fn into_inner(self) -> T {
        self.transport
    }

    fn send(&mut self, cmd: Command<'_>) -> Result<(), LinkError> {
        let bytes = cmd.encode();
        debug!("Sending command: {:?}", String::from_utf8_lossy(&bytes));
        let written = self
            .transport
            .write(&bytes)
            .map_err(|e| LinkError::Transport(format!("{:?}", e)))?;
        debug!("Wrote {} bytes", written);
        Ok(())
    }

    fn exec(&mut self, cmd: Command<'_>) -> Result<String, LinkError> {
        self.transport
            .clear_input()
            .map_err(|e| LinkError::Transport(format!("{:?}", e)))?;
        self.send(cmd)?;
        self.read_line()
    }

    /// Read exactly one newline-terminated record. Bytes after the terminator
    /// belong to no request and are dropped. On timeout whatever arrived so
    /// far is the reply.
    fn read_line(&mut self) -> Result<String, LinkError> {
        self.rx.clear();
        loop {
            if let Some(end) = self.rx.iter().position(|&b| b == Self::LINE_END) {
                let mut line: Vec<u8> = self.rx.drain(..=end).collect();
                if !self.rx.is_empty() {
                    debug!("Dropping bytes after reply: {:?}", String::from_utf8_lossy(&self.rx));
                    self.rx.clear();
                }
                line.pop();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                let text = String::from_utf8_lossy(&line).into_owned();
                debug!("Received line: {:?}", text);
                return Ok(text);
            }

            let mut buf = [0u8; 64];
            match self.transport.read(&mut buf, self.read_timeout_ms) {
                Ok(0) => {
                    let text = String::from_utf8_lossy(&self.rx).into_owned();
                    self.rx.clear();
                    if !text.is_empty() {
                        debug!("Unterminated reply: {:?}", text);
                    }
                    return Ok(text);
                }
                Ok(n) => self.rx.extend_from_slice(&buf[..n]),
                Err(e) => {
                    error!("Read error: {:?}", e);
                    return Err(LinkError::Transport(format!("{:?}", e)));
                }
            }
        }
    }
}
