//! Types shared by the device link and the control loop

use thiserror::Error;

/// Device-reported indicator that a scanned tag is waiting to be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RfidFlag {
    #[default]
    Idle,
    Pending,
}

impl RfidFlag {
    pub fn from_wire(c: char) -> Option<Self> {
        match c {
            '0' => Some(Self::Idle),
            '1' => Some(Self::Pending),
            _ => None,
        }
    }
}

/// Parsed reply to the `o` (status) command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub odometer: String,
    pub rfid_flag: RfidFlag,
}

impl Status {
    /// Parse `<prefix><odometer>x<flag>`. The prefix is a single echo byte.
    pub fn parse(reply: &str) -> Result<Self, LinkError> {
        let mut chars = reply.chars();
        if chars.next().is_none() {
            return Err(LinkError::InvalidResponse("empty status reply".into()));
        }
        let body = chars.as_str();

        let fields: Vec<&str> = body.split('x').collect();
        let [odometer, flag] = fields.as_slice() else {
            return Err(LinkError::InvalidResponse(format!(
                "status reply has {} fields, expected 2: {:?}",
                fields.len(),
                reply
            )));
        };

        let mut flag_chars = flag.chars();
        let rfid_flag = match (flag_chars.next(), flag_chars.next()) {
            (Some(c), None) => RfidFlag::from_wire(c),
            _ => None,
        }
        .ok_or_else(|| LinkError::InvalidResponse(format!("invalid rfid flag {:?}", flag)))?;

        Ok(Self {
            odometer: (*odometer).to_string(),
            rfid_flag,
        })
    }
}

/// One tag presented at the reader and the decision taken for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanAttempt {
    pub tag: String,
    pub authorized: bool,
}

/// Single-character commands understood by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Enable,
    Disable,
    DisplayLine1(&'a str),
    DisplayLine2(&'a str),
    Status,
    Rfid,
    ResetCutTime,
    UpdateCutTime,
    ReadCutTime,
}

impl Command<'_> {
    pub fn code(&self) -> u8 {
        match self {
            Self::Enable => b'e',
            Self::Disable => b'd',
            Self::DisplayLine1(_) => b'p',
            Self::DisplayLine2(_) => b'q',
            Self::Status => b'o',
            Self::Rfid => b'r',
            Self::ResetCutTime => b'x',
            Self::UpdateCutTime => b'y',
            Self::ReadCutTime => b'z',
        }
    }

    /// ASCII bytes on the wire, newline terminated
    pub fn encode(&self) -> Vec<u8> {
        let mut cmd = vec![self.code()];
        if let Self::DisplayLine1(text) | Self::DisplayLine2(text) = self {
            cmd.extend(sanitize_display(text).bytes());
        }
        cmd.push(b'\n');
        cmd
    }
}

/// Mask anything that is not printable ASCII, so a display payload can
/// never carry a line terminator.
pub(crate) fn sanitize_display(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii_graphic() || c == ' ' { c } else { '?' })
        .collect()
}

/// Errors that can occur while talking to the controller
#[derive(Debug, Error)]
pub enum LinkError {
    /// Transport layer error (serial port, etc.)
    #[error("transport error: {0}")]
    Transport(String),
    /// Reply from the controller did not have the expected shape
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// USB authorization pseudo-file could not be written
    #[error("usb reset failed: {0}")]
    Usb(#[from] std::io::Error),
}
