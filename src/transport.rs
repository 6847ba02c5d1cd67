/// Byte link between the host and the interlock controller.
///
/// The link is strictly request/response: the device link writes one command
/// line, then reads until it has a newline-terminated reply or a read comes
/// back empty. Backends must therefore report "nothing arrived before the
/// timeout" as `Ok(0)`, never as an error; errors end the control loop.
pub trait LinkTransport {
    /// Error type for transport operations
    type Error: std::fmt::Debug;

    /// Write a whole command line, returning the number of bytes sent
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Read whatever is available, waiting at most `timeout_ms`.
    /// Returns `Ok(0)` on timeout.
    fn read(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, Self::Error>;

    /// Drop unread input, such as a reply nobody asked for
    fn clear_input(&mut self) -> Result<(), Self::Error>;
}
