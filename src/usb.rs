//! Power-cycling the USB bus through the kernel's `authorized` attribute

use log::info;
use std::path::Path;
use std::time::Duration;

use crate::types::LinkError;

pub const DEFAULT_USB_AUTHORIZED_PATH: &str = "/sys/bus/usb/devices/usb1/authorized";
pub const DEFAULT_SETTLE: Duration = Duration::from_secs(2);

/// Deauthorize then reauthorize every device on the bus, which re-enumerates
/// a wedged controller. Requires write access to the sysfs attribute.
pub fn reset_usb(authorized_path: &Path, settle: Duration) -> Result<(), LinkError> {
    info!("Resetting USB bus via {}", authorized_path.display());
    std::fs::write(authorized_path, "0")?;
    std::thread::sleep(settle);
    std::fs::write(authorized_path, "1")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_usb_leaves_bus_authorized() {
        let file = tempfile::NamedTempFile::new().unwrap();
        reset_usb(file.path(), Duration::ZERO).unwrap();
        assert_eq!(std::fs::read_to_string(file.path()).unwrap(), "1");
    }

    #[test]
    fn test_reset_usb_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope").join("authorized");
        assert!(matches!(
            reset_usb(&missing, Duration::ZERO),
            Err(LinkError::Usb(_))
        ));
    }
}
