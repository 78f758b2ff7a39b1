//! Output device discovery via `cpal`.

use cpal::traits::{DeviceTrait, HostTrait};

/// Names of all output devices on the default host.
pub fn output_device_names() -> Vec<String> {
    let host = cpal::default_host();
    match host.output_devices() {
        Ok(devices) => devices.filter_map(|d| d.name().ok()).collect(),
        Err(e) => {
            log::warn!("playback: cannot enumerate output devices: {e}");
            Vec::new()
        }
    }
}

/// Find the output device called `preferred`, falling back to the host
/// default when it is `None` or not present.
pub fn select_output_device(preferred: Option<&str>) -> Option<cpal::Device> {
    let host = cpal::default_host();

    if let Some(wanted) = preferred {
        match host.output_devices() {
            Ok(mut devices) => {
                if let Some(device) =
                    devices.find(|d| d.name().map(|n| n == wanted).unwrap_or(false))
                {
                    return Some(device);
                }
                log::warn!(
                    "playback: output device {wanted:?} not found (available: {:?}); using default",
                    output_device_names()
                );
            }
            Err(e) => {
                log::warn!("playback: cannot enumerate output devices ({e}); using default");
            }
        }
    }

    host.default_output_device()
}
