use std::io::Write;

use tracing::debug;

use crate::core::{DeviceType, Platform, Result};
use crate::driver::Driver;

/// Truncating conversion, matching how OpenCL tools conventionally report
/// global memory.
#[inline(always)]
pub(crate) const fn bytes_to_mib(bytes: u64) -> u64 {
    bytes / 1024 / 1024
}

/// Walks every platform and device the driver reports and writes the
/// diagnostic report. The first failing query aborts the whole report;
/// there is no partial-result recovery.
pub fn write_report<D, W>(driver: &D, out: &mut W) -> Result<()>
where
    D: Driver + ?Sized,
    W: Write,
{
    let platforms = Platform::all(driver)?;
    debug!(platforms = platforms.len(), "enumerated platforms");
    writeln!(out, "Number of platforms: {}", platforms.len())?;

    for (index, platform) in platforms.iter().enumerate() {
        writeln!(out, "Platform #{}/{}", index + 1, platforms.len())?;
        writeln!(out, "    Platform name: {}", platform.name()?)?;
        writeln!(out, "    Vendor name: {}", platform.vendor()?)?;

        let devices = platform.devices()?;
        debug!(
            platform = index + 1,
            devices = devices.len(),
            "enumerated devices"
        );
        writeln!(out, "    Number of devices: {}", devices.len())?;

        for (index, device) in devices.iter().enumerate() {
            writeln!(out, "    Device #{}/{}", index + 1, devices.len())?;
            writeln!(out, "        Device name: {}", device.name()?)?;

            // Combined or unrecognized masks get no type line at all.
            if let Some(label) = device.device_type()?.and_then(DeviceType::label) {
                writeln!(out, "        Device type: {label}")?;
            }

            writeln!(
                out,
                "        Global memory size (MB): {}",
                bytes_to_mib(device.global_mem_size()?)
            )?;
            writeln!(
                out,
                "        Max compute units: {}",
                device.max_compute_units()?
            )?;
            writeln!(
                out,
                "        Max work group size: {}",
                device.max_work_group_size()?
            )?;
        }
    }

    Ok(())
}
