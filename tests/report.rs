use cldiag::core::{DriverError, Error, Result};
use cldiag::driver::{DeviceId, Driver, PlatformId};
use cldiag::opencl_sys::{
    cl_device_id, cl_device_info, cl_platform_id, cl_platform_info, CL_DEVICE_GLOBAL_MEM_SIZE,
    CL_DEVICE_MAX_COMPUTE_UNITS, CL_DEVICE_MAX_WORK_GROUP_SIZE, CL_DEVICE_NAME, CL_DEVICE_TYPE,
    CL_PLATFORM_NAME, CL_PLATFORM_VENDOR,
};
use cldiag::report::write_report;

const CL_INVALID_VALUE: i32 = -30;

struct StubDevice {
    name: &'static str,
    device_type: u64,
    global_mem_size: u64,
    max_compute_units: u32,
    max_work_group_size: usize,
}

impl StubDevice {
    fn gpu() -> Self {
        Self {
            name: "StubDevice",
            device_type: 4,
            global_mem_size: 1_073_741_824,
            max_compute_units: 8,
            max_work_group_size: 256,
        }
    }
}

struct StubPlatform {
    name: &'static str,
    vendor: &'static str,
    devices: Vec<StubDevice>,
}

#[derive(Default)]
struct StubDriver {
    platforms: Vec<StubPlatform>,
    fail_platform_info: bool,
}

impl StubDriver {
    fn single_gpu() -> Self {
        Self {
            platforms: vec![StubPlatform {
                name: "StubPlatform",
                vendor: "StubVendor",
                devices: vec![StubDevice::gpu()],
            }],
            ..Self::default()
        }
    }

    // Identifiers are 1-based so no handle is ever null.
    fn platform(&self, id: PlatformId) -> &StubPlatform {
        &self.platforms[id.as_raw() as usize - 1]
    }

    fn device(&self, id: DeviceId) -> &StubDevice {
        let raw = id.as_raw() as usize;
        &self.platforms[(raw >> 8) - 1].devices[(raw & 0xff) - 1]
    }
}

fn invalid_value() -> Error {
    DriverError::from_status(CL_INVALID_VALUE).into()
}

/// Probe-or-fill, the same shape the real entry points have.
fn serve(bytes: &[u8], out: Option<&mut [u8]>) -> Result<usize> {
    match out {
        None => Ok(bytes.len()),
        Some(buf) => {
            let n = buf.len().min(bytes.len());
            buf[..n].copy_from_slice(&bytes[..n]);
            Ok(buf.len())
        }
    }
}

fn nul_terminated(s: &str) -> Vec<u8> {
    let mut bytes = s.as_bytes().to_vec();
    bytes.push(0);
    bytes
}

impl Driver for StubDriver {
    fn platform_ids(&self, out: Option<&mut [PlatformId]>) -> Result<u32> {
        if let Some(ids) = out {
            for (i, id) in ids.iter_mut().enumerate() {
                *id = PlatformId::from_raw((i + 1) as cl_platform_id);
            }
        }
        Ok(self.platforms.len() as u32)
    }

    fn device_ids(&self, platform: PlatformId, out: Option<&mut [DeviceId]>) -> Result<u32> {
        let p = platform.as_raw() as usize;
        let devices = &self.platforms[p - 1].devices;

        if let Some(ids) = out {
            for (i, id) in ids.iter_mut().enumerate() {
                *id = DeviceId::from_raw(((p << 8) | (i + 1)) as cl_device_id);
            }
        }
        Ok(devices.len() as u32)
    }

    fn platform_info(
        &self,
        platform: PlatformId,
        param: cl_platform_info,
        out: Option<&mut [u8]>,
    ) -> Result<usize> {
        if self.fail_platform_info {
            return Err(invalid_value());
        }

        let p = self.platform(platform);
        let value = match param {
            CL_PLATFORM_NAME => nul_terminated(p.name),
            CL_PLATFORM_VENDOR => nul_terminated(p.vendor),
            _ => return Err(invalid_value()),
        };
        serve(&value, out)
    }

    fn device_info(
        &self,
        device: DeviceId,
        param: cl_device_info,
        out: Option<&mut [u8]>,
    ) -> Result<usize> {
        let d = self.device(device);
        let value = match param {
            CL_DEVICE_NAME => nul_terminated(d.name),
            CL_DEVICE_TYPE => d.device_type.to_ne_bytes().to_vec(),
            CL_DEVICE_GLOBAL_MEM_SIZE => d.global_mem_size.to_ne_bytes().to_vec(),
            CL_DEVICE_MAX_COMPUTE_UNITS => d.max_compute_units.to_ne_bytes().to_vec(),
            CL_DEVICE_MAX_WORK_GROUP_SIZE => d.max_work_group_size.to_ne_bytes().to_vec(),
            _ => return Err(invalid_value()),
        };
        serve(&value, out)
    }
}

fn render(driver: &StubDriver) -> (Result<()>, String) {
    let mut out = Vec::new();
    let res = write_report(driver, &mut out);
    (res, String::from_utf8(out).unwrap())
}

#[test]
fn zero_platforms_prints_only_the_count() {
    let (res, out) = render(&StubDriver::default());
    assert!(res.is_ok());
    assert_eq!(out, "Number of platforms: 0\n");
}

#[test]
fn single_gpu_end_to_end() {
    let (res, out) = render(&StubDriver::single_gpu());
    assert!(res.is_ok());
    assert_eq!(
        out,
        "\
Number of platforms: 1
Platform #1/1
    Platform name: StubPlatform
    Vendor name: StubVendor
    Number of devices: 1
    Device #1/1
        Device name: StubDevice
        Device type: GPU
        Global memory size (MB): 1024
        Max compute units: 8
        Max work group size: 256
"
    );
}

#[test]
fn platform_probe_failure_aborts_before_any_attribute() {
    let mut driver = StubDriver::single_gpu();
    driver.fail_platform_info = true;

    let (res, out) = render(&driver);
    match res {
        Err(Error::Driver(err)) => assert_eq!(err.status, CL_INVALID_VALUE),
        other => panic!("expected a driver error, got {other:?}"),
    }

    // The platform header went out, but no attribute did.
    assert_eq!(out, "Number of platforms: 1\nPlatform #1/1\n");
}

#[test]
fn unrecognized_device_type_gets_no_type_line() {
    let mut driver = StubDriver::single_gpu();
    driver.platforms[0].devices[0].device_type = 1 << 7;

    let (res, out) = render(&driver);
    assert!(res.is_ok());
    assert!(!out.contains("Device type:"));

    // The surrounding attribute lines are still adjacent and in order.
    let name_line = out.find("        Device name: StubDevice\n").unwrap();
    let mem_line = out.find("        Global memory size (MB): 1024\n").unwrap();
    assert_eq!(mem_line, name_line + "        Device name: StubDevice\n".len());
}

#[test]
fn known_type_with_unknown_bit_gets_no_type_line() {
    // A stray bit next to a known type must not collapse to that type.
    for device_type in [2 | (1 << 7), 4 | (1 << 7), 8 | (1 << 9)] {
        let mut driver = StubDriver::single_gpu();
        driver.platforms[0].devices[0].device_type = device_type;

        let (res, out) = render(&driver);
        assert!(res.is_ok());
        assert!(
            !out.contains("Device type:"),
            "mask {device_type:#x} produced a type line:\n{out}"
        );
    }
}

#[test]
fn combined_type_mask_gets_no_type_line() {
    let mut driver = StubDriver::single_gpu();
    driver.platforms[0].devices[0].device_type = 2 | 4;

    let (res, out) = render(&driver);
    assert!(res.is_ok());
    assert!(!out.contains("Device type:"));
}

#[test]
fn cpu_and_accelerator_labels() {
    let mut driver = StubDriver::single_gpu();
    driver.platforms[0].devices[0].device_type = 2;
    let (_, out) = render(&driver);
    assert!(out.contains("        Device type: CPU\n"));

    driver.platforms[0].devices[0].device_type = 8;
    let (_, out) = render(&driver);
    assert!(out.contains("        Device type: Accelerator\n"));
}

#[test]
fn indices_are_one_based_across_platforms_and_devices() {
    let driver = StubDriver {
        platforms: vec![
            StubPlatform {
                name: "First",
                vendor: "VendorA",
                devices: Vec::new(),
            },
            StubPlatform {
                name: "Second",
                vendor: "VendorB",
                devices: vec![StubDevice::gpu(), StubDevice::gpu()],
            },
        ],
        ..StubDriver::default()
    };

    let (res, out) = render(&driver);
    assert!(res.is_ok());

    assert!(out.contains("Number of platforms: 2\n"));
    assert!(out.contains("Platform #1/2\n"));
    assert!(out.contains("Platform #2/2\n"));

    // The empty platform reports zero devices and prints none.
    let first = out.find("Platform #1/2").unwrap();
    let second = out.find("Platform #2/2").unwrap();
    assert!(out[first..second].contains("    Number of devices: 0\n"));
    assert!(!out[first..second].contains("Device #"));

    assert!(out[second..].contains("    Number of devices: 2\n"));
    assert!(out[second..].contains("    Device #1/2\n"));
    assert!(out[second..].contains("    Device #2/2\n"));
}

#[test]
fn memory_size_truncates_to_whole_mib() {
    let mut driver = StubDriver::single_gpu();
    driver.platforms[0].devices[0].global_mem_size = 2_147_483_648;

    let (_, out) = render(&driver);
    assert!(out.contains("        Global memory size (MB): 2048\n"));

    // One byte short of 2 GiB truncates down.
    driver.platforms[0].devices[0].global_mem_size = 2_147_483_647;
    let (_, out) = render(&driver);
    assert!(out.contains("        Global memory size (MB): 2047\n"));
}
