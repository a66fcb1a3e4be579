use core::fmt::{self, Debug};

use opencl_sys::{
    cl_device_info, cl_device_type, CL_DEVICE_GLOBAL_MEM_SIZE, CL_DEVICE_MAX_COMPUTE_UNITS,
    CL_DEVICE_MAX_WORK_GROUP_SIZE, CL_DEVICE_NAME, CL_DEVICE_TYPE, CL_DEVICE_TYPE_ACCELERATOR,
    CL_DEVICE_TYPE_CPU, CL_DEVICE_TYPE_CUSTOM, CL_DEVICE_TYPE_DEFAULT, CL_DEVICE_TYPE_GPU,
};

use crate::core::Result;
use crate::driver::{info_string, probe_then_fill, DeviceId, Driver, PlatformId};

/// One OpenCL device, scoped to its parent platform's enumeration pass.
pub struct Device<'d, D: Driver + ?Sized> {
    driver: &'d D,
    id: DeviceId,
}

impl<'d, D: Driver + ?Sized> Device<'d, D> {
    /// Enumerates every device of one platform, count query first,
    /// identifier query second.
    pub(crate) fn all(driver: &'d D, platform: PlatformId) -> Result<Vec<Self>> {
        let count = driver.device_ids(platform, None)?;

        let mut ids = vec![DeviceId::NULL; count as usize];
        if count > 0 {
            driver.device_ids(platform, Some(&mut ids))?;
        }

        Ok(ids.into_iter().map(|id| Self { driver, id }).collect())
    }

    #[inline(always)]
    pub const fn id(&self) -> DeviceId {
        self.id
    }

    /// Device name string.
    #[inline(always)]
    pub fn name(&self) -> Result<String> {
        self.get_info_string(CL_DEVICE_NAME)
    }

    /// The device type bitmask, or `None` when the driver reports any bit
    /// outside the known type table. Unknown bits must not be dropped, or
    /// a mask like `CPU | (1 << 7)` would pass for a plain CPU.
    #[inline(always)]
    pub fn device_type(&self) -> Result<Option<DeviceType>> {
        let bits = cl_device_type::from_ne_bytes(self.get_info_array(CL_DEVICE_TYPE)?);
        Ok(DeviceType::from_bits(bits))
    }

    /// Size of global memory in bytes.
    #[inline(always)]
    pub fn global_mem_size(&self) -> Result<u64> {
        Ok(u64::from_ne_bytes(
            self.get_info_array(CL_DEVICE_GLOBAL_MEM_SIZE)?,
        ))
    }

    /// The number of parallel compute cores on the device.
    #[inline(always)]
    pub fn max_compute_units(&self) -> Result<u32> {
        Ok(u32::from_ne_bytes(
            self.get_info_array(CL_DEVICE_MAX_COMPUTE_UNITS)?,
        ))
    }

    /// Maximum number of work-items in one work-group.
    #[inline(always)]
    pub fn max_work_group_size(&self) -> Result<usize> {
        Ok(usize::from_ne_bytes(
            self.get_info_array(CL_DEVICE_MAX_WORK_GROUP_SIZE)?,
        ))
    }

    #[inline]
    fn get_info_string(&self, param: cl_device_info) -> Result<String> {
        let bytes = probe_then_fill(|out| self.driver.device_info(self.id, param, out))?;
        Ok(info_string(bytes))
    }

    /// Fixed-width attributes still go through the size probe; a driver
    /// reporting fewer bytes than the target width is zero-extended.
    #[inline]
    fn get_info_array<const N: usize>(&self, param: cl_device_info) -> Result<[u8; N]> {
        let bytes = probe_then_fill(|out| self.driver.device_info(self.id, param, out))?;

        let mut value = [0u8; N];
        let n = bytes.len().min(N);
        value[..n].copy_from_slice(&bytes[..n]);
        Ok(value)
    }
}

impl<D: Driver + ?Sized> Debug for Device<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("type", &self.device_type())
            .field("global_mem_size", &self.global_mem_size())
            .field("max_compute_units", &self.max_compute_units())
            .field("max_work_group_size", &self.max_work_group_size())
            .finish()
    }
}

bitflags::bitflags! {
    /// The OpenCL device type.
    #[repr(transparent)]
    pub struct DeviceType : cl_device_type {
        const DEFAULT = CL_DEVICE_TYPE_DEFAULT;
        const CPU = CL_DEVICE_TYPE_CPU;
        const GPU = CL_DEVICE_TYPE_GPU;
        const ACCELERATOR = CL_DEVICE_TYPE_ACCELERATOR;
        const CUSTOM = CL_DEVICE_TYPE_CUSTOM;
    }
}

impl DeviceType {
    /// Human-readable label, defined only when the mask is exactly one of
    /// the three common types. Combined or unrecognized masks have none.
    pub fn label(self) -> Option<&'static str> {
        if self == Self::CPU {
            Some("CPU")
        } else if self == Self::GPU {
            Some("GPU")
        } else if self == Self::ACCELERATOR {
            Some("Accelerator")
        } else {
            None
        }
    }
}
