use core::fmt::{self, Debug};

use opencl_sys::{
    cl_platform_info, CL_PLATFORM_NAME, CL_PLATFORM_PROFILE, CL_PLATFORM_VENDOR,
    CL_PLATFORM_VERSION,
};

use crate::core::{Device, Result};
use crate::driver::{info_string, probe_then_fill, Driver, PlatformId};

/// One OpenCL platform, borrowed from its driver for the duration of an
/// enumeration pass.
pub struct Platform<'d, D: Driver + ?Sized> {
    driver: &'d D,
    id: PlatformId,
}

impl<'d, D: Driver + ?Sized> Platform<'d, D> {
    /// Enumerates every platform the driver reports, count query first,
    /// identifier query second.
    pub fn all(driver: &'d D) -> Result<Vec<Self>> {
        let count = driver.platform_ids(None)?;

        let mut ids = vec![PlatformId::NULL; count as usize];
        if count > 0 {
            driver.platform_ids(Some(&mut ids))?;
        }

        Ok(ids.into_iter().map(|id| Self { driver, id }).collect())
    }

    #[inline(always)]
    pub const fn id(&self) -> PlatformId {
        self.id
    }

    /// Platform name string.
    #[inline(always)]
    pub fn name(&self) -> Result<String> {
        self.get_info_string(CL_PLATFORM_NAME)
    }

    /// Platform vendor string.
    #[inline(always)]
    pub fn vendor(&self) -> Result<String> {
        self.get_info_string(CL_PLATFORM_VENDOR)
    }

    /// OpenCL profile string.
    #[inline(always)]
    pub fn profile(&self) -> Result<String> {
        self.get_info_string(CL_PLATFORM_PROFILE)
    }

    /// OpenCL version string.
    #[inline(always)]
    pub fn version(&self) -> Result<String> {
        self.get_info_string(CL_PLATFORM_VERSION)
    }

    /// Devices exposed by this platform, all device types.
    #[inline(always)]
    pub fn devices(&self) -> Result<Vec<Device<'d, D>>> {
        Device::all(self.driver, self.id)
    }

    #[inline]
    fn get_info_string(&self, param: cl_platform_info) -> Result<String> {
        let bytes = probe_then_fill(|out| self.driver.platform_info(self.id, param, out))?;
        Ok(info_string(bytes))
    }
}

impl<D: Driver + ?Sized> Debug for Platform<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Platform")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("vendor", &self.vendor())
            .finish()
    }
}
