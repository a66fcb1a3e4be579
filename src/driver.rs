use core::ptr::null_mut;

use opencl_sys::{
    cl_device_id, cl_device_info, cl_platform_id, cl_platform_info, cl_uint, clGetDeviceIDs,
    clGetDeviceInfo, clGetPlatformIDs, clGetPlatformInfo, CL_DEVICE_TYPE_ALL,
};
use tracing::trace;

use crate::core::Result;

/// Opaque platform identifier handed out by the driver. Held only for the
/// duration of one enumeration pass, never retained.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformId(cl_platform_id);

impl PlatformId {
    pub const NULL: Self = Self(null_mut());

    #[inline(always)]
    pub const fn from_raw(id: cl_platform_id) -> Self {
        Self(id)
    }

    #[inline(always)]
    pub const fn as_raw(&self) -> cl_platform_id {
        self.0
    }
}

unsafe impl Send for PlatformId {}
unsafe impl Sync for PlatformId {}

/// Opaque device identifier, scoped to its parent platform.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(cl_device_id);

impl DeviceId {
    pub const NULL: Self = Self(null_mut());

    #[inline(always)]
    pub const fn from_raw(id: cl_device_id) -> Self {
        Self(id)
    }

    #[inline(always)]
    pub const fn as_raw(&self) -> cl_device_id {
        self.0
    }
}

unsafe impl Send for DeviceId {}
unsafe impl Sync for DeviceId {}

/// The discovery and attribute-query surface of an OpenCL runtime.
///
/// Every method mirrors the probe/fill shape of the C entry points: passing
/// `None` reports a count or a value size without touching any buffer,
/// passing `Some` fills the given buffer, which the caller must have sized
/// from a preceding probe.
pub trait Driver {
    /// Platform identifiers. `None` reports how many platforms exist.
    fn platform_ids(&self, out: Option<&mut [PlatformId]>) -> Result<u32>;

    /// Device identifiers of one platform, all device types. `None`
    /// reports the device count.
    fn device_ids(&self, platform: PlatformId, out: Option<&mut [DeviceId]>) -> Result<u32>;

    /// A platform attribute. `None` probes the value size in bytes.
    fn platform_info(
        &self,
        platform: PlatformId,
        param: cl_platform_info,
        out: Option<&mut [u8]>,
    ) -> Result<usize>;

    /// A device attribute. `None` probes the value size in bytes.
    fn device_info(
        &self,
        device: DeviceId,
        param: cl_device_info,
        out: Option<&mut [u8]>,
    ) -> Result<usize>;
}

/// Probes an attribute's size, then fills a buffer of exactly that size
/// with the same query. Both platform and device attributes go through
/// here; the closure captures the handle and attribute identifier so both
/// calls are guaranteed to agree on them.
pub fn probe_then_fill<F>(mut query: F) -> Result<Vec<u8>>
where
    F: FnMut(Option<&mut [u8]>) -> Result<usize>,
{
    let len = query(None)?;
    let mut buf = vec![0u8; len];
    if len > 0 {
        query(Some(&mut buf))?;
    }
    Ok(buf)
}

/// Strings come back NUL-terminated from the driver.
pub(crate) fn info_string(mut bytes: Vec<u8>) -> String {
    while bytes.last() == Some(&0) {
        bytes.pop();
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// The system OpenCL runtime, bound through `opencl-sys`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClDriver {
    _priv: (),
}

impl ClDriver {
    /// Binds to the runtime and verifies it answers a platform count
    /// probe. A runtime that cannot even report its platform count is
    /// treated as unavailable.
    pub fn load() -> Result<Self> {
        let driver = Self::default();
        let count = driver.platform_ids(None)?;
        trace!(platforms = count, "OpenCL runtime is responding");
        Ok(driver)
    }
}

impl Driver for ClDriver {
    fn platform_ids(&self, out: Option<&mut [PlatformId]>) -> Result<u32> {
        let mut count: cl_uint = 0;
        unsafe {
            match out {
                None => tri!(clGetPlatformIDs(0, null_mut(), &mut count)),
                Some(ids) => {
                    count = ids.len() as cl_uint;
                    tri!(clGetPlatformIDs(count, ids.as_mut_ptr().cast(), null_mut()));
                }
            }
        }
        Ok(count)
    }

    fn device_ids(&self, platform: PlatformId, out: Option<&mut [DeviceId]>) -> Result<u32> {
        let mut count: cl_uint = 0;
        unsafe {
            match out {
                None => tri!(clGetDeviceIDs(
                    platform.as_raw(),
                    CL_DEVICE_TYPE_ALL,
                    0,
                    null_mut(),
                    &mut count
                )),
                Some(ids) => {
                    count = ids.len() as cl_uint;
                    tri!(clGetDeviceIDs(
                        platform.as_raw(),
                        CL_DEVICE_TYPE_ALL,
                        count,
                        ids.as_mut_ptr().cast(),
                        null_mut()
                    ));
                }
            }
        }
        Ok(count)
    }

    fn platform_info(
        &self,
        platform: PlatformId,
        param: cl_platform_info,
        out: Option<&mut [u8]>,
    ) -> Result<usize> {
        let mut size = 0usize;
        unsafe {
            match out {
                None => tri!(clGetPlatformInfo(
                    platform.as_raw(),
                    param,
                    0,
                    null_mut(),
                    &mut size
                )),
                Some(buf) => {
                    size = buf.len();
                    tri!(clGetPlatformInfo(
                        platform.as_raw(),
                        param,
                        size,
                        buf.as_mut_ptr().cast(),
                        null_mut()
                    ));
                }
            }
        }
        Ok(size)
    }

    fn device_info(
        &self,
        device: DeviceId,
        param: cl_device_info,
        out: Option<&mut [u8]>,
    ) -> Result<usize> {
        let mut size = 0usize;
        unsafe {
            match out {
                None => tri!(clGetDeviceInfo(
                    device.as_raw(),
                    param,
                    0,
                    null_mut(),
                    &mut size
                )),
                Some(buf) => {
                    size = buf.len();
                    tri!(clGetDeviceInfo(
                        device.as_raw(),
                        param,
                        size,
                        buf.as_mut_ptr().cast(),
                        null_mut()
                    ));
                }
            }
        }
        Ok(size)
    }
}
