//! OpenCL platform and device diagnostics.
//!
//! `cldiag` walks every OpenCL platform the installed runtime reports and
//! prints a plain-text summary of each platform (name, vendor) and each of
//! its devices (name, type, global memory, compute units, work-group
//! limit). Every attribute is fetched with the probe-then-fill pattern the
//! OpenCL API requires: a zero-length query reports the value size, a
//! second query of exactly that size fills the buffer.
//!
//! The enumeration is generic over the [`Driver`](driver::Driver) seam, so
//! the report can run against the real runtime ([`driver::ClDriver`]) or an
//! in-memory stub in tests.

macro_rules! flat_mod {
    ($($i:ident),+) => {
        $(
            mod $i;
            pub use $i::*;
        )+
    };
}

macro_rules! tri {
    ($e:expr) => {{
        let err = $e;
        if err != 0 {
            return Err($crate::core::DriverError::from_status(err).into());
        }
    }};
}

pub mod core;
pub mod driver;
pub mod report;

#[doc(hidden)]
pub extern crate opencl_sys;

use crate::core::Result;
use crate::driver::ClDriver;

/// Binds to the OpenCL runtime and writes the full diagnostic report to
/// standard output. Any driver failure aborts the whole report.
pub fn run() -> Result<()> {
    let driver = ClDriver::load()?;
    let stdout = std::io::stdout();
    report::write_report(&driver, &mut stdout.lock())
}
