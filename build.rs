#[cfg(windows)]
use camino::Utf8Path;

pub fn main() {
    #[cfg(windows)]
    link_opencl();
}

// Windows has no ICD loader on the default link path; the CUDA toolkit ships one.
#[cfg(windows)]
fn link_opencl() {
    if let Some(path) = option_env!("CUDA_PATH") {
        let lib = Utf8Path::new(path).join("lib");
        #[cfg(target_pointer_width = "32")]
        let path = lib.join("Win32");
        #[cfg(target_pointer_width = "64")]
        let path = lib.join("x64");
        println!("cargo:rustc-link-search={path}");
    } else {
        eprintln!("OpenCL library path not found, linking may fail.")
    }
}
