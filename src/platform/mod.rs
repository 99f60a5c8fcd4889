#[cfg(any(target_os = "linux", target_os = "android"))]
pub mod linux;

#[cfg(any(target_os = "linux", target_os = "android"))]
pub use self::linux::*;
