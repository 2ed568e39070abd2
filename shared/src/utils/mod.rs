//! Common utility functions

pub mod device;
pub mod validation;

pub use device::{parse_device_info, DeviceInfo, DeviceType};
pub use validation::*;
