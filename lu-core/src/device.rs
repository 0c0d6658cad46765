/// Marker trait for execution devices.
pub trait Device: std::fmt::Debug {}

/// Represents a CPU execution device.
///
/// Dense LU runs sequentially on the calling thread, so the device carries
/// no state.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuDevice {}

impl CpuDevice {
    pub fn new() -> Self {
        Self {}
    }
}

impl Device for CpuDevice {}
