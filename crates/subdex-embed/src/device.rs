use candle_core::Device;
use tracing::info;

/// Pick the compute device. CPU is the fixed default so an artifact built
/// on one machine queries identically on any other; Metal is opt-in via
/// the `metal` feature.
pub fn select_device() -> Device {
    #[cfg(feature = "metal")]
    {
        if let Ok(dev) = Device::new_metal(0) {
            info!("device: Metal (MPS)");
            return dev;
        }
    }
    info!("device: CPU");
    Device::Cpu
}
