use candle_core::Device;
use tracing::{debug, warn};

#[cfg(any(feature = "metal", feature = "cuda"))]
use tracing::info;

/// Picks the inference device. GPU backends are tried only when compiled in and
/// `prefer_gpu` is set; anything else runs on the CPU.
pub fn select_device(prefer_gpu: bool) -> Device {
    if !prefer_gpu {
        debug!("GPU disabled by configuration, using CPU");
        return Device::Cpu;
    }

    #[cfg(any(feature = "metal", feature = "cuda"))]
    let mut failures: Vec<String> = Vec::new();

    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(device) => {
                info!("Embedding on Metal GPU");
                return device;
            }
            Err(e) => failures.push(format!("metal: {e}")),
        }
    }

    #[cfg(feature = "cuda")]
    {
        match Device::new_cuda(0) {
            Ok(device) => {
                info!("Embedding on CUDA GPU");
                return device;
            }
            Err(e) => failures.push(format!("cuda: {e}")),
        }
    }

    #[cfg(any(feature = "metal", feature = "cuda"))]
    let reason = failures.join("; ");

    #[cfg(not(any(feature = "metal", feature = "cuda")))]
    let reason = "no GPU backend compiled".to_string();

    warn!(reason = %reason, "Embedding on CPU");
    Device::Cpu
}
