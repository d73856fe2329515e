use candle_core::Device;

use crate::error::{PipelineError, Result};

/// Which device a builder should load the model onto.
#[derive(Clone, Default)]
pub(crate) enum DeviceRequest {
    #[default]
    Cpu,
    Cuda(usize),
}

impl DeviceRequest {
    pub(crate) fn resolve(self) -> Result<Device> {
        match self {
            DeviceRequest::Cpu => Ok(Device::Cpu),
            DeviceRequest::Cuda(i) => Device::new_cuda(i).map_err(|e| {
                PipelineError::Device(format!(
                    "Failed to init CUDA device {i}: {e}. Try CPU as fallback."
                ))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DeviceRequest;

    #[test]
    fn cpu_request_resolves() {
        let device = DeviceRequest::Cpu.resolve().unwrap();
        assert!(device.is_cpu());
    }
}
