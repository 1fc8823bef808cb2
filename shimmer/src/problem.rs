use thiserror::Error;

#[derive(Debug, Error)]
pub enum Problem {
    #[error("Viewport must have a positive size, got {width}x{height}")]
    EmptyViewport { width: u32, height: u32 },

    #[error("Setting `{name}` must be a positive, finite number, got {value}")]
    InvalidSetting { name: &'static str, value: f64 },

    #[error("Failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("Failed to find an appropriate adapter: {0}")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),

    #[error("Failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("Failed to read settings: {0}")]
    ReadSettings(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    ParseSettings(#[from] serde_json::Error),

    #[error("Failed to write image: {0}")]
    WriteImage(#[from] image::ImageError),
}

/// Rejects viewports the color field cannot be evaluated on.
pub fn check_viewport(width: u32, height: u32) -> Result<(), Problem> {
    if width == 0 || height == 0 {
        return Err(Problem::EmptyViewport { width, height });
    }

    Ok(())
}
