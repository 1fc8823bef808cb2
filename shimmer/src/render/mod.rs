pub mod field;

/// Picks the swapchain format for the field.
///
/// The fragment stage writes final display values, so a linear (non-sRGB)
/// format is preferred to keep them from being gamma-encoded a second time.
pub fn preferred_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .find(|format| !format.is_srgb())
        .or_else(|| formats.first())
        .copied()
}

#[cfg(test)]
mod test {
    use super::*;
    use wgpu::TextureFormat;

    #[test]
    fn test_prefers_linear_format() {
        let formats = [TextureFormat::Bgra8UnormSrgb, TextureFormat::Bgra8Unorm];
        assert_eq!(
            preferred_surface_format(&formats),
            Some(TextureFormat::Bgra8Unorm)
        );
    }

    #[test]
    fn test_falls_back_to_first_format() {
        let formats = [TextureFormat::Rgba8UnormSrgb, TextureFormat::Bgra8UnormSrgb];
        assert_eq!(
            preferred_surface_format(&formats),
            Some(TextureFormat::Rgba8UnormSrgb)
        );
        assert_eq!(preferred_surface_format(&[]), None);
    }
}
