// CPU rendition of the GPU program, for snapshots and tests.

use crate::field::{self, FieldState};
use crate::settings::Mode;

use glam::{Vec2, Vec4};
use image::{Rgba, RgbaImage};

/// Renders one frame at `time` seconds into a `width`x`height` image.
///
/// Pixels are sampled at their centres with the surface origin in the
/// bottom-left corner, as the fragment stage sees them.
pub fn render_image(width: u32, height: u32, time: f32, mode: Mode) -> RgbaImage {
    log::debug!("Rasterizing {}x{} at {}s ({:?})", width, height, time, mode);

    let state = FieldState::new(time, width, height);

    RgbaImage::from_fn(width, height, |x, y| {
        let uv = pixel_uv(x, y, width, height);
        to_rgba8(sample(&state, uv, mode))
    })
}

pub fn sample(state: &FieldState, uv: Vec2, mode: Mode) -> Vec4 {
    match mode {
        Mode::Normal => field::shade(state, uv),
        Mode::DebugNoise => {
            let value = 0.5 + 0.5 * field::sample_noise(state, uv);
            Vec4::new(value, value, value, 1.0)
        }
    }
}

pub fn pixel_uv(x: u32, y: u32, width: u32, height: u32) -> Vec2 {
    Vec2::new(
        (x as f32 + 0.5) / width as f32,
        1.0 - (y as f32 + 0.5) / height as f32,
    )
}

// Out-of-range channels saturate, like a render target with a unorm format.
fn to_rgba8(color: Vec4) -> Rgba<u8> {
    let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgba([
        quantize(color.x),
        quantize(color.y),
        quantize(color.z),
        quantize(color.w),
    ])
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pixel_centres() {
        let uv = pixel_uv(0, 0, 4, 2);
        assert_relative_eq!(uv.x, 0.125);
        assert_relative_eq!(uv.y, 0.75);

        let uv = pixel_uv(3, 1, 4, 2);
        assert_relative_eq!(uv.x, 0.875);
        assert_relative_eq!(uv.y, 0.25);
    }

    #[test]
    fn test_image_size_and_constant_channels() {
        let img = render_image(32, 18, 1.25, Mode::Normal);
        assert_eq!(img.dimensions(), (32, 18));

        for pixel in img.pixels() {
            // 0.5 * 255 rounds up.
            assert_eq!(pixel[1], 128);
            assert_eq!(pixel[3], 255);
        }
    }

    #[test]
    fn test_matches_field() {
        let (width, height) = (40, 30);
        let img = render_image(width, height, 3.0, Mode::Normal);
        let state = FieldState::new(3.0, width, height);

        for &(x, y) in &[(0, 0), (20, 15), (39, 29), (7, 22)] {
            let expected = to_rgba8(field::shade(&state, pixel_uv(x, y, width, height)));
            assert_eq!(*img.get_pixel(x, y), expected);
        }
    }

    #[test]
    fn test_debug_noise_is_gray() {
        let img = render_image(16, 16, 0.0, Mode::DebugNoise);
        for pixel in img.pixels() {
            assert_eq!(pixel[0], pixel[1]);
            assert_eq!(pixel[1], pixel[2]);
            assert_eq!(pixel[3], 255);
        }
    }

    #[test]
    fn test_saturates_out_of_range_channels() {
        assert_eq!(to_rgba8(Vec4::new(-0.2, 0.5, 1.7, 1.0)), Rgba([0, 128, 255, 255]));
    }
}
