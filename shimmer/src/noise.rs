// Classic 2D gradient (Perlin) noise with a table-free permutation.
//
// The lattice hash is a polynomial evaluated modulo 289, so every gradient is
// derived from the corner coordinates alone and the field repeats every 289
// units along each axis. `shader/perlin_field.wgsl` carries the same code for
// the GPU; keep the two in step.

use glam::{Vec2, Vec2Swizzles, Vec4, Vec4Swizzles};

/// The lattice wraps after this many cells.
pub const PERIOD: f32 = 289.0;

// Empirical contrast calibration for the gradient lengths.
const NORM_BIAS: f32 = 1.792_842_914_001_59;
const NORM_SCALE: f32 = 0.853_734_720_953_14;

// Expands the interpolated result towards [-1, 1].
const OUTPUT_SCALE: f32 = 2.3;

/// Samples the noise field at `p`. The result lies roughly within [-1, 1].
pub fn cnoise(p: Vec2) -> f32 {
    let corner_offset = Vec4::new(0.0, 0.0, 1.0, 1.0);
    let pi = mod289(p.xyxy().floor() + corner_offset);
    let pf = fract(p.xyxy()) - corner_offset;

    let ix = pi.xzxz();
    let iy = pi.yyww();
    let fx = pf.xzxz();
    let fy = pf.yyww();

    let i = permute(permute(ix) + iy);

    let gx = fract(i * (1.0 / 41.0)) * 2.0 - 1.0;
    let gy = gx.abs() - 0.5;
    let tx = (gx + 0.5).floor();
    let gx = gx - tx;

    let g00 = Vec2::new(gx.x, gy.x);
    let g10 = Vec2::new(gx.y, gy.y);
    let g01 = Vec2::new(gx.z, gy.z);
    let g11 = Vec2::new(gx.w, gy.w);

    let norm = NORM_BIAS
        - NORM_SCALE * Vec4::new(g00.dot(g00), g01.dot(g01), g10.dot(g10), g11.dot(g11));
    let g00 = g00 * norm.x;
    let g01 = g01 * norm.y;
    let g10 = g10 * norm.z;
    let g11 = g11 * norm.w;

    let n00 = g00.dot(Vec2::new(fx.x, fy.x));
    let n10 = g10.dot(Vec2::new(fx.y, fy.y));
    let n01 = g01.dot(Vec2::new(fx.z, fy.z));
    let n11 = g11.dot(Vec2::new(fx.w, fy.w));

    let fade_xy = fade(pf.xy());
    let n_x = Vec2::new(
        mix(n00, n10, fade_xy.x),
        mix(n01, n11, fade_xy.x),
    );
    let n_xy = mix(n_x.x, n_x.y, fade_xy.y);

    OUTPUT_SCALE * n_xy
}

/// Quintic smootherstep, `6t^5 - 15t^4 + 10t^3`.
pub fn fade(t: Vec2) -> Vec2 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn permute(x: Vec4) -> Vec4 {
    mod289((x * 34.0 + 1.0) * x)
}

// GLSL `mod`, which floors rather than truncates.
fn mod289(x: Vec4) -> Vec4 {
    x - (x * (1.0 / PERIOD)).floor() * PERIOD
}

// GLSL `fract`. Not `Vec4::fract`, which truncates towards zero.
fn fract(x: Vec4) -> Vec4 {
    x - x.floor()
}

fn mix(x: f32, y: f32, a: f32) -> f32 {
    x * (1.0 - a) + y * a
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn max_step(samples: &[f32]) -> f32 {
        samples
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).abs())
            .fold(0.0, f32::max)
    }

    fn slice_x(from: f32, steps: usize, y: f32) -> Vec<f32> {
        (0..=steps)
            .map(|k| cnoise(Vec2::new(from + 0.001 * k as f32, y)))
            .collect()
    }

    #[test]
    fn test_known_values() {
        assert_abs_diff_eq!(cnoise(Vec2::new(0.5, 0.5)), -0.491_532_65, epsilon = 1e-5);
        assert_abs_diff_eq!(cnoise(Vec2::new(1.25, 3.75)), 0.399_958_13, epsilon = 1e-5);
        assert_abs_diff_eq!(cnoise(Vec2::new(-2.5, 0.5)), -0.461_477_55, epsilon = 1e-5);
        assert_abs_diff_eq!(cnoise(Vec2::new(10.3, -4.7)), 0.300_757_23, epsilon = 1e-4);
    }

    #[test]
    fn test_zero_on_lattice_points() {
        for &(x, y) in &[(0.0, 0.0), (1.0, 1.0), (-3.0, 7.0), (42.0, -17.0)] {
            assert_abs_diff_eq!(cnoise(Vec2::new(x, y)), 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_deterministic() {
        let p = Vec2::new(3.141, -2.718);
        assert_eq!(cnoise(p).to_bits(), cnoise(p).to_bits());
    }

    #[test]
    fn test_period() {
        for &(x, y) in &[(0.3, 0.7), (12.25, 5.5), (-3.4, 2.2), (100.6, 200.1)] {
            let base = cnoise(Vec2::new(x, y));
            assert_abs_diff_eq!(base, cnoise(Vec2::new(x + PERIOD, y)), epsilon = 1e-3);
            assert_abs_diff_eq!(base, cnoise(Vec2::new(x, y + PERIOD)), epsilon = 1e-3);
        }
    }

    #[test]
    fn test_range() {
        let mut min = f32::MAX;
        let mut max = f32::MIN;

        for i in 0..=400 {
            for j in 0..=160 {
                let n = cnoise(Vec2::new(-40.0 + 0.2 * i as f32, -40.0 + 0.5 * j as f32));
                min = min.min(n);
                max = max.max(n);
            }
        }

        assert!(min >= -1.2, "minimum {} below range", min);
        assert!(max <= 1.2, "maximum {} above range", max);
        // The field should actually use most of its range.
        assert!(min < -0.5 && max > 0.5);
    }

    #[test]
    fn test_continuous_across_cell_boundary() {
        for &y in &[0.0, 0.3, 0.77] {
            let interior = max_step(&slice_x(0.1, 800, y));
            let boundary = max_step(&slice_x(0.99, 20, y));

            assert!(boundary < 0.005);
            assert!(
                boundary <= 4.0 * interior.max(1e-4),
                "jump of {} at the boundary, {} inside the cell",
                boundary,
                interior
            );
        }

        let across_y: Vec<f32> = (0..=20)
            .map(|k| cnoise(Vec2::new(0.3, 0.99 + 0.001 * k as f32)))
            .collect();
        assert!(max_step(&across_y) < 0.005);
    }

    #[test]
    fn test_fade_endpoints() {
        let f = fade(Vec2::new(0.0, 1.0));
        assert_relative_eq!(f.x, 0.0);
        assert_relative_eq!(f.y, 1.0);
        assert_relative_eq!(fade(Vec2::splat(0.5)).x, 0.5);
    }
}
