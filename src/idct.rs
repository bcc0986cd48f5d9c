use std::f64::consts::{FRAC_1_SQRT_2, PI};

use once_cell::sync::Lazy;

/// One 8x8 block of reconstructed samples for a single component, row-major.
pub type Tile = [u8; 64];

/// `BASIS[x][u]` = C(u) * cos((2x + 1) * u * pi / 16), where C(0) = 1/sqrt(2)
/// and C(u) = 1 otherwise.
static BASIS: Lazy<[[f64; 8]; 8]> = Lazy::new(|| {
    let mut basis = [[0.; 8]; 8];
    for (x, row) in basis.iter_mut().enumerate() {
        for (u, value) in row.iter_mut().enumerate() {
            let scale = if u == 0 { FRAC_1_SQRT_2 } else { 1. };
            *value = scale * (((2 * x + 1) * u) as f64 * PI / 16.).cos();
        }
    }
    basis
});

/// Inverse DCT of 64 natural-order dequantized coefficients, level shifted
/// by 128 and clamped to a byte.
pub fn inverse_dct(coefficients: &[i32; 64]) -> Tile {
    let basis = &*BASIS;
    let mut out = [0u8; 64];
    for y in 0..8 {
        for x in 0..8 {
            let mut sum = 0.;
            for v in 0..8 {
                for u in 0..8 {
                    let coeff = coefficients[v * 8 + u];
                    if coeff != 0 {
                        sum += coeff as f64 * basis[x][u] * basis[y][v];
                    }
                }
            }
            out[y * 8 + x] = ((sum / 4.).round() + 128.).clamp(0., 255.) as u8;
        }
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_zero_dct() {
        assert_eq!(inverse_dct(&[0; 64]), [128; 64]);
    }

    #[test]
    fn test_dc_dct() {
        // A lone DC term d contributes d * (1/sqrt(2))^2 / 4 = d / 8 everywhere.
        for (dc, expected) in [(80, 138), (-80, 118), (4, 129), (-4, 127), (2000, 255), (-2000, 0)] {
            let mut block = [0; 64];
            block[0] = dc;
            assert_eq!(inverse_dct(&block), [expected; 64], "dc = {}", dc);
        }
    }

    #[test]
    fn test_horizontal_frequency() {
        let mut block = [0; 64];
        block[1] = 100;
        let tile = inverse_dct(&block);
        for y in 0..8 {
            // Every row is identical and the ramp falls from left to right.
            assert_eq!(tile[y * 8..y * 8 + 8], tile[0..8]);
            for x in 0..7 {
                assert!(tile[y * 8 + x] > tile[y * 8 + x + 1]);
            }
            // Antisymmetric around the centre.
            for x in 0..8 {
                assert_eq!(tile[y * 8 + x] as i32 - 128, 128 - tile[y * 8 + 7 - x] as i32);
            }
        }
    }

    #[test]
    fn test_vertical_frequency() {
        let mut block = [0; 64];
        block[8] = -100;
        let tile = inverse_dct(&block);
        for x in 0..8 {
            for y in 0..7 {
                assert!(tile[y * 8 + x] < tile[(y + 1) * 8 + x]);
            }
        }
    }
}
