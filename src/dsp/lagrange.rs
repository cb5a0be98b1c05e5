/// Number of taps of the 4th-order Lagrange interpolator
pub const LAGRANGE_TAPS: usize = 5;

/// 4th-order Lagrange fractional-delay coefficients
///
/// `h[k]` weights the sample `k` taps further back; `d` is the fractional
/// position measured from tap 0 and is best kept in `[1.5, 2.5]`.
pub fn lagrange_coefficients(d: f32) -> [f32; LAGRANGE_TAPS] {
    let d0 = d;
    let d1 = d - 1.0;
    let d2 = d - 2.0;
    let d3 = d - 3.0;
    let d4 = d - 4.0;

    [
        d1 * d2 * d3 * d4 / 24.0,
        -d0 * d2 * d3 * d4 / 6.0,
        d0 * d1 * d3 * d4 / 4.0,
        -d0 * d1 * d2 * d4 / 6.0,
        d0 * d1 * d2 * d3 / 24.0,
    ]
}
