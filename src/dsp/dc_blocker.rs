/// Pole radius of the DC blocker
pub const DC_BLOCK_COEFF: f32 = 0.995;

/// First-order highpass: `y[n] = x[n] - x[n-1] + 0.995 * y[n-1]`
#[derive(Debug, Clone, Default)]
pub struct DcBlocker {
    x1: f32,
    y1: f32,
}

impl DcBlocker {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        let y = x - self.x1 + DC_BLOCK_COEFF * self.y1;
        self.x1 = x;
        self.y1 = y;
        y
    }

    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.y1 = 0.0;
    }
}
