/// Biquad filter node - second-order IIR filter with selectable response
///
/// Implements the RBJ (Robert Bristow-Johnson) Audio EQ Cookbook formulas.
///
/// # Filter Types
/// - **Lowpass**: passes low frequencies, attenuates above `freq`
/// - **Highpass**: passes high frequencies, attenuates below `freq`
/// - **Bandpass**: constant 0 dB peak gain at `freq`
/// - **Bandstop**: rejects a band around `freq`
/// - **Allpass**: flat magnitude, phase rotation around `freq`
///
/// # Algorithm (RBJ Cookbook)
/// ```text
/// 1. w0 = 2π * freq / sample_rate, c = cos(w0), alpha = sin(w0) / (2Q)
/// 2. (b0, b1, b2, a0, a1, a2) from (c, alpha) per filter type
/// 3. y[n] = (b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]) / a0
/// ```
///
/// Coefficients are cached against the last `(freq, Q)` pair, so constant
/// parameters cost one computation and streamed ones only recompute on change.
/// The history is seeded from the first input sample, which avoids the
/// startup transient a zeroed state produces on a nonzero-mean input.

use crate::audio_node::{AudioNode, NodeId, ProcessContext};
use crate::param::{InputCursor, ParamTable};

const FREQ: usize = 0;
const Q: usize = 1;

/// Highest cutoff as a fraction of the sample rate; keeps the poles off z = -1
const MAX_FREQ_RATIO: f32 = 0.49;

/// Biquad filter types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterType {
    #[default]
    Lowpass,
    Highpass,
    Bandpass,
    Bandstop,
    Allpass,
}

/// Difference equation coefficients
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a0: f32,
    pub a1: f32,
    pub a2: f32,
}

impl BiquadCoeffs {
    /// Cookbook coefficients; `freq` and `q` must already be clamped
    pub fn compute(filter_type: FilterType, freq: f32, q: f32, sample_rate: f32) -> Self {
        let w0 = 2.0 * std::f32::consts::PI * freq / sample_rate;
        let c = w0.cos();
        let alpha = w0.sin() / (2.0 * q);

        let (b0, b1, b2) = match filter_type {
            FilterType::Lowpass => ((1.0 - c) * 0.5, 1.0 - c, (1.0 - c) * 0.5),
            FilterType::Highpass => ((1.0 + c) * 0.5, -(1.0 + c), (1.0 + c) * 0.5),
            FilterType::Bandpass => (alpha, 0.0, -alpha),
            FilterType::Bandstop => (1.0, -2.0 * c, 1.0),
            FilterType::Allpass => (1.0 - alpha, -2.0 * c, 1.0 + alpha),
        };

        Self {
            b0,
            b1,
            b2,
            a0: 1.0 + alpha,
            a1: -2.0 * c,
            a2: 1.0 - alpha,
        }
    }
}

/// Biquad filter history
#[derive(Debug, Clone, Default)]
struct BiquadState {
    x1: f32, // Input delayed by 1 sample
    x2: f32, // Input delayed by 2 samples
    y1: f32, // Output delayed by 1 sample
    y2: f32, // Output delayed by 2 samples
    primed: bool,
}

/// Biquad filter node
///
/// - `freq`: cutoff/center frequency in Hz, clamped to [1, 0.49 * sample_rate]
/// - `q`: quality factor, clamped to [0.1, 100]
///
/// # Example
/// ```ignore
/// // Lowpass at 1000 Hz with Q = 0.707 (Butterworth)
/// let filt = BiquadNode::new(0, 1000.0, 0.707, FilterType::Lowpass, 44100.0);
/// ```
pub struct BiquadNode {
    input: NodeId,
    params: ParamTable,
    filter_type: FilterType,
    coeffs: BiquadCoeffs,
    /// `(freq, q)` the coefficients were computed from
    memo: Option<(f32, f32)>,
    state: BiquadState,
    sample_rate: f32,
}

impl BiquadNode {
    pub fn new(input: NodeId, freq: f32, q: f32, filter_type: FilterType, sample_rate: f32) -> Self {
        Self {
            input,
            params: ParamTable::new(&[("freq", freq), ("q", q)]),
            filter_type,
            coeffs: BiquadCoeffs::compute(filter_type, 1000.0, 1.0, sample_rate),
            memo: None,
            state: BiquadState::default(),
            sample_rate,
        }
    }

    /// Switch response; coefficients are recomputed on the next sample
    pub fn set_filter_type(&mut self, filter_type: FilterType) {
        self.filter_type = filter_type;
        self.memo = None;
    }

    pub fn coefficients(&self) -> BiquadCoeffs {
        self.coeffs
    }

    #[inline]
    fn update_coeffs(&mut self, freq: f32, q: f32) {
        let freq = freq.clamp(1.0, self.sample_rate * MAX_FREQ_RATIO);
        let q = q.clamp(0.1, 100.0);
        if self.memo != Some((freq, q)) {
            self.coeffs = BiquadCoeffs::compute(self.filter_type, freq, q, self.sample_rate);
            self.memo = Some((freq, q));
        }
    }
}

impl AudioNode for BiquadNode {
    fn process_block(
        &mut self,
        inputs: &[&[f32]],
        output: &mut [f32],
        _sample_rate: f32,
        _context: &ProcessContext,
    ) {
        let mut inputs = InputCursor::new(inputs);
        let signal = inputs.signal();
        let params = self.params.resolve(&mut inputs);

        if !self.state.primed && !output.is_empty() {
            let x = signal.at(0);
            self.state = BiquadState {
                x1: x,
                x2: x,
                y1: x,
                y2: x,
                primed: true,
            };
        }

        for (i, sample) in output.iter_mut().enumerate() {
            self.update_coeffs(params.at(FREQ, i), params.at(Q, i));
            let c = self.coeffs;
            let s = &mut self.state;

            let x = signal.at(i);
            let y = (c.b0 * x + c.b1 * s.x1 + c.b2 * s.x2 - c.a1 * s.y1 - c.a2 * s.y2) / c.a0;

            s.x2 = s.x1;
            s.x1 = x;
            s.y2 = s.y1;
            s.y1 = y;

            *sample = y;
        }

        params.scale_output(output);
    }

    fn signal_inputs(&self) -> Vec<NodeId> {
        vec![self.input]
    }

    fn params(&self) -> &ParamTable {
        &self.params
    }

    fn params_mut(&mut self) -> &mut ParamTable {
        &mut self.params
    }

    fn reset(&mut self) {
        self.state = BiquadState::default();
    }

    fn name(&self) -> &str {
        "BiquadNode"
    }
}
