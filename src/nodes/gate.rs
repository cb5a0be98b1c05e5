/// Gate node - noise gate with smoothed open/close and look-ahead
///
/// A power detector (squared input through a fixed 5 ms one-pole) is compared
/// with the threshold. The gate value then glides toward 1 (open) or 0 (closed)
/// with independent rise and fall times, and multiplies the look-ahead delayed
/// input.
///
/// ```text
/// power  = x^2 + c5 * (power - x^2)            c5 = exp(-1 / (sr * 0.005))
/// target = power >= 10^(thresh / 10) ? 1 : 0
/// g      = target + coeff * (g - target)        rise coeff opening, fall closing
/// out    = lookahead(x) * g
/// ```

use crate::audio_node::{AudioNode, NodeId, ProcessContext};
use crate::dsp::{LookAheadBuffer, SmoothingCoeff};
use crate::error::DspResult;
use crate::param::{InputCursor, ParamTable};

use super::compressor::DEFAULT_LOOKAHEAD_MS;

const THRESH: usize = 0;
const RISETIME: usize = 1;
const FALLTIME: usize = 2;

/// Time constant of the power detector, in seconds
const DETECTOR_TIME: f32 = 0.005;

/// Noise gate
///
/// # Parameters
/// - `thresh`: threshold in dB, clamped to [-120, 0]
/// - `risetime`: seconds for the gate to open (to 63%)
/// - `falltime`: seconds for the gate to close (to 37%)
pub struct GateNode {
    input: NodeId,
    params: ParamTable,
    power: f32,
    detector_coeff: f32,
    gate: f32,
    rise: SmoothingCoeff,
    fall: SmoothingCoeff,
    lookahead: LookAheadBuffer,
    output_amp: bool,
    sample_rate: f32,
}

impl GateNode {
    /// # Errors
    /// `DspError::Allocation` if the look-ahead buffer cannot be allocated.
    pub fn new(
        input: NodeId,
        thresh: f32,
        risetime: f32,
        falltime: f32,
        sample_rate: f32,
    ) -> DspResult<Self> {
        Ok(Self {
            input,
            params: ParamTable::new(&[
                ("thresh", thresh),
                ("risetime", risetime),
                ("falltime", falltime),
            ]),
            power: 0.0,
            detector_coeff: SmoothingCoeff::new(DETECTOR_TIME, sample_rate).coeff(),
            gate: 0.0,
            rise: SmoothingCoeff::new(risetime, sample_rate),
            fall: SmoothingCoeff::new(falltime, sample_rate),
            lookahead: LookAheadBuffer::new(DEFAULT_LOOKAHEAD_MS, sample_rate)?,
            output_amp: false,
            sample_rate,
        })
    }

    /// Set the look-ahead in ms; values outside 0..=25 are logged and ignored
    pub fn set_lookahead(&mut self, lookahead_ms: f32) -> bool {
        self.lookahead.set_lookahead(lookahead_ms)
    }

    pub fn lookahead_ms(&self) -> f32 {
        self.lookahead.lookahead_ms()
    }

    pub fn set_output_amp(&mut self, output_amp: bool) {
        self.output_amp = output_amp;
    }

    /// Current gate value in [0, 1]
    pub fn gate_value(&self) -> f32 {
        self.gate
    }
}

impl AudioNode for GateNode {
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

        for (i, sample) in output.iter_mut().enumerate() {
            let x = signal.at(i);
            let thresh = params.at(THRESH, i).clamp(-120.0, 0.0);
            let rise = self.rise.update(params.at(RISETIME, i), self.sample_rate);
            let fall = self.fall.update(params.at(FALLTIME, i), self.sample_rate);

            let squared = x * x;
            self.power = squared + self.detector_coeff * (self.power - squared);

            let (target, coeff) = if self.power >= 10.0f32.powf(thresh * 0.1) {
                (1.0, rise)
            } else {
                (0.0, fall)
            };
            self.gate = target + coeff * (self.gate - target);

            let delayed = self.lookahead.process(x);
            *sample = if self.output_amp { self.gate } else { delayed * self.gate };
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
        self.power = 0.0;
        self.gate = 0.0;
        self.lookahead.clear();
    }

    fn name(&self) -> &str {
        "GateNode"
    }
}
