/// Compressor node - envelope follower, soft-knee gain computer, look-ahead
///
/// The envelope of the undelayed input drives the gain computer; the gain is
/// applied to the input read back from a look-ahead buffer, so transients are
/// already attenuated when they reach the output.
///
/// # Algorithm
/// ```text
/// 1. follow = |x| + coeff * (follow - |x|)   (rise coeff if follow < |x|)
/// 2. indb = 20 * log10(follow + 1e-20), diff = indb - thresh
/// 3. above thresh + 3*knee:  out_db = diff - diff / ratio
///    inside the knee band:   same, with ratio' = 1 + (ratio - 1) * t^2
///    below:                  out_db = 0
/// 4. gain = clamp(10^(-out_db / 20), 1e-20, 1)
/// 5. output = lookahead(x) * gain   (or gain alone in output-amp mode)
/// ```
///
/// # Parameters
/// - `thresh`: threshold in dB, clamped to [-120, 0]
/// - `ratio`: compression ratio, clamped to [1, 100]
/// - `risetime` / `falltime`: envelope times in seconds
/// - `knee`: knee width, 0 = hard knee, 1 = ±3 dB around the threshold

use crate::audio_node::{AudioNode, NodeId, ProcessContext};
use crate::dsp::{amp_to_db, EnvelopeFollower, LookAheadBuffer};
use crate::error::DspResult;
use crate::param::{InputCursor, ParamTable};

const THRESH: usize = 0;
const RATIO: usize = 1;
const RISETIME: usize = 2;
const FALLTIME: usize = 3;
const KNEE: usize = 4;

/// dB of knee band on each side of the threshold per unit of `knee`
pub const KNEE_DB: f32 = 3.0;

/// Default look-ahead in milliseconds
pub const DEFAULT_LOOKAHEAD_MS: f32 = 5.0;

/// Effective ratio inside a knee band
///
/// `t` is the normalised position in the band: 0 at the outer edge (ratio 1),
/// 1 at the inner edge (full `ratio`).
#[inline]
pub fn knee_ratio(ratio: f32, t: f32) -> f32 {
    1.0 + (ratio - 1.0) * t * t
}

/// Gain reduction in dB for an input level of `indb`
///
/// Zero below the knee, `diff - diff / ratio` above it, with the effective
/// ratio interpolated across the knee band.
pub fn compression_db(indb: f32, thresh: f32, ratio: f32, knee: f32) -> f32 {
    let diff = indb - thresh;
    let half_band = knee * KNEE_DB;

    if indb >= thresh + half_band {
        diff - diff / ratio
    } else if half_band > 0.0 && indb > thresh - half_band {
        let t = (indb - (thresh - half_band)) / (2.0 * half_band);
        let r = knee_ratio(ratio, t);
        (diff - diff / r).max(0.0)
    } else {
        0.0
    }
}

pub struct CompressorNode {
    input: NodeId,
    params: ParamTable,
    envelope: EnvelopeFollower,
    lookahead: LookAheadBuffer,
    /// Emit the gain alone instead of the compressed signal
    output_amp: bool,
    sample_rate: f32,
}

impl CompressorNode {
    /// # Errors
    /// `DspError::Allocation` if the look-ahead buffer cannot be allocated.
    pub fn new(
        input: NodeId,
        thresh: f32,
        ratio: f32,
        risetime: f32,
        falltime: f32,
        knee: f32,
        sample_rate: f32,
    ) -> DspResult<Self> {
        Ok(Self {
            input,
            params: ParamTable::new(&[
                ("thresh", thresh),
                ("ratio", ratio),
                ("risetime", risetime),
                ("falltime", falltime),
                ("knee", knee),
            ]),
            envelope: EnvelopeFollower::new(risetime, falltime, sample_rate),
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

    pub fn output_amp(&self) -> bool {
        self.output_amp
    }
}

impl AudioNode for CompressorNode {
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
            let ratio = params.at(RATIO, i).clamp(1.0, 100.0);
            let knee = params.at(KNEE, i).clamp(0.0, 1.0);

            self.envelope
                .set_times(params.at(RISETIME, i), params.at(FALLTIME, i), self.sample_rate);
            let follow = self.envelope.process(x.abs());

            let out_db = compression_db(amp_to_db(follow), thresh, ratio, knee);
            let gain = 10.0f32.powf(-out_db * 0.05).clamp(1e-20, 1.0);

            let delayed = self.lookahead.process(x);
            *sample = if self.output_amp { gain } else { delayed * gain };
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
        self.envelope.reset();
        self.lookahead.clear();
    }

    fn name(&self) -> &str {
        "CompressorNode"
    }
}
