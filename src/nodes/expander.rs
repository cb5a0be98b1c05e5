/// Expander node - two-threshold dynamics expansion with look-ahead
///
/// Signals louder than the upper threshold are boosted and signals quieter
/// than the lower threshold are cut, both by `ratio`, widening the dynamic
/// range on either side of the band between the thresholds.
///
/// ```text
/// above upthresh:    gain_db = (indb - upthresh) * (ratio - 1)      (boost)
/// below downthresh:  gain_db = (indb - downthresh) * (ratio - 1)    (cut)
/// between:           gain_db = 0
/// ```
///
/// With `knee` > 0 each threshold gets its own ±3·knee dB band in which the
/// effective ratio is interpolated quadratically, as in the compressor.

use crate::audio_node::{AudioNode, NodeId, ProcessContext};
use crate::dsp::{amp_to_db, EnvelopeFollower, LookAheadBuffer};
use crate::error::DspResult;
use crate::param::{InputCursor, ParamTable};

use super::compressor::{knee_ratio, DEFAULT_LOOKAHEAD_MS, KNEE_DB};

const DOWNTHRESH: usize = 0;
const UPTHRESH: usize = 1;
const RATIO: usize = 2;
const RISETIME: usize = 3;
const FALLTIME: usize = 4;
const KNEE: usize = 5;

const MAX_GAIN: f32 = 100.0;

/// Boost above the upper threshold, in dB (>= 0)
fn boost_db(indb: f32, upthresh: f32, ratio: f32, half_band: f32) -> f32 {
    let diff = indb - upthresh;
    if indb >= upthresh + half_band {
        diff * (ratio - 1.0)
    } else if half_band > 0.0 && indb > upthresh - half_band {
        let t = (indb - (upthresh - half_band)) / (2.0 * half_band);
        (diff * (knee_ratio(ratio, t) - 1.0)).max(0.0)
    } else {
        0.0
    }
}

/// Cut below the lower threshold, in dB (<= 0)
fn cut_db(indb: f32, downthresh: f32, ratio: f32, half_band: f32) -> f32 {
    let diff = indb - downthresh;
    if indb <= downthresh - half_band {
        diff * (ratio - 1.0)
    } else if half_band > 0.0 && indb < downthresh + half_band {
        let t = ((downthresh + half_band) - indb) / (2.0 * half_band);
        (diff * (knee_ratio(ratio, t) - 1.0)).min(0.0)
    } else {
        0.0
    }
}

/// Total gain change in dB for an input level of `indb`
///
/// `downthresh` is clamped to be no higher than `upthresh`.
pub fn expansion_db(indb: f32, downthresh: f32, upthresh: f32, ratio: f32, knee: f32) -> f32 {
    let downthresh = downthresh.min(upthresh);
    let half_band = knee * KNEE_DB;
    boost_db(indb, upthresh, ratio, half_band) + cut_db(indb, downthresh, ratio, half_band)
}

pub struct ExpanderNode {
    input: NodeId,
    params: ParamTable,
    envelope: EnvelopeFollower,
    lookahead: LookAheadBuffer,
    output_amp: bool,
    sample_rate: f32,
}

impl ExpanderNode {
    /// # Errors
    /// `DspError::Allocation` if the look-ahead buffer cannot be allocated.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        input: NodeId,
        downthresh: f32,
        upthresh: f32,
        ratio: f32,
        risetime: f32,
        falltime: f32,
        knee: f32,
        sample_rate: f32,
    ) -> DspResult<Self> {
        Ok(Self {
            input,
            params: ParamTable::new(&[
                ("downthresh", downthresh),
                ("upthresh", upthresh),
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
}

impl AudioNode for ExpanderNode {
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
            let upthresh = params.at(UPTHRESH, i).clamp(-120.0, 0.0);
            let downthresh = params.at(DOWNTHRESH, i).clamp(-120.0, 0.0);
            let ratio = params.at(RATIO, i).clamp(1.0, 100.0);
            let knee = params.at(KNEE, i).clamp(0.0, 1.0);

            self.envelope
                .set_times(params.at(RISETIME, i), params.at(FALLTIME, i), self.sample_rate);
            let follow = self.envelope.process(x.abs());

            let gain_db = expansion_db(amp_to_db(follow), downthresh, upthresh, ratio, knee);
            let gain = 10.0f32.powf(gain_db * 0.05).clamp(1e-20, MAX_GAIN);

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
        "ExpanderNode"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 44100.0;

    #[test]
    fn test_hard_thresholds() {
        // 2:1, band [-40, -10]
        assert_eq!(expansion_db(-20.0, -40.0, -10.0, 2.0, 0.0), 0.0);
        assert!((expansion_db(-4.0, -40.0, -10.0, 2.0, 0.0) - 6.0).abs() < 1e-5);
        assert!((expansion_db(-50.0, -40.0, -10.0, 2.0, 0.0) + 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_lower_threshold_clamped_to_upper() {
        // downthresh above upthresh behaves as downthresh == upthresh
        let a = expansion_db(-30.0, -5.0, -20.0, 3.0, 0.0);
        let b = expansion_db(-30.0, -20.0, -20.0, 3.0, 0.0);
        assert_eq!(a, b);
        assert!(a < 0.0);
    }

    #[test]
    fn test_knee_continuity() {
        let (down, up, ratio, knee) = (-40.0, -10.0, 4.0, 1.0);
        let eps = 1e-4;
        for edge in [up + 3.0, up - 3.0, down + 3.0, down - 3.0] {
            let a = expansion_db(edge + eps, down, up, ratio, knee);
            let b = expansion_db(edge - eps, down, up, ratio, knee);
            assert!((a - b).abs() < 1e-2, "jump at {}: {} vs {}", edge, a, b);
        }
    }

    #[test]
    fn test_quiet_signal_is_cut() {
        let mut node = ExpanderNode::new(0, -30.0, -6.0, 2.0, 0.0001, 0.05, 0.0, SAMPLE_RATE).unwrap();
        node.set_output_amp(true);

        let context = ProcessContext::new(SAMPLE_RATE, 4410);
        let input = vec![0.01; 4410];
        let mut out = vec![0.0; 4410];
        node.process_block(&[&input[..]], &mut out, SAMPLE_RATE, &context);

        // -40 dB is 10 dB under the lower threshold: cut by a further 10 dB
        let expected = 10.0f32.powf(-10.0 / 20.0);
        assert!((out[4409] - expected).abs() < 1e-3, "gain {}", out[4409]);
    }
}
