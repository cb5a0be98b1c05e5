/// Smooth delay - delay line retuned by crossfading between two read taps
///
/// Changing the delay time of a plain interpolated delay either clicks (jump)
/// or glides in pitch (sweep). This node instead starts a second tap at the new
/// delay and crossfades the old tap 1→0 and the new tap 0→1.

use crate::audio_node::{AudioNode, NodeId, ProcessContext};
use crate::dsp::RingBuffer;
use crate::error::DspResult;
use crate::param::{InputCursor, ParamTable};

const DELAY: usize = 0;
const FEEDBACK: usize = 1;
const CROSSFADE: usize = 2;

/// Crossfading delay node
///
/// - `delay`: seconds, clamped to [1/sample_rate, max_delay]
/// - `feedback`: clamped to [0, 1]
/// - `crossfade`: fade length in seconds, bounded by the new delay period
///
/// Only one crossfade runs at a time; a delay change made during a fade is
/// picked up as soon as the fade completes.
pub struct SmoothDelayNode {
    input: NodeId,
    params: ParamTable,
    ring: RingBuffer,
    max_delay: f32,
    sample_rate: f32,
    /// Read positions in samples of the two taps
    taps: [f32; 2],
    amps: [f32; 2],
    /// Tap being faded in (or fully active)
    current: usize,
    fade_step: f32,
    fade_remaining: usize,
    primed: bool,
}

impl SmoothDelayNode {
    /// # Errors
    /// `DspError::Allocation` if the ring buffer cannot be allocated.
    pub fn new(
        input: NodeId,
        delay: f32,
        feedback: f32,
        crossfade: f32,
        max_delay: f32,
        sample_rate: f32,
    ) -> DspResult<Self> {
        let max_delay = max_delay.max(1.0 / sample_rate);

        Ok(Self {
            input,
            params: ParamTable::new(&[
                ("delay", delay),
                ("feedback", feedback),
                ("crossfade", crossfade),
            ]),
            ring: RingBuffer::for_duration(max_delay, sample_rate)?,
            max_delay,
            sample_rate,
            taps: [0.0; 2],
            amps: [1.0, 0.0],
            current: 0,
            fade_step: 0.0,
            fade_remaining: 0,
            primed: false,
        })
    }

    pub fn is_fading(&self) -> bool {
        self.fade_remaining > 0
    }

    /// Delay in samples of the tap currently faded in
    pub fn active_delay_samples(&self) -> f32 {
        self.taps[self.current]
    }

    fn start_fade(&mut self, delay_samples: f32, crossfade: f32) {
        let fade_len = (crossfade.max(0.0) * self.sample_rate)
            .min(delay_samples)
            .round()
            .max(1.0) as usize;

        self.current = 1 - self.current;
        self.taps[self.current] = delay_samples;
        self.fade_step = 1.0 / fade_len as f32;
        self.fade_remaining = fade_len;
    }
}

impl AudioNode for SmoothDelayNode {
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

        let min_delay = 1.0 / self.sample_rate;

        for (i, sample) in output.iter_mut().enumerate() {
            let delay_samples =
                params.at(DELAY, i).clamp(min_delay, self.max_delay) * self.sample_rate;
            let feedback = params.at(FEEDBACK, i).clamp(0.0, 1.0);

            if !self.primed {
                self.taps = [delay_samples; 2];
                self.amps = [0.0; 2];
                self.amps[self.current] = 1.0;
                self.primed = true;
            } else if self.fade_remaining == 0 && delay_samples != self.taps[self.current] {
                self.start_fade(delay_samples, params.at(CROSSFADE, i));
            }

            let old = 1 - self.current;
            if self.fade_remaining > 0 {
                self.fade_remaining -= 1;
                let gain = 1.0 - self.fade_remaining as f32 * self.fade_step;
                self.amps[self.current] = gain;
                self.amps[old] = 1.0 - gain;
            }

            let mut delayed = self.ring.read_linear(self.taps[self.current]) * self.amps[self.current];
            if self.amps[old] > 0.0 {
                delayed += self.ring.read_linear(self.taps[old]) * self.amps[old];
            }
            *sample = delayed;

            self.ring.write(signal.at(i) + delayed * feedback);
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
        self.ring.clear();
        self.fade_remaining = 0;
        self.primed = false;
    }

    fn name(&self) -> &str {
        "SmoothDelayNode"
    }
}
