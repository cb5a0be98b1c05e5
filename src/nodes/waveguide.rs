/// Digital waveguide node - plucked/struck string model
///
/// A single delay loop whose length sets the pitch. The excitation is added
/// into the loop, and what comes back around passes a one-pole lowpass
/// (string damping) and a DC blocker before being scaled by the decay
/// feedback.
///
/// Algorithm:
/// 1. Loop delay D = sample_rate / freq - 0.5 (the lowpass adds the other half sample)
/// 2. Fractional read with a 5-tap 4th-order Lagrange interpolator
/// 3. Damping: y = x + (1/3) * (y[n-1] - x)
/// 4. DC blocker, then feedback = 100^(-1 / (freq * dur)), i.e. -40 dB after `dur`
///
/// The interpolator is retuned only when the frequency changes, and the
/// feedback only when the frequency or duration changes.
///
/// # References
/// - Julius O. Smith III. "Physical Audio Signal Processing"
///   https://ccrma.stanford.edu/~jos/pasp/
/// - Karplus-Strong algorithm

use crate::audio_node::{AudioNode, NodeId, ProcessContext};
use crate::dsp::{lagrange_coefficients, DcBlocker, RingBuffer, LAGRANGE_TAPS};
use crate::error::DspResult;
use crate::param::{InputCursor, ParamTable};

const FREQ: usize = 0;
const DUR: usize = 1;

/// One-pole damping coefficient in the loop
pub const DAMPING: f32 = 1.0 / 3.0;

/// Highest frequency as a fraction of the sample rate
pub const MAX_FREQ_RATIO: f32 = 0.45;

/// Shortest decay duration, in seconds
pub const MIN_DUR: f32 = 0.0001;

/// Fractional loop read point with cached Lagrange coefficients
#[derive(Debug, Clone)]
pub(crate) struct LoopTap {
    freq: f32,
    delay: f32,
    base: usize,
    coeffs: [f32; LAGRANGE_TAPS],
}

impl LoopTap {
    pub(crate) fn new() -> Self {
        Self {
            freq: -1.0,
            delay: 0.0,
            base: 1,
            coeffs: lagrange_coefficients(0.0),
        }
    }

    /// Retune for `freq` (already clamped); returns whether it changed
    #[inline]
    pub(crate) fn tune(&mut self, freq: f32, sample_rate: f32) -> bool {
        if freq == self.freq {
            return false;
        }
        self.freq = freq;
        self.delay = sample_rate / freq - 0.5;

        // Center the 5 taps on the read point: fraction stays near 2
        self.base = (self.delay.round() as usize).saturating_sub(2).max(1);
        self.coeffs = lagrange_coefficients(self.delay - self.base as f32);
        true
    }

    /// Interpolated sample `delay` samples back, before this sample's write
    #[inline]
    pub(crate) fn read(&self, ring: &RingBuffer) -> f32 {
        self.coeffs
            .iter()
            .enumerate()
            .map(|(k, h)| h * ring.read(self.base + k))
            .sum()
    }

    pub(crate) fn delay(&self) -> f32 {
        self.delay
    }
}

/// Ring buffer long enough for one period at `min_freq` plus the interpolator taps
pub(crate) fn loop_ring(min_freq: f32, sample_rate: f32) -> DspResult<RingBuffer> {
    let period = (sample_rate / min_freq).ceil() as usize;
    RingBuffer::with_capacity(period + LAGRANGE_TAPS + 1)
}

/// Loop gain giving a 40 dB decay over `dur` seconds
#[inline]
pub fn decay_feedback(freq: f32, dur: f32) -> f32 {
    100.0f32.powf(-1.0 / (freq * dur))
}

/// Waveguide node
///
/// - `freq`: Hz, clamped to [min_freq, 0.45 * sample_rate]
/// - `dur`: seconds to decay by 40 dB, floored at 0.1 ms
///
/// # Example
/// ```ignore
/// // A3 string, 2 s ring, excited by a single impulse
/// let strike = ImpulseNode::new();                                   // NodeId 0
/// let string = WaveguideNode::new(0, 220.0, 2.0, 20.0, 44100.0)?;    // NodeId 1
/// ```
pub struct WaveguideNode {
    input: NodeId,
    params: ParamTable,
    ring: RingBuffer,
    tap: LoopTap,
    damping: f32,
    dc: DcBlocker,
    feedback: f32,
    last_dur: f32,
    min_freq: f32,
    max_freq: f32,
    sample_rate: f32,
}

impl WaveguideNode {
    /// # Parameters
    /// - `input`: excitation signal
    /// - `freq`: initial frequency in Hz
    /// - `dur`: initial decay duration in seconds
    /// - `min_freq`: lowest playable frequency, sizes the loop buffer
    /// - `sample_rate`: sample rate in Hz
    ///
    /// # Errors
    /// `DspError::Allocation` if the loop buffer cannot be allocated.
    pub fn new(
        input: NodeId,
        freq: f32,
        dur: f32,
        min_freq: f32,
        sample_rate: f32,
    ) -> DspResult<Self> {
        let max_freq = sample_rate * MAX_FREQ_RATIO;
        let min_freq = min_freq.max(1.0).min(max_freq);

        Ok(Self {
            input,
            params: ParamTable::new(&[("freq", freq), ("dur", dur)]),
            ring: loop_ring(min_freq, sample_rate)?,
            tap: LoopTap::new(),
            damping: 0.0,
            dc: DcBlocker::new(),
            feedback: 0.0,
            last_dur: -1.0,
            min_freq,
            max_freq,
            sample_rate,
        })
    }

    pub fn min_freq(&self) -> f32 {
        self.min_freq
    }

    /// Current loop delay in samples
    pub fn loop_delay(&self) -> f32 {
        self.tap.delay()
    }

    /// Current loop gain
    pub fn feedback(&self) -> f32 {
        self.feedback
    }
}

impl AudioNode for WaveguideNode {
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
            let freq = params.at(FREQ, i).max(self.min_freq).min(self.max_freq);
            let dur = params.at(DUR, i).max(MIN_DUR);

            if self.tap.tune(freq, self.sample_rate) || dur != self.last_dur {
                self.feedback = decay_feedback(freq, dur);
                self.last_dur = dur;
            }

            let val = self.tap.read(&self.ring);
            self.damping = val + DAMPING * (self.damping - val);
            let y = self.dc.process(self.damping);

            self.ring.write(signal.at(i) + y * self.feedback);
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
        self.ring.clear();
        self.damping = 0.0;
        self.dc.reset();
    }

    fn name(&self) -> &str {
        "WaveguideNode"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::Param;

    const SAMPLE_RATE: f32 = 44100.0;

    fn pluck(node: &mut WaveguideNode, len: usize) -> Vec<f32> {
        let mut input = vec![0.0; len];
        input[0] = 1.0;
        let context = ProcessContext::new(SAMPLE_RATE, len);
        let mut out = vec![0.0; len];
        node.process_block(&[&input[..]], &mut out, SAMPLE_RATE, &context);
        out
    }

    fn peak(buffer: &[f32]) -> f32 {
        buffer.iter().fold(0.0f32, |m, x| m.max(x.abs()))
    }

    #[test]
    fn test_loop_delay_from_frequency() {
        let mut node = WaveguideNode::new(0, 441.0, 1.0, 20.0, SAMPLE_RATE).unwrap();
        pluck(&mut node, 16);
        assert!((node.loop_delay() - 99.5).abs() < 1e-3);
        assert!((node.feedback() - 100.0f32.powf(-1.0 / 441.0)).abs() < 1e-6);
    }

    #[test]
    fn test_frequency_clamped() {
        let mut node = WaveguideNode::new(0, 5.0, 1.0, 50.0, SAMPLE_RATE).unwrap();
        pluck(&mut node, 16);
        assert!((node.loop_delay() - (SAMPLE_RATE / 50.0 - 0.5)).abs() < 1e-2);

        node.set_param("freq", Param::Constant(40000.0)).unwrap();
        pluck(&mut node, 16);
        let max = SAMPLE_RATE * MAX_FREQ_RATIO;
        assert!((node.loop_delay() - (SAMPLE_RATE / max - 0.5)).abs() < 1e-3);
    }

    #[test]
    fn test_zero_duration_dies_within_a_period() {
        let mut node = WaveguideNode::new(0, 220.0, 0.0, 20.0, SAMPLE_RATE).unwrap();
        let out = pluck(&mut node, 4096);
        let period = (SAMPLE_RATE / 220.0) as usize;

        let first = peak(&out[..period + 10]);
        assert!(first > 0.1);
        assert!(peak(&out[3 * period..]) < 0.01 * first);
    }

    fn rms(buffer: &[f32]) -> f32 {
        (buffer.iter().map(|x| x * x).sum::<f32>() / buffer.len() as f32).sqrt()
    }

    /// Lag in `min..=max` with the highest autocorrelation
    fn best_lag(buffer: &[f32], min: usize, max: usize) -> usize {
        let n = buffer.len() - max;
        (min..=max)
            .map(|lag| {
                let corr: f32 = (0..n).map(|i| buffer[i] * buffer[i + lag]).sum();
                (lag, corr)
            })
            .fold((min, f32::MIN), |best, c| if c.1 > best.1 { c } else { best })
            .0
    }

    #[test]
    fn test_long_duration_sustains_periodic_tone() {
        // 441 Hz: period of exactly 100 samples
        let mut node = WaveguideNode::new(0, 441.0, 100.0, 20.0, SAMPLE_RATE).unwrap();
        let out = pluck(&mut node, 22050);
        let late = &out[17640..];

        assert!(out.iter().all(|s| s.is_finite()));
        assert!(rms(late) > 1e-3, "rms {}", rms(late));
        let lag = best_lag(late, 80, 120);
        assert!((lag as i32 - 100).abs() <= 1, "period {}", lag);
    }

    #[test]
    fn test_longer_duration_rings_longer() {
        let mut long = WaveguideNode::new(0, 441.0, 100.0, 20.0, SAMPLE_RATE).unwrap();
        let mut short = WaveguideNode::new(0, 441.0, 0.05, 20.0, SAMPLE_RATE).unwrap();
        let long_tail = rms(&pluck(&mut long, 22050)[17640..]);
        let short_tail = rms(&pluck(&mut short, 22050)[17640..]);
        assert!(long_tail > 100.0 * short_tail);
    }

    #[test]
    fn test_decay_feedback_formula() {
        assert!((decay_feedback(100.0, 1.0) - 0.955).abs() < 1e-3);
        assert!(decay_feedback(220.0, MIN_DUR) < 1e-6);
    }
}
