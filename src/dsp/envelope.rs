/// Shortest time constant accepted, in seconds
pub const MIN_TIME: f32 = 0.0001;

/// One-pole smoothing coefficient cached against the time it was derived from
///
/// `coeff = exp(-1 / (sample_rate * time))`, recomputed only when `time`
/// changes.
#[derive(Debug, Clone, Copy)]
pub struct SmoothingCoeff {
    time: f32,
    coeff: f32,
}

impl SmoothingCoeff {
    pub fn new(time: f32, sample_rate: f32) -> Self {
        let time = time.max(MIN_TIME);
        Self {
            time,
            coeff: Self::compute(time, sample_rate),
        }
    }

    /// Coefficient for `time`, refreshing the cache on change
    #[inline]
    pub fn update(&mut self, time: f32, sample_rate: f32) -> f32 {
        let time = time.max(MIN_TIME);
        if time != self.time {
            self.time = time;
            self.coeff = Self::compute(time, sample_rate);
        }
        self.coeff
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn coeff(&self) -> f32 {
        self.coeff
    }

    fn compute(time: f32, sample_rate: f32) -> f32 {
        (-1.0 / (sample_rate * time)).exp()
    }
}

/// Asymmetric peak follower
///
/// Rises toward the rectified input with the rise coefficient and decays with
/// the fall coefficient.
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    follow: f32,
    rise: SmoothingCoeff,
    fall: SmoothingCoeff,
}

impl EnvelopeFollower {
    pub fn new(rise_time: f32, fall_time: f32, sample_rate: f32) -> Self {
        Self {
            follow: 0.0,
            rise: SmoothingCoeff::new(rise_time, sample_rate),
            fall: SmoothingCoeff::new(fall_time, sample_rate),
        }
    }

    /// Refresh cached coefficients (cheap when the times are unchanged)
    #[inline]
    pub fn set_times(&mut self, rise_time: f32, fall_time: f32, sample_rate: f32) {
        self.rise.update(rise_time, sample_rate);
        self.fall.update(fall_time, sample_rate);
    }

    /// Feed a non-negative detector value, return the new envelope
    #[inline]
    pub fn process(&mut self, level: f32) -> f32 {
        let coeff = if self.follow < level {
            self.rise.coeff()
        } else {
            self.fall.coeff()
        };
        self.follow = level + coeff * (self.follow - level);
        self.follow
    }

    pub fn value(&self) -> f32 {
        self.follow
    }

    pub fn reset(&mut self) {
        self.follow = 0.0;
    }
}

/// Linear amplitude to dB, floored so silence stays finite
#[inline]
pub fn amp_to_db(amp: f32) -> f32 {
    20.0 * (amp + 1e-20).log10()
}
