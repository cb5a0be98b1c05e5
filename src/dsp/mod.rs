//! Low-level DSP primitives shared by the nodes
//!
//! Allocation happens only at construction; everything here is safe to call
//! from inside `process_block`.

/// Circular sample memory with a mirrored wrap slot.
pub mod ring_buffer;
/// Cached one-pole coefficients, peak follower and dB conversion.
pub mod envelope;
/// Fixed-capacity dry-signal delay for the dynamics processors.
pub mod lookahead;
pub mod dc_blocker;
pub mod lagrange;

pub use dc_blocker::DcBlocker;
pub use envelope::{amp_to_db, EnvelopeFollower, SmoothingCoeff};
pub use lagrange::{lagrange_coefficients, LAGRANGE_TAPS};
pub use lookahead::{LookAheadBuffer, MAX_LOOKAHEAD_MS};
pub use ring_buffer::RingBuffer;
