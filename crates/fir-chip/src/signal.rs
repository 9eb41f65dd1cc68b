//! Reference test signal for the FIR pipeline.
//!
//! The client application and the integration tests drive the filter with the
//! same 38-period sawtooth so that output batches are comparable across runs
//! and across backends.

/// One sample of the reference sawtooth at index `i`.
///
/// Rises for 19 samples, falls for 19, with a small `i % 5` ripple on top.
/// All arithmetic is integer, matching the wire format of the device.
pub fn sawtooth_sample(i: usize) -> i32 {
    let i = i as i64;
    let mut v = i % 38 * 16 / 19 + i % 5;
    if i % 38 >= 19 {
        v = 37 - v;
    }
    v as i32
}

/// The full reference batch: `n` consecutive sawtooth samples.
pub fn sawtooth(n: usize) -> Vec<i32> {
    (0..n).map(sawtooth_sample).collect()
}
