// Smoothing module - moving averages over decibel readings
//
// TrendSmoother keeps a bounded FIFO of the most recent readings and a
// running sum, so each update is O(1). Before the window fills, the average
// covers however many readings have been seen (growing window).
//
// Two batch smoothers are provided and kept separate:
// - apply_moving_average: causal window data[i-w+1..=i], identical to
//   feeding the sequence through TrendSmoother::add one value at a time.
// - apply_centered_moving_average: window centred on i (numpy
//   convolve(mode="same") alignment). Near the edges fewer taps exist and the
//   average is taken over the taps actually present, so its edge values
//   differ from the causal variant.

use std::collections::VecDeque;

use crate::error::{ensure_finite, ensure_finite_samples, AnalysisError, Result};

/// Default smoothing window (readings)
pub const DEFAULT_WINDOW_SIZE: usize = 10;

/// Streaming moving-average filter for one audio session
///
/// Not shareable between concurrent streams: dedicate one instance per
/// session and call `reset` before reusing it for an unrelated one.
#[derive(Debug, Clone)]
pub struct TrendSmoother {
    buffer: VecDeque<f64>,
    window_size: usize,
    sum: f64,
}

impl TrendSmoother {
    /// Create a smoother averaging over the last `window_size` readings
    ///
    /// # Errors
    /// `InvalidSize` when `window_size` is zero.
    pub fn new(window_size: usize) -> Result<Self> {
        if window_size == 0 {
            return Err(AnalysisError::InvalidSize {
                parameter: "window_size",
                value: window_size,
            });
        }

        Ok(Self {
            buffer: VecDeque::with_capacity(window_size + 1),
            window_size,
            sum: 0.0,
        })
    }

    /// Push a reading and return the smoothed value
    ///
    /// A rejected value leaves the history untouched.
    pub fn add(&mut self, value: f64) -> Result<f64> {
        ensure_finite("value", value)?;

        self.buffer.push_back(value);
        self.sum += value;

        if self.buffer.len() > self.window_size {
            if let Some(oldest) = self.buffer.pop_front() {
                self.sum -= oldest;
            }
        }

        Ok(self.sum / self.buffer.len() as f64)
    }

    /// Current average without modifying state (0 when empty)
    pub fn current_average(&self) -> f64 {
        if self.buffer.is_empty() {
            0.0
        } else {
            self.sum / self.buffer.len() as f64
        }
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.sum = 0.0;
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.buffer.len() == self.window_size
    }

    /// Owned copy of the buffered readings, oldest first
    pub fn buffer(&self) -> Vec<f64> {
        self.buffer.iter().copied().collect()
    }
}

fn validate_batch(data: &[f64], window_size: usize) -> Result<()> {
    if window_size == 0 {
        return Err(AnalysisError::InvalidSize {
            parameter: "window_size",
            value: window_size,
        });
    }
    if let Some(index) = data.iter().position(|v| !v.is_finite()) {
        return Err(AnalysisError::NonFiniteSample {
            what: "data",
            index,
            value: data[index],
        });
    }
    Ok(())
}

/// Causal moving average over a whole sequence
///
/// Sequences shorter than the window are returned unchanged. Otherwise
/// element `i` is the mean of `data[max(0, i-w+1)..=i]`, computed by the
/// same running-sum update as `TrendSmoother::add`.
pub fn apply_moving_average(data: &[f64], window_size: usize) -> Result<Vec<f64>> {
    validate_batch(data, window_size)?;
    if data.len() < window_size {
        return Ok(data.to_vec());
    }

    let mut smoother = TrendSmoother::new(window_size)?;
    data.iter().map(|&value| smoother.add(value)).collect()
}

/// Centred moving average over a whole sequence
///
/// Element `i` averages `data[i - ceil((w-1)/2) ..= i + floor((w-1)/2)]`,
/// clipped to the sequence bounds and divided by the number of taps used.
/// Sequences shorter than the window are returned unchanged.
pub fn apply_centered_moving_average(data: &[f64], window_size: usize) -> Result<Vec<f64>> {
    validate_batch(data, window_size)?;
    if data.len() < window_size {
        return Ok(data.to_vec());
    }

    let behind = window_size / 2;
    let ahead = (window_size - 1) / 2;

    // prefix[i] = sum of data[..i]
    let mut prefix = Vec::with_capacity(data.len() + 1);
    prefix.push(0.0);
    for &value in data {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + value);
    }

    let smoothed = (0..data.len())
        .map(|i| {
            let start = i.saturating_sub(behind);
            let end = (i + ahead + 1).min(data.len());
            (prefix[end] - prefix[start]) / (end - start) as f64
        })
        .collect();

    Ok(smoothed)
}

/// Convenience for f32 decibel streams coming straight off the level stage
pub fn apply_moving_average_f32(data: &[f32], window_size: usize) -> Result<Vec<f64>> {
    ensure_finite_samples("data", data)?;
    let widened: Vec<f64> = data.iter().map(|&v| v as f64).collect();
    apply_moving_average(&widened, window_size)
}
