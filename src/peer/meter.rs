use std::time::Duration;

/// Running transfer totals for one connection.
///
/// "bytes transferred / time used" ranks peers for efficiency, which is
/// useful when selecting preferred peers for download. Both totals are
/// monotone for the life of the session; selection policy lives elsewhere.
#[derive(Debug, Default)]
pub struct TransferMeter {
    bytes_transferred: u64,
    time_used: Duration,
}

impl TransferMeter {
    pub fn new() -> Self {
        TransferMeter::default()
    }

    pub fn bytes_transferred(&self) -> u64 {
        self.bytes_transferred
    }

    pub fn time_used(&self) -> Duration {
        self.time_used
    }

    /// Adds a completed transfer to the totals.
    pub fn record(&mut self, bytes: u64, time: Duration) {
        self.bytes_transferred += bytes;
        self.time_used += time;
    }

    /// Bytes per second over the life of the session, larger is better.
    /// `None` until any time has been spent transferring.
    pub fn efficiency(&self) -> Option<f64> {
        if self.time_used.is_zero() {
            return None;
        }
        Some(self.bytes_transferred as f64 / self.time_used.as_secs_f64())
    }
}
