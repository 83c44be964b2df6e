// ── Runtime service configuration ──
//
// These types describe *how* a DataService behaves: simulated latency,
// write-queue depth, default page size. They never touch disk; the
// config crate builds a `ServiceConfig` and hands it in.

use std::time::Duration;

use rand::Rng;

use crate::error::CoreError;
use crate::query::DEFAULT_PAGE_SIZE;

/// Artificial latency band applied to every service call.
///
/// Each call sleeps for a uniformly chosen duration in `[min, max]`.
/// A zero band disables the delay entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyProfile {
    pub min: Duration,
    pub max: Duration,
}

impl LatencyProfile {
    /// No artificial delay. Used by tests and the CLI's batch mode.
    pub const NONE: Self = Self {
        min: Duration::ZERO,
        max: Duration::ZERO,
    };

    pub fn new(min: Duration, max: Duration) -> Result<Self, CoreError> {
        if min > max {
            return Err(CoreError::Config {
                message: format!("latency min ({min:?}) exceeds max ({max:?})"),
            });
        }
        Ok(Self { min, max })
    }

    /// Fixed delay: `min == max`.
    pub fn constant(delay: Duration) -> Self {
        Self {
            min: delay,
            max: delay,
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.max.is_zero()
    }

    /// Pick a delay from the band.
    pub fn sample(&self) -> Duration {
        if self.min >= self.max {
            return self.min;
        }
        rand::thread_rng().gen_range(self.min..=self.max)
    }

    /// Sleep for one sampled delay.
    pub(crate) async fn delay(&self) {
        if self.is_disabled() {
            return;
        }
        tokio::time::sleep(self.sample()).await;
    }
}

impl Default for LatencyProfile {
    /// The 200–1500 ms band the mock backend has always simulated.
    fn default() -> Self {
        Self {
            min: Duration::from_millis(200),
            max: Duration::from_millis(1500),
        }
    }
}

/// Configuration for a single DataService.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Simulated network latency.
    pub latency: LatencyProfile,
    /// Capacity of the per-collection write queue.
    pub write_queue_size: usize,
    /// Page size of the list state handed out by `DataService::query_state`.
    pub default_page_size: usize,
}

impl ServiceConfig {
    /// Zero-latency configuration.
    pub fn instant() -> Self {
        Self {
            latency: LatencyProfile::NONE,
            ..Self::default()
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            latency: LatencyProfile::default(),
            write_queue_size: 64,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}
