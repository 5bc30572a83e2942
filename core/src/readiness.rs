//! Readiness gate
//!
//! The diagram loads on its own schedule. Rather than blocking, or retrying
//! forever, the gate polls a [`ReadinessProbe`] on a fixed interval and gives
//! up after a bounded number of attempts.

use std::time::Duration;

use hotspot_types::TimingConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadinessError {
    #[error("diagram was not ready after {attempts} attempts")]
    NeverReady { attempts: u32 },
}

/// Something that can report whether the diagram has loaded, handing back
/// its registry once it has
pub trait ReadinessProbe {
    type Output;

    /// `None` while still loading
    fn probe(&mut self) -> Option<Self::Output>;
}

impl<F, T> ReadinessProbe for F
where
    F: FnMut() -> Option<T>,
{
    type Output = T;

    fn probe(&mut self) -> Option<T> {
        self()
    }
}

/// Bounded poll schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessGate {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl ReadinessGate {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn from_timing(timing: &TimingConfig) -> Self {
        Self::new(timing.ready_poll(), timing.ready_max_attempts)
    }

    /// Poll until the probe reports ready or the attempts run out
    pub async fn wait<P: ReadinessProbe>(&self, probe: &mut P) -> Result<P::Output, ReadinessError> {
        for attempt in 1..=self.max_attempts {
            if let Some(output) = probe.probe() {
                tracing::debug!(attempt, "Diagram ready");
                return Ok(output);
            }
            if attempt < self.max_attempts {
                tokio::time::sleep(self.interval).await;
            }
        }
        Err(ReadinessError::NeverReady {
            attempts: self.max_attempts,
        })
    }
}
