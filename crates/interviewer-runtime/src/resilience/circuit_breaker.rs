//! Per-purpose circuit breaker for language service calls.
//!
//! Repeated failures for one purpose open its circuit; while open, the
//! adapter uses the default without calling out.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

use crate::language::Purpose;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open a circuit
    pub failure_threshold: u32,

    /// How long an open circuit skips calls, e.g. "30s"
    #[serde(with = "crate::config::duration")]
    pub recovery_timeout: Duration,

    /// Half-open successes needed to close again
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            recovery_timeout: Duration::from_secs(30),
            success_threshold: 2,
        }
    }
}

/// State of one purpose's circuit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CircuitState {
    Closed { failures: u32 },

    /// Calls are skipped until `opened_at + recovery_timeout`
    Open { opened_at: Instant },

    /// Calls go through; `successes` counts toward closing again
    HalfOpen { successes: u32 },
}

impl CircuitState {
    const CLOSED: CircuitState = CircuitState::Closed { failures: 0 };

    fn open() -> Self {
        CircuitState::Open { opened_at: Instant::now() }
    }

    fn after_success(&self, config: &CircuitBreakerConfig) -> Self {
        match *self {
            CircuitState::HalfOpen { successes } if successes + 1 < config.success_threshold => {
                CircuitState::HalfOpen { successes: successes + 1 }
            }
            CircuitState::Open { opened_at } => CircuitState::Open { opened_at },
            _ => Self::CLOSED,
        }
    }

    fn after_failure(&self, config: &CircuitBreakerConfig) -> Self {
        match *self {
            CircuitState::Closed { failures } if failures + 1 < config.failure_threshold => {
                CircuitState::Closed { failures: failures + 1 }
            }
            CircuitState::Open { opened_at } => CircuitState::Open { opened_at },
            _ => Self::open(),
        }
    }
}

/// Circuits keyed by [`Purpose`], so a failing translation path does not
/// silence concern detection.
pub struct CircuitBreaker {
    circuits: RwLock<HashMap<Purpose, CircuitState>>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            circuits: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// True while calls for `purpose` must be skipped.
    ///
    /// An open circuit past its recovery timeout moves to half-open here.
    pub fn is_open(&self, purpose: Purpose) -> bool {
        let mut circuits = self.circuits.write();
        let Some(CircuitState::Open { opened_at }) = circuits.get(&purpose).cloned() else {
            return false;
        };
        if opened_at.elapsed() < self.config.recovery_timeout {
            return true;
        }
        circuits.insert(purpose, CircuitState::HalfOpen { successes: 0 });
        tracing::info!(purpose = %purpose, "Circuit half-open, letting a call through");
        false
    }

    pub fn record_success(&self, purpose: Purpose) {
        self.transition(purpose, CircuitState::after_success);
    }

    pub fn record_failure(&self, purpose: Purpose) {
        self.transition(purpose, CircuitState::after_failure);
    }

    fn transition(&self, purpose: Purpose, next: fn(&CircuitState, &CircuitBreakerConfig) -> CircuitState) {
        let mut circuits = self.circuits.write();
        let current = circuits.get(&purpose).cloned().unwrap_or(CircuitState::CLOSED);
        let updated = next(&current, &self.config);

        match (&current, &updated) {
            (CircuitState::Closed { failures }, CircuitState::Open { .. }) => {
                tracing::warn!(purpose = %purpose, failures = failures + 1, "Circuit opened");
            }
            (CircuitState::HalfOpen { .. }, CircuitState::Open { .. }) => {
                tracing::warn!(purpose = %purpose, "Recovery call failed, circuit reopened");
            }
            (CircuitState::HalfOpen { .. }, CircuitState::Closed { .. }) => {
                tracing::info!(purpose = %purpose, "Circuit closed");
            }
            _ => {}
        }

        circuits.insert(purpose, updated);
    }

    pub fn state(&self, purpose: Purpose) -> CircuitState {
        self.circuits
            .read()
            .get(&purpose)
            .cloned()
            .unwrap_or(CircuitState::CLOSED)
    }

    /// Close every circuit.
    pub fn reset(&self) {
        self.circuits.write().clear();
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}
