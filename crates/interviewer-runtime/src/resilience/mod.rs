//! Resilience patterns for interviewer-runtime.
//!
//! The circuit breaker stops issuing calls for a purpose that keeps failing;
//! the adapter then serves the safe default or canned text directly.

mod circuit_breaker;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
