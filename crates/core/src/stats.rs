// SPDX-FileCopyrightText: © 2025 Coda Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Runtime statistics accumulated over one execution of a script.
//!
//! All counters are `f64` so fractional millisecond runtimes can be
//! accumulated without rounding between operations, matching the
//! originating implementation's accounting. Every counter is monotonically
//! non-decreasing within a run.

use serde::{Deserialize, Serialize};

/// Counters and runtime totals for a single `run()` of a [`crate::script::Script`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CodaStats {
    pub coda_runtime_total_ms: f64,

    pub operations_runtime_total_ms: f64,
    pub operations_total: f64,
    pub operations_successful_total: f64,
    pub operations_failed_total: f64,
    pub operations_blacklisted_total: f64,

    pub variables_total: f64,
    pub variables_failed_total: f64,
    pub variables_successful_total: f64,
}

impl Default for CodaStats {
    fn default() -> Self {
        Self {
            coda_runtime_total_ms: 0.0,
            operations_runtime_total_ms: 0.0,
            operations_total: 0.0,
            operations_successful_total: 0.0,
            operations_failed_total: 0.0,
            operations_blacklisted_total: 0.0,
            variables_total: 0.0,
            variables_failed_total: 0.0,
            variables_successful_total: 0.0,
        }
    }
}

impl CodaStats {
    pub fn record_variable_attempt(&mut self) {
        self.variables_total += 1.0;
    }

    pub fn record_variable_success(&mut self) {
        self.variables_successful_total += 1.0;
    }

    pub fn record_variable_failure(&mut self) {
        self.variables_failed_total += 1.0;
    }

    /// Records a completed (non-blacklisted) operation dispatch.
    pub fn record_operation(&mut self, runtime_ms: f64, succeeded: bool) {
        self.operations_total += 1.0;
        self.operations_runtime_total_ms += runtime_ms;
        if succeeded {
            self.operations_successful_total += 1.0;
        } else {
            self.operations_failed_total += 1.0;
        }
    }

    /// Records a blacklist rejection. Deliberately does NOT touch
    /// `operations_failed_total` — blacklisting is not a failure for
    /// routing/accounting purposes.
    pub fn record_blacklisted(&mut self) {
        self.operations_blacklisted_total += 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blacklist_does_not_affect_failed_total() {
        let mut stats = CodaStats::default();
        stats.record_blacklisted();
        assert_eq!(stats.operations_blacklisted_total, 1.0);
        assert_eq!(stats.operations_failed_total, 0.0);
        assert_eq!(stats.operations_total, 0.0);
    }

    #[test]
    fn operation_counters_accumulate() {
        let mut stats = CodaStats::default();
        stats.record_operation(12.5, true);
        stats.record_operation(7.5, false);
        assert_eq!(stats.operations_total, 2.0);
        assert_eq!(stats.operations_successful_total, 1.0);
        assert_eq!(stats.operations_failed_total, 1.0);
        assert_eq!(stats.operations_runtime_total_ms, 20.0);
    }
}
