// timing.rs - wall-clock measurement helpers
use std::fmt;
use std::time::{Duration, Instant};

use tracing::info;

/// Return value of a measured closure together with how long it ran.
///
/// # Type Parameters
/// - `T`: The type of the return value from the measured function.
#[derive(Debug, Clone)]
pub struct ExecutionResult<T> {
    pub result: T,
    pub duration: Duration,
}

impl<T> ExecutionResult<T> {
    /// Elapsed time in fractional milliseconds.
    pub fn millis(&self) -> f64 {
        self.duration.as_secs_f64() * 1000.0
    }

    /// Logs a one-line summary at `info` level.
    ///
    /// # Arguments
    /// - `operation_name`: Name of the measured operation.
    pub fn log_summary(&self, operation_name: &str) {
        info!(
            operation = operation_name,
            elapsed_us = self.duration.as_micros() as u64,
            "{operation_name}: {:.3} ms",
            self.millis()
        );
    }

    /// Logs a summary that also includes the return value.
    pub fn log_report(&self, operation_name: &str)
    where
        T: fmt::Debug,
    {
        info!(
            operation = operation_name,
            elapsed_us = self.duration.as_micros() as u64,
            result = ?self.result,
            "{operation_name} finished"
        );
    }
}

/// Measures closures with a monotonic clock.
pub struct Timer;

impl Timer {
    /// Runs `f` and records its execution time.
    ///
    /// # Type Parameters
    /// - `F`: The closure to measure.
    /// - `R`: Its return type.
    pub fn measure<F, R>(f: F) -> ExecutionResult<R>
    where
        F: FnOnce() -> R,
    {
        let start_time = Instant::now();
        let result = f();
        ExecutionResult {
            result,
            duration: start_time.elapsed(),
        }
    }

    /// Runs `f`, logs a summary and returns its value.
    pub fn measure_and_log<F, R>(operation_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let execution_result = Self::measure(f);
        execution_result.log_summary(operation_name);
        execution_result.result
    }
}

/// Measures a code block and logs its execution time, yielding the block's value.
///
/// # Arguments
/// - `$name`: Operation name.
/// - `$code`: The block to run.
#[macro_export]
macro_rules! measure_time {
    ($name:expr, $code:block) => {{
        $crate::timing::Timer::measure_and_log($name, || $code)
    }};
}
