//! Process exit codes.
//!
//! The rule-derived codes are a contract for CI scripts; `Failure` is
//! reserved for runs that could not complete.

use std::process::Termination;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitStatus {
    /// No errors, and no warnings under strict mode.
    Clean = 0,
    /// Warnings present and strict mode enabled.
    Warnings = 1,
    /// At least one error-severity issue.
    Errors = 2,
    /// Bad configuration or an unwritable report.
    Failure = 3,
}

impl ExitStatus {
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl Termination for ExitStatus {
    fn report(self) -> std::process::ExitCode {
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        std::process::ExitCode::from(self.code() as u8)
    }
}
