// Consistent exit codes for the rulebridge CLI.
//
//   0 = success
//   1 = general error
//   2 = usage/argument error (unknown editor, bad config)
//   3 = at least one document failed validation
//   4 = broken links found by `lint`

use std::process;

use rulebridge_common::aggregate::AggregateError;
use rulebridge_common::editor::UnsupportedEditor;
use thiserror::Error;

use crate::config::ConfigError;

/// Named exit codes for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    Error = 1,
    Usage = 2,
    Validation = 3,
    BrokenLinks = 4,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Map an anyhow error to an exit code by inspecting the error chain.
    pub fn from_error(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if cause.is::<UnsupportedEditor>() || cause.is::<ConfigError>() {
                return Self::Usage;
            }
            if cause.is::<ValidationFailed>() || cause.is::<AggregateError>() {
                return Self::Validation;
            }
            if cause.is::<BrokenLinks>() {
                return Self::BrokenLinks;
            }
        }
        Self::Error
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code.code() as u8)
    }
}

/// Returned after a batch completes with per-document failures.
#[derive(Debug, Error)]
#[error("{count} document(s) failed validation")]
pub struct ValidationFailed {
    pub count: usize,
}

#[derive(Debug, Error)]
#[error("{count} broken link(s) found")]
pub struct BrokenLinks {
    pub count: usize,
}
