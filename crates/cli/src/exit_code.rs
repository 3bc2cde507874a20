//! Exit code definitions for spa-deploy
//!
//! Scripts rely on these values. Changing them is a breaking change.

/// Exit codes for the spa-deploy binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Deployment completed and the URL was printed
    Success = 0,

    /// Any unrecoverable configuration or deployment error
    GeneralError = 1,
}

impl ExitCode {
    /// Convert exit code to i32 for use with std::process::exit
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get a human-readable description of the exit code
    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "Deployment completed successfully",
            Self::GeneralError => "Deployment failed",
        }
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}
