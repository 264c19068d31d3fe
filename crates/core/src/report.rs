//! Failure reporting for deferred calls
//!
//! A call fired from `invoke` hands its return value straight back to the
//! caller. A call fired from a timer tick has no caller to return to, so its
//! outcome is converted with [`Report`] and handed to the host's failure
//! channel instead.

/// Return values that may carry a failure
pub trait Report {
    /// Extract the failure, if this value represents one
    fn into_failure(self) -> Option<anyhow::Error>;
}

impl Report for () {
    fn into_failure(self) -> Option<anyhow::Error> {
        None
    }
}

impl<T, E> Report for Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn into_failure(self) -> Option<anyhow::Error> {
        self.err().map(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_never_fails() {
        assert!(().into_failure().is_none());
    }

    #[test]
    fn test_result_reports_error() {
        let ok: Result<u32, std::io::Error> = Ok(3);
        assert!(ok.into_failure().is_none());

        let err: Result<u32, anyhow::Error> = Err(anyhow::anyhow!("label widget gone"));
        let failure = err.into_failure().unwrap();
        assert_eq!(failure.to_string(), "label widget gone");
    }
}
