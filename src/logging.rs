use std::fmt;

/// A request-scoped logging interface.
///
/// Every record carries the request id and the bus method it belongs to, so
/// interleaved requests can be told apart in the log stream.
#[derive(Debug, Clone, Copy)]
pub struct RequestLog<'a> {
    request_id: &'a str,
    method: &'static str,
}

impl<'a> RequestLog<'a> {
    /// Creates a logger for one call.
    pub fn new(request_id: &'a str, method: &'static str) -> Self {
        Self { request_id, method }
    }

    /// Returns the request ID associated with this logger.
    pub fn request_id(&self) -> &str {
        self.request_id
    }

    /// Returns the method name associated with this logger.
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// Logs an info-level message with request ID.
    ///
    /// Use with `format_args!`:
    /// ```no_run
    /// # use identity_groups::RequestLog;
    /// let log = RequestLog::new("req-1", "CreateGroups");
    /// log.info(format_args!("created {} groups", 3));
    /// ```
    pub fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(request_id = %self.request_id, method = self.method, "{}", args);
    }

    /// Logs a warning-level message with request ID.
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(request_id = %self.request_id, method = self.method, "{}", args);
    }

    /// Logs an error-level message with request ID.
    pub fn error(&self, args: fmt::Arguments<'_>) {
        tracing::error!(request_id = %self.request_id, method = self.method, "{}", args);
    }

    /// Logs a debug-level message with request ID.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(request_id = %self.request_id, method = self.method, "{}", args);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_request_identity() {
        let log = RequestLog::new("req-42", "CreateGroups");
        assert_eq!(log.request_id(), "req-42");
        assert_eq!(log.method(), "CreateGroups");

        // No subscriber installed; these must be no-ops.
        log.debug(format_args!("debug {}", 1));
        log.info(format_args!("info"));
        log.warn(format_args!("warn"));
        log.error(format_args!("error"));
    }
}
