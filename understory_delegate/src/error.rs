// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors surfaced by a dispatch cycle.

use alloc::string::String;

/// Why a dispatch cycle was aborted.
///
/// Generic over the host's error type `E`. Neither variant is recovered from
/// locally: the cycle stops at the failing step and the remaining snapshot is
/// not invoked.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError<E> {
    /// The host could not evaluate a delegation selector.
    #[error("selector `{selector}` could not be evaluated: {error}")]
    Selector {
        /// Selector that was being tested.
        selector: String,
        /// Error reported by the host matcher.
        error: E,
    },
    /// A handler returned an error.
    #[error("`{event_type}` handler failed: {error}")]
    Handler {
        /// Event type name of the cycle.
        event_type: String,
        /// Error returned by the handler.
        error: E,
    },
}

impl<E> DispatchError<E> {
    /// Unwrap the host error.
    ///
    /// Handlers use this to forward a failed nested dispatch as their own error.
    pub fn into_inner(self) -> E {
        match self {
            Self::Selector { error, .. } | Self::Handler { error, .. } => error,
        }
    }

    /// Borrow the host error.
    pub fn inner(&self) -> &E {
        match self {
            Self::Selector { error, .. } | Self::Handler { error, .. } => error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn display_names_the_failing_step() {
        let e: DispatchError<&str> = DispatchError::Selector {
            selector: String::from("[x"),
            error: "unterminated attribute",
        };
        assert_eq!(
            e.to_string(),
            "selector `[x` could not be evaluated: unterminated attribute"
        );
        let e: DispatchError<&str> = DispatchError::Handler {
            event_type: String::from("click"),
            error: "boom",
        };
        assert_eq!(e.to_string(), "`click` handler failed: boom");
    }

    #[test]
    fn into_inner_returns_host_error() {
        let e: DispatchError<u8> = DispatchError::Handler {
            event_type: String::from("click"),
            error: 3,
        };
        assert_eq!(*e.inner(), 3);
        assert_eq!(e.into_inner(), 3);
    }
}
