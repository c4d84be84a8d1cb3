//! Store error taxonomy and the reporter seam
//!
//! - Reducer faults are fatal for the store (unless the store was configured
//!   to skip the faulty action).
//! - Effect and selector faults are isolated to the one registration that
//!   produced them.
//!
//! Every fault is handed to the store's [`ErrorReporter`]. The default
//! [`LogReporter`] writes it through the `log` facade.

use std::any::Any;
use std::fmt;
use thiserror::Error;

/// Identifier of a registered effect, unique within one store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(pub(crate) u64);

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors raised by a store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store `{store}`: reducer failed on action `{action}`: {message}")]
    ReducerFault {
        store: String,
        action: &'static str,
        message: String,
    },

    #[error("store `{store}`: effect {effect} failed: {source}")]
    EffectFault {
        store: String,
        effect: EffectId,
        #[source]
        source: anyhow::Error,
    },

    #[error("store `{store}`: effect {effect} panicked: {message}")]
    EffectPanicked {
        store: String,
        effect: EffectId,
        message: String,
    },

    #[error("store `{store}`: selector projection panicked: {message}")]
    SelectorFault { store: String, message: String },

    #[error("store `{0}` has been destroyed")]
    Destroyed(String),

    #[error("store `{0}` halted after a reducer fault")]
    Halted(String),

    #[error("effects need a running tokio runtime")]
    NoRuntime,
}

impl StoreError {
    /// Whether this error ends all further processing of the store
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::ReducerFault { .. })
    }
}

/// Receives every fault a store isolates or halts on
pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &StoreError);
}

/// Default reporter - writes faults to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, error: &StoreError) {
        match error {
            StoreError::EffectFault { source, .. } => {
                log::error!("{} (caused by: {:#})", error, source);
            }
            _ if error.is_fatal() => {
                log::error!("{} - no further actions will be processed", error);
            }
            _ => log::error!("{}", error),
        }
    }
}

/// Readable message out of a caught panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_fault_keeps_source() {
        let error = StoreError::EffectFault {
            store: "slideshow".to_string(),
            effect: EffectId(3),
            source: anyhow::anyhow!("timer broke"),
        };

        assert_eq!(
            error.to_string(),
            "store `slideshow`: effect #3 failed: timer broke"
        );
        let source = std::error::Error::source(&error).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("timer broke"));
        assert!(!error.is_fatal());
    }

    #[test]
    fn test_reducer_fault_is_fatal() {
        let error = StoreError::ReducerFault {
            store: "counter".to_string(),
            action: "inc",
            message: "overflow".to_string(),
        };
        assert!(error.is_fatal());
    }

    #[test]
    fn test_panic_message_from_payloads() {
        let caught = std::panic::catch_unwind(|| panic!("static message")).unwrap_err();
        assert_eq!(panic_message(caught.as_ref()), "static message");

        let caught = std::panic::catch_unwind(|| panic!("formatted {}", 42)).unwrap_err();
        assert_eq!(panic_message(caught.as_ref()), "formatted 42");
    }
}
