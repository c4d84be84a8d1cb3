//! Store configuration

use crate::error::{ErrorReporter, LogReporter};
use std::fmt;
use std::sync::Arc;

/// What the scheduler does when the reducer panics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReducerFaultPolicy {
    /// Report the fault and stop processing actions for good
    #[default]
    Halt,
    /// Report the fault, keep the previous state and continue with the next action
    SkipAction,
}

/// Configuration of a single store instance
#[derive(Clone)]
pub struct StoreConfig {
    /// Name used in log lines and error reports
    pub name: String,
    pub reducer_fault_policy: ReducerFaultPolicy,
    pub reporter: Arc<dyn ErrorReporter>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: "store".to_string(),
            reducer_fault_policy: ReducerFaultPolicy::default(),
            reporter: Arc::new(LogReporter),
        }
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("name", &self.name)
            .field("reducer_fault_policy", &self.reducer_fault_policy)
            .finish_non_exhaustive()
    }
}
