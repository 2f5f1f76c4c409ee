//! Request tokens for asynchronous collaborator calls.
//!
//! The caller owns the actual work (HTTP, file reading, font loading) and
//! brackets it with `begin` and `finish`. Each slot and operation has at
//! most one current token; a response carrying any other token is stale and
//! is discarded, so a late answer can never overwrite a newer one.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::composition::SlotKind;

/// Kinds of asynchronous work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    Generate,
    RemoveBackground,
    Upload,
    Export,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Generate => "generate",
            Operation::RemoveBackground => "removeBackground",
            Operation::Upload => "upload",
            Operation::Export => "export",
        }
    }

    /// Export is tracked for the whole session, everything else per slot.
    fn scope(self, slot: SlotKind) -> Option<SlotKind> {
        match self {
            Operation::Export => None,
            _ => Some(slot),
        }
    }
}

type RequestKey = (Option<SlotKind>, Operation);

/// Identifies one in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestToken {
    slot: Option<SlotKind>,
    operation: Operation,
    sequence: u64,
}

impl RequestToken {
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Slot the request targets; `None` for session-wide operations.
    pub fn slot(&self) -> Option<SlotKind> {
        self.slot
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    fn key(&self) -> RequestKey {
        (self.slot, self.operation)
    }
}

/// Whether a finished request was applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The result was applied to the composition.
    Applied,
    /// Background removal failed; the original image was kept.
    Fallback(crate::services::ServiceError),
    /// A newer request superseded this one; the result was discarded.
    Stale,
}

impl Outcome {
    pub fn is_stale(&self) -> bool {
        matches!(self, Outcome::Stale)
    }
}

/// The request is already running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Busy {
    pub operation: Operation,
    pub slot: Option<SlotKind>,
}

/// Current token per slot and operation.
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    next_sequence: u64,
    pending: HashMap<RequestKey, u64>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request unless the same one is still pending.
    pub fn try_begin(&mut self, slot: SlotKind, operation: Operation) -> Result<RequestToken, Busy> {
        let scope = operation.scope(slot);
        if self.pending.contains_key(&(scope, operation)) {
            return Err(Busy {
                operation,
                slot: scope,
            });
        }
        Ok(self.begin(slot, operation))
    }

    /// Start a request, superseding any pending one for the same slot and
    /// operation.
    pub fn begin(&mut self, slot: SlotKind, operation: Operation) -> RequestToken {
        self.next_sequence += 1;
        let token = RequestToken {
            slot: operation.scope(slot),
            operation,
            sequence: self.next_sequence,
        };
        self.pending.insert(token.key(), token.sequence);
        token
    }

    /// Retire `token`. Returns `true` if it was the current one.
    pub fn finish(&mut self, token: RequestToken) -> bool {
        if self.is_current(token) {
            self.pending.remove(&token.key());
            true
        } else {
            false
        }
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.pending.get(&token.key()) == Some(&token.sequence)
    }

    pub fn is_busy(&self, slot: SlotKind, operation: Operation) -> bool {
        self.pending
            .contains_key(&(operation.scope(slot), operation))
    }

    /// Drop every pending request on `slot`; their responses become stale.
    pub fn invalidate_slot(&mut self, slot: SlotKind) {
        self.pending.retain(|(scope, _), _| *scope != Some(slot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_flight() {
        let mut requests = RequestTracker::new();
        let token = requests
            .try_begin(SlotKind::Generated, Operation::Generate)
            .unwrap();
        assert!(requests.is_busy(SlotKind::Generated, Operation::Generate));
        assert_eq!(
            requests.try_begin(SlotKind::Generated, Operation::Generate),
            Err(Busy {
                operation: Operation::Generate,
                slot: Some(SlotKind::Generated)
            })
        );
        // Other slots and operations are independent.
        assert!(requests
            .try_begin(SlotKind::Uploaded, Operation::Generate)
            .is_ok());
        assert!(requests
            .try_begin(SlotKind::Generated, Operation::RemoveBackground)
            .is_ok());

        assert!(requests.finish(token));
        assert!(!requests.is_busy(SlotKind::Generated, Operation::Generate));
    }

    #[test]
    fn test_supersede_makes_older_stale() {
        let mut requests = RequestTracker::new();
        let a = requests.begin(SlotKind::Uploaded, Operation::Upload);
        let b = requests.begin(SlotKind::Uploaded, Operation::Upload);
        assert!(b.sequence() > a.sequence());

        // B returns first and is applied, then A's late response is dropped.
        assert!(requests.finish(b));
        assert!(!requests.finish(a));
    }

    #[test]
    fn test_finish_twice() {
        let mut requests = RequestTracker::new();
        let token = requests.begin(SlotKind::Generated, Operation::Generate);
        assert!(requests.finish(token));
        assert!(!requests.finish(token));
    }

    #[test]
    fn test_export_is_session_wide() {
        let mut requests = RequestTracker::new();
        let token = requests
            .try_begin(SlotKind::Generated, Operation::Export)
            .unwrap();
        assert_eq!(token.slot(), None);
        assert!(requests.is_busy(SlotKind::Uploaded, Operation::Export));
        assert!(requests
            .try_begin(SlotKind::Uploaded, Operation::Export)
            .is_err());
        // Clearing a slot does not cancel an export.
        requests.invalidate_slot(SlotKind::Generated);
        assert!(requests.is_current(token));
    }

    #[test]
    fn test_invalidate_slot() {
        let mut requests = RequestTracker::new();
        let generated = requests.begin(SlotKind::Generated, Operation::Generate);
        let removal = requests.begin(SlotKind::Generated, Operation::RemoveBackground);
        let upload = requests.begin(SlotKind::Uploaded, Operation::Upload);

        requests.invalidate_slot(SlotKind::Generated);
        assert!(!requests.finish(generated));
        assert!(!requests.finish(removal));
        assert!(requests.finish(upload));
    }
}
