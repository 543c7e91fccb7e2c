//! Parent-link validation for connection gestures.
//!
//! A connection from `source` to `target` makes `target` the parent of
//! `source`. The task graph is a forest at rest; these checks keep it one.

use crate::model::TaskId;
use std::collections::HashSet;
use thiserror::Error;

/// Upper bound on ancestor-chain traversal.
pub const MAX_ANCESTOR_DEPTH: usize = 10_000;

/// Reasons a connection is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("cannot connect task {0} to itself")]
    SelfConnection(TaskId),
    #[error("tasks {child} and {parent} are already linked")]
    AlreadyLinked { child: TaskId, parent: TaskId },
    #[error("linking {child} under {parent} would create a cycle")]
    Cycle { child: TaskId, parent: TaskId },
    #[error("ancestor chain above {0} is malformed")]
    MalformedHierarchy(TaskId),
    #[error("unknown task {0}")]
    UnknownTask(TaskId),
}

/// Whether `candidate` appears in the ancestor chain of `of`.
///
/// Walks parent links upward with a visited set and a depth cap, so corrupt
/// chains that loop back on themselves still terminate; in that case the
/// chain is reported as malformed.
pub fn is_ancestor(
    candidate: TaskId,
    of: TaskId,
    parent_of: impl Fn(TaskId) -> Option<TaskId>,
) -> Result<bool, ConnectionError> {
    let mut visited = HashSet::new();
    visited.insert(of);
    let mut cursor = parent_of(of);

    while let Some(current) = cursor {
        if current == candidate {
            return Ok(true);
        }
        if !visited.insert(current) || visited.len() > MAX_ANCESTOR_DEPTH {
            return Err(ConnectionError::MalformedHierarchy(of));
        }
        cursor = parent_of(current);
    }

    Ok(false)
}

/// Check whether `target` may become the parent of `source`.
pub fn validate_connection(
    source: TaskId,
    target: TaskId,
    parent_of: impl Fn(TaskId) -> Option<TaskId>,
) -> Result<(), ConnectionError> {
    if source == target {
        return Err(ConnectionError::SelfConnection(source));
    }
    if parent_of(source) == Some(target) || parent_of(target) == Some(source) {
        return Err(ConnectionError::AlreadyLinked {
            child: source,
            parent: target,
        });
    }
    if is_ancestor(source, target, &parent_of)? {
        return Err(ConnectionError::Cycle {
            child: source,
            parent: target,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use uuid::Uuid;

    fn chain() -> (TaskId, TaskId, TaskId, HashMap<TaskId, TaskId>) {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        // C's parent is B, B's parent is A.
        let parents = HashMap::from([(c, b), (b, a)]);
        (a, b, c, parents)
    }

    #[test]
    fn test_cycle_rejected() {
        let (a, _, c, parents) = chain();
        // Making C the parent of A closes the loop A -> B -> C -> A.
        let result = validate_connection(a, c, |id| parents.get(&id).copied());
        assert_eq!(result, Err(ConnectionError::Cycle { child: a, parent: c }));
    }

    #[test]
    fn test_self_connection_rejected() {
        let (a, _, _, parents) = chain();
        let result = validate_connection(a, a, |id| parents.get(&id).copied());
        assert_eq!(result, Err(ConnectionError::SelfConnection(a)));
    }

    #[test]
    fn test_existing_link_rejected_both_ways() {
        let (_, b, c, parents) = chain();
        let lookup = |id: TaskId| parents.get(&id).copied();
        assert!(matches!(
            validate_connection(c, b, lookup),
            Err(ConnectionError::AlreadyLinked { .. })
        ));
        assert!(matches!(
            validate_connection(b, c, lookup),
            Err(ConnectionError::AlreadyLinked { .. })
        ));
    }

    #[test]
    fn test_valid_connection_accepted() {
        let (a, _, c, parents) = chain();
        let d = Uuid::new_v4();
        let lookup = |id: TaskId| parents.get(&id).copied();
        assert_eq!(validate_connection(d, c, lookup), Ok(()));
        // Re-parenting C directly under A keeps the forest acyclic.
        assert_eq!(validate_connection(c, a, lookup), Ok(()));
    }

    #[test]
    fn test_corrupt_chain_terminates() {
        let (x, y, z) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        // x -> y -> x loops forever without a guard.
        let parents = HashMap::from([(x, y), (y, x)]);
        let result = validate_connection(z, x, |id| parents.get(&id).copied());
        assert_eq!(result, Err(ConnectionError::MalformedHierarchy(x)));
    }
}
