//! Dependency graph traversal
//!
//! The graph is the sheet's dependency map: each cell id maps to the ids its
//! formula reads. Ids without an entry have no outgoing edges. Both
//! traversals here are iterative so long reference chains cannot exhaust
//! the call stack.

use crate::error::{FormulaError, FormulaResult};
use ahash::AHashMap;

/// Cell id → ids of the cells its formula reads, in discovery order
pub type DependencyMap = AHashMap<String, Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    InProgress,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Complete,
    Cycle,
    TooDeep,
}

/// Three-colour depth-first walk over a [`DependencyMap`]
struct Traversal<'a> {
    dependencies: &'a DependencyMap,
    states: AHashMap<&'a str, VisitState>,
}

impl<'a> Traversal<'a> {
    fn new(dependencies: &'a DependencyMap) -> Self {
        Self {
            dependencies,
            states: AHashMap::new(),
        }
    }

    fn edges(&self, vertex: &str) -> &'a [String] {
        self.dependencies
            .get(vertex)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Walk from `start`, calling `finished` on each vertex after all of
    /// its dependencies
    fn run(
        &mut self,
        start: &'a str,
        max_depth: usize,
        mut finished: impl FnMut(&'a str),
    ) -> Outcome {
        let mut stack: Vec<(&'a str, usize)> = vec![(start, 0)];
        self.states.insert(start, VisitState::InProgress);

        while let Some(&(vertex, next)) = stack.last() {
            let Some(neighbour) = self.edges(vertex).get(next) else {
                self.states.insert(vertex, VisitState::Done);
                finished(vertex);
                stack.pop();
                continue;
            };

            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }

            match self.states.get(neighbour.as_str()) {
                Some(VisitState::InProgress) => return Outcome::Cycle,
                Some(VisitState::Done) => {}
                None => {
                    if stack.len() > max_depth {
                        return Outcome::TooDeep;
                    }
                    self.states.insert(neighbour, VisitState::InProgress);
                    stack.push((neighbour, 0));
                }
            }
        }

        Outcome::Complete
    }
}

/// Detects circular references reachable from a cell
///
/// Built fresh for every query over the dependency map as it is at that
/// moment, and consumed by the check.
pub struct CycleChecker<'a> {
    traversal: Traversal<'a>,
}

impl<'a> CycleChecker<'a> {
    pub fn new(dependencies: &'a DependencyMap) -> Self {
        Self {
            traversal: Traversal::new(dependencies),
        }
    }

    /// Whether a cycle is reachable from `start`
    pub fn contains_cycle(mut self, start: &str) -> bool {
        let dependencies = self.traversal.dependencies;
        let Some((start, _)) = dependencies.get_key_value(start) else {
            return false;
        };
        self.traversal.run(start, usize::MAX, |_| {}) == Outcome::Cycle
    }
}

/// Ids reachable from `start` (itself included), each listed after every
/// id it reads
///
/// Fails with [`FormulaError::DepthExceeded`] when a chain of references
/// is longer than `max_depth` and with [`FormulaError::CircularReference`]
/// when the walk runs into a cycle. An id with no entry yields an empty
/// order.
pub fn evaluation_order<'a>(
    dependencies: &'a DependencyMap,
    start: &str,
    max_depth: usize,
) -> FormulaResult<Vec<&'a str>> {
    let Some((start, _)) = dependencies.get_key_value(start) else {
        return Ok(Vec::new());
    };

    let mut order = Vec::new();
    let mut traversal = Traversal::new(dependencies);
    match traversal.run(start, max_depth, |id| order.push(id)) {
        Outcome::Complete => Ok(order),
        Outcome::Cycle => Err(FormulaError::CircularReference(start.clone())),
        Outcome::TooDeep => Err(FormulaError::DepthExceeded(max_depth)),
    }
}
