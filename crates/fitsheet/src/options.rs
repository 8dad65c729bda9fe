//! Sheet options

use sha2::Digest as _;

/// Options for a [`Sheet`](crate::Sheet)
#[derive(Debug, Clone)]
pub struct SheetOptions {
    /// Longest chain of references a single query follows (default: 100 000)
    ///
    /// A query that needs a longer chain evaluates to `Empty`.
    pub max_dependency_depth: usize,
    /// How cross-cell references are evaluated
    pub strategy: EvaluationStrategy,
    /// Checksum written to and verified on saved documents
    pub checksum: ChecksumAlgorithm,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            max_dependency_depth: 100_000,
            strategy: EvaluationStrategy::default(),
            checksum: ChecksumAlgorithm::default(),
        }
    }
}

/// Evaluation strategy for cross-cell references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvaluationStrategy {
    /// Evaluate every reachable cell once, in dependency order, from an
    /// explicit work list
    #[default]
    Memoized,
    /// Re-evaluate each reference where it occurs, on the call stack
    ///
    /// Nesting is capped at [`RECURSIVE_DEPTH_LIMIT`](crate::sheet::RECURSIVE_DEPTH_LIMIT)
    /// even when `max_dependency_depth` is larger.
    Recursive,
}

/// Document checksum algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChecksumAlgorithm {
    /// SHA-256 (default)
    #[default]
    Sha256,
    /// SHA-512
    Sha512,
}

impl ChecksumAlgorithm {
    /// Lowercase hex digest of `data`
    pub fn digest(self, data: &[u8]) -> String {
        match self {
            ChecksumAlgorithm::Sha256 => hex::encode(sha2::Sha256::digest(data)),
            ChecksumAlgorithm::Sha512 => hex::encode(sha2::Sha512::digest(data)),
        }
    }
}
