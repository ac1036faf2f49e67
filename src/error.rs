use thiserror::Error;

/// LlrbError enumerates over all possible errors that this package
/// shall return.
#[derive(Debug, PartialEq, Error)]
pub enum LlrbError<K>
where
    K: Clone,
{
    /// Fatal case, breaking one of the two LLRB rules.
    #[error("consecutive red links")]
    ConsecutiveReds,
    /// Fatal case, a red link leaning right.
    #[error("red link leaning right")]
    RedRightLink,
    /// Fatal case, the root link must be black.
    #[error("root is red")]
    RedRoot,
    /// Fatal case, breaking one of the two LLRB rules. The String
    /// component of this variant can be used for debugging.
    #[error("unbalanced blacks, {0}")]
    UnbalancedBlacks(String),
    /// Fatal case, entries are not in comparator order.
    #[error("entries out of sort order")]
    SortError(K, K),
}
