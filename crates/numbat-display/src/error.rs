//! Primitive tree errors.

use crate::primitive::PrimitiveId;

/// Failures of primitive tree operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DisplayError {
    /// The configured primitive limit was reached.
    #[error("primitive limit of {limit} reached")]
    Exhausted {
        /// The configured limit.
        limit: usize,
    },
    /// The id does not name a primitive in this tree.
    #[error("no primitive {0:?}")]
    UnknownPrimitive(PrimitiveId),
    /// A text operation was applied to a non-text primitive.
    #[error("primitive {0:?} is not a text run")]
    NotText(PrimitiveId),
}
