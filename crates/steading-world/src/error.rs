//! Error types for the steading-world crate.
//!
//! All operations that can fail return typed errors rather than
//! panicking. Registry and contract-book lookups report the offending
//! identifier so callers can log it and move on.

use uuid::Uuid;

use steading_types::ContractId;

/// Errors that can occur during world state operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// An entity with this id already exists in the registry.
    #[error("duplicate entity: {0}")]
    DuplicateEntity(Uuid),

    /// No entity with this id exists in the registry.
    #[error("entity not found: {0}")]
    EntityNotFound(Uuid),

    /// No contract with this id exists in the contract book.
    #[error("contract not found: {0}")]
    ContractNotFound(ContractId),

    /// A checked arithmetic operation overflowed.
    #[error("arithmetic overflow in world computation: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },

    /// A caller-supplied parameter was out of range.
    #[error("invalid parameter: {reason}")]
    InvalidParameter {
        /// Explanation of what is wrong with the parameter.
        reason: String,
    },
}
