//! Error types for protocol runs

use crate::dcop::types::AgentId;
use thiserror::Error;

/// Errors that can occur while building or driving a SyncBB run
///
/// An exhausted domain is not an error: it is reported through
/// [`DomainValue::Exhausted`](crate::dcop::types::DomainValue::Exhausted).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("No message pending for agent {0}")]
    MailboxEmpty(AgentId),
    #[error("Invalid constraint checker: {0}")]
    InvalidChecker(String),
    #[error("Unknown agent: {0}")]
    UnknownAgent(AgentId),
    #[error("Duplicate agent: {0}")]
    DuplicateAgent(AgentId),
    #[error("Agent order is empty")]
    EmptyOrder,
    #[error("Constraint checker failed: {0}")]
    Checker(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// A specialized Result type for protocol operations
pub type Result<T> = std::result::Result<T, Error>;
