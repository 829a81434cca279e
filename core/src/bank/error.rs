//! Bank reconstruction errors

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BankError {
    /// The event cannot be applied to a bank document
    #[error("invalid bank event: {name}")]
    InvalidBankEvent { name: String },

    #[error("unknown bank value type: {0}")]
    UnknownValueType(i64),
}
