use crate::domain::expense::ExpenseId;
use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("splits of expense {expense} sum to {actual}, expected {expected}")]
    SplitMismatch {
        expense: ExpenseId,
        expected: Decimal,
        actual: Decimal,
    },
    #[error("balances do not net to zero (drift {drift})")]
    BalanceImbalance { drift: Decimal },
    #[error("invalid amount: {value}")]
    InvalidAmount { value: String },
    #[error("expense {expense} has no participants to split between")]
    NoParticipants { expense: ExpenseId },
    #[error("split references unknown expense {expense}")]
    UnknownExpense { expense: ExpenseId },
    #[error("invalid ledger record: {0}")]
    InvalidRecord(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl EngineError {
    pub fn invalid_amount(value: impl ToString) -> Self {
        Self::InvalidAmount {
            value: value.to_string(),
        }
    }

    /// Signed difference between what an expense should split and what it did.
    pub fn discrepancy(&self) -> Option<Decimal> {
        match self {
            Self::SplitMismatch {
                expected, actual, ..
            } => expected.checked_sub(*actual),
            _ => None,
        }
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for EngineError {
    fn from(err: rocksdb::Error) -> Self {
        Self::InternalError(Box::new(err))
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        Self::InternalError(Box::new(err))
    }
}
