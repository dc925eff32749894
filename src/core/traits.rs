//! Core trait shared by the single-owner and concurrent ledger engines
//!
//! Both engines expose the same operations, so pipelines and tests can be
//! written once against [`Ledger`].

use crate::types::{
    Account, LedgerError, Operation, OperationOutcome, TransactionRecord, TransferOutcome,
};
use rust_decimal::Decimal;

/// Trait for ledger engines
///
/// Every mutating operation is one atomic unit: the balance changes and the
/// transaction record are either all committed or none are.
pub trait Ledger {
    /// Current balance, or `None` if the account does not exist
    ///
    /// Never creates an account and never logs anything.
    fn get_balance(&self, account_id: &str) -> Result<Option<Decimal>, LedgerError>;

    /// Credit `amount` to `account_id`, creating the account if needed
    fn deposit(&mut self, account_id: &str, amount: Decimal) -> Result<Account, LedgerError>;

    /// Debit `amount` from an existing account
    fn withdraw(&mut self, account_id: &str, amount: Decimal) -> Result<Account, LedgerError>;

    /// Move `amount` from an existing origin to a destination, creating the
    /// destination if needed
    fn transfer(
        &mut self,
        origin_id: &str,
        destination_id: &str,
        amount: Decimal,
    ) -> Result<TransferOutcome, LedgerError>;

    /// Clear the transaction log and every account
    fn reset(&mut self) -> Result<(), LedgerError>;

    /// Consistent snapshot of all accounts, sorted by id
    fn accounts(&self) -> Result<Vec<Account>, LedgerError>;

    /// Consistent snapshot of the transaction log, in commit order
    fn transactions(&self) -> Result<Vec<TransactionRecord>, LedgerError>;

    /// Dispatch a single operation
    fn apply(&mut self, operation: Operation) -> Result<OperationOutcome, LedgerError> {
        match operation {
            Operation::Deposit {
                destination,
                amount,
            } => self
                .deposit(&destination, amount)
                .map(|destination| OperationOutcome::Deposited { destination }),
            Operation::Withdraw { origin, amount } => self
                .withdraw(&origin, amount)
                .map(|origin| OperationOutcome::Withdrawn { origin }),
            Operation::Transfer {
                origin,
                destination,
                amount,
            } => self
                .transfer(&origin, &destination, amount)
                .map(OperationOutcome::from),
            Operation::Reset => self.reset().map(|()| OperationOutcome::Reset),
        }
    }
}
