//! Property tests over random operation sequences
//!
//! Operations draw from a small pool of account ids so that transfers,
//! overdrafts and unknown origins all come up often.

use account_ledger::core::r#async::BatchProcessor;
use account_ledger::{Account, AsyncLedgerEngine, Ledger, LedgerEngine, Operation};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;

const ACCOUNTS: [&str; 4] = ["a", "b", "c", "d"];

fn account_id() -> impl Strategy<Value = String> {
    prop::sample::select(ACCOUNTS.to_vec()).prop_map(str::to_string)
}

/// Mostly valid cent amounts, with some zero and over-precise ones mixed in
fn amount() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        8 => (1i64..5_000).prop_map(|cents| Decimal::new(cents, 2)),
        1 => Just(Decimal::ZERO),
        1 => (1i64..5_000).prop_map(|mills| Decimal::new(mills * 10 + 5, 3)),
    ]
}

fn operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        4 => (account_id(), amount())
            .prop_map(|(destination, amount)| Operation::Deposit { destination, amount }),
        3 => (account_id(), amount())
            .prop_map(|(origin, amount)| Operation::Withdraw { origin, amount }),
        4 => (account_id(), account_id(), amount()).prop_map(|(origin, destination, amount)| {
            Operation::Transfer {
                origin,
                destination,
                amount,
            }
        }),
        1 => Just(Operation::Reset),
    ]
}

fn total(accounts: &[Account]) -> Decimal {
    accounts.iter().map(|account| account.balance).sum()
}

fn balances(accounts: &[Account]) -> Vec<(String, Decimal)> {
    accounts
        .iter()
        .map(|account| (account.id.clone(), account.balance))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        ..ProptestConfig::default()
    })]

    /// Balances stay non-negative and every operation moves the total by
    /// exactly what it says, or not at all when it fails
    #[test]
    fn balances_non_negative_and_totals_conserved(
        operations in prop::collection::vec(operation(), 1..60)
    ) {
        let mut engine = LedgerEngine::new();

        for operation in operations {
            let before = total(&engine.accounts().unwrap());
            let records_before = engine.transactions().unwrap().len();

            let result = engine.apply(operation.clone());
            let accounts = engine.accounts().unwrap();
            let after = total(&accounts);
            let records_after = engine.transactions().unwrap().len();

            prop_assert!(accounts.iter().all(|account| account.balance >= Decimal::ZERO));

            match (&operation, &result) {
                (_, Err(_)) => {
                    prop_assert_eq!(after, before);
                    prop_assert_eq!(records_after, records_before);
                }
                (Operation::Deposit { amount, .. }, Ok(_)) => {
                    prop_assert_eq!(after, before + amount);
                    prop_assert_eq!(records_after, records_before + 1);
                }
                (Operation::Withdraw { amount, .. }, Ok(_)) => {
                    prop_assert_eq!(after, before - amount);
                    prop_assert_eq!(records_after, records_before + 1);
                }
                (Operation::Transfer { .. }, Ok(_)) => {
                    prop_assert_eq!(after, before);
                    prop_assert_eq!(records_after, records_before + 1);
                }
                (Operation::Reset, Ok(_)) => {
                    prop_assert!(accounts.is_empty());
                    prop_assert_eq!(records_after, 0);
                }
            }
        }
    }

    /// Both engines give the same answer to every operation
    #[test]
    fn sync_and_concurrent_engines_agree(
        operations in prop::collection::vec(operation(), 1..60)
    ) {
        let mut sync_engine = LedgerEngine::new();
        let async_engine = AsyncLedgerEngine::default();

        for operation in operations {
            let expected = sync_engine.apply(operation.clone());
            let actual = async_engine.apply(operation);

            prop_assert_eq!(
                actual.as_ref().map(|_| ()).map_err(|e| e.kind()),
                expected.as_ref().map(|_| ()).map_err(|e| e.kind())
            );
        }

        prop_assert_eq!(
            balances(&async_engine.accounts().unwrap()),
            balances(&sync_engine.accounts().unwrap())
        );
        prop_assert_eq!(
            async_engine.transactions().unwrap().len(),
            sync_engine.transactions().unwrap().len()
        );
    }

    /// Partitioned parallel batches end in the same state as sequential replay
    #[test]
    fn batch_processing_matches_sequential_replay(
        operations in prop::collection::vec(operation(), 1..80)
    ) {
        let mut sync_engine = LedgerEngine::new();
        let expected: Vec<bool> = operations
            .iter()
            .map(|operation| sync_engine.apply(operation.clone()).is_ok())
            .collect();

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(4)
            .build()
            .unwrap();
        let engine = Arc::new(AsyncLedgerEngine::default());
        let processor = BatchProcessor::new(Arc::clone(&engine));
        let results = runtime.block_on(processor.process_batch(operations));

        let actual: Vec<bool> = results.iter().map(|processed| processed.result.is_ok()).collect();
        prop_assert_eq!(actual, expected);
        prop_assert_eq!(
            balances(&engine.accounts().unwrap()),
            balances(&sync_engine.accounts().unwrap())
        );
    }
}
