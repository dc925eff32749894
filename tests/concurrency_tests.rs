//! Concurrency tests for the shared ledger engine
//!
//! Many threads hammer one `AsyncLedgerEngine`; afterwards the ledger must
//! look like some sequential ordering of the same operations.

use account_ledger::core::{AsyncAccountStore, AsyncTransactionLog};
use account_ledger::{
    AsyncLedgerEngine, ErrorKind, Ledger, LedgerConfig, LedgerEngine, LedgerError, Operation,
    Posting,
};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

fn dec(value: i64) -> Decimal {
    Decimal::new(value, 0)
}

fn spawn_all<F>(threads: usize, work: F) -> Vec<thread::JoinHandle<Vec<Result<(), LedgerError>>>>
where
    F: Fn(usize) -> Vec<Result<(), LedgerError>> + Send + Sync + 'static,
{
    let work = Arc::new(work);
    let barrier = Arc::new(Barrier::new(threads));

    (0..threads)
        .map(|thread_index| {
            let work = Arc::clone(&work);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                work(thread_index)
            })
        })
        .collect()
}

fn join_all(
    handles: Vec<thread::JoinHandle<Vec<Result<(), LedgerError>>>>,
) -> Vec<Result<(), LedgerError>> {
    handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect()
}

/// Two engines over one pair of stores, plus the account store itself
fn engines_sharing_stores() -> (Arc<AsyncAccountStore>, AsyncLedgerEngine, AsyncLedgerEngine) {
    let accounts = Arc::new(AsyncAccountStore::new());
    let log = Arc::new(AsyncTransactionLog::new());
    let config = LedgerConfig::with_lock_timeout(Duration::from_secs(2));

    (
        Arc::clone(&accounts),
        AsyncLedgerEngine::new(Arc::clone(&accounts), Arc::clone(&log), config.clone()),
        AsyncLedgerEngine::new(accounts, log, config),
    )
}

/// Replaying the log from scratch must land on the stored balances
fn assert_log_matches_balances(engine: &AsyncLedgerEngine) {
    let mut replay = LedgerEngine::new();
    for record in engine.transactions().unwrap() {
        let amount = record.amount;
        let operation = match record.posting {
            Posting::Deposit { destination } => Operation::Deposit {
                destination,
                amount,
            },
            Posting::Withdraw { origin } => Operation::Withdraw { origin, amount },
            Posting::Transfer {
                origin,
                destination,
            } => Operation::Transfer {
                origin,
                destination,
                amount,
            },
        };
        replay.apply(operation).unwrap();
    }

    let balances = |accounts: Vec<account_ledger::Account>| -> Vec<(String, Decimal)> {
        accounts
            .into_iter()
            .map(|account| (account.id, account.balance))
            .collect()
    };
    assert_eq!(
        balances(engine.accounts().unwrap()),
        balances(replay.accounts().unwrap())
    );
}

#[test]
fn racing_withdrawals_never_overdraw() {
    let engine = AsyncLedgerEngine::default();
    engine.deposit("shared", dec(100)).unwrap();

    let worker = engine.clone();
    let results = join_all(spawn_all(16, move |_| {
        (0..10)
            .map(|_| worker.withdraw("shared", dec(1)).map(|_| ()))
            .collect()
    }));

    let succeeded = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(succeeded, 100);
    assert!(results
        .iter()
        .filter_map(|result| result.as_ref().err())
        .all(|e| e.kind() == ErrorKind::InsufficientFunds));
    assert_eq!(engine.get_balance("shared").unwrap(), Some(Decimal::ZERO));
    assert_eq!(engine.transactions().unwrap().len(), 101);
}

#[test]
fn concurrent_transfers_conserve_total() {
    let engine = AsyncLedgerEngine::default();
    let ids: Vec<String> = (0..6).map(|i| format!("acct-{i}")).collect();
    for id in &ids {
        engine.deposit(id, dec(1_000)).unwrap();
    }

    let worker = engine.clone();
    let worker_ids = ids.clone();
    let results = join_all(spawn_all(8, move |thread_index| {
        (0..200)
            .map(|step| {
                let origin = &worker_ids[(thread_index + step) % worker_ids.len()];
                let destination = &worker_ids[(thread_index * 7 + step * 3 + 1) % worker_ids.len()];
                worker
                    .transfer(origin, destination, Decimal::new(((step % 50) + 1) as i64, 0))
                    .map(|_| ())
            })
            .collect()
    }));

    assert!(results.iter().all(|result| match result {
        Ok(()) => true,
        Err(e) => e.kind() == ErrorKind::InsufficientFunds,
    }));

    let accounts = engine.accounts().unwrap();
    let total: Decimal = accounts.iter().map(|account| account.balance).sum();
    assert_eq!(total, dec(6_000));
    assert!(accounts
        .iter()
        .all(|account| account.balance >= Decimal::ZERO));

    let committed = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(engine.transactions().unwrap().len(), ids.len() + committed);
}

#[test]
fn concurrent_first_deposits_create_one_account() {
    let engine = AsyncLedgerEngine::default();

    let worker = engine.clone();
    let results = join_all(spawn_all(12, move |_| {
        vec![worker.deposit("fresh", dec(5)).map(|_| ())]
    }));

    assert!(results.iter().all(Result::is_ok));
    let accounts = engine.accounts().unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].balance, dec(60));
}

#[test]
fn concurrent_transfers_into_new_account_create_it_once() {
    let engine = AsyncLedgerEngine::default();
    for i in 0..10 {
        engine.deposit(&format!("src-{i}"), dec(10)).unwrap();
    }

    let worker = engine.clone();
    let results = join_all(spawn_all(10, move |thread_index| {
        vec![worker
            .transfer(&format!("src-{thread_index}"), "sink", dec(10))
            .map(|_| ())]
    }));

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(engine.get_balance("sink").unwrap(), Some(dec(100)));
    assert_eq!(engine.accounts().unwrap().len(), 11);
}

#[test]
fn reset_is_exclusive() {
    let engine = AsyncLedgerEngine::default();
    let stop = Arc::new(AtomicBool::new(false));

    let worker = engine.clone();
    let worker_stop = Arc::clone(&stop);
    let depositor = thread::spawn(move || {
        while !worker_stop.load(Ordering::Relaxed) {
            worker.deposit("a", dec(1)).unwrap();
            // May race a reset and find no origin
            let _ = worker.transfer("a", "b", dec(1));
        }
    });

    for _ in 0..20 {
        engine.reset().unwrap();
        // A snapshot never sees a record without its balance change
        let accounts = engine.accounts().unwrap();
        let records = engine.transactions().unwrap();
        let total: Decimal = accounts.iter().map(|account| account.balance).sum();
        let deposited = records
            .iter()
            .filter(|record| record.posting.origin().is_none())
            .count();
        assert!(total <= dec(deposited as i64));
        thread::sleep(Duration::from_millis(1));
    }

    stop.store(true, Ordering::Relaxed);
    depositor.join().unwrap();
}

#[test]
fn snapshots_are_consistent_under_load() {
    let engine = AsyncLedgerEngine::default();
    engine.deposit("x", dec(500)).unwrap();
    engine.deposit("y", dec(500)).unwrap();
    let stop = Arc::new(AtomicBool::new(false));

    let mut movers = Vec::new();
    for (origin, destination) in [("x", "y"), ("y", "x")] {
        let worker = engine.clone();
        let worker_stop = Arc::clone(&stop);
        movers.push(thread::spawn(move || {
            while !worker_stop.load(Ordering::Relaxed) {
                let _ = worker.transfer(origin, destination, dec(7));
            }
        }));
    }

    for _ in 0..50 {
        let accounts = engine.accounts().unwrap();
        let total: Decimal = accounts.iter().map(|account| account.balance).sum();
        assert_eq!(total, dec(1_000));
    }

    stop.store(true, Ordering::Relaxed);
    for mover in movers {
        mover.join().unwrap();
    }
}

#[test]
fn contended_lock_times_out_as_storage_unavailable() {
    let engine =
        AsyncLedgerEngine::with_config(LedgerConfig::with_lock_timeout(Duration::from_millis(20)));
    engine.deposit("a", dec(1)).unwrap();

    let snapshotter = engine.clone();
    let barrier = Arc::new(Barrier::new(2));
    let holder_barrier = Arc::clone(&barrier);

    // accounts() holds the ledger gate exclusively while it copies balances,
    // so deposits from this thread contend for the gate
    let holder = thread::spawn(move || {
        holder_barrier.wait();
        for _ in 0..2_000 {
            let _ = snapshotter.accounts();
        }
    });
    barrier.wait();

    let mut outcomes = Vec::new();
    for _ in 0..50 {
        outcomes.push(engine.deposit("a", dec(1)));
    }
    holder.join().unwrap();

    assert!(outcomes.iter().all(|outcome| match outcome {
        Ok(_) => true,
        Err(e) => e.kind() == ErrorKind::StorageUnavailable && e.is_retryable(),
    }));
}

#[test]
fn reset_through_one_engine_waits_for_deposit_through_another() {
    let (accounts, resetter, depositor) = engines_sharing_stores();
    depositor.deposit("x", dec(1)).unwrap();
    let observer = resetter.clone();

    // The deposit finds x, then parks on its lock
    let cell = accounts.find("x").unwrap();
    let held = cell.lock();
    let deposit = thread::spawn(move || depositor.deposit("x", dec(5)));
    thread::sleep(Duration::from_millis(50));
    let reset = thread::spawn(move || resetter.reset());
    thread::sleep(Duration::from_millis(50));
    drop(held);

    assert!(deposit.join().unwrap().is_ok());
    assert_eq!(reset.join().unwrap(), Ok(()));

    // The reset ran after the deposit, so nothing survives it
    assert_eq!(observer.get_balance("x").unwrap(), None);
    assert!(observer.transactions().unwrap().is_empty());
    assert_log_matches_balances(&observer);
}

#[test]
fn reset_through_one_engine_waits_for_transfer_creating_destination() {
    let (accounts, resetter, mover) = engines_sharing_stores();
    mover.deposit("src", dec(10)).unwrap();
    let observer = resetter.clone();

    // The transfer finds src and no destination, then parks on src's lock
    let cell = accounts.find("src").unwrap();
    let held = cell.lock();
    let transfer = thread::spawn(move || mover.transfer("src", "fresh", dec(10)));
    thread::sleep(Duration::from_millis(50));
    let reset = thread::spawn(move || resetter.reset());
    thread::sleep(Duration::from_millis(50));
    drop(held);

    assert!(transfer.join().unwrap().is_ok());
    assert_eq!(reset.join().unwrap(), Ok(()));

    assert_eq!(observer.get_balance("fresh").unwrap(), None);
    assert!(observer.accounts().unwrap().is_empty());
    assert!(observer.transactions().unwrap().is_empty());
    assert_log_matches_balances(&observer);
}

#[test]
fn engines_sharing_stores_keep_log_and_balances_in_step() {
    let (_, resetter, worker) = engines_sharing_stores();
    let observer = resetter.clone();
    let stop = Arc::new(AtomicBool::new(false));

    let mut workers = Vec::new();
    for thread_index in 0..4 {
        let engine = worker.clone();
        let worker_stop = Arc::clone(&stop);
        workers.push(thread::spawn(move || {
            let mut step = 0usize;
            while !worker_stop.load(Ordering::Relaxed) {
                let account = format!("acct-{}", (thread_index + step) % 5);
                let other = format!("acct-{}", (thread_index * 3 + step + 1) % 5);
                // Rejections are expected whenever a reset lands in between
                let _ = engine.deposit(&account, dec(3));
                let _ = engine.transfer(&account, &other, dec(2));
                let _ = engine.withdraw(&other, dec(1));
                step += 1;
            }
        }));
    }

    for _ in 0..20 {
        resetter.reset().unwrap();
        thread::sleep(Duration::from_millis(2));
    }

    stop.store(true, Ordering::Relaxed);
    for handle in workers {
        handle.join().unwrap();
    }

    assert_log_matches_balances(&observer);
}
