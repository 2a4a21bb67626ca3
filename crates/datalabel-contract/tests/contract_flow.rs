use async_trait::async_trait;
use datalabel_contract::{CallContext, ContractConfig, LabelContract};
use datalabel_economics::{LedgerAdapter, MemoryLedger, TransferReceipt};
use datalabel_types::{Label, LabelError, ProtocolParams, QuAmount, TaskHash, WorkerId};
use std::sync::Arc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn worker(n: u8) -> WorkerId {
    WorkerId::from_bytes([n; 32])
}

fn operator() -> WorkerId {
    WorkerId::from_bytes([0xFF; 32])
}

fn new_contract() -> (LabelContract, Arc<MemoryLedger>) {
    let ledger = Arc::new(MemoryLedger::new());
    let contract = LabelContract::new(ProtocolParams::default(), ledger.clone());
    (contract, ledger)
}

async fn fund(contract: &LabelContract, amount: u64, tick: u64) {
    let ctx = CallContext::new(operator(), QuAmount::from_qu(amount), tick);
    contract.fund(&ctx).await;
}

#[tokio::test]
async fn test_complete_labeling_lifecycle() {
    init_tracing();
    let (contract, ledger) = new_contract();
    let task = TaskHash::new(b"image-0042");

    // 1. Community funds the pool
    println!("\n=== Funding the pool ===");
    fund(&contract, 10_000, 1).await;
    let stats = contract.pool_stats().await;
    assert_eq!(stats.available, QuAmount::from_qu(10_000));
    assert_eq!(stats.lifetime_funded, QuAmount::from_qu(10_000));

    // 2. Votes arrive; two for label 5, one dissent on 7
    println!("\n=== Collecting votes ===");
    let outcome = contract
        .submit_label(&CallContext::bare(worker(1), 10), task, Label::new(5))
        .await
        .unwrap();
    assert_eq!(outcome.tally, 1);
    assert!(outcome.resolution.is_none());

    contract
        .submit_label(&CallContext::bare(worker(2), 11), task, Label::new(5))
        .await
        .unwrap();
    contract
        .submit_label(&CallContext::bare(worker(4), 12), task, Label::new(7))
        .await
        .unwrap();

    // 3. The third identical vote resolves the task
    println!("\n=== Resolving ===");
    let outcome = contract
        .submit_label(&CallContext::bare(worker(3), 13), task, Label::new(5))
        .await
        .unwrap();
    let resolution = outcome.resolution.expect("quorum reached");
    assert_eq!(resolution.accepted_label, Label::new(5));
    assert_eq!(resolution.winners, vec![worker(1), worker(2), worker(3)]);
    assert_eq!(resolution.penalized, vec![worker(4)]);
    assert_eq!(resolution.total_paid, QuAmount::from_qu(3000));

    let entry = contract.task(task).await.unwrap();
    assert_eq!(entry.accepted_label(), Some(Label::new(5)));

    let winner = contract.worker(worker(1)).await.unwrap();
    assert_eq!(winner.accrued, QuAmount::from_qu(1000));
    assert_eq!(winner.reputation, 1);

    let stats = contract.pool_stats().await;
    assert_eq!(stats.available, QuAmount::from_qu(7000));
    assert_eq!(stats.committed, QuAmount::from_qu(3000));

    // 4. A winner claims and the ledger pays out
    println!("\n=== Claiming ===");
    let receipt = contract
        .claim_payout(&CallContext::bare(worker(1), 20))
        .await
        .unwrap();
    assert_eq!(receipt.to, worker(1));
    assert_eq!(receipt.amount, QuAmount::from_qu(1000));
    assert_eq!(
        ledger.balance(worker(1)).await.unwrap(),
        QuAmount::from_qu(1000)
    );

    let claimed = contract.worker(worker(1)).await.unwrap();
    assert_eq!(claimed.accrued, QuAmount::ZERO);
    assert_eq!(claimed.reputation, 1);

    let stats = contract.pool_stats().await;
    assert_eq!(stats.committed, QuAmount::from_qu(2000));
    assert_eq!(stats.lifetime_claimed, QuAmount::from_qu(1000));
    println!("Final pool stats: {stats:?}");
}

#[tokio::test]
async fn test_payout_deferred_until_pool_refilled() {
    init_tracing();
    let (contract, _ledger) = new_contract();
    let task = TaskHash::new(b"audio-0007");
    fund(&contract, 2000, 1).await;

    for (n, tick) in [(1u8, 10u64), (2, 11)] {
        contract
            .submit_label(&CallContext::bare(worker(n), tick), task, Label::new(3))
            .await
            .unwrap();
    }

    // Quorum is reached but the pool only covers two rewards.
    let err = contract
        .submit_label(&CallContext::bare(worker(3), 12), task, Label::new(3))
        .await
        .unwrap_err();
    assert!(matches!(err, LabelError::InsufficientPool { .. }));

    let entry = contract.task(task).await.unwrap();
    assert_eq!(entry.tally(Label::new(3)), 3);
    assert_eq!(contract.pool_stats().await.committed, QuAmount::ZERO);

    // Top up, then a fourth voter joins the majority and the payout
    // covers all four recorded voters.
    fund(&contract, 2000, 20).await;
    let outcome = contract
        .submit_label(&CallContext::bare(worker(4), 21), task, Label::new(3))
        .await
        .unwrap();
    let resolution = outcome.resolution.expect("resolves after refill");
    assert_eq!(resolution.winners.len(), 4);
    assert_eq!(resolution.total_paid, QuAmount::from_qu(4000));

    let stats = contract.pool_stats().await;
    assert_eq!(stats.available, QuAmount::ZERO);
    assert_eq!(stats.committed, QuAmount::from_qu(4000));
}

#[tokio::test]
async fn test_claim_with_nothing_accrued_is_rejected() {
    let (contract, _ledger) = new_contract();

    let err = contract
        .claim_payout(&CallContext::bare(worker(1), 5))
        .await
        .unwrap_err();
    assert!(matches!(err, LabelError::NothingToClaim { .. }));
}

#[tokio::test]
async fn test_second_claim_finds_nothing() {
    let (contract, ledger) = new_contract();
    let task = TaskHash::new(b"video-0099");
    fund(&contract, 5000, 1).await;

    for (n, tick) in [(1u8, 10u64), (2, 11), (3, 12)] {
        contract
            .submit_label(&CallContext::bare(worker(n), tick), task, Label::new(1))
            .await
            .unwrap();
    }

    contract
        .claim_payout(&CallContext::bare(worker(1), 20))
        .await
        .unwrap();
    let err = contract
        .claim_payout(&CallContext::bare(worker(1), 21))
        .await
        .unwrap_err();
    assert!(matches!(err, LabelError::NothingToClaim { .. }));

    // Only one transfer ever reached the ledger.
    assert_eq!(ledger.transfers().await.len(), 1);
}

struct FailingLedger;

#[async_trait]
impl LedgerAdapter for FailingLedger {
    async fn send(&self, _to: WorkerId, _amount: QuAmount) -> anyhow::Result<TransferReceipt> {
        anyhow::bail!("ledger unavailable")
    }

    async fn balance(&self, _id: WorkerId) -> anyhow::Result<QuAmount> {
        anyhow::bail!("ledger unavailable")
    }
}

#[tokio::test]
async fn test_failed_transfer_never_pays_twice() {
    init_tracing();
    let contract = LabelContract::new(ProtocolParams::default(), Arc::new(FailingLedger));
    let task = TaskHash::new(b"text-0123");
    fund(&contract, 5000, 1).await;

    for (n, tick) in [(1u8, 10u64), (2, 11), (3, 12)] {
        contract
            .submit_label(&CallContext::bare(worker(n), tick), task, Label::new(8))
            .await
            .unwrap();
    }

    let err = contract
        .claim_payout(&CallContext::bare(worker(1), 20))
        .await
        .unwrap_err();
    match err {
        LabelError::TransferFailed { amount, .. } => {
            assert_eq!(amount, QuAmount::from_qu(1000));
        }
        other => panic!("unexpected error: {other}"),
    }

    // The debit is authoritative: the balance is gone from the contract
    // and a retry cannot pay out a second time.
    assert_eq!(
        contract.worker(worker(1)).await.unwrap().accrued,
        QuAmount::ZERO
    );
    let err = contract
        .claim_payout(&CallContext::bare(worker(1), 21))
        .await
        .unwrap_err();
    assert!(matches!(err, LabelError::NothingToClaim { .. }));

    let stats = contract.pool_stats().await;
    assert_eq!(stats.lifetime_claimed, QuAmount::from_qu(1000));
}

#[tokio::test]
async fn test_expiry_sweep_closes_stale_tasks() {
    let (contract, _ledger) = new_contract();
    fund(&contract, 10_000, 1).await;
    let lifetime = contract.params().task_lifetime_ticks;

    let stale = TaskHash::new(b"stale-task");
    let fresh = TaskHash::new(b"fresh-task");
    contract
        .submit_label(&CallContext::bare(worker(1), 0), stale, Label::new(5))
        .await
        .unwrap();
    contract
        .submit_label(&CallContext::bare(worker(1), lifetime), fresh, Label::new(5))
        .await
        .unwrap();

    let expired = contract.expire_tasks(lifetime + 1).await;
    assert_eq!(expired, vec![stale]);

    let err = contract
        .submit_label(
            &CallContext::bare(worker(2), lifetime + 2),
            stale,
            Label::new(5),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LabelError::TaskExpired { .. }));

    // The younger task is untouched and still resolvable.
    contract
        .submit_label(
            &CallContext::bare(worker(2), lifetime + 3),
            fresh,
            Label::new(5),
        )
        .await
        .unwrap();
    let outcome = contract
        .submit_label(
            &CallContext::bare(worker(3), lifetime + 4),
            fresh,
            Label::new(5),
        )
        .await
        .unwrap();
    assert!(outcome.resolution.is_some());
}

#[tokio::test]
async fn test_replaying_the_call_sequence_reproduces_state() {
    let run = || async {
        let contract = LabelContract::new(ProtocolParams::default(), Arc::new(MemoryLedger::new()));
        let task = TaskHash::new(b"replay-task");
        fund(&contract, 3000, 1).await;

        contract
            .submit_label(&CallContext::bare(worker(1), 10), task, Label::new(5))
            .await
            .unwrap();
        // A duplicate slips in and is rejected; rejections must not
        // perturb state either.
        let _ = contract
            .submit_label(&CallContext::bare(worker(1), 11), task, Label::new(7))
            .await;
        contract
            .submit_label(&CallContext::bare(worker(2), 12), task, Label::new(5))
            .await
            .unwrap();
        contract
            .submit_label(&CallContext::bare(worker(3), 13), task, Label::new(5))
            .await
            .unwrap();
        contract
            .claim_payout(&CallContext::bare(worker(2), 20))
            .await
            .unwrap();
        contract.snapshot().await
    };

    let first = run().await;
    let second = run().await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_restored_snapshot_continues_where_it_left_off() {
    let (contract, _ledger) = new_contract();
    let task = TaskHash::new(b"suspended-task");
    fund(&contract, 5000, 1).await;

    contract
        .submit_label(&CallContext::bare(worker(1), 10), task, Label::new(5))
        .await
        .unwrap();
    contract
        .submit_label(&CallContext::bare(worker(2), 11), task, Label::new(5))
        .await
        .unwrap();
    let snapshot = contract.snapshot().await;

    // A fresh instance picks up the persisted state; the next vote is
    // the third and resolves the task.
    let restored = LabelContract::from_state(
        ProtocolParams::default(),
        snapshot,
        Arc::new(MemoryLedger::new()),
    );
    let outcome = restored
        .submit_label(&CallContext::bare(worker(3), 12), task, Label::new(5))
        .await
        .unwrap();
    assert!(outcome.resolution.is_some());
    assert_eq!(
        restored.pool_stats().await.committed,
        QuAmount::from_qu(3000)
    );
}

#[tokio::test]
async fn test_config_drives_contract_parameters() {
    let mut config = ContractConfig::default();
    config.consensus.quorum = 2;
    config.consensus.reward_per_worker = QuAmount::from_qu(500);

    let params: ProtocolParams = config.into();
    let contract = LabelContract::new(params, Arc::new(MemoryLedger::new()));
    let task = TaskHash::new(b"configured-task");
    fund(&contract, 1000, 1).await;

    contract
        .submit_label(&CallContext::bare(worker(1), 10), task, Label::new(5))
        .await
        .unwrap();
    let outcome = contract
        .submit_label(&CallContext::bare(worker(2), 11), task, Label::new(5))
        .await
        .unwrap();

    let resolution = outcome.resolution.expect("two votes suffice here");
    assert_eq!(resolution.reward_per_worker, QuAmount::from_qu(500));
    assert_eq!(resolution.total_paid, QuAmount::from_qu(1000));
}
