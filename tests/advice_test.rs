mod common;

use std::sync::atomic::Ordering;

use anyhow::Result;
use common::{CannedProvider, GatedProvider, expense, income};
use domus::advice::{
    AdviceDesk, AdviceError, AdviceSlot, EMPTY_LEDGER_MESSAGE, FALLBACK_MESSAGE, NO_TIPS_MESSAGE,
    RequestOutcome, get_financial_advice,
};
use domus::application::LedgerStore;
use domus::domain::Category;
use domus::storage::MemoryStore;

async fn sample_store() -> Result<LedgerStore<MemoryStore>> {
    let mut store = LedgerStore::open(MemoryStore::new()).await;
    store
        .add(income("Salário", 500000, Category::Salary, "2024-01-01"))
        .await?;
    store
        .add(expense("Restaurante", 35000, Category::Leisure, "2024-01-03"))
        .await?;
    Ok(store)
}

#[tokio::test]
async fn test_empty_ledger_skips_provider() -> Result<()> {
    let provider = CannedProvider::ok("should not be used");

    let text = get_financial_advice(&provider, &[]).await;

    assert_eq!(text, EMPTY_LEDGER_MESSAGE);
    assert_eq!(provider.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_provider_text_returned_verbatim() -> Result<()> {
    let store = sample_store().await?;
    let provider = CannedProvider::ok("1. Cozinhe em casa.\n2. Reserve 10% do salário.");

    let text = get_financial_advice(&provider, store.transactions()).await;

    assert_eq!(text, "1. Cozinhe em casa.\n2. Reserve 10% do salário.");
    assert_eq!(provider.call_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_network_failure_falls_back() -> Result<()> {
    let store = sample_store().await?;
    let before = store.snapshot();
    let provider = CannedProvider::failing(AdviceError::Network("connection refused".into()));

    let text = get_financial_advice(&provider, store.transactions()).await;

    assert_eq!(text, FALLBACK_MESSAGE);
    assert_eq!(store.transactions(), before.as_slice());
    assert_eq!(store.summary().balance, 465000);
    Ok(())
}

#[tokio::test]
async fn test_missing_key_falls_back() -> Result<()> {
    let store = sample_store().await?;
    let provider = CannedProvider::failing(AdviceError::MissingKey);

    assert_eq!(
        get_financial_advice(&provider, store.transactions()).await,
        FALLBACK_MESSAGE
    );
    Ok(())
}

#[tokio::test]
async fn test_blank_answer_uses_no_tips_message() -> Result<()> {
    let store = sample_store().await?;
    let provider = CannedProvider::ok("  \n");

    assert_eq!(
        get_financial_advice(&provider, store.transactions()).await,
        NO_TIPS_MESSAGE
    );
    Ok(())
}

#[tokio::test]
async fn test_desk_answers_empty_ledger_inline() -> Result<()> {
    let provider = CannedProvider::ok("unused");
    let mut desk = AdviceDesk::new(provider.clone());

    assert_eq!(desk.request(Vec::new()), RequestOutcome::Answered);
    assert!(!desk.is_pending());
    assert_eq!(
        desk.slot(),
        AdviceSlot {
            advice: Some(EMPTY_LEDGER_MESSAGE.to_string()),
            loading: false,
        }
    );
    assert_eq!(provider.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_desk_publishes_result() -> Result<()> {
    let store = sample_store().await?;
    let mut desk = AdviceDesk::new(CannedProvider::ok("Gaste menos com lazer."));
    let mut updates = desk.subscribe();

    assert_eq!(desk.request(store.snapshot()), RequestOutcome::Started);
    let slot = desk.wait().await;

    assert_eq!(slot.advice.as_deref(), Some("Gaste menos com lazer."));
    assert!(!slot.loading);

    // Subscribers observe the same final value
    assert!(updates.has_changed()?);
    assert_eq!(*updates.borrow_and_update(), slot);
    Ok(())
}

#[tokio::test]
async fn test_desk_failure_is_non_fatal() -> Result<()> {
    let mut store = sample_store().await?;
    let mut desk = AdviceDesk::new(CannedProvider::failing(AdviceError::Api {
        status: 503,
        message: "overloaded".into(),
    }));

    desk.request(store.snapshot());
    let slot = desk.wait().await;
    assert_eq!(slot.advice.as_deref(), Some(FALLBACK_MESSAGE));

    // The ledger keeps working afterwards
    store
        .add(expense("Mercado", 1000, Category::Food, "2024-01-04"))
        .await?;
    assert_eq!(store.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_desk_ignores_trigger_while_pending() -> Result<()> {
    let store = sample_store().await?;
    let provider = GatedProvider::new();
    let mut desk = AdviceDesk::new(provider.clone());

    assert_eq!(desk.request(store.snapshot()), RequestOutcome::Started);
    assert!(desk.is_pending());
    assert!(desk.slot().loading);

    assert_eq!(desk.request(store.snapshot()), RequestOutcome::AlreadyPending);

    provider.release(1);
    let slot = desk.wait().await;

    assert_eq!(slot.advice.as_deref(), Some("answer 1"));
    assert!(!slot.loading);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn test_desk_later_result_overwrites_slot() -> Result<()> {
    let store = sample_store().await?;
    let provider = GatedProvider::new();
    let mut desk = AdviceDesk::new(provider.clone());

    provider.release(2);

    desk.request(store.snapshot());
    assert_eq!(desk.wait().await.advice.as_deref(), Some("answer 1"));

    desk.request(store.snapshot());
    assert_eq!(desk.wait().await.advice.as_deref(), Some("answer 2"));
    Ok(())
}

#[tokio::test]
async fn test_desk_cancel_keeps_previous_advice() -> Result<()> {
    let store = sample_store().await?;
    let provider = GatedProvider::new();
    let mut desk = AdviceDesk::new(provider.clone());

    provider.release(1);
    desk.request(store.snapshot());
    assert_eq!(desk.wait().await.advice.as_deref(), Some("answer 1"));

    // Second request blocks on the gate until cancelled
    assert_eq!(desk.request(store.snapshot()), RequestOutcome::Started);
    while provider.calls.load(Ordering::SeqCst) < 2 {
        tokio::task::yield_now().await;
    }
    desk.cancel();

    assert!(!desk.is_pending());
    assert_eq!(
        desk.slot(),
        AdviceSlot {
            advice: Some("answer 1".to_string()),
            loading: false,
        }
    );

    // A new request is accepted after cancelling
    provider.release(1);
    assert_eq!(desk.request(store.snapshot()), RequestOutcome::Started);
    assert_eq!(desk.wait().await.advice.as_deref(), Some("answer 3"));
    Ok(())
}
