//! Concurrency tests: counters stay gapless and creation has a single winner

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use chainsign_core::ErrorKind;
use chainsign_signing::{CreateDeviceRequest, ListTransactionsRequest, SignTransactionRequest};

use crate::test_utils::*;

const SIGNERS: usize = 8;
const SIGNS_PER_SIGNER: usize = 10;

#[test]
fn test_concurrent_signs_on_one_device_are_gapless() {
    init_tracing();
    let service = service_with_device("d1", "ECC");

    let handles: Vec<_> = (0..SIGNERS)
        .map(|worker| {
            let service = service.clone();
            thread::spawn(move || {
                (0..SIGNS_PER_SIGNER)
                    .map(|i| {
                        let data = format!("w{}-{}", worker, i);
                        service
                            .sign_transaction(SignTransactionRequest::new("d1", data))
                            .unwrap()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let responses: Vec<_> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    let total = SIGNERS * SIGNS_PER_SIGNER;

    let mut counters: Vec<u64> = responses
        .iter()
        .map(|r| split_signed_data(&r.signed_data).0)
        .collect();
    counters.sort_unstable();
    assert_eq!(counters, (0..total as u64).collect::<Vec<_>>());

    let device = service.get_device("d1").unwrap().device;
    assert_eq!(device.signature_counter, total as u64);
    assert_eq!(service.ledger().len(), total);

    // Every previous signature is used exactly once
    let transactions = service
        .list_transactions(ListTransactionsRequest {
            device_id: Some("d1".to_string()),
        })
        .unwrap()
        .transactions;
    let links: HashSet<_> = transactions
        .iter()
        .map(|tx| tx.previous_signature.clone())
        .collect();
    assert_eq!(links.len(), total);

    assert!(service.verify_chain("d1").unwrap().is_ok());
}

#[test]
fn test_concurrent_signs_on_different_devices() {
    let service = test_service();
    for id in ["a", "b", "c", "d"] {
        service
            .create_device(CreateDeviceRequest::new(id, "ECC"))
            .unwrap();
    }

    let handles: Vec<_> = ["a", "b", "c", "d"]
        .into_iter()
        .map(|id| {
            let service = service.clone();
            thread::spawn(move || {
                for i in 0..5 {
                    service
                        .sign_transaction(SignTransactionRequest::new(id, i.to_string()))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for id in ["a", "b", "c", "d"] {
        assert_eq!(service.get_device(id).unwrap().device.signature_counter, 5);
        assert!(service.verify_chain(id).unwrap().is_ok());
    }
    assert_eq!(service.ledger().len(), 20);
}

#[test]
fn test_concurrent_create_has_single_winner() {
    let service = Arc::new(test_service());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            thread::spawn(move || service.create_device(CreateDeviceRequest::new("shared", "ECC")))
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|err| err.kind() == ErrorKind::Conflict));
    assert_eq!(service.registry().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_signs_from_async_tasks() {
    init_tracing();
    let service = service_with_device("rsa-1", "RSA");

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..12 {
        let service = service.clone();
        tasks.spawn_blocking(move || {
            service.sign_transaction(SignTransactionRequest::new("rsa-1", format!("tx-{}", i)))
        });
    }

    let mut counters = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let response = joined.unwrap().unwrap();
        counters.push(split_signed_data(&response.signed_data).0);
    }
    counters.sort_unstable();

    assert_eq!(counters, (0..12).collect::<Vec<u64>>());
    assert!(service.verify_chain("rsa-1").unwrap().is_ok());
}
