//! Chain verification against altered transaction histories

use chainsign_core::Transaction;
use chainsign_crypto::{verify_device_chain, AlgorithmSuite, SuiteParams, VerifyResult};
use chainsign_signing::{ListTransactionsRequest, SignTransactionRequest};

use crate::test_utils::*;

struct SignedChain {
    suite: AlgorithmSuite,
    device: chainsign_core::Device,
    transactions: Vec<Transaction>,
}

fn signed_chain(length: usize) -> SignedChain {
    let service = service_with_device("d1", "ECC");
    for i in 0..length {
        service
            .sign_transaction(SignTransactionRequest::new("d1", format!("payload-{}", i)))
            .unwrap();
    }

    let device = service.get_device("d1").unwrap().device;
    let transactions = service
        .list_transactions(ListTransactionsRequest {
            device_id: Some("d1".to_string()),
        })
        .unwrap()
        .transactions;
    let suite = AlgorithmSuite::for_algorithm(device.algorithm, SuiteParams::default());

    SignedChain {
        suite,
        device,
        transactions,
    }
}

fn error_type(result: &VerifyResult) -> (&str, usize) {
    match result {
        VerifyResult::Error {
            error_type, index, ..
        } => (error_type.as_str(), *index),
        VerifyResult::Ok { .. } => panic!("expected a verification error, got {}", result),
    }
}

#[test]
fn test_untouched_chain_verifies() {
    let chain = signed_chain(3);
    let result = verify_device_chain(&chain.suite, &chain.device, &chain.transactions);
    assert_eq!(result, VerifyResult::Ok { length: 3 });
}

#[test]
fn test_altered_payload_is_detected() {
    let mut chain = signed_chain(3);
    chain.transactions[1].data = "forged".to_string();

    let result = verify_device_chain(&chain.suite, &chain.device, &chain.transactions);
    assert_eq!(error_type(&result), ("invalid_signature", 1));
}

#[test]
fn test_broken_link_is_detected() {
    let mut chain = signed_chain(3);
    chain.transactions[2].previous_signature = chain.transactions[0].signature.clone();

    let result = verify_device_chain(&chain.suite, &chain.device, &chain.transactions);
    assert_eq!(error_type(&result), ("broken_link", 2));
}

#[test]
fn test_removed_transaction_is_detected() {
    let mut chain = signed_chain(3);
    chain.transactions.remove(1);

    let result = verify_device_chain(&chain.suite, &chain.device, &chain.transactions);
    assert_eq!(error_type(&result), ("counter_gap", 1));
}

#[test]
fn test_foreign_anchor_is_detected() {
    let mut chain = signed_chain(2);
    let other = signed_chain(1);
    chain.transactions[0].previous_signature = other.transactions[0].previous_signature.clone();

    let result = verify_device_chain(&chain.suite, &chain.device, &chain.transactions);
    assert_eq!(error_type(&result), ("invalid_anchor", 0));
}
