//! End-to-end chain scenarios through the signing service

use chainsign_core::{encode_base64, ErrorKind, SignatureAlgorithm};
use chainsign_crypto::{AlgorithmSuite, SuiteParams};
use chainsign_signing::{
    CreateDeviceRequest, ListDevicesRequest, ListTransactionsRequest, SignTransactionRequest,
};

use crate::test_utils::*;

fn run_two_transaction_scenario(algorithm: &str) {
    init_tracing();
    let service = service_with_device("d1", algorithm);

    let first = service
        .sign_transaction(SignTransactionRequest::new("d1", "hello"))
        .unwrap();
    let second = service
        .sign_transaction(SignTransactionRequest::new("d1", "world"))
        .unwrap();

    let device = service.get_device("d1").unwrap().device;
    assert_eq!(device.signature_counter, 2);

    let alg: SignatureAlgorithm = algorithm.parse().unwrap();
    let suite = AlgorithmSuite::for_algorithm(
        alg,
        SuiteParams {
            rsa_key_bits: TEST_RSA_KEY_BITS,
        },
    );

    // First transaction links to the anchor, the device id signed by the device key
    let (counter, data, anchor) = split_signed_data(&first.signed_data);
    assert_eq!((counter, data.as_str()), (0, "hello"));
    assert!(suite
        .verify(&device.public_key, b"d1", &decode_base64(&anchor))
        .unwrap());
    assert!(suite
        .verify(&device.public_key, b"hello", &decode_base64(&first.signature))
        .unwrap());

    // Second links to the first signature
    assert_eq!(second.signed_data, format!("1_world_{}", first.signature));
    assert!(suite
        .verify(&device.public_key, b"world", &decode_base64(&second.signature))
        .unwrap());

    let transactions = service
        .list_transactions(ListTransactionsRequest {
            device_id: Some("d1".to_string()),
        })
        .unwrap()
        .transactions;
    assert_eq!(transactions.len(), 2);
    assert_eq!(encode_base64(&transactions[1].signature), second.signature);

    assert!(service.verify_chain("d1").unwrap().is_ok());
}

#[test]
fn test_ecc_chain_scenario() {
    run_two_transaction_scenario("ECC");
}

#[test]
fn test_rsa_chain_scenario() {
    run_two_transaction_scenario("RSA");
}

#[test]
fn test_data_with_separator_is_signed_verbatim() {
    let service = service_with_device("d1", "ECC");
    let response = service
        .sign_transaction(SignTransactionRequest::new("d1", "a_b_c"))
        .unwrap();

    let (counter, data, _) = split_signed_data(&response.signed_data);
    assert_eq!(counter, 0);
    assert_eq!(data, "a_b_c");
}

#[test]
fn test_empty_payload_is_signed() {
    let service = service_with_device("d1", "ECC");
    let response = service
        .sign_transaction(SignTransactionRequest::new("d1", ""))
        .unwrap();

    assert!(response.signed_data.starts_with("0__"));
}

#[test]
fn test_devices_chain_independently() {
    let service = service_with_device("a", "ECC");
    service
        .create_device(CreateDeviceRequest::new("b", "RSA").with_label("backup"))
        .unwrap();

    for _ in 0..3 {
        service
            .sign_transaction(SignTransactionRequest::new("a", "x"))
            .unwrap();
    }
    let b_first = service
        .sign_transaction(SignTransactionRequest::new("b", "y"))
        .unwrap();
    assert!(b_first.signed_data.starts_with("0_y_"));

    assert_eq!(service.get_device("a").unwrap().device.signature_counter, 3);
    assert_eq!(service.get_device("b").unwrap().device.signature_counter, 1);
    assert!(service.verify_chain("a").unwrap().is_ok());
    assert!(service.verify_chain("b").unwrap().is_ok());

    let rsa_only = service
        .list_devices(ListDevicesRequest {
            algorithm: Some("RSA".to_string()),
            ..Default::default()
        })
        .unwrap()
        .devices;
    assert_eq!(rsa_only.len(), 1);
    assert_eq!(rsa_only[0].label.as_deref(), Some("backup"));
}

#[test]
fn test_rejections_do_not_mutate_state() {
    let service = service_with_device("d1", "ECC");

    let err = service
        .sign_transaction(SignTransactionRequest::new("ghost", "x"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = service
        .create_device(CreateDeviceRequest::new("d2", "DSA"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = service
        .create_device(CreateDeviceRequest::new("d1", "RSA"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    assert_eq!(service.registry().len(), 1);
    assert!(service.ledger().is_empty());
    assert_eq!(
        service.get_device("d1").unwrap().device.algorithm,
        SignatureAlgorithm::Ecc
    );
    assert_eq!(service.metrics().requests_rejected_total, 3);
}

#[test]
fn test_verify_unknown_device() {
    let service = test_service();
    let err = service.verify_chain("ghost").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
