use super::*;

#[test]
fn invoke_is_deterministic_for_the_same_inputs() {
    let a = invoke(b"model-bytes", b"input-bytes");
    let b = invoke(b"model-bytes", b"input-bytes");
    assert_eq!(a, b);
}

#[test]
fn invoke_differs_when_the_model_changes() {
    let a = invoke(b"model-a", b"input-bytes");
    let b = invoke(b"model-b", b"input-bytes");
    assert_ne!(a, b);
}

#[test]
fn worker_request_round_trips_through_json() {
    let request = WorkerRequest {
        model_id: "m1".into(),
        model_path: PathBuf::from("/tmp/m1.bin"),
        input_bytes: vec![1, 2, 3],
    };
    let bytes = serde_json::to_vec(&request).expect("encode");
    let decoded: WorkerRequest = serde_json::from_slice(&bytes).expect("decode");
    assert_eq!(decoded.model_id, request.model_id);
    assert_eq!(decoded.input_bytes, request.input_bytes);
}
