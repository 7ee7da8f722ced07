use super::*;

#[test]
fn json_output_round_trips_through_serde_json() {
    let value = serde_json::json!({ "job_id": "job-abc" });
    print_json(&value).expect("prints");
}
