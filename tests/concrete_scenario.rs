mod common;

use common::{candidate, two_consumer_scenario};
use trophic_lib::model::search::enumerate;
use trophic_lib::model::validator::{validate, Validator};
use trophic_lib::model::ViolationKind;

#[test]
fn test_minimal_completion_is_enumerated_and_valid() {
    let scenario = two_consumer_scenario();
    let expected = candidate(&[("P", "C1", 1), ("P", "C2", 1)]);

    let found: Vec<_> = enumerate(&scenario, None).unwrap().collect();
    assert!(found.contains(&expected), "minimal completion missing");

    let report = Validator::new().report(&scenario, &expected);
    assert_valid!(report.result);
    let trace = report.trace.unwrap();
    assert!(trace.converged);
    assert_eq!(trace.converged_at_round, Some(1));
    assert_eq!(trace.final_energy("C1"), Some(1));
    assert_eq!(trace.final_energy("C2"), Some(1));
}

#[test]
fn test_dropping_an_edge_starves_its_target() {
    let scenario = two_consumer_scenario();
    let full = candidate(&[("P", "C1", 1), ("P", "C2", 1)]);
    let partial = full.without("P", "C2");
    assert_eq!(partial.len(), 1);

    let result = validate(&scenario, &partial);
    assert_violation!(result, ViolationKind::CapacityViolation, "C2", 1);
}

#[test]
fn test_violation_explains_itself() {
    let scenario = two_consumer_scenario();
    let result = validate(&scenario, &candidate(&[("P", "C1", 1)]));
    let message = result.violation.unwrap().to_string();
    assert!(message.contains("C2"), "message was: {message}");
}
