/// Asserts that a validation result passed.
#[macro_export]
macro_rules! assert_valid {
    ($result:expr) => {
        let result = &$result;
        assert!(
            result.valid,
            "Expected a valid candidate, got {:?}",
            result.violation
        );
    };
}

/// Asserts the kind and node of the first reported violation, and optionally its round.
#[macro_export]
macro_rules! assert_violation {
    ($result:expr, $kind:expr, $node:expr) => {
        let result = &$result;
        let violation = result
            .violation
            .as_ref()
            .expect("Expected a violation but the candidate was valid");
        assert_eq!(violation.kind, $kind, "Violation kind mismatch: {}", violation);
        assert_eq!(violation.node_id, $node, "Violation node mismatch: {}", violation);
    };
    ($result:expr, $kind:expr, $node:expr, $round:expr) => {
        $crate::assert_violation!($result, $kind, $node);
        assert_eq!(
            $result.violation.as_ref().map(|v| v.round_index),
            Some($round),
            "Violation round mismatch"
        );
    };
}
