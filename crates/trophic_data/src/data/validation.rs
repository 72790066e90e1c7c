use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Why a candidate fails. These are ordinary outcomes of validation, not errors.
pub enum ViolationKind {
    /// A node exceeds its in/out degree bound, or the edge set is not simple.
    DegreeViolation,
    /// An edge does not climb trophic levels.
    TrophicOrderViolation,
    /// A consumer's final intake lies outside its band.
    CapacityViolation,
    /// No fixed point before the round cap.
    Unstable,
}

impl ViolationKind {
    /// Structural violations are detected without running the simulator.
    #[must_use]
    pub fn is_structural(self) -> bool {
        matches!(self, Self::DegreeViolation | Self::TrophicOrderViolation)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub kind: ViolationKind,
    pub node_id: String,
    /// Round the violation was observed in; 0 for structural violations.
    pub round_index: usize,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            ViolationKind::DegreeViolation => {
                write!(f, "{} has too many feeding relationships", self.node_id)
            }
            ViolationKind::TrophicOrderViolation => write!(
                f,
                "{} feeds on a species at the same or a higher trophic level",
                self.node_id
            ),
            ViolationKind::CapacityViolation => write!(
                f,
                "{} cannot obtain a sustainable intake (round {})",
                self.node_id, self.round_index
            ),
            ViolationKind::Unstable => write!(
                f,
                "energy flow through {} never settles (gave up at round {})",
                self.node_id, self.round_index
            ),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub violation: Option<Violation>,
}

impl ValidationResult {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            valid: true,
            violation: None,
        }
    }

    pub fn fail(kind: ViolationKind, node_id: impl Into<String>, round_index: usize) -> Self {
        Self {
            valid: false,
            violation: Some(Violation {
                kind,
                node_id: node_id.into(),
                round_index,
            }),
        }
    }

    #[must_use]
    pub fn kind(&self) -> Option<ViolationKind> {
        self.violation.as_ref().map(|v| v.kind)
    }
}
