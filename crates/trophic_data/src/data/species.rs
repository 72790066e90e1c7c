use serde::{Deserialize, Serialize};

/// Abstract energy unit. Integral so that round-to-round comparisons are exact.
pub type Energy = u64;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
/// Ecological role of a species. Role-dependent behaviour is a single match in the simulator.
pub enum Role {
    /// Unlimited supply; emits every outgoing edge's capacity each round.
    Producer,
    /// Receives energy from lower trophic levels and may forward it upward.
    Consumer,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
/// A species node of the feeding network.
pub struct Species {
    /// Unique within a scenario.
    pub id: String,
    pub role: Role,
    /// Producers sit at level 0; every feeding edge strictly climbs levels.
    pub trophic_level: u32,
    /// Lower bound of the sustainable intake band (ignored for producers).
    pub min_intake: Energy,
    /// Upper bound of the sustainable intake band (ignored for producers).
    pub max_intake: Energy,
    pub max_out_degree: u32,
    pub max_in_degree: u32,
}

impl Species {
    /// A producer at trophic level 0. Producers never receive edges.
    pub fn producer(id: impl Into<String>, max_out_degree: u32) -> Self {
        Self {
            id: id.into(),
            role: Role::Producer,
            trophic_level: 0,
            min_intake: 0,
            max_intake: 0,
            max_out_degree,
            max_in_degree: 0,
        }
    }

    /// A consumer with the given level, intake band and degree bounds.
    pub fn consumer(
        id: impl Into<String>,
        trophic_level: u32,
        intake: (Energy, Energy),
        max_out_degree: u32,
        max_in_degree: u32,
    ) -> Self {
        Self {
            id: id.into(),
            role: Role::Consumer,
            trophic_level,
            min_intake: intake.0,
            max_intake: intake.1,
            max_out_degree,
            max_in_degree,
        }
    }

    #[must_use]
    pub fn is_producer(&self) -> bool {
        self.role == Role::Producer
    }

    /// Minimum number of incoming edges this species needs to have any chance
    /// of reaching its intake band.
    #[must_use]
    pub fn min_in_degree(&self) -> u32 {
        match self.role {
            Role::Producer => 0,
            Role::Consumer if self.min_intake > 0 => 1,
            Role::Consumer => 0,
        }
    }

    /// Whether `energy` lies inside the sustainable band. Producers are always sustained.
    #[must_use]
    pub fn is_sustained_by(&self, energy: Energy) -> bool {
        match self.role {
            Role::Producer => true,
            Role::Consumer => (self.min_intake..=self.max_intake).contains(&energy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_producer_defaults() {
        let p = Species::producer("P", 2);
        assert!(p.is_producer());
        assert_eq!(p.trophic_level, 0);
        assert_eq!(p.min_in_degree(), 0);
        assert!(p.is_sustained_by(0));
    }

    #[test]
    fn test_consumer_band() {
        let c = Species::consumer("C1", 1, (1, 3), 0, 1);
        assert_eq!(c.min_in_degree(), 1);
        assert!(!c.is_sustained_by(0));
        assert!(c.is_sustained_by(1));
        assert!(c.is_sustained_by(3));
        assert!(!c.is_sustained_by(4));
    }

    #[test]
    fn test_wire_field_names() {
        let c = Species::consumer("C1", 1, (1, 3), 0, 1);
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains("\"trophicLevel\":1"));
        assert!(json.contains("\"maxInDegree\":1"));
        assert!(json.contains("\"role\":\"consumer\""));
    }
}
