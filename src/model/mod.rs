pub use trophic_data::{
    CandidateSolution, Energy, FeedingEdge, Role, RoundEnergies, Scenario, SimulationTrace,
    Species, ValidationResult, Violation, ViolationKind,
};
pub mod config {
    pub use trophic_core::config::*;
}
pub mod error {
    pub use trophic_core::error::*;
}
pub mod generator {
    pub use trophic_core::generator::*;
}
pub mod metrics {
    pub use trophic_core::metrics::*;
}
pub mod scoring {
    pub use trophic_core::scoring::*;
}
pub mod search {
    pub use trophic_core::search::*;
}
pub mod simulator {
    pub use trophic_core::simulator::*;
}
pub mod validator {
    pub use trophic_core::validator::*;
}
pub mod web {
    pub use trophic_core::web::*;
}
pub mod io {
    pub use trophic_io::*;
}
