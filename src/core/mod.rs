// Core algorithm exports
pub mod error;
pub mod executor;
pub mod orchestrator;
pub mod planner;
pub mod proximity;
pub mod selector;

pub use error::MatchError;
pub use executor::{final_status, ExecutionReport, MatchExecutor};
pub use orchestrator::MatchOrchestrator;
pub use planner::{AllocationPlan, AllocationPlanner, AllocationStep};
pub use proximity::proximity_score;
pub use selector::CandidateSelector;
