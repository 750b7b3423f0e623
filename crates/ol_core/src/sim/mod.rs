//! Day-advancement orchestration: the controller loop, the day simulator,
//! the forced-outcome search, and the day-result processor.

pub mod controller;
pub mod day;
pub mod lock;
pub mod outcome;
pub mod results;

pub use controller::{AdvanceController, AdvanceOptions};
pub use day::DayGames;
pub use lock::RunLock;
pub use outcome::{NUM_TRIES, START_CHANGING_HOME_ADVANTAGE};
pub use results::DayReport;
