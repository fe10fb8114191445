//! Error type for the command line front end.

use tlm_model::ModelError;
use tlm_results::ResultsError;
use tlm_system::SystemError;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Simulation error: {0}")]
    System(#[from] SystemError),

    #[error("Results error: {0}")]
    Results(#[from] ResultsError),

    #[error("Simulation was stopped at t={time}: {reason}")]
    Stopped { time: f64, reason: String },
}
