//! Fetch errors

use tally_ports::ExchangeError;
use thiserror::Error;

/// Every failure from one concurrent fetch, in call order
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{} exchange call(s) failed: {}", .errors.len(), join_errors(.errors))]
pub struct FetchError {
    pub errors: Vec<ExchangeError>,
}

impl FetchError {
    pub fn new(errors: Vec<ExchangeError>) -> Self {
        Self { errors }
    }

    pub fn errors(&self) -> &[ExchangeError] {
        &self.errors
    }
}

impl From<ExchangeError> for FetchError {
    fn from(err: ExchangeError) -> Self {
        Self { errors: vec![err] }
    }
}

fn join_errors(errors: &[ExchangeError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
