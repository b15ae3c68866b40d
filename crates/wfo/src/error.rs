use core_types::ResultShape;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum WfoError {
    #[error("A walk-forward summary needs a walk-forward result set, got a {0} set.")]
    NotWalkForward(ResultShape),
}
