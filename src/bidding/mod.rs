pub mod model;
pub mod validator;

pub use model::BidFormReading;
pub use validator::{validate_bid, BidFormGuard, BidVerdict, SubmitOutcome};
