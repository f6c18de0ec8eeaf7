pub mod client;
pub mod toggler;

pub use client::{HttpToggleClient, Polarity, ToggleClient, ToggleError, ToggleResponse};
pub use toggler::LikeToggler;
