pub mod bidding;
pub mod config;
pub mod countdown;
pub mod dom;
pub mod flash;
pub mod format;
pub mod likes;
pub mod page;
pub mod search;
pub mod timer;
