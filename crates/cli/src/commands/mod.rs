//! Command handlers for the trendcast CLI.

pub mod collect;
pub mod poll;
pub mod search;
pub mod serve;

pub use collect::CollectCommand;
pub use poll::PollCommand;
pub use search::SearchCommand;
pub use serve::ServeCommand;
