pub mod client;
pub mod models;

pub use client::TrackerClient;
pub use models::TicketResult;
