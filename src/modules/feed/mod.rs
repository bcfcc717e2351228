pub mod activity;
pub mod aggregator;
pub mod handlers;
pub mod routes;
pub mod sources;

pub use routes::feed_routes;
