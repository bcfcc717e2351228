pub mod feed;
pub mod progress;
