pub mod engine;
pub mod sizing;
mod tidy;
