pub mod filters;
pub mod flags;
pub mod state;
