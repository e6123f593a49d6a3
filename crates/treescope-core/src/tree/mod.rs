mod arena;
pub mod document;
pub mod error;
pub mod hierarchy;
pub mod ids;
pub mod path;
