mod builder;
mod cache;
mod error;
mod io;
mod schema;

pub use builder::TreeBuilder;
pub use cache::{LAST_TREE_KEY, TreeCache};
pub use error::DocumentError;
pub use io::{
    load_growth_steps, load_tree, parse_growth_steps, parse_tree_str, parse_tree_value, save_tree,
};
pub use schema::{validate_tree, validate_tree_at};
