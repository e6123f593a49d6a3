//! Pure projection of the view state into drawable primitives.
//!
//! Nothing here feeds back into layout or interaction: positions come from
//! the layout and the controller's live store, classes from node flags.

pub mod frame;
pub mod scene;
pub mod svg;

pub use frame::transition_frame;
pub use scene::{Annotation, Arrow, Badge, EdgePath, NodeGlyph, PlusSign, Scene, build_scene};
