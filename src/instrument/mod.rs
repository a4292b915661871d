pub mod color;
pub mod key;
pub mod registry;

pub use color::Color;
pub use key::{Key, KeyLayout, LayoutError};
pub use registry::{MAX_NOTE, Note, NoteRegistry};
