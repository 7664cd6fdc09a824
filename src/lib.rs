#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub(crate) mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, load_config};
pub use ir::{InputNode, NoteTreeError, parse_note_tree};
pub use layout::{LayoutError, MindMapLayout, MindMapSession, compute_mindmap_layout};
pub use theme::{Theme, ThemeId};
