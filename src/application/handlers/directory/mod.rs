//! Directory query handlers.

mod get_directory;

pub use get_directory::{DirectoryEntry, DirectoryView, GetDirectoryHandler, GetDirectoryQuery};
