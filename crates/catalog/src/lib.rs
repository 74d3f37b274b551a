//! `devmart-catalog` — catalog items (projects) and their stored files.
//!
//! Projects are owned by the record store; this crate is the typed edge over
//! that generic table API: record shapes, admin CRUD, featured listing, and
//! the aggregate download counter.

pub mod file;
pub mod project;
pub mod repository;

pub use file::ProjectFile;
pub use project::{Difficulty, Project, ProjectDraft, ProjectUpdate};
pub use repository::ProjectRepository;
