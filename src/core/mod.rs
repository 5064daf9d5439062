//! Core module - item/link data model and link normalization

pub mod eliminated;
pub mod item;
pub mod link;
pub mod plugin;
pub mod updater;

pub use eliminated::{EliminatedItem, EliminationCause};
pub use item::{Item, ItemDetail, ItemKind, RequirementLevel};
pub use link::{ItemLink, LinkType};
pub use plugin::{DataSourcePlugin, DataSources, InMemorySource};
pub use updater::{ItemLinkUpdater, LinkError};
