//! Data source plugin boundary
//!
//! Plugins own their item collections; the engine reads them through
//! [`DataSourcePlugin`] and requests mutations (link fixes, eliminations)
//! through the same trait instead of reaching into foreign state.

use std::collections::HashMap;

use crate::core::eliminated::{EliminatedItem, EliminationCause};
use crate::core::item::{Item, ItemKind};
use crate::core::link::{ItemLink, LinkType};

/// Capability surface every data source plugin exposes to the engine
pub trait DataSourcePlugin {
    /// Plugin name, used in diagnostics
    fn name(&self) -> &str;

    /// Live items of the given kind, in the plugin's stable order
    fn items(&self, kind: ItemKind) -> &[Item];

    /// Eliminated items of the given kind
    fn eliminated_items(&self, kind: ItemKind) -> &[EliminatedItem];

    /// Add an outgoing link to the identified live item. Returns false when
    /// the item is unknown to this plugin.
    fn add_item_link(&mut self, item_id: &str, link: ItemLink) -> bool;

    /// Remove the `(target_id, link_type)` link from the identified live
    /// item. Returns false when the item or link is unknown.
    fn remove_item_link(&mut self, item_id: &str, target_id: &str, link_type: LinkType) -> bool;

    /// Move the identified live item to the eliminated set, recording why
    fn eliminate_item(&mut self, item_id: &str, reason: &str, cause: EliminationCause);
}

/// Read-only aggregation over a set of plugins
///
/// Lookup convenience for the analysis phase, which never mutates.
pub struct DataSources<'a> {
    plugins: &'a [Box<dyn DataSourcePlugin>],
}

impl<'a> DataSources<'a> {
    /// Wrap a plugin slice
    pub fn new(plugins: &'a [Box<dyn DataSourcePlugin>]) -> Self {
        Self { plugins }
    }

    /// All live items of a kind, across plugins, in plugin order
    pub fn items_of_kind(&self, kind: ItemKind) -> Vec<&'a Item> {
        self.plugins
            .iter()
            .flat_map(|p| p.items(kind).iter())
            .collect()
    }

    /// Find a live item by ID across all plugins and kinds
    pub fn item(&self, id: &str) -> Option<&'a Item> {
        for kind in ItemKind::ALL {
            for plugin in self.plugins {
                if let Some(item) = plugin.items(kind).iter().find(|i| i.id == id) {
                    return Some(item);
                }
            }
        }
        None
    }

    /// Find an eliminated item by ID across all plugins and kinds
    pub fn eliminated_item(&self, id: &str) -> Option<&'a EliminatedItem> {
        for kind in ItemKind::ALL {
            for plugin in self.plugins {
                if let Some(item) = plugin.eliminated_items(kind).iter().find(|e| e.id() == id) {
                    return Some(item);
                }
            }
        }
        None
    }
}

/// A plugin backed by in-memory item lists
///
/// Reference implementation of [`DataSourcePlugin`]; file-import plugins and
/// the test suite assemble their items through it.
#[derive(Default)]
pub struct InMemorySource {
    name: String,
    items: HashMap<ItemKind, Vec<Item>>,
    eliminated: HashMap<ItemKind, Vec<EliminatedItem>>,
}

impl InMemorySource {
    /// Create an empty source with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: HashMap::new(),
            eliminated: HashMap::new(),
        }
    }

    /// Add a live item, bucketed by its kind
    pub fn add_item(&mut self, item: Item) {
        self.items.entry(item.kind()).or_default().push(item);
    }

    /// Add a pre-eliminated item, bucketed by its kind
    pub fn add_eliminated(&mut self, eliminated: EliminatedItem) {
        self.eliminated
            .entry(eliminated.item.kind())
            .or_default()
            .push(eliminated);
    }

    /// Builder-style [`Self::add_item`]
    pub fn with_item(mut self, item: Item) -> Self {
        self.add_item(item);
        self
    }

    fn find_item_mut(&mut self, item_id: &str) -> Option<&mut Item> {
        self.items
            .values_mut()
            .flat_map(|v| v.iter_mut())
            .find(|i| i.id == item_id)
    }
}

impl DataSourcePlugin for InMemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn items(&self, kind: ItemKind) -> &[Item] {
        self.items.get(&kind).map_or(&[], Vec::as_slice)
    }

    fn eliminated_items(&self, kind: ItemKind) -> &[EliminatedItem] {
        self.eliminated.get(&kind).map_or(&[], Vec::as_slice)
    }

    fn add_item_link(&mut self, item_id: &str, link: ItemLink) -> bool {
        match self.find_item_mut(item_id) {
            Some(item) => {
                item.add_link(link);
                true
            }
            None => false,
        }
    }

    fn remove_item_link(&mut self, item_id: &str, target_id: &str, link_type: LinkType) -> bool {
        match self.find_item_mut(item_id) {
            Some(item) => item.remove_link(target_id, link_type),
            None => false,
        }
    }

    fn eliminate_item(&mut self, item_id: &str, reason: &str, cause: EliminationCause) {
        for items in self.items.values_mut() {
            if let Some(pos) = items.iter().position(|i| i.id == item_id) {
                let item = items.remove(pos);
                let record = EliminatedItem::new(item, reason, cause);
                self.eliminated
                    .entry(record.item.kind())
                    .or_default()
                    .push(record);
                return;
            }
        }
    }
}
