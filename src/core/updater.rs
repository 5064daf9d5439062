//! Bidirectional link normalization and cascading elimination
//!
//! Plugins populate their items independently, so after a refresh the link
//! graph is usually one-sided: a child knows its parent but not vice versa,
//! and links may still point at items another plugin filtered out. The
//! [`ItemLinkUpdater`] runs once after all plugins have refreshed and brings
//! the graph to a consistent state:
//!
//! 1. links to eliminated items are dropped, and items left with no links
//!    at all are eliminated in turn, to a fixed point (the live set shrinks
//!    monotonically, so this terminates),
//! 2. every remaining link gets its complementary mirror on the target item.
//!
//! Elimination is decided on the links items arrived with: the cascade runs
//! before mirroring, so a dependent's mirror cannot keep an orphan alive.
//!
//! A link whose target is neither live nor eliminated is a fatal integrity
//! error: the update aborts and no partial state is trusted.

use std::collections::{HashMap, HashSet, VecDeque};

use thiserror::Error;
use tracing::info;

use crate::core::eliminated::EliminationCause;
use crate::core::item::ItemKind;
use crate::core::link::{ItemLink, LinkType};
use crate::core::plugin::DataSourcePlugin;

/// Reason string recorded on items eliminated by the cascade
const CASCADE_REASON: &str = "All items this item linked to were eliminated.";

/// Errors raised while normalizing item links
#[derive(Debug, Error)]
pub enum LinkError {
    /// A link points at an ID no plugin knows, live or eliminated
    #[error(
        "item {source_id} ({kind}) links to \"{target_id}\", which is neither a live nor an eliminated item"
    )]
    UnknownLinkTarget {
        source_id: String,
        kind: ItemKind,
        target_id: String,
    },
}

/// Shadow state for one live item during an update run
struct LiveEntry {
    plugin: usize,
    kind: ItemKind,
    links: Vec<ItemLink>,
}

/// Normalizes item links across all plugins
///
/// Holds no state between runs other than the IDs eliminated by the most
/// recent [`Self::update_all_item_links`] call.
#[derive(Default)]
pub struct ItemLinkUpdater {
    eliminated_item_ids: Vec<String>,
}

impl ItemLinkUpdater {
    /// Create an updater
    pub fn new() -> Self {
        Self::default()
    }

    /// IDs of items eliminated by the most recent update, in elimination
    /// order
    pub fn eliminated_item_ids(&self) -> &[String] {
        &self.eliminated_item_ids
    }

    /// Normalize links across every item of every plugin
    ///
    /// Drops links to eliminated items, cascades elimination of items whose
    /// links have all been dropped, then mirrors complementary links among
    /// the survivors. Fails without touching any plugin when a link targets
    /// an unknown ID.
    pub fn update_all_item_links(
        &mut self,
        plugins: &mut [Box<dyn DataSourcePlugin>],
    ) -> Result<(), LinkError> {
        self.eliminated_item_ids.clear();

        // Shadow index of the full item graph. Mutations are applied to the
        // shadow and to the owning plugin in step, so the shadow stays
        // authoritative for the whole run.
        let mut order: Vec<String> = Vec::new();
        let mut live: HashMap<String, LiveEntry> = HashMap::new();
        let mut eliminated: HashSet<String> = HashSet::new();

        for kind in ItemKind::ALL {
            for (plugin_idx, plugin) in plugins.iter().enumerate() {
                for item in plugin.items(kind) {
                    if live.contains_key(&item.id) {
                        continue;
                    }
                    order.push(item.id.clone());
                    live.insert(
                        item.id.clone(),
                        LiveEntry {
                            plugin: plugin_idx,
                            kind,
                            links: item.links().to_vec(),
                        },
                    );
                }
                for record in plugin.eliminated_items(kind) {
                    eliminated.insert(record.id().to_string());
                }
            }
        }

        // Integrity check up front: every link must resolve somewhere.
        // Aborting here means no plugin has been mutated yet.
        for id in &order {
            let entry = &live[id];
            for link in &entry.links {
                if !live.contains_key(&link.target_id) && !eliminated.contains(&link.target_id) {
                    return Err(LinkError::UnknownLinkTarget {
                        source_id: id.clone(),
                        kind: entry.kind,
                        target_id: link.target_id.clone(),
                    });
                }
            }
        }

        self.cascade_eliminations(plugins, &order, &mut live, &mut eliminated);
        self.mirror_links(plugins, &order, &mut live);
        Ok(())
    }

    /// Ensure every link between two live items has its complement on the
    /// target. Existing links are never retyped, and adds are deduplicated.
    fn mirror_links(
        &self,
        plugins: &mut [Box<dyn DataSourcePlugin>],
        order: &[String],
        live: &mut HashMap<String, LiveEntry>,
    ) {
        for source_id in order {
            let Some(entry) = live.get(source_id) else {
                continue; // eliminated by the cascade
            };
            let outgoing = entry.links.clone();
            for link in outgoing {
                let mirror_type = link.link_type.complement();
                let Some(target) = live.get_mut(&link.target_id) else {
                    continue;
                };
                let already = target
                    .links
                    .iter()
                    .any(|l| l.target_id == *source_id && l.link_type == mirror_type);
                if !already {
                    let mirror = ItemLink::new(source_id.clone(), mirror_type);
                    target.links.push(mirror.clone());
                    plugins[target.plugin].add_item_link(&link.target_id, mirror);
                }
            }
        }
    }

    /// Drop links to eliminated items and eliminate items that end up with
    /// no links, transitively, until nothing changes.
    fn cascade_eliminations(
        &mut self,
        plugins: &mut [Box<dyn DataSourcePlugin>],
        order: &[String],
        live: &mut HashMap<String, LiveEntry>,
        eliminated: &mut HashSet<String>,
    ) {
        // Reverse adjacency: target ID -> the live items linking at it.
        let mut incoming: HashMap<String, Vec<String>> = HashMap::new();
        for id in order {
            for link in &live[id].links {
                incoming
                    .entry(link.target_id.clone())
                    .or_default()
                    .push(id.clone());
            }
        }

        // Worklist of eliminated IDs whose incoming links still need
        // dropping. Seeding with the pre-existing eliminated set covers the
        // initial sweep; the loop extends it as the cascade progresses.
        let mut worklist: VecDeque<String> = eliminated.iter().cloned().collect();

        while let Some(gone_id) = worklist.pop_front() {
            let Some(sources) = incoming.remove(&gone_id) else {
                continue;
            };
            for source_id in sources {
                let Some(entry) = live.get_mut(&source_id) else {
                    continue; // already eliminated further up the cascade
                };
                let dropped: Vec<LinkType> = entry
                    .links
                    .iter()
                    .filter(|l| l.target_id == gone_id)
                    .map(|l| l.link_type)
                    .collect();
                if dropped.is_empty() {
                    continue;
                }
                entry.links.retain(|l| l.target_id != gone_id);
                let plugin_idx = entry.plugin;
                let now_empty = entry.links.is_empty();
                for link_type in dropped {
                    plugins[plugin_idx].remove_item_link(&source_id, &gone_id, link_type);
                }
                if now_empty {
                    info!(item = %source_id, "eliminating item: all linked items are gone");
                    plugins[plugin_idx].eliminate_item(
                        &source_id,
                        CASCADE_REASON,
                        EliminationCause::LinkedItemMissing,
                    );
                    live.remove(&source_id);
                    eliminated.insert(source_id.clone());
                    self.eliminated_item_ids.push(source_id.clone());
                    worklist.push_back(source_id);
                }
            }
        }
    }
}
