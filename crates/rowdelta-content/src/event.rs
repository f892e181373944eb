use std::collections::BTreeMap;

use rowdelta_diff::IndexMap;
use rowdelta_types::ComparableSection;

use crate::content::ContentStream;

/// One step of a delivered diff cycle.
///
/// A cycle is always delivered in this order: `Start`, then for every
/// paired section in ascending old-section order an `ItemUpdate` followed by
/// its `ItemReorder`, then `SectionUpdate`, `SectionReorder` and finally
/// `Completion`. Updates are applied to content before anything moves.
#[derive(Clone, Debug)]
pub enum ContentEvent<S: ComparableSection> {
    /// A cycle is about to be delivered.
    Start,
    /// Apply deletions, insertions and reloads to one section's items.
    ItemUpdate {
        /// Matched items in old order with their new content.
        items: Vec<S::Item>,
        /// Section index in the OLD section order.
        section: usize,
        insertions: Vec<usize>,
        reloads: IndexMap,
        deletions: Vec<usize>,
    },
    /// Move one section's items into their final order.
    ItemReorder {
        /// The section's items in new order.
        items: Vec<S::Item>,
        section: usize,
        moves: IndexMap,
    },
    /// Apply deletions, insertions and reloads to the section list.
    SectionUpdate {
        sections: Vec<S>,
        insertions: Vec<usize>,
        reloads: IndexMap,
        deletions: Vec<usize>,
    },
    /// Move sections into their final order.
    SectionReorder { sections: Vec<S>, moves: IndexMap },
    /// The cycle has been fully delivered.
    Completion,
}

/// Classification of content events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContentEventKind {
    Start,
    ItemUpdate,
    ItemReorder,
    SectionUpdate,
    SectionReorder,
    Completion,
}

impl std::fmt::Display for ContentEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Start => "Start",
            Self::ItemUpdate => "ItemUpdate",
            Self::ItemReorder => "ItemReorder",
            Self::SectionUpdate => "SectionUpdate",
            Self::SectionReorder => "SectionReorder",
            Self::Completion => "Completion",
        };
        write!(f, "{s}")
    }
}

impl<S: ComparableSection> ContentEvent<S> {
    pub fn kind(&self) -> ContentEventKind {
        match self {
            Self::Start => ContentEventKind::Start,
            Self::ItemUpdate { .. } => ContentEventKind::ItemUpdate,
            Self::ItemReorder { .. } => ContentEventKind::ItemReorder,
            Self::SectionUpdate { .. } => ContentEventKind::SectionUpdate,
            Self::SectionReorder { .. } => ContentEventKind::SectionReorder,
            Self::Completion => ContentEventKind::Completion,
        }
    }

    /// Returns `true` for the last event of a cycle.
    pub fn is_completion(&self) -> bool {
        matches!(self, Self::Completion)
    }
}

pub type StartHandler = Box<dyn FnMut() + Send>;
pub type ItemUpdateHandler<T> =
    Box<dyn FnMut(&[T], usize, &[usize], &BTreeMap<usize, usize>, &[usize]) + Send>;
pub type ItemReorderHandler<T> = Box<dyn FnMut(&[T], usize, &BTreeMap<usize, usize>) + Send>;
pub type SectionUpdateHandler<S> =
    Box<dyn FnMut(&[S], &[usize], &BTreeMap<usize, usize>, &[usize]) + Send>;
pub type SectionReorderHandler<S> = Box<dyn FnMut(&[S], &BTreeMap<usize, usize>) + Send>;
pub type CompletionHandler = Box<dyn FnMut() + Send>;

/// Callback adapter over a [`ContentStream`].
///
/// Each handler is optional; events without a handler are ignored.
pub struct ContentHandlers<S: ComparableSection> {
    start: Option<StartHandler>,
    item_update: Option<ItemUpdateHandler<S::Item>>,
    item_reorder: Option<ItemReorderHandler<S::Item>>,
    section_update: Option<SectionUpdateHandler<S>>,
    section_reorder: Option<SectionReorderHandler<S>>,
    completion: Option<CompletionHandler>,
}

impl<S: ComparableSection> Default for ContentHandlers<S> {
    fn default() -> Self {
        Self {
            start: None,
            item_update: None,
            item_reorder: None,
            section_update: None,
            section_reorder: None,
            completion: None,
        }
    }
}

impl<S: ComparableSection> ContentHandlers<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_start(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.start = Some(Box::new(f));
        self
    }

    pub fn on_item_update(
        mut self,
        f: impl FnMut(&[S::Item], usize, &[usize], &BTreeMap<usize, usize>, &[usize]) + Send + 'static,
    ) -> Self {
        self.item_update = Some(Box::new(f));
        self
    }

    pub fn on_item_reorder(
        mut self,
        f: impl FnMut(&[S::Item], usize, &BTreeMap<usize, usize>) + Send + 'static,
    ) -> Self {
        self.item_reorder = Some(Box::new(f));
        self
    }

    pub fn on_section_update(
        mut self,
        f: impl FnMut(&[S], &[usize], &BTreeMap<usize, usize>, &[usize]) + Send + 'static,
    ) -> Self {
        self.section_update = Some(Box::new(f));
        self
    }

    pub fn on_section_reorder(
        mut self,
        f: impl FnMut(&[S], &BTreeMap<usize, usize>) + Send + 'static,
    ) -> Self {
        self.section_reorder = Some(Box::new(f));
        self
    }

    pub fn on_completion(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.completion = Some(Box::new(f));
        self
    }

    /// Invoke the handler registered for `event`, if any.
    pub fn handle(&mut self, event: &ContentEvent<S>) {
        match event {
            ContentEvent::Start => {
                if let Some(f) = self.start.as_mut() {
                    f();
                }
            }
            ContentEvent::ItemUpdate {
                items,
                section,
                insertions,
                reloads,
                deletions,
            } => {
                if let Some(f) = self.item_update.as_mut() {
                    f(items, *section, insertions, reloads, deletions);
                }
            }
            ContentEvent::ItemReorder {
                items,
                section,
                moves,
            } => {
                if let Some(f) = self.item_reorder.as_mut() {
                    f(items, *section, moves);
                }
            }
            ContentEvent::SectionUpdate {
                sections,
                insertions,
                reloads,
                deletions,
            } => {
                if let Some(f) = self.section_update.as_mut() {
                    f(sections, insertions, reloads, deletions);
                }
            }
            ContentEvent::SectionReorder { sections, moves } => {
                if let Some(f) = self.section_reorder.as_mut() {
                    f(sections, moves);
                }
            }
            ContentEvent::Completion => {
                if let Some(f) = self.completion.as_mut() {
                    f();
                }
            }
        }
    }

    /// Dispatch every event of `events` until the stream closes.
    pub async fn drive(mut self, mut events: ContentStream<S>) {
        while let Some(event) = events.recv().await {
            self.handle(&event);
        }
    }
}
