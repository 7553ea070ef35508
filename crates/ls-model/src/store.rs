//! `PartStore` — the engine's part table.
//!
//! Parts are appended and never removed during a run, so a `PartId` is the
//! index into the backing `Vec`.  Queues elsewhere hold ids only.

use std::ops::{Index, IndexMut};

use ls_core::{OrderId, PartId, SimTime};

use crate::{Part, PartKind, Routing};

/// Everything needed to create a part.
#[derive(Clone, Debug)]
pub struct NewPart {
    pub order:   OrderId,
    pub kind:    PartKind,
    pub code:    String,
    pub size:    String,
    pub routing: Routing,
    pub bom:     Vec<String>,
    pub created: SimTime,
    pub due:     Option<SimTime>,
}

#[derive(Default)]
pub struct PartStore {
    parts: Vec<Part>,
}

impl PartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a part in state `Created` and return its id.
    pub fn create(&mut self, spec: NewPart) -> PartId {
        let id = PartId(self.parts.len() as u32);
        self.parts.push(Part::new(id, spec));
        id
    }

    pub fn get(&self, id: PartId) -> Option<&Part> {
        self.parts.get(id.index())
    }

    pub fn get_mut(&mut self, id: PartId) -> Option<&mut Part> {
        self.parts.get_mut(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Parts still physically on the line: not finished, scrapped or
    /// consumed by assembly.
    pub fn active_count(&self) -> usize {
        self.parts.iter().filter(|p| !p.state().is_terminal()).count()
    }

    pub fn clear(&mut self) {
        self.parts.clear();
    }
}

impl Index<PartId> for PartStore {
    type Output = Part;

    fn index(&self, id: PartId) -> &Part {
        &self.parts[id.index()]
    }
}

impl IndexMut<PartId> for PartStore {
    fn index_mut(&mut self, id: PartId) -> &mut Part {
        &mut self.parts[id.index()]
    }
}
