//! Kit matching and post-assembly routing.

use ls_core::{BufferId, PartId};
use ls_model::{Part, PartKind, PartStore, Routing, routing_key};
use ls_config::Line;

use crate::state::BufferState;

/// A parent and the children that complete its BOM, with where each waits.
#[derive(Clone, Debug, PartialEq)]
pub struct Kit {
    pub parent:   (PartId, BufferId),
    pub children: Vec<(PartId, BufferId)>,
}

/// Scan `inputs` in order for the first parent whose missing children are
/// all present in some input buffer.  Children must belong to the parent's
/// order and match by code; each child is claimed once.
pub fn find_kit(inputs: &[BufferId], buffers: &[BufferState], parts: &PartStore) -> Option<Kit> {
    for &pb in inputs {
        for &candidate in &buffers[pb.index()].queue {
            let parent = &parts[candidate];
            if !is_parent(parent) {
                continue;
            }
            if let Some(children) = claim_children(parent, inputs, buffers, parts) {
                return Some(Kit { parent: (candidate, pb), children });
            }
        }
    }
    None
}

fn is_parent(part: &Part) -> bool {
    part.kind == PartKind::Parent || !part.bom.is_empty()
}

fn claim_children(
    parent: &Part,
    inputs: &[BufferId],
    buffers: &[BufferState],
    parts: &PartStore,
) -> Option<Vec<(PartId, BufferId)>> {
    let mut claimed: Vec<(PartId, BufferId)> = Vec::new();
    for code in parent.missing_children() {
        let found = inputs.iter().find_map(|&b| {
            buffers[b.index()]
                .queue
                .iter()
                .find(|&&id| {
                    let p = &parts[id];
                    id != parent.id
                        && p.order == parent.order
                        && p.code == code
                        && !claimed.iter().any(|&(c, _)| c == id)
                })
                .map(|&id| (id, b))
        })?;
        claimed.push(found);
    }
    Some(claimed)
}

/// The routing an assembled parent follows from here on.
///
/// Walks `sequence`, appending the phase-1 operations of the parent (when
/// its code appears) and of each attached child whose code appears.  With no
/// sequence configured, the parent comes first and children follow in
/// attach order.  Missing routings contribute nothing.
pub fn assembled_routing(parent: &Part, sequence: &[String], line: &Line) -> Routing {
    let phase1 = |kind: PartKind, code: &str| {
        line.routing(&routing_key(kind, &parent.size, code, 1)).map(|r| r.iter().cloned())
    };

    let mut ops = Vec::new();
    if sequence.is_empty() {
        ops.extend(phase1(parent.kind, &parent.code).into_iter().flatten());
        for child in &parent.attached {
            ops.extend(phase1(PartKind::Child, &child.code).into_iter().flatten());
        }
    } else {
        for code in sequence {
            if *code == parent.code {
                ops.extend(phase1(parent.kind, code).into_iter().flatten());
            } else if parent.attached.iter().any(|c| c.code == *code) {
                ops.extend(phase1(PartKind::Child, code).into_iter().flatten());
            }
        }
    }
    ops.into()
}
