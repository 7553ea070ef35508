//! Order-string (BOM) parsing.
//!
//! An order string is a dash-delimited list of sections:
//!
//! ```text
//! M1-LR-M2-M3-P
//! └┬┘ └┬┘ └┬┘ └┬┘ └── children of M3: "P"
//!  │   │   │   └───── parent M3
//!  │   │   └───────── parent M2 (no children)
//!  │   └───────────── children of M1: "L", "R"
//!  └───────────────── parent M1
//! ```
//!
//! Segments starting with `M` are parents.  A segment directly after a
//! parent that does not start with `M` lists that parent's child codes, one
//! character each.

use crate::{BomError, BomResult};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BomParent {
    pub code:     String,
    pub children: Vec<String>,
}

pub fn parse_order_string(input: &str) -> BomResult<Vec<BomParent>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(BomError::Empty);
    }

    let mut parents: Vec<BomParent> = Vec::new();
    // True while the last parent may still take a child segment.
    let mut open = false;

    for (index, raw) in trimmed.split('-').enumerate() {
        let segment = raw.trim();
        if segment.is_empty() {
            return Err(BomError::EmptySegment { input: input.to_string(), index });
        }
        if !segment.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(BomError::InvalidCharacter {
                input:   input.to_string(),
                segment: segment.to_string(),
            });
        }

        if segment.starts_with('M') {
            parents.push(BomParent { code: segment.to_string(), children: Vec::new() });
            open = true;
            continue;
        }

        match parents.last_mut() {
            Some(parent) if open => {
                parent.children = segment.chars().map(String::from).collect();
                open = false;
            }
            _ => {
                return Err(BomError::OrphanChildren {
                    input:   input.to_string(),
                    segment: segment.to_string(),
                });
            }
        }
    }
    Ok(parents)
}
