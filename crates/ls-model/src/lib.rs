//! `ls-model` — the domain objects the engine moves around.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                    |
//! |--------------|-------------------------------------------------------------|
//! | [`part`]     | `Part`, `PartKind`, `PartState`, `StateDurations`           |
//! | [`store`]    | `PartStore` (the engine's part table), `NewPart`            |
//! | [`bom`]      | `parse_order_string`, `BomParent`                           |
//! | [`order`]    | `OrderBook`, `OrderRecord`                                  |
//! | [`routing`]  | `Operation`, `Routing`, `routing_key`                       |
//! | [`resource`] | `ResourcePool`, `PoolKind`, `RequestOutcome`                |
//! | [`error`]    | `BomError`, `ResourceError`                                 |
//!
//! Nothing here schedules events or knows about stations.  The engine in
//! `ls-sim` owns one `PartStore`, one `OrderBook` and a `ResourcePool` per
//! configured pool, and drives them.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to the plain data types.    |

pub mod bom;
pub mod error;
pub mod order;
pub mod part;
pub mod resource;
pub mod routing;
pub mod store;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use bom::{BomParent, parse_order_string};
pub use error::{BomError, BomResult, ResourceError, ResourceResult};
pub use order::{OrderBook, OrderRecord};
pub use part::{AttachedChild, Part, PartKind, PartState, StateDurations};
pub use resource::{PoolKind, RequestOutcome, ResourcePool};
pub use routing::{DEFAULT_OPERATION_HOURS, Operation, Routing, routing_key};
pub use store::{NewPart, PartStore};
