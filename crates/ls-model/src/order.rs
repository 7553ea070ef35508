//! `OrderBook` — what the engine remembers about each order.
//!
//! Orders are not materialized as entities; their parts carry the
//! `OrderId`.  The book only keeps the descriptive fields reports need.

use ls_core::{OrderId, SimTime};

#[derive(Clone, Debug, PartialEq)]
pub struct OrderRecord {
    pub id:      OrderId,
    /// External order name.
    pub name:    String,
    /// The raw BOM string.
    pub bom:     String,
    pub size:    String,
    pub arrival: SimTime,
    pub due:     Option<SimTime>,
}

#[derive(Clone, Debug, Default)]
pub struct OrderBook {
    orders: Vec<OrderRecord>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an order; ids are assigned densely in insertion order.
    pub fn insert(
        &mut self,
        name: String,
        bom: String,
        size: String,
        arrival: SimTime,
        due: Option<SimTime>,
    ) -> OrderId {
        let id = OrderId(self.orders.len() as u32);
        self.orders.push(OrderRecord { id, name, bom, size, arrival, due });
        id
    }

    pub fn get(&self, id: OrderId) -> Option<&OrderRecord> {
        self.orders.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &OrderRecord> {
        self.orders.iter()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn clear(&mut self) {
        self.orders.clear();
    }
}
