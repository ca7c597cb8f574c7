//! Store Command Wrappers
//!
//! Client-side bindings for the intents the list sends to the store.

mod item;

pub use item::*;
