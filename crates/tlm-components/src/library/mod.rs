//! Built-in component library.

pub mod hydraulic;
pub mod mechanic;
mod probe;
pub mod signal;

use crate::registry::ComponentRegistry;

/// Register every built-in component type.
pub fn register_all(reg: &mut ComponentRegistry) {
    signal::register(reg);
    hydraulic::register(reg);
    mechanic::register(reg);
}
