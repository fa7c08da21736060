//! Mapping of the logical pin roles onto the concrete HW.

pub mod driver;
