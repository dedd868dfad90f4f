//! Widget-tree reasoning for mirrored Android device testing.
//!
//! A device's on-screen hierarchy is dumped, parsed into an immutable
//! [`Snapshot`](tree::snapshot::Snapshot) and queried: which widget sits
//! under a point, what covers a widget, and how to scroll it into view.
//! Operator commands are fanned out to a [`DeviceGroup`](console::group::DeviceGroup).

pub mod analysis;
pub mod cli;
pub mod console;
pub mod device;
pub mod parser;
pub mod refresh;
pub mod trace;
pub mod tree;
pub mod view;
