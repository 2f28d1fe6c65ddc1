//! Host input adapters
//!
//! The engine consumes [`InputMsg`](crate::messages::InputMsg) values; this
//! module holds translators from concrete platform event types.

pub mod winit_adapter;

pub use winit_adapter::WinitPointerAdapter;
