//! Access gate adapters.

mod provide_right_gate;

pub use provide_right_gate::ProvideRightGate;
