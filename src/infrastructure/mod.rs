//! Provider adapters implementing the ports in `domain::ports`.

pub mod simulated;
