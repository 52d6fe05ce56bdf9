//! Domain types shared by the loader and the form controller, plus the ports
//! a payment provider adapter must implement.

pub mod payment;
pub mod ports;
pub mod sdk_error;
pub mod state;
