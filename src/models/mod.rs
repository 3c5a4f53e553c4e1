//! Domain models

pub mod actor;
pub mod booking;
pub mod delivery;
pub mod enums;
pub mod supplier_request;
