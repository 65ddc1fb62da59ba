//! # tidelock-core
//! Foundation types and interfaces for the Tidelock staking protocol.

pub mod constants;
pub mod error;
pub mod events;
pub mod ledger;
pub mod types;
