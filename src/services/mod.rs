//! Business logic services and external collaborators.
//!
//! Each collaborator sits behind a trait so handlers stay independent of
//! how the collaborator is reached.

pub mod commission;
pub mod identity;
pub mod notification;
pub mod siri;
pub mod verification;
