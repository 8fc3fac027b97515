//! Interaction-channel implementations.

mod ibd;
mod oxygen;

pub use ibd::InverseBetaDecay;
pub use oxygen::{OxygenElectron, OxygenPositron};
