//! Target-specific compilation passes.
//!
//! These passes read target hardware properties from the `PropertySet`
//! and produce circuits that respect the device's connectivity and
//! native gate set.

pub mod layout;
pub mod routing;
pub mod translation;

pub use layout::TrivialLayout;
pub use routing::SwapRouting;
pub use translation::BasisTranslation;
