//! HC Core - Platform-agnostic Logic and Traits
//!
//! Diese Crate enthält KEINE Hardware-Dependencies.
//! Sie definiert nur Traits und Pure Logic: den entprellten
//! Binär-Geräte-Controller (Taster → Relais, PIR → Licht) als
//! wiederverwendbaren Typ.

#![no_std]

pub mod logic;
pub mod traits;
pub mod types;

// Re-exports für einfachen Zugriff
pub use logic::{ControlledDevice, Device};
pub use traits::{Clock, InputReader, SwitchError, SwitchWriter, TransitionNotifier};
pub use types::{DeviceCommand, SwitchState, ToggleTarget, TransitionEvent};
