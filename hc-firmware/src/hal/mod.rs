// Hardware Abstraction Layer (HAL) Module
//
// Dieses Modul kapselt Hardware-Zugriffe hinter den hc-core Traits,
// um Testbarkeit und Wartbarkeit zu verbessern.

pub mod gpio;

pub use gpio::{EmbassyClock, GpioButton, GpioSensor, RelaySwitch};
