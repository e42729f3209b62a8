//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements                          | Connects to            |
//! |------------|-------------------------------------|------------------------|
//! | `hardware` | ActuatorPort, HoldPort, SystemPort  | LEDC servo, GPIO, delay|
//! | `telnet`   | Transport                           | TCP port 23            |
//! | `uart`     | Transport                           | ESP32 UART (device)    |
//! | `wifi`     | n/a                                 | ESP-IDF WiFi STA       |
//! | `time`     | n/a                                 | ESP32 system timer     |

pub mod hardware;
pub mod telnet;
pub mod time;
#[cfg(target_os = "espidf")]
pub mod uart;
pub mod wifi;
