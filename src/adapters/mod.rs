//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements         | Connects to                   |
//! |-------------|--------------------|-------------------------------|
//! | `hardware`  | SensorPort         | HC-SR04, pH probe (ADC1)      |
//! |             | ActuatorPort       | Servo (LEDC), relay, buzzer   |
//! | `log_sink`  | EventSink          | Serial log output             |
//! | `rtdb`      | RemoteStorePort    | Realtime database over HTTPS  |
//! | `time`      | -                  | ESP32 system timer            |
//! | `wifi`      | ConnectivityPort   | ESP-IDF WiFi STA              |

pub mod hardware;
pub mod log_sink;
pub mod rtdb;
pub mod time;
pub mod wifi;
