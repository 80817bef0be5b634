//! Remote store layout.

// Sensor readings and actuator state (device → store)
pub const DISTANCE: &str = "/sensors/distance";
pub const ACIDITY: &str = "/sensors/ph";
pub const ACIDITY_VOLTAGE: &str = "/sensors/phVolt";
pub const VALVE: &str = "/sensors/servo2";
pub const PUMP: &str = "/sensors/pump";

// Device bookkeeping
pub const DEVICE_STATUS: &str = "/device/status";
pub const DEVICE_MODE: &str = "/device/mode";
pub const DEVICE_TIMESTAMP: &str = "/device/timestamp";
pub const DEVICE_SENSOR_FAULT: &str = "/device/sensorFault";

// Operator commands (store → device)
pub const COMMAND_VALVE: &str = "/commands/servo2";
pub const COMMAND_PUMP: &str = "/commands/pump";
