//! Remote-API protocol codes and service names
//!
//! The message bodies carry these as plain integers; the enums give them
//! names. Wire values are fixed and shared with every other binding.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

/// Body offset inside every request packet
pub const REQUEST_BODY_OFFSET: usize = 268;

/// Body offset inside every response packet
pub const RESPONSE_BODY_OFFSET: usize = 272;

pub const SERVICE_JOIN: &str = "HakoRemoteApi/Join";
pub const SERVICE_GET_SIM_STATE: &str = "HakoRemoteApi/GetSimState";
pub const SERVICE_SIM_CONTROL: &str = "HakoRemoteApi/SimControl";
pub const SERVICE_GET_EVENT: &str = "HakoRemoteApi/GetEvent";
pub const SERVICE_ACK_EVENT: &str = "HakoRemoteApi/AckEvent";

/// Every service the remote API exposes
pub const SERVICE_NAMES: [&str; 5] = [
    SERVICE_JOIN,
    SERVICE_GET_SIM_STATE,
    SERVICE_SIM_CONTROL,
    SERVICE_GET_EVENT,
    SERVICE_ACK_EVENT,
];

/// Simulation lifecycle state reported by `GetSimState`
#[repr(u32)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
pub enum SimulationState {
    Stopped = 0,
    Runnable = 1,
    Running = 2,
    Stopping = 3,
    Resetting = 4,
    Error = 5,
    Terminated = 6,
    /// Wildcard used when waiting for any state change
    Any = 7,
    Count = 8,
}

/// `SimControl` operation
#[repr(u32)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
pub enum SimControlCommand {
    Start = 0,
    Stop = 1,
    Reset = 2,
}

/// Event delivered to an asset by `GetEvent` and acknowledged by `AckEvent`
#[repr(u32)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
pub enum SimAssetEvent {
    None = 0,
    Start = 1,
    Stop = 2,
    Reset = 3,
    Error = 4,
}

/// Progress of a service call, carried in the response header
#[repr(u32)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
pub enum ServiceStatus {
    None = 0,
    Doing = 1,
    Canceling = 2,
    Done = 3,
    Error = 4,
}

/// Outcome of a service call, carried in the response header
#[repr(i32)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
pub enum ServiceResultCode {
    Ok = 0,
    Error = 1,
    Canceled = 2,
    Invalid = 3,
    Busy = 4,
}

/// Request kind, carried in the request header
#[repr(u32)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
pub enum ServiceOpcode {
    Request = 0,
    Cancel = 1,
}
