//! Request and response bodies of the remote API
//!
//! One request/response pair per service. Names and messages are inline
//! 128-byte [`HakoString`]s, byte-compatible with the C structs, except
//! `GetEventRequest::name` which lives in the heap. Codes are plain
//! integers with typed accessors on top.

use pdu_codec::{define_pdu, PduResult};
use serde::{Deserialize, Serialize};

use super::header::HakoString;
use crate::error::{ProtocolError, ProtocolResult};
use crate::protocol::{SimAssetEvent, SimControlCommand, SimulationState};

define_pdu! {
    #[derive(Serialize, Deserialize)]
    pub struct JoinRequest("hako_srv_msgs/JoinRequest", 128) {
        [0] pub name: HakoString,
    }
}

define_pdu! {
    #[derive(Serialize, Deserialize)]
    pub struct JoinResponse("hako_srv_msgs/JoinResponse", 132) {
        [0] pub status_code: u32,
        [4] pub message: HakoString,
    }
}

define_pdu! {
    #[derive(Serialize, Deserialize)]
    pub struct GetSimStateRequest("hako_srv_msgs/GetSimStateRequest", 128) {
        [0] pub name: HakoString,
    }
}

define_pdu! {
    /// Snapshot of the simulation; bools are 4-byte words on the wire
    #[derive(Serialize, Deserialize)]
    pub struct GetSimStateResponse("hako_srv_msgs/GetSimStateResponse", 32) {
        [0] pub sim_state: u32,
        [8] pub master_time: i64,
        [16] pub is_pdu_created: bool,
        [20] pub is_simulation_mode: bool,
        [24] pub is_pdu_sync_mode: bool,
    }
}

define_pdu! {
    #[derive(Serialize, Deserialize)]
    pub struct SimControlRequest("hako_srv_msgs/SimControlRequest", 132) {
        [0] pub name: HakoString,
        [128] pub op: u32,
    }
}

define_pdu! {
    #[derive(Serialize, Deserialize)]
    pub struct SimControlResponse("hako_srv_msgs/SimControlResponse", 132) {
        [0] pub status_code: u32,
        [4] pub message: HakoString,
    }
}

define_pdu! {
    /// Asset name carried in the heap region
    #[derive(Serialize, Deserialize)]
    pub struct GetEventRequest("hako_srv_msgs/GetEventRequest", 8) {
        [0] pub name: String,
    }
}

define_pdu! {
    #[derive(Serialize, Deserialize)]
    pub struct GetEventResponse("hako_srv_msgs/GetEventResponse", 4) {
        [0] pub event_code: u32,
    }
}

define_pdu! {
    #[derive(Serialize, Deserialize)]
    pub struct AckEventRequest("hako_srv_msgs/AckEventRequest", 136) {
        [0] pub name: HakoString,
        [128] pub event_code: u32,
        [132] pub result_code: u32,
    }
}

define_pdu! {
    #[derive(Serialize, Deserialize)]
    pub struct AckEventResponse("hako_srv_msgs/AckEventResponse", 4) {
        [0] pub ack_code: u32,
    }
}

impl JoinRequest {
    pub fn new(name: &str) -> PduResult<Self> {
        Ok(Self {
            name: HakoString::new(name)?,
        })
    }
}

impl JoinResponse {
    pub fn new(status_code: u32, message: &str) -> PduResult<Self> {
        Ok(Self {
            status_code,
            message: HakoString::new(message)?,
        })
    }
}

impl GetSimStateRequest {
    pub fn new(name: &str) -> PduResult<Self> {
        Ok(Self {
            name: HakoString::new(name)?,
        })
    }
}

impl GetSimStateResponse {
    pub fn state(&self) -> ProtocolResult<SimulationState> {
        SimulationState::try_from(self.sim_state)
            .map_err(|e| ProtocolError::unknown_code("SimulationState", e.number))
    }
}

impl SimControlRequest {
    pub fn new(name: &str, command: SimControlCommand) -> PduResult<Self> {
        Ok(Self {
            name: HakoString::new(name)?,
            op: command.into(),
        })
    }

    pub fn command(&self) -> ProtocolResult<SimControlCommand> {
        SimControlCommand::try_from(self.op)
            .map_err(|e| ProtocolError::unknown_code("SimControlCommand", e.number))
    }
}

impl SimControlResponse {
    pub fn new(status_code: u32, message: &str) -> PduResult<Self> {
        Ok(Self {
            status_code,
            message: HakoString::new(message)?,
        })
    }
}

impl GetEventRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl GetEventResponse {
    pub fn event(&self) -> ProtocolResult<SimAssetEvent> {
        SimAssetEvent::try_from(self.event_code)
            .map_err(|e| ProtocolError::unknown_code("SimAssetEvent", e.number))
    }
}

impl AckEventRequest {
    pub fn new(name: &str, event: SimAssetEvent, result_code: u32) -> PduResult<Self> {
        Ok(Self {
            name: HakoString::new(name)?,
            event_code: event.into(),
            result_code,
        })
    }

    pub fn event(&self) -> ProtocolResult<SimAssetEvent> {
        SimAssetEvent::try_from(self.event_code)
            .map_err(|e| ProtocolError::unknown_code("SimAssetEvent", e.number))
    }
}
