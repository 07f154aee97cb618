//! Service Header Implementation
//!
//! Every remote-API packet opens with one of two headers. They carry call
//! correlation (request id, service, client) and, on responses, call
//! progress. The body follows at a fixed offset:
//!
//! ```text
//! request   ┌──────────────────────────────┬──────────┐
//!           │ ServiceRequestHeader (268)   │ body     │
//!           └──────────────────────────────┴──────────┘
//! response  ┌──────────────────────────────┬──────────┐
//!           │ ServiceResponseHeader (272)  │ body     │
//!           └──────────────────────────────┴──────────┘
//! ```

use pdu_codec::{define_pdu, FixedString, PacketHeader, PduResult, HAKO_STRING_SIZE};
use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, ProtocolResult};
use crate::protocol::{
    ServiceOpcode, ServiceResultCode, ServiceStatus, REQUEST_BODY_OFFSET, RESPONSE_BODY_OFFSET,
};

/// Fixed 128-byte NUL-terminated name field
pub type HakoString = FixedString<HAKO_STRING_SIZE>;

define_pdu! {
    /// Header of every request packet (268 bytes)
    #[derive(Serialize, Deserialize)]
    pub struct ServiceRequestHeader("hako_srv_msgs/ServiceRequestHeader", 268) {
        [0] pub request_id: u32,
        [4] pub service_name: HakoString,
        [132] pub client_name: HakoString,
        [260] pub opcode: u32,
        [264] pub status_poll_interval_msec: i32,
    }
}

define_pdu! {
    /// Header of every response packet (272 bytes)
    #[derive(Serialize, Deserialize)]
    pub struct ServiceResponseHeader("hako_srv_msgs/ServiceResponseHeader", 272) {
        [0] pub request_id: u32,
        [4] pub service_name: HakoString,
        [132] pub client_name: HakoString,
        [260] pub status: u32,
        [264] pub processing_percentage: u32,
        [268] pub result_code: i32,
    }
}

impl PacketHeader for ServiceRequestHeader {
    const BODY_OFFSET: usize = REQUEST_BODY_OFFSET;
}

impl PacketHeader for ServiceResponseHeader {
    const BODY_OFFSET: usize = RESPONSE_BODY_OFFSET;
}

impl ServiceRequestHeader {
    /// Request header for `service_name`, names checked against capacity
    pub fn new(
        request_id: u32,
        service_name: &str,
        client_name: &str,
        opcode: ServiceOpcode,
        status_poll_interval_msec: i32,
    ) -> PduResult<Self> {
        Ok(Self {
            request_id,
            service_name: HakoString::new(service_name)?,
            client_name: HakoString::new(client_name)?,
            opcode: opcode.into(),
            status_poll_interval_msec,
        })
    }

    pub fn opcode(&self) -> ProtocolResult<ServiceOpcode> {
        ServiceOpcode::try_from(self.opcode)
            .map_err(|e| ProtocolError::unknown_code("ServiceOpcode", e.number))
    }
}

impl ServiceResponseHeader {
    /// Response header answering `request`, with progress and outcome
    pub fn reply_to(
        request: &ServiceRequestHeader,
        status: ServiceStatus,
        processing_percentage: u32,
        result_code: ServiceResultCode,
    ) -> Self {
        Self {
            request_id: request.request_id,
            service_name: request.service_name.clone(),
            client_name: request.client_name.clone(),
            status: status.into(),
            processing_percentage,
            result_code: result_code.into(),
        }
    }

    pub fn status(&self) -> ProtocolResult<ServiceStatus> {
        ServiceStatus::try_from(self.status)
            .map_err(|e| ProtocolError::unknown_code("ServiceStatus", e.number))
    }

    pub fn result_code(&self) -> ProtocolResult<ServiceResultCode> {
        ServiceResultCode::try_from(self.result_code)
            .map_err(|e| ProtocolError::unknown_code("ServiceResultCode", e.number))
    }

    /// Call finished and succeeded
    pub fn is_ok(&self) -> bool {
        self.status() == Ok(ServiceStatus::Done) && self.result_code() == Ok(ServiceResultCode::Ok)
    }
}
