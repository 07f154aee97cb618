//! `hako_srv_msgs` message catalog
//!
//! Headers, bodies, and the ten request/response packets built from them.

pub mod body;
pub mod header;

pub use body::*;
pub use header::{HakoString, ServiceRequestHeader, ServiceResponseHeader};

use pdu_codec::Packet;

pub type JoinRequestPacket = Packet<ServiceRequestHeader, JoinRequest>;
pub type JoinResponsePacket = Packet<ServiceResponseHeader, JoinResponse>;
pub type GetSimStateRequestPacket = Packet<ServiceRequestHeader, GetSimStateRequest>;
pub type GetSimStateResponsePacket = Packet<ServiceResponseHeader, GetSimStateResponse>;
pub type SimControlRequestPacket = Packet<ServiceRequestHeader, SimControlRequest>;
pub type SimControlResponsePacket = Packet<ServiceResponseHeader, SimControlResponse>;
pub type GetEventRequestPacket = Packet<ServiceRequestHeader, GetEventRequest>;
pub type GetEventResponsePacket = Packet<ServiceResponseHeader, GetEventResponse>;
pub type AckEventRequestPacket = Packet<ServiceRequestHeader, AckEventRequest>;
pub type AckEventResponsePacket = Packet<ServiceResponseHeader, AckEventResponse>;
