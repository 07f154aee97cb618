//! Pre-populated schema registry for the whole catalog
//!
//! Lets a process that only knows a type name (e.g. from configuration)
//! decode any `hako_srv_msgs` PDU through the dynamic codec.

use pdu_codec::{PduResult, PduStruct, SchemaRegistry};

use crate::srv_msgs::*;

macro_rules! register_all {
    ($registry:expr, $($ty:ty),* $(,)?) => {
        $( $registry.register_type::<$ty>()?; )*
    };
}

/// Registry holding every header, body and packet schema
pub fn catalog_registry() -> PduResult<SchemaRegistry> {
    let mut registry = SchemaRegistry::new();
    register_all!(
        registry,
        ServiceRequestHeader,
        ServiceResponseHeader,
        JoinRequest,
        JoinResponse,
        GetSimStateRequest,
        GetSimStateResponse,
        SimControlRequest,
        SimControlResponse,
        GetEventRequest,
        GetEventResponse,
        AckEventRequest,
        AckEventResponse,
        JoinRequestPacket,
        JoinResponsePacket,
        GetSimStateRequestPacket,
        GetSimStateResponsePacket,
        SimControlRequestPacket,
        SimControlResponsePacket,
        GetEventRequestPacket,
        GetEventResponsePacket,
        AckEventRequestPacket,
        AckEventResponsePacket,
    );
    Ok(registry)
}

/// Packet type name for a body type name
///
/// `hako_srv_msgs/JoinRequest` → `hako_srv_msgs/JoinRequestPacket`
pub fn packet_type_name<B: PduStruct>() -> String {
    format!("{}Packet", B::schema().name)
}
