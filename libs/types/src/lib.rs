//! # hako_srv_msgs PDU Types
//!
//! Message catalog for the simulation remote API, declared on top of
//! `pdu-codec`. Each type is its field-offset table and nothing else; the
//! codec does all encoding and decoding.
//!
//! ## Quick Start
//!
//! ```rust
//! use pdu_types::{
//!     GetEventRequest, GetEventRequestPacket, ServiceOpcode, ServiceRequestHeader,
//!     SERVICE_GET_EVENT,
//! };
//!
//! let header =
//!     ServiceRequestHeader::new(1, SERVICE_GET_EVENT, "client-a", ServiceOpcode::Request, 10)
//!         .unwrap();
//! let packet = GetEventRequestPacket::new(header, GetEventRequest::new("sensor1"));
//!
//! let bytes = packet.encode().unwrap();
//! assert_eq!(GetEventRequestPacket::decode(&bytes).unwrap(), packet);
//! ```
//!
//! ## What This Crate Contains
//! - Service request/response headers (268 / 272 bytes)
//! - Request/response bodies for Join, GetSimState, SimControl, GetEvent, AckEvent
//! - The ten `*Packet` aliases pairing them
//! - Protocol enums and service-name constants
//! - A registry pre-loaded with every schema for the dynamic codec

pub mod error;
pub mod protocol;
pub mod registry;
pub mod srv_msgs;

pub use error::{ProtocolError, ProtocolResult};
pub use protocol::*;
pub use registry::{catalog_registry, packet_type_name};
pub use srv_msgs::*;
