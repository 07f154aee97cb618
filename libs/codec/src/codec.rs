//! Configured codec handle
//!
//! The free functions (`encode_pdu`, `decode_pdu`, ...) run with
//! `CodecConfig::default()`. A `PduCodec` carries an explicit configuration
//! so a service can apply its own limits to every call.

use crate::builder;
use crate::config::CodecConfig;
use crate::dynamic::{self, DynamicStruct};
use crate::error::PduResult;
use crate::metadata::PduMetadata;
use crate::parser;
use crate::schema::StructSchema;
use crate::structs::PduStruct;

#[derive(Debug, Clone, Default)]
pub struct PduCodec {
    config: CodecConfig,
}

impl PduCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Codec configured from `HAKO_PDU_*` environment variables
    pub fn from_env() -> Self {
        Self::new(CodecConfig::from_env())
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn encode<T: PduStruct>(&self, value: &T) -> PduResult<Vec<u8>> {
        builder::encode_pdu_with(value, &self.config)
    }

    pub fn encode_into<T: PduStruct>(&self, value: &T, out: &mut [u8]) -> PduResult<usize> {
        builder::encode_pdu_into_with(value, out, &self.config)
    }

    pub fn decode<T: PduStruct>(&self, data: &[u8]) -> PduResult<T> {
        parser::decode_pdu_with(data, &self.config)
    }

    pub fn parse_metadata(&self, data: &[u8]) -> PduResult<PduMetadata> {
        parser::parse_metadata_with(data, &self.config)
    }

    pub fn encode_dynamic(
        &self,
        schema: &StructSchema,
        value: &DynamicStruct,
    ) -> PduResult<Vec<u8>> {
        dynamic::encode_dynamic_with(schema, value, &self.config)
    }

    pub fn decode_dynamic(&self, schema: &StructSchema, data: &[u8]) -> PduResult<DynamicStruct> {
        dynamic::decode_dynamic_with(schema, data, &self.config)
    }
}
