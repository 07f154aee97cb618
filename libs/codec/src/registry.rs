//! # Schema Registry
//!
//! Name → schema lookup for the dynamic codec. Schemas enter either from a
//! Rust type (`register_type::<T>()`) or from JSON (`load_json`); both are
//! validated before they become visible.
//!
//! A JSON document is one `StructSchema` object or an array of them. Nested
//! struct fields carry their schema inline:
//!
//! ```json
//! {
//!   "name": "demo/Event", "size": 12,
//!   "fields": [
//!     { "name": "name", "offset": 0, "kind": { "type": "string" } },
//!     { "name": "code", "offset": 8, "kind": { "type": "primitive", "kind": "uint32" } }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::dynamic::{self, DynamicStruct};
use crate::error::{PduError, PduResult};
use crate::schema::StructSchema;
use crate::structs::PduStruct;

#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaDocument {
    One(StructSchema),
    Many(Vec<StructSchema>),
}

/// Validated schemas keyed by type name
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, Arc<StructSchema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a schema after validating it
    ///
    /// Registering an identical layout twice is a no-op; a different layout
    /// under an existing name is rejected.
    pub fn register(&mut self, schema: impl Into<Arc<StructSchema>>) -> PduResult<()> {
        let schema = schema.into();
        schema.validate()?;

        if let Some(existing) = self.schemas.get(&schema.name) {
            if **existing == *schema {
                return Ok(());
            }
            return Err(PduError::InvalidSchema(format!(
                "{}: conflicting layout already registered",
                schema.name
            )));
        }

        debug!(
            "Registered schema {} ({} bytes, {} fields)",
            schema.name,
            schema.size,
            schema.fields.len()
        );
        self.schemas.insert(schema.name.clone(), schema);
        Ok(())
    }

    pub fn register_type<T: PduStruct>(&mut self) -> PduResult<()> {
        self.register(T::schema())
    }

    /// Load one schema or an array of schemas from JSON
    ///
    /// Returns the number of schemas added. Nothing is registered if any
    /// schema in the document is rejected.
    pub fn load_json(&mut self, json: &str) -> PduResult<usize> {
        let schemas = match serde_json::from_str(json)
            .map_err(|e| PduError::InvalidSchema(format!("schema JSON: {e}")))?
        {
            SchemaDocument::One(schema) => vec![schema],
            SchemaDocument::Many(schemas) => schemas,
        };

        let mut staged = self.clone();
        for schema in &schemas {
            staged.register(schema.clone())?;
        }
        *self = staged;
        Ok(schemas.len())
    }

    /// All schemas as a JSON array, loadable with [`load_json`](Self::load_json)
    pub fn to_json(&self) -> PduResult<String> {
        let schemas: Vec<&StructSchema> = self.schemas.values().map(|s| s.as_ref()).collect();
        serde_json::to_string_pretty(&schemas).map_err(|e| PduError::InvalidSchema(e.to_string()))
    }

    pub fn get(&self, name: &str) -> PduResult<Arc<StructSchema>> {
        self.schemas
            .get(name)
            .cloned()
            .ok_or_else(|| PduError::UnknownType {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Registered type names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Check that the registered schema for `T` matches the Rust type
    ///
    /// Catches a JSON schema that drifted from the compiled layout.
    pub fn verify_type<T: PduStruct>(&self) -> PduResult<()> {
        let compiled = T::schema();
        let registered = self.get(&compiled.name)?;

        if registered.size != compiled.size {
            return Err(PduError::schema_mismatch(
                "",
                format!("{} bytes", registered.size),
                format!("{} bytes", compiled.size),
            ));
        }

        for field in &registered.fields {
            let Some(actual) = compiled.field(&field.name) else {
                return Err(PduError::schema_mismatch(
                    field.name.as_str(),
                    field.kind.describe(),
                    "no such Rust field",
                ));
            };
            if actual.kind != field.kind || actual.offset != field.offset {
                return Err(PduError::schema_mismatch(
                    field.name.as_str(),
                    format!("{} at {}", field.kind.describe(), field.offset),
                    format!("{} at {}", actual.kind.describe(), actual.offset),
                ));
            }
        }

        if let Some(extra) = compiled
            .fields
            .iter()
            .find(|f| registered.field(&f.name).is_none())
        {
            return Err(PduError::schema_mismatch(
                extra.name.as_str(),
                "no such schema field",
                extra.kind.describe(),
            ));
        }
        Ok(())
    }

    /// Decode a PDU of the named type
    pub fn decode_dynamic(&self, name: &str, data: &[u8]) -> PduResult<DynamicStruct> {
        dynamic::decode_dynamic(&*self.get(name)?, data)
    }

    /// Encode a value using the schema named by its `type_name`
    pub fn encode_dynamic(&self, value: &DynamicStruct) -> PduResult<Vec<u8>> {
        dynamic::encode_dynamic(&*self.get(&value.type_name)?, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::PduValue;
    use crate::schema::FieldKind;
    use crate::{define_pdu, encode_pdu};

    define_pdu! {
        struct Event("test/Event", 12) {
            [0] name: String,
            [8] code: u32,
        }
    }

    const EVENT_JSON: &str = r#"{
        "name": "test/Event",
        "size": 12,
        "fields": [
            {"name": "name", "offset": 0, "kind": {"type": "string"}},
            {"name": "code", "offset": 8, "kind": {"type": "primitive", "kind": "uint32"}}
        ]
    }"#;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = SchemaRegistry::new();
        assert!(registry.is_empty());
        registry.register_type::<Event>().unwrap();
        registry.register_type::<Event>().unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("test/Event"));
        assert_eq!(registry.get("test/Event").unwrap().size, 12);
        assert_eq!(
            registry.get("test/Nope"),
            Err(PduError::UnknownType { name: "test/Nope".into() })
        );
    }

    #[test]
    fn test_json_schema_matches_compiled_type() {
        let mut registry = SchemaRegistry::new();
        assert_eq!(registry.load_json(EVENT_JSON).unwrap(), 1);
        registry.verify_type::<Event>().unwrap();

        let bytes = encode_pdu(&Event { name: "sensor1".into(), code: 3 }).unwrap();
        let value = registry.decode_dynamic("test/Event", &bytes).unwrap();
        assert_eq!(value.get("code"), Some(&PduValue::primitive(3u32)));
        assert_eq!(registry.encode_dynamic(&value).unwrap(), bytes);
    }

    #[test]
    fn test_drifted_json_schema_is_detected() {
        let mut registry = SchemaRegistry::new();
        registry
            .load_json(&EVENT_JSON.replace("\"uint32\"", "\"int32\""))
            .unwrap();
        assert!(matches!(
            registry.verify_type::<Event>(),
            Err(PduError::SchemaMismatch { field, .. }) if field == "code"
        ));
    }

    #[test]
    fn test_conflicting_layout_is_rejected() {
        let mut registry = SchemaRegistry::new();
        registry.register_type::<Event>().unwrap();
        let err = registry
            .load_json(&EVENT_JSON.replace("\"size\": 12", "\"size\": 16"))
            .unwrap_err();
        assert!(matches!(err, PduError::InvalidSchema(_)));
        assert_eq!(registry.get("test/Event").unwrap().size, 12);
    }

    #[test]
    fn test_bad_document_registers_nothing() {
        let mut registry = SchemaRegistry::new();
        let overlapping = EVENT_JSON.replace("\"offset\": 8", "\"offset\": 4");
        let doc = format!("[{EVENT_JSON}, {}]", overlapping.replace("test/Event", "test/Bad"));
        assert!(registry.load_json(&doc).is_err());
        assert!(registry.is_empty());

        assert!(matches!(
            registry.load_json("{ not json"),
            Err(PduError::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_wrapping_offset_is_rejected() {
        let mut registry = SchemaRegistry::new();
        let wrapping = EVENT_JSON.replace("\"offset\": 8", "\"offset\": 18446744073709551615");
        assert!(matches!(
            registry.load_json(&wrapping),
            Err(PduError::InvalidSchema(_))
        ));

        let huge_array = EVENT_JSON.replace(
            r#"{"type": "primitive", "kind": "uint32"}"#,
            r#"{"type": "array", "kind": "uint64", "len": 4611686018427387904}"#,
        );
        assert!(matches!(
            registry.load_json(&huge_array),
            Err(PduError::InvalidSchema(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_byte_alias_in_json() {
        let mut registry = SchemaRegistry::new();
        registry
            .load_json(&EVENT_JSON.replace("\"uint32\"", "\"byte\""))
            .unwrap();
        let code = registry.get("test/Event").unwrap().field("code").unwrap().kind.clone();
        assert_eq!(code, FieldKind::primitive(crate::primitive::PrimitiveKind::Uint8));
    }

    #[test]
    fn test_json_export_round_trip() {
        let mut registry = SchemaRegistry::new();
        registry.register_type::<Event>().unwrap();
        let json = registry.to_json().unwrap();

        let mut reloaded = SchemaRegistry::new();
        assert_eq!(reloaded.load_json(&json).unwrap(), 1);
        assert_eq!(reloaded.get("test/Event"), registry.get("test/Event"));
        assert_eq!(reloaded.names().collect::<Vec<_>>(), vec!["test/Event"]);
    }
}
