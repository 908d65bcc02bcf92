use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    value::Value,
};
use thiserror::Error as ThisError;

///
/// SerializeError
///

#[derive(Debug, ThisError)]
pub enum SerializeError {
    #[error("serialize error: {0}")]
    Serialize(String),

    #[error("deserialize error: {0}")]
    Deserialize(String),
}

impl SerializeError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::Serialize(_) => ErrorClass::Internal,
            Self::Deserialize(_) => ErrorClass::InvariantViolation,
        }
    }
}

impl From<SerializeError> for InternalError {
    fn from(err: SerializeError) -> Self {
        Self::new(err.class(), ErrorOrigin::Serialize, err.to_string())
    }
}

///
/// Encoder
///
/// Text form of rendered output. The bulk path hands over pre-shaped
/// documents, so an encoder never needs to see an entity.
///

pub trait Encoder: Send + Sync {
    fn encode(&self, value: &Value) -> Result<String, SerializeError>;

    fn decode(&self, text: &str) -> Result<Value, SerializeError>;
}

///
/// JsonEncoder
///

#[derive(Clone, Copy, Debug, Default)]
pub struct JsonEncoder;

impl Encoder for JsonEncoder {
    fn encode(&self, value: &Value) -> Result<String, SerializeError> {
        serde_json::to_string(value).map_err(|err| SerializeError::Serialize(err.to_string()))
    }

    fn decode(&self, text: &str) -> Result<Value, SerializeError> {
        serde_json::from_str::<serde_json::Value>(text)
            .map(Value::from)
            .map_err(|err| SerializeError::Deserialize(err.to_string()))
    }
}

///
/// TESTS
///
