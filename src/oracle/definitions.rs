use postcard::{from_bytes, to_allocvec};
use serde::{Deserialize, Serialize};

pub use uuid::Uuid;

#[allow(unused_imports)]
pub use log::{debug, error, info, trace, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleRequest {
    pub id: Uuid,
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleReply {
    pub id: Uuid,
    /// Model text, or the reason the model could not answer.
    pub result: Result<String, String>,
}

impl From<OracleReply> for warp::ws::Message {
    fn from(value: OracleReply) -> Self {
        Self::binary(to_allocvec(&value).unwrap_or_default())
    }
}

impl From<OracleRequest> for tungstenite::Message {
    fn from(value: OracleRequest) -> Self {
        Self::binary(to_allocvec(&value).unwrap_or_default())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParsingMessageError {
    #[error("expected a binary frame")]
    NonBinaryError,
    #[error("malformed frame: {0}")]
    PostcardError(#[from] postcard::Error),
}

impl TryFrom<tungstenite::Message> for OracleReply {
    type Error = ParsingMessageError;
    fn try_from(value: tungstenite::Message) -> Result<Self, Self::Error> {
        if value.is_binary() {
            Ok(from_bytes(&value.into_data())?)
        } else {
            Err(ParsingMessageError::NonBinaryError)
        }
    }
}

impl TryFrom<warp::ws::Message> for OracleRequest {
    type Error = ParsingMessageError;
    fn try_from(value: warp::ws::Message) -> Result<Self, Self::Error> {
        if value.is_binary() {
            Ok(from_bytes(value.as_bytes())?)
        } else {
            Err(ParsingMessageError::NonBinaryError)
        }
    }
}
