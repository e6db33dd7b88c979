//! Response header construction and parsing.
//!
//! [`HeaderFields`] is the typed view of a protobuf
//! [`ResponseHeader`]. Building is infallible once the fields exist;
//! parsing rejects unknown result codes and empty sink ids.

use std::fmt;

use crate::proto::gateway::ResponseHeader;

pub use crate::proto::gateway::GatewayResultCode;

/// Errors raised while assembling or reading a response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResponseError {
    /// The numeric result code is not part of [`GatewayResultCode`].
    #[error("unknown result code: {0}")]
    UnknownResultCode(i32),

    /// A sink id was given but is empty.
    #[error("sink id must not be empty")]
    EmptySinkId,

    /// The message has no response header.
    #[error("response header missing")]
    MissingHeader,
}

impl GatewayResultCode {
    /// Maps a wire value back to the enumeration.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::UnknownResultCode`] for values outside the
    /// enumeration.
    pub fn from_wire(value: i32) -> Result<Self, ResponseError> {
        Self::try_from(value).map_err(|_| ResponseError::UnknownResultCode(value))
    }
}

/// Identifier of a sink managed by the gateway. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SinkId(String);

impl SinkId {
    /// Wraps a sink identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::EmptySinkId`] if `id` is empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ResponseError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ResponseError::EmptySinkId);
        }
        Ok(Self(id))
    }

    /// Returns the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fields shared by every gateway response header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderFields {
    /// Identifier of the answered request.
    pub req_id: u64,
    /// Unique gateway identifier.
    pub gw_id: String,
    /// Operation result.
    pub res: GatewayResultCode,
    /// Targeted sink, when the operation is sink specific.
    pub sink_id: Option<SinkId>,
}

impl HeaderFields {
    /// Creates header fields without a sink id. `gw_id` is stringified.
    #[must_use]
    pub fn new(req_id: u64, gw_id: impl fmt::Display, res: GatewayResultCode) -> Self {
        Self {
            req_id,
            gw_id: gw_id.to_string(),
            res,
            sink_id: None,
        }
    }

    /// Targets the response at a sink.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::EmptySinkId`] if `sink_id` is empty.
    pub fn with_sink(mut self, sink_id: impl Into<String>) -> Result<Self, ResponseError> {
        self.sink_id = Some(SinkId::new(sink_id)?);
        Ok(self)
    }

    /// Builds the protobuf header. The sink id is only set when present.
    #[must_use]
    pub fn build_header(&self) -> ResponseHeader {
        ResponseHeader {
            req_id: self.req_id,
            gw_id: self.gw_id.clone(),
            res: i32::from(self.res),
            sink_id: self.sink_id.as_ref().map(|s| s.as_str().to_string()),
            time_ms_epoch: None,
        }
    }

    /// Reads the fields back from a protobuf header.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::UnknownResultCode`] for an unrecognised
    /// result and [`ResponseError::EmptySinkId`] for a present but empty
    /// sink id.
    pub fn parse_header(header: &ResponseHeader) -> Result<Self, ResponseError> {
        Ok(Self {
            req_id: header.req_id,
            gw_id: header.gw_id.clone(),
            res: GatewayResultCode::from_wire(header.res)?,
            sink_id: header.sink_id.as_deref().map(SinkId::new).transpose()?,
        })
    }
}

impl TryFrom<&ResponseHeader> for HeaderFields {
    type Error = ResponseError;

    fn try_from(header: &ResponseHeader) -> Result<Self, Self::Error> {
        Self::parse_header(header)
    }
}
