//! Gateway response assembly.
//!
//! Every gateway response carries a [`header::HeaderFields`] header and a
//! type specific body. The [`Response`] trait makes the body encoding a
//! required capability of each response type; the [`builder`] wraps
//! responses in the customer envelope.

pub mod builder;
pub mod header;

use prost::Message as _;

use crate::config::GatewayIdentity;
use crate::proto::gateway::{GatewayResponse, GatewayStatusResponse, ResponseHeader};

pub use builder::ResponseBuilder;
pub use header::{GatewayResultCode, HeaderFields, ResponseError, SinkId};

/// A response to a prior gateway request.
pub trait Response {
    /// Header fields echoing the request.
    fn fields(&self) -> &HeaderFields;

    /// Type specific body.
    fn body(&self) -> GatewayResponse;

    /// Protobuf header built from [`Response::fields`].
    fn header(&self) -> ResponseHeader {
        self.fields().build_header()
    }

    /// Encoded body bytes.
    fn payload(&self) -> Vec<u8> {
        self.body().encode_to_vec()
    }
}

/// Answer to a gateway status request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayStatus {
    fields: HeaderFields,
    app_software: String,
    mesh_software: String,
    imsi: String,
}

impl GatewayStatus {
    /// Builds a status answer from the configured identity.
    ///
    /// The result code is always [`GatewayResultCode::GwResOk`].
    #[must_use]
    pub fn new(req_id: u64, identity: &GatewayIdentity) -> Self {
        Self {
            fields: HeaderFields::new(req_id, &identity.gw_id, GatewayResultCode::GwResOk),
            app_software: identity.app_software.clone(),
            mesh_software: identity.mesh_software.clone(),
            imsi: identity.imsi.clone(),
        }
    }
}

impl Response for GatewayStatus {
    fn fields(&self) -> &HeaderFields {
        &self.fields
    }

    fn body(&self) -> GatewayResponse {
        GatewayResponse {
            header: Some(self.header()),
            gw_status_resp: Some(GatewayStatusResponse {
                app_software: self.app_software.clone(),
                wirepas_software: self.mesh_software.clone(),
                imsi: self.imsi.clone(),
            }),
        }
    }
}

/// Result of applying a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigStatus {
    fields: HeaderFields,
}

impl ConfigStatus {
    /// Builds a configuration result for `req_id`.
    #[must_use]
    pub fn new(req_id: u64, gw_id: &str, res: GatewayResultCode) -> Self {
        Self {
            fields: HeaderFields::new(req_id, gw_id, res),
        }
    }

    /// Targets the result at a sink.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::EmptySinkId`] if `sink_id` is empty.
    pub fn with_sink(self, sink_id: impl Into<String>) -> Result<Self, ResponseError> {
        Ok(Self {
            fields: self.fields.with_sink(sink_id)?,
        })
    }
}

impl Response for ConfigStatus {
    fn fields(&self) -> &HeaderFields {
        &self.fields
    }

    fn body(&self) -> GatewayResponse {
        GatewayResponse {
            header: Some(self.header()),
            gw_status_resp: None,
        }
    }
}
