//! Customer envelope assembly.
//!
//! [`ResponseBuilder`] wraps response bodies in the customer envelope,
//! stamping the configured customer name and the assembly time. Three
//! assemblies are provided: a bare client acknowledgment, a gateway status
//! report, and a configuration result.

use crate::config::GatewayIdentity;
use crate::proto::gateway::{
    ClientResponse, CustomerHeader, CustomerMessage, CustomerResponse, GenericMessage,
    customer_response::Body,
};

use super::{
    ConfigStatus, GatewayResultCode, GatewayStatus, HeaderFields, Response, ResponseError,
};

/// Assembles customer response envelopes for one gateway.
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    identity: GatewayIdentity,
    clock: fn() -> i64,
}

impl ResponseBuilder {
    /// Creates a builder stamping envelopes with the wall clock.
    #[must_use]
    pub fn new(identity: GatewayIdentity) -> Self {
        Self {
            identity,
            clock: now_ms,
        }
    }

    /// Replaces the millisecond clock used for `gateway_epoch_ms`.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    /// Identity stamped on every envelope.
    #[must_use]
    pub const fn identity(&self) -> &GatewayIdentity {
        &self.identity
    }

    /// Bare acknowledgment to a client.
    #[must_use]
    pub fn client_status(&self) -> GenericMessage {
        self.envelope(Body::ClientResp(ClientResponse {}))
    }

    /// Gateway status report for `req_id`.
    ///
    /// The header result is always [`GatewayResultCode::GwResOk`]; there is
    /// no way to report a failed status request.
    #[must_use]
    pub fn gateway_status(&self, req_id: u64) -> GenericMessage {
        self.wrap(&GatewayStatus::new(req_id, &self.identity))
    }

    /// Result of applying a configuration requested by `req_id`.
    #[must_use]
    pub fn config_status(&self, req_id: u64, res: GatewayResultCode) -> GenericMessage {
        self.wrap(&ConfigStatus::new(req_id, &self.identity.gw_id, res))
    }

    /// Wraps any gateway response in the customer envelope.
    #[must_use]
    pub fn wrap<R: Response>(&self, response: &R) -> GenericMessage {
        tracing::debug!(
            req_id = response.fields().req_id,
            res = ?response.fields().res,
            "assembling gateway response"
        );
        self.envelope(Body::GatewayResp(response.body()))
    }

    /// Reads the gateway header back out of an assembled envelope.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::MissingHeader`] if the envelope carries no
    /// gateway response header (for example a bare client acknowledgment),
    /// or the error of [`HeaderFields::parse_header`] for a malformed one.
    pub fn read_header(message: &GenericMessage) -> Result<HeaderFields, ResponseError> {
        let header = message
            .customer
            .as_ref()
            .and_then(|customer| customer.response.as_ref())
            .and_then(|response| match &response.body {
                Some(Body::GatewayResp(body)) => body.header.as_ref(),
                _ => None,
            })
            .ok_or(ResponseError::MissingHeader)?;
        HeaderFields::parse_header(header)
    }

    fn envelope(&self, body: Body) -> GenericMessage {
        GenericMessage {
            customer: Some(CustomerMessage {
                customer_name: self.identity.customer_name.clone(),
                response: Some(CustomerResponse {
                    header: Some(CustomerHeader {
                        gateway_epoch_ms: (self.clock)(),
                    }),
                    body: Some(body),
                }),
            }),
        }
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
