//! Gateway response header and customer response envelope.
//!
//! ```text
//! GenericMessage
//!   └── CustomerMessage { customer_name }
//!         └── CustomerResponse
//!               ├── CustomerHeader { gateway_epoch_ms }
//!               └── body: ClientResponse | GatewayResponse
//!                                           ├── ResponseHeader
//!                                           └── GatewayStatusResponse?
//! ```

/// Result of a gateway operation.
///
/// One-to-one with the numeric `res` field of [`ResponseHeader`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum GatewayResultCode {
    /// Operation succeeded.
    GwResOk = 0,
    /// Unexpected failure inside the gateway.
    GwResInternalError = 1,
    /// Sink id does not match any sink of the gateway.
    GwResInvalidSinkId = 2,
    /// Node role is not valid.
    GwResInvalidRole = 3,
    /// Network address is not valid.
    GwResInvalidNetworkAddress = 4,
    /// Network channel is not valid.
    GwResInvalidNetworkChannel = 5,
    /// Channel map is not valid.
    GwResInvalidChannelMap = 6,
    /// Network keys are not valid.
    GwResInvalidNetworkKeys = 7,
    /// Access cycle range is not valid.
    GwResInvalidAcRange = 8,
    /// Sink is not in a state that allows the operation.
    GwResInvalidSinkState = 9,
    /// Destination address is not valid.
    GwResInvalidDestAddress = 10,
    /// Destination endpoint is not valid.
    GwResInvalidDestEndpoint = 11,
    /// Source endpoint is not valid.
    GwResInvalidSourceEndpoint = 12,
    /// Quality of service class is not valid.
    GwResInvalidQos = 13,
    /// Data payload is not valid.
    GwResInvalidDataPayload = 14,
    /// Sink ran out of memory.
    GwResSinkOutOfMemory = 15,
    /// Sink did not answer in time.
    GwResSinkTimeout = 16,
    /// A request parameter is not valid.
    GwResInvalidParam = 17,
    /// Operation not permitted.
    GwResAccessDenied = 18,
    /// Maximum hop count is not valid.
    GwResInvalidMaxHopCount = 19,
    /// Scratchpad sequence number is not valid.
    GwResInvalidSequenceNumber = 20,
    /// Scratchpad image is not valid.
    GwResInvalidScratchpad = 21,
    /// Reboot delay is not valid.
    GwResInvalidRebootDelay = 22,
    /// Diagnostic interval is not valid.
    GwResInvalidDiagInterval = 23,
    /// Application configuration is not valid.
    GwResInvalidAppConfig = 24,
}

/// Generic header echoed in every gateway response.
#[derive(Clone, PartialEq, prost::Message)]
pub struct ResponseHeader {
    /// Identifier of the request this response answers.
    #[prost(uint64, tag = "1")]
    pub req_id: u64,

    /// Unique gateway identifier.
    #[prost(string, tag = "2")]
    pub gw_id: String,

    /// Numeric [`GatewayResultCode`].
    #[prost(enumeration = "GatewayResultCode", tag = "3")]
    pub res: i32,

    /// Sink the operation targeted, if any.
    #[prost(string, optional, tag = "4")]
    pub sink_id: Option<String>,

    /// Gateway time, milliseconds since the Unix epoch.
    #[prost(uint64, optional, tag = "5")]
    pub time_ms_epoch: Option<u64>,
}

/// Outer envelope sent by the gateway.
#[derive(Clone, PartialEq, prost::Message)]
pub struct GenericMessage {
    /// Customer specific part.
    #[prost(message, optional, tag = "1")]
    pub customer: Option<CustomerMessage>,
}

/// Customer specific message.
#[derive(Clone, PartialEq, prost::Message)]
pub struct CustomerMessage {
    /// Tenant the gateway reports for.
    #[prost(string, tag = "1")]
    pub customer_name: String,

    /// Response body.
    #[prost(message, optional, tag = "2")]
    pub response: Option<CustomerResponse>,
}

/// Header of a customer response.
#[derive(Clone, PartialEq, prost::Message)]
pub struct CustomerHeader {
    /// Assembly time, milliseconds since the Unix epoch.
    #[prost(int64, tag = "1")]
    pub gateway_epoch_ms: i64,
}

/// Customer response with one of the supported bodies.
#[derive(Clone, PartialEq, prost::Message)]
pub struct CustomerResponse {
    /// Envelope header.
    #[prost(message, optional, tag = "1")]
    pub header: Option<CustomerHeader>,

    /// Response body.
    #[prost(oneof = "customer_response::Body", tags = "2, 3")]
    pub body: Option<customer_response::Body>,
}

/// Nested types of [`CustomerResponse`].
pub mod customer_response {
    /// Response body variants.
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Body {
        /// Bare acknowledgment to a client.
        #[prost(message, tag = "2")]
        ClientResp(super::ClientResponse),
        /// Answer to a gateway level request.
        #[prost(message, tag = "3")]
        GatewayResp(super::GatewayResponse),
    }
}

/// Client acknowledgment. Carries no fields.
#[derive(Clone, PartialEq, prost::Message)]
pub struct ClientResponse {}

/// Answer to a gateway level request.
#[derive(Clone, PartialEq, prost::Message)]
pub struct GatewayResponse {
    /// Request/response header.
    #[prost(message, optional, tag = "1")]
    pub header: Option<ResponseHeader>,

    /// Present when answering a status request.
    #[prost(message, optional, tag = "2")]
    pub gw_status_resp: Option<GatewayStatusResponse>,
}

/// Gateway software and device status.
#[derive(Clone, PartialEq, prost::Message)]
pub struct GatewayStatusResponse {
    /// Application firmware version.
    #[prost(string, tag = "1")]
    pub app_software: String,

    /// Mesh stack version.
    #[prost(string, tag = "2")]
    pub wirepas_software: String,

    /// Device identifier of the cellular modem.
    #[prost(string, tag = "3")]
    pub imsi: String,
}
