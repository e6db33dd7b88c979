//! Telemetry records streamed on the realtime situation channel.
//!
//! A binary frame carries either a single [`Message`] (heartbeats,
//! startup situation entries) or a [`MessageCollection`] batch.

use prost::Message as _;

use crate::error::ClientError;

/// A single telemetry record.
///
/// During the startup situation a record either announces how many nodes
/// follow ([`RtSituationMetadata`]) or describes one loaded node, identified
/// by its `(network_id, source_address)` pair.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Message {
    /// Mesh address of the node that produced the record.
    #[prost(uint32, optional, tag = "1")]
    pub source_address: Option<u32>,

    /// Mesh network the node belongs to.
    #[prost(uint32, optional, tag = "2")]
    pub network_id: Option<u32>,

    /// Backend reception time, milliseconds since the Unix epoch.
    #[prost(uint64, optional, tag = "3")]
    pub rx_time_ms_epoch: Option<u64>,

    /// Travel time through the mesh in milliseconds.
    #[prost(uint32, optional, tag = "4")]
    pub travel_time_ms: Option<u32>,

    /// Number of hops from node to sink.
    #[prost(uint32, optional, tag = "5")]
    pub hop_count: Option<u32>,

    /// Present on the first startup situation message.
    #[prost(message, optional, tag = "6")]
    pub rtsituation_metadata: Option<RtSituationMetadata>,

    /// Raw application payload.
    #[prost(bytes = "vec", optional, tag = "7")]
    pub payload: Option<Vec<u8>>,
}

impl Message {
    /// Returns the `(network_id, source_address)` pair when both are set.
    #[must_use]
    pub fn node_key(&self) -> Option<(u32, u32)> {
        Some((self.network_id?, self.source_address?))
    }
}

/// Metadata announcing the size of the startup situation.
#[derive(Clone, PartialEq, prost::Message)]
pub struct RtSituationMetadata {
    /// Number of node records that follow.
    #[prost(uint32, optional, tag = "1")]
    pub node_count: Option<u32>,
}

/// A batch of telemetry records.
#[derive(Clone, PartialEq, prost::Message)]
pub struct MessageCollection {
    /// Records in arrival order.
    #[prost(message, repeated, tag = "1")]
    pub message_collection: Vec<Message>,
}

/// Decodes a binary frame as a single record.
///
/// # Errors
///
/// Returns [`ClientError::Decode`] if the bytes are not a valid `Message`.
pub fn decode_message(bytes: &[u8]) -> Result<Message, ClientError> {
    Ok(Message::decode(bytes)?)
}

/// Decodes a binary frame as a batch.
///
/// # Errors
///
/// Returns [`ClientError::Decode`] if the bytes are not a valid
/// `MessageCollection`. A single `Message` frame normally fails here
/// because its first field is a varint.
pub fn decode_collection(bytes: &[u8]) -> Result<MessageCollection, ClientError> {
    Ok(MessageCollection::decode(bytes)?)
}
