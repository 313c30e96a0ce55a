//! Little-endian, fixed-layout, length-inferred wire codec for the field
//! device link.
//!
//! Telemetry frames (device -> backend) preserve the embedded device's C
//! struct padding byte-for-byte; dispatch frames (backend -> device) are
//! packed. Both are bit-exact round-trippable: `decode(encode(p)) == p` and
//! `encode(decode(b)) == b` for any `b` that decodes successfully.

use thiserror::Error;

/// Magic bytes for a telemetry frame: `"GRID"` little-endian as a u32.
pub const TELEMETRY_MAGIC: u32 = 0x47524944;
/// Magic bytes for a dispatch frame: `"DISP"` little-endian as a u32.
pub const DISPATCH_MAGIC: u32 = 0x44495350;

/// Node type tag carried in a telemetry record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Power,
    Consumer,
}

impl NodeKind {
    fn from_byte(b: u8) -> Self {
        if b == 0 {
            NodeKind::Power
        } else {
            NodeKind::Consumer
        }
    }

    fn to_byte(self) -> u8 {
        match self {
            NodeKind::Power => 0,
            NodeKind::Consumer => 1,
        }
    }
}

/// Single node entry in a telemetry frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryNode {
    pub id: u8,
    pub kind: NodeKind,
    pub demand_amps: f32,
    pub fulfillment: f32,
}

/// A fully decoded telemetry frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryPacket {
    pub timestamp_ms: u32,
    pub nodes: Vec<TelemetryNode>,
}

/// Single node entry in a dispatch frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispatchNode {
    pub id: u8,
    /// Normalized supply in `[0, 1]`.
    pub supply: f32,
    pub source_id: u8,
}

/// A fully encoded/decoded dispatch frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchPacket {
    pub nodes: Vec<DispatchNode>,
}

/// Decode failures for either frame type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("bad magic bytes")]
    BadMagic,
    #[error("frame truncated before header could be read")]
    TruncatedFrame,
    #[error("frame length {actual} does not match node count (expected {expected})")]
    LengthMismatch { expected: usize, actual: usize },
}

const TELEMETRY_NODE_SIZE: usize = 11; // id, type, pad, demand(4), fulfillment(4)
const TELEMETRY_HEADER_SIZE: usize = 9; // magic(4) + timestamp(4) + count(1)
const DISPATCH_NODE_SIZE: usize = 6; // id, supply(4), source
const DISPATCH_HEADER_SIZE: usize = 5; // magic(4) + count(1)

/// Encode a telemetry packet, preserving the 1-byte padding after the type
/// byte so the layout matches the device's C struct exactly.
pub fn encode_telemetry(packet: &TelemetryPacket) -> Vec<u8> {
    let mut buf = Vec::with_capacity(TELEMETRY_HEADER_SIZE + TELEMETRY_NODE_SIZE * packet.nodes.len());
    buf.extend_from_slice(&TELEMETRY_MAGIC.to_le_bytes());
    buf.extend_from_slice(&packet.timestamp_ms.to_le_bytes());
    buf.push(packet.nodes.len() as u8);
    for node in &packet.nodes {
        buf.push(node.id);
        buf.push(node.kind.to_byte());
        buf.push(0); // padding byte, must be preserved for bit-exact layout
        buf.extend_from_slice(&node.demand_amps.to_le_bytes());
        buf.extend_from_slice(&node.fulfillment.to_le_bytes());
    }
    buf
}

/// Decode a telemetry frame. Fails on bad magic, truncation, or a length
/// that does not match the advertised node count. Numeric fields are
/// copied verbatim; no clamping is performed here.
pub fn decode_telemetry(data: &[u8]) -> Result<TelemetryPacket, DecodeError> {
    if data.len() < TELEMETRY_HEADER_SIZE {
        return Err(DecodeError::TruncatedFrame);
    }

    let magic = u32::from_le_bytes(data[0..4].try_into().unwrap());
    if magic != TELEMETRY_MAGIC {
        return Err(DecodeError::BadMagic);
    }

    let timestamp_ms = u32::from_le_bytes(data[4..8].try_into().unwrap());
    let node_count = data[8] as usize;

    let expected = TELEMETRY_HEADER_SIZE + TELEMETRY_NODE_SIZE * node_count;
    if data.len() != expected {
        return Err(DecodeError::LengthMismatch {
            expected,
            actual: data.len(),
        });
    }

    let mut nodes = Vec::with_capacity(node_count);
    let mut offset = TELEMETRY_HEADER_SIZE;
    for _ in 0..node_count {
        let id = data[offset];
        let kind = NodeKind::from_byte(data[offset + 1]);
        // offset + 2 is the padding byte; skipped without inspection.
        let demand_amps = f32::from_le_bytes(data[offset + 3..offset + 7].try_into().unwrap());
        let fulfillment = f32::from_le_bytes(data[offset + 7..offset + 11].try_into().unwrap());
        nodes.push(TelemetryNode {
            id,
            kind,
            demand_amps,
            fulfillment,
        });
        offset += TELEMETRY_NODE_SIZE;
    }

    Ok(TelemetryPacket {
        timestamp_ms,
        nodes,
    })
}

/// Encode a dispatch packet. Total length is exactly `5 + 6*K`.
pub fn encode_dispatch(packet: &DispatchPacket) -> Vec<u8> {
    let mut buf = Vec::with_capacity(DISPATCH_HEADER_SIZE + DISPATCH_NODE_SIZE * packet.nodes.len());
    buf.extend_from_slice(&DISPATCH_MAGIC.to_le_bytes());
    buf.push(packet.nodes.len() as u8);
    for node in &packet.nodes {
        buf.push(node.id);
        buf.extend_from_slice(&node.supply.to_le_bytes());
        buf.push(node.source_id);
    }
    buf
}

/// Decode a dispatch frame.
pub fn decode_dispatch(data: &[u8]) -> Result<DispatchPacket, DecodeError> {
    if data.len() < DISPATCH_HEADER_SIZE {
        return Err(DecodeError::TruncatedFrame);
    }

    let magic = u32::from_le_bytes(data[0..4].try_into().unwrap());
    if magic != DISPATCH_MAGIC {
        return Err(DecodeError::BadMagic);
    }

    let node_count = data[4] as usize;
    let expected = DISPATCH_HEADER_SIZE + DISPATCH_NODE_SIZE * node_count;
    if data.len() != expected {
        return Err(DecodeError::LengthMismatch {
            expected,
            actual: data.len(),
        });
    }

    let mut nodes = Vec::with_capacity(node_count);
    let mut offset = DISPATCH_HEADER_SIZE;
    for _ in 0..node_count {
        let id = data[offset];
        let supply = f32::from_le_bytes(data[offset + 1..offset + 5].try_into().unwrap());
        let source_id = data[offset + 5];
        nodes.push(DispatchNode {
            id,
            supply,
            source_id,
        });
        offset += DISPATCH_NODE_SIZE;
    }

    Ok(DispatchPacket { nodes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telemetry_round_trip() {
        let packet = TelemetryPacket {
            timestamp_ms: 1234,
            nodes: vec![
                TelemetryNode {
                    id: 7,
                    kind: NodeKind::Consumer,
                    demand_amps: 2.5,
                    fulfillment: 96.0,
                },
                TelemetryNode {
                    id: 1,
                    kind: NodeKind::Power,
                    demand_amps: 0.0,
                    fulfillment: 0.0,
                },
            ],
        };
        let bytes = encode_telemetry(&packet);
        assert_eq!(bytes.len(), TELEMETRY_HEADER_SIZE + TELEMETRY_NODE_SIZE * 2);
        let decoded = decode_telemetry(&bytes).unwrap();
        assert_eq!(decoded, packet);
    }

    #[test]
    fn dispatch_round_trip() {
        let packet = DispatchPacket {
            nodes: vec![DispatchNode {
                id: 3,
                supply: 0.42,
                source_id: 9,
            }],
        };
        let bytes = encode_dispatch(&packet);
        assert_eq!(bytes.len(), DISPATCH_HEADER_SIZE + DISPATCH_NODE_SIZE);
        assert_eq!(decode_dispatch(&bytes).unwrap(), packet);
    }

    #[test]
    fn empty_telemetry_round_trips() {
        let packet = TelemetryPacket {
            timestamp_ms: 0,
            nodes: vec![],
        };
        let bytes = encode_telemetry(&packet);
        assert_eq!(bytes.len(), TELEMETRY_HEADER_SIZE);
        assert_eq!(decode_telemetry(&bytes).unwrap(), packet);
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut bytes = encode_telemetry(&TelemetryPacket {
            timestamp_ms: 0,
            nodes: vec![],
        });
        bytes[0] = 0xFF;
        assert_eq!(decode_telemetry(&bytes), Err(DecodeError::BadMagic));
    }

    #[test]
    fn truncated_frame_is_rejected() {
        assert_eq!(decode_telemetry(&[0x44, 0x49]), Err(DecodeError::TruncatedFrame));
        assert_eq!(decode_dispatch(&[0x44]), Err(DecodeError::TruncatedFrame));
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let mut bytes = encode_telemetry(&TelemetryPacket {
            timestamp_ms: 0,
            nodes: vec![TelemetryNode {
                id: 1,
                kind: NodeKind::Power,
                demand_amps: 1.0,
                fulfillment: 1.0,
            }],
        });
        bytes.push(0); // one extra trailing byte
        assert!(matches!(
            decode_telemetry(&bytes),
            Err(DecodeError::LengthMismatch { .. })
        ));
    }

    /// From spec.md §8 scenario 5: bytes decode to timestamp=0, one
    /// consumer node id=7, demand=2.5, fulfillment=96.0.
    #[test]
    fn spec_codec_padding_vector() {
        let bytes: Vec<u8> = vec![
            0x47, 0x52, 0x49, 0x44, 0x00, 0x00, 0x00, 0x00, 0x01, 0x07, 0x01, 0x00, 0x00, 0x00,
            0x20, 0x40, 0x00, 0x00, 0xC0, 0x42,
        ];
        let decoded = decode_telemetry(&bytes).unwrap();
        assert_eq!(decoded.timestamp_ms, 0);
        assert_eq!(decoded.nodes.len(), 1);
        assert_eq!(decoded.nodes[0].id, 7);
        assert_eq!(decoded.nodes[0].kind, NodeKind::Consumer);
        assert_eq!(decoded.nodes[0].demand_amps, 2.5);
        assert_eq!(decoded.nodes[0].fulfillment, 96.0);
    }

    #[test]
    fn encode_decode_is_stable_for_successfully_decoded_bytes() {
        let packet = TelemetryPacket {
            timestamp_ms: 999,
            nodes: vec![TelemetryNode {
                id: 2,
                kind: NodeKind::Consumer,
                demand_amps: 3.3,
                fulfillment: 50.0,
            }],
        };
        let bytes = encode_telemetry(&packet);
        let decoded = decode_telemetry(&bytes).unwrap();
        assert_eq!(encode_telemetry(&decoded), bytes);
    }
}
