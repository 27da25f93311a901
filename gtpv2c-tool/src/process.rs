use gtpv2c::layer::{DecodeError, LayerRegistry, LayerStack, LayerType};
use gtpv2c::packet::gtpv2::{Gtpv2C, Gtpv2Layer};
use gtpv2c::packet::message::Gtpv2MessageType;
use gtpv2c::packet::Gtpv2Error;
use gtpv2c::serialize::{PrependBuffer, SerializeBuffer};
use tracing::{debug, warn};

use crate::stats::{LocalStats, Stats, FLUSH_INTERVAL};

/// How decoded messages are printed
#[derive(Debug, Clone, Copy, Default)]
pub struct DumpOptions {
    pub json: bool,
    pub layers: bool,
}

/// Parse a hex string, ignoring whitespace, `:` separators and a leading `0x`
pub fn parse_hex(input: &str) -> Result<Vec<u8>, String> {
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let digits: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();

    hex::decode(&digits).map_err(|e| format!("invalid hex {:?}: {}", input, e))
}

/// Parse a decimal or `0x` prefixed integer
pub fn parse_u32(input: &str) -> Result<u32, String> {
    let result = match input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => input.parse(),
    };
    result.map_err(|e| format!("invalid number {:?}: {}", input, e))
}

pub fn parse_u16(input: &str) -> Result<u16, String> {
    let value = parse_u32(input)?;
    u16::try_from(value).map_err(|_| format!("{} does not fit in 16 bits", value))
}

/// Decode and print one message, updating the counters
pub fn process_message(
    index: u64,
    data: &[u8],
    registry: &LayerRegistry,
    local_stats: &mut LocalStats,
    stats: &Stats,
    dump: DumpOptions,
) -> Result<(), String> {
    local_stats.total_messages += 1;
    local_stats.total_bytes += data.len() as u64;

    let result = decode_message(index, data, registry, local_stats, dump);

    if local_stats.should_flush(FLUSH_INTERVAL) {
        local_stats.flush(stats);
    }
    result
}

fn decode_message(
    index: u64,
    data: &[u8],
    registry: &LayerRegistry,
    local_stats: &mut LocalStats,
    dump: DumpOptions,
) -> Result<(), String> {
    let stack = LayerStack::decode(registry, data, LayerType::GTPV2C);

    if let Some(error) = stack.error_layer() {
        match error {
            DecodeError::Gtpv2(Gtpv2Error::TruncatedHeader { .. }) => local_stats.truncated += 1,
            DecodeError::Gtpv2(Gtpv2Error::UnsupportedVersion(_)) => {
                local_stats.unsupported_version += 1
            }
            _ => local_stats.other_errors += 1,
        }
        return Err(format!("message {}: {}", index, error));
    }

    let Some(gtp) = stack.gtpv2() else {
        local_stats.other_errors += 1;
        return Err(format!("message {}: no GTPv2-C layer decoded", index));
    };

    count_header(gtp, local_stats);

    let next = match gtp.next_layer_type() {
        Ok(layer_type) => {
            match layer_type {
                LayerType::IPV4 => local_stats.ipv4 += 1,
                LayerType::IPV6 => local_stats.ipv6 += 1,
                _ => local_stats.ppp += 1,
            }
            Some(layer_type)
        }
        Err(_) => {
            local_stats.no_payload += 1;
            None
        }
    };
    debug!(index, next = ?next, "message decoded");

    if dump.json {
        let value = serde_json::json!({
            "index": index,
            "header": gtp.header,
            "header_len": gtp.contents.len(),
            "payload_len": gtp.payload.len(),
            "next": next.map(|t| t.to_string()),
        });
        println!("{}", value);
        return Ok(());
    }

    println!("{:>5}   {} ({} bytes)", index, gtp, data.len());
    println!(
        "        header {} bytes, payload {} bytes, next {}",
        gtp.contents.len(),
        gtp.payload.len(),
        next.map_or_else(|| "none".to_string(), |t| t.to_string())
    );
    if dump.layers {
        for layer in stack.layers() {
            println!("        {layer}");
        }
    }
    Ok(())
}

fn count_header(gtp: &Gtpv2Layer<'_>, local_stats: &mut LocalStats) {
    local_stats.header_bytes += gtp.contents.len() as u64;

    if gtp.teid_flag {
        local_stats.with_teid += 1;
    }
    if gtp.piggybacking_flag {
        local_stats.piggybacked += 1;
    }
    if gtp.message_type.is_path_management() {
        local_stats.path_management += 1;
    }
    if !gtp.message_type.is_valid() {
        warn!(message_type = gtp.message_type.0, "unknown message type");
        local_stats.unknown_message_type += 1;
    }
}

/// Fields for a message to encode
#[derive(Debug, Clone)]
pub struct EncodeRequest {
    pub message_type: Gtpv2MessageType,
    pub teid: Option<u32>,
    pub sequence_number: u32,
    pub message_length: Option<u16>,
    pub piggyback: bool,
    pub body: Vec<u8>,
}

/// Encode the header in front of the body
pub fn encode_message(request: &EncodeRequest) -> Result<Vec<u8>, String> {
    let mut header = match request.teid {
        Some(teid) => Gtpv2C::new(request.message_type, teid, request.sequence_number),
        None => Gtpv2C::new_no_teid(request.message_type, request.sequence_number),
    };
    header.piggybacking_flag = request.piggyback;

    if request.sequence_number > 0x00FF_FFFF {
        warn!(
            sequence = request.sequence_number,
            "sequence number truncated to 24 bits"
        );
    }

    header.message_length = match request.message_length {
        Some(length) => length,
        None => {
            let length = header.header_length() - Gtpv2C::LENGTH_EXCLUDED + request.body.len();
            u16::try_from(length)
                .map_err(|_| format!("message length {} does not fit in 16 bits", length))?
        }
    };

    let mut buf = PrependBuffer::new();
    buf.append_bytes(request.body.len())
        .map_err(|e| e.to_string())?
        .copy_from_slice(&request.body);
    header.serialize_to(&mut buf).map_err(|e| e.to_string())?;

    debug!(%header, body_len = request.body.len(), "message encoded");
    Ok(buf.into_vec())
}
