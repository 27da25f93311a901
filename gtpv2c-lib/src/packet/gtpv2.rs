//! GTPv2-C (GPRS Tunneling Protocol version 2, control plane) header codec
//!
//! Decodes and encodes the header defined in 3GPP TS 29.274 section 5.1.
//! The message body (Information Elements) is left as payload.
//!
//! # GTPv2-C Header Format
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! | Ver |P|T|Spare|  Message Type |         Message Length        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                         TEID (if T=1)                         |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |               Sequence Number                 |    Spare      |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! The header is 8 bytes when T=0 and 12 bytes when T=1. The sequence number
//! window always starts right after the TEID (or after the first 4 bytes).
//!
//! # Examples
//!
//! ## Decoding
//!
//! ```
//! use gtpv2c::packet::gtpv2::Gtpv2C;
//! use gtpv2c::packet::message::Gtpv2MessageType;
//!
//! let packet = [
//!     0x48,                    // Version 2, P=0, T=1
//!     0x20,                    // Create Session Request
//!     0x01, 0x07,              // Length: 263
//!     0x00, 0x00, 0x00, 0x00,  // TEID: 0
//!     0x00, 0x14, 0x4c,        // Sequence number: 5196
//!     0x00,                    // Spare
//! ];
//!
//! let (header, consumed) = Gtpv2C::decode(&packet).unwrap();
//! assert_eq!(consumed, 12);
//! assert_eq!(header.version, 2);
//! assert!(header.teid_flag);
//! assert_eq!(header.message_type, Gtpv2MessageType::CREATE_SESSION_REQUEST);
//! assert_eq!(header.message_length, 263);
//! assert_eq!(header.sequence_number, 5196);
//! ```
//!
//! ## Encoding in front of a body
//!
//! ```
//! use gtpv2c::packet::gtpv2::Gtpv2C;
//! use gtpv2c::packet::message::Gtpv2MessageType;
//! use gtpv2c::serialize::{PrependBuffer, SerializeBuffer};
//!
//! let mut buf = PrependBuffer::new();
//! buf.append_bytes(5).unwrap().copy_from_slice(&[0x03, 0x00, 0x01, 0x00, 0x2a]); // Recovery IE
//!
//! let mut header = Gtpv2C::new_no_teid(Gtpv2MessageType::ECHO_RESPONSE, 7);
//! header.message_length = 4 + 5;
//! header.serialize_to(&mut buf).unwrap();
//!
//! assert_eq!(&buf.bytes()[..8], &[0x40, 0x02, 0x00, 0x09, 0x00, 0x00, 0x07, 0x00]);
//! assert_eq!(buf.len(), 13);
//! ```

use std::fmt::{self, Formatter};

use serde::{Deserialize, Serialize};
use tracing::trace;
use zerocopy::byteorder::{BigEndian, U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Ref, Unaligned};

use crate::layer::{DecodeError, Layer, LayerType, PacketBuilder};
use crate::packet::detect::detect_inner_protocol;
use crate::packet::message::Gtpv2MessageType;
use crate::packet::{Gtpv2Error, HeaderParser, PacketHeader};
use crate::serialize::SerializeBuffer;

/// GTPv2-C standard port
pub const GTPV2_C_PORT: u16 = 2123;

/// Check if port is GTPv2-C
#[inline]
pub fn is_gtpv2_c_port(port: u16) -> bool {
    port == GTPV2_C_PORT
}

/// Fixed 4-byte part of the GTPv2-C header, as laid out on the wire
#[repr(C, packed)]
#[derive(FromBytes, IntoBytes, Unaligned, Debug, Clone, Copy, KnownLayout, Immutable)]
pub struct Gtpv2FixedHeader {
    flags: u8,
    message_type: Gtpv2MessageType,
    length: U16<BigEndian>,
}

impl Gtpv2FixedHeader {
    /// Version field mask (bits 5-7)
    pub const VERSION_MASK: u8 = 0xE0;
    pub const VERSION_SHIFT: u8 = 5;

    /// Piggybacking flag (bit 4)
    pub const FLAG_P: u8 = 0x10;

    /// TEID flag (bit 3): 1 = TEID present
    pub const FLAG_T: u8 = 0x08;

    /// GTPv2 version number
    pub const VERSION_2: u8 = 2;

    #[inline]
    pub fn new(flags: u8, message_type: Gtpv2MessageType, length: u16) -> Self {
        Gtpv2FixedHeader {
            flags,
            message_type,
            length: U16::new(length),
        }
    }

    #[inline]
    pub fn flags(&self) -> u8 {
        self.flags
    }

    #[inline]
    pub fn version(&self) -> u8 {
        (self.flags & Self::VERSION_MASK) >> Self::VERSION_SHIFT
    }

    #[inline]
    pub fn has_piggybacking(&self) -> bool {
        self.flags & Self::FLAG_P != 0
    }

    #[inline]
    pub fn has_teid(&self) -> bool {
        self.flags & Self::FLAG_T != 0
    }

    #[inline]
    pub fn message_type(&self) -> Gtpv2MessageType {
        self.message_type
    }

    /// Returns the length field (message length excluding first 4 bytes)
    #[inline]
    pub fn length(&self) -> u16 {
        self.length.get()
    }

    #[inline]
    pub fn header_length(&self) -> usize {
        Gtpv2C::header_length_for(self.has_teid())
    }
}

impl PacketHeader for Gtpv2FixedHeader {
    const NAME: &'static str = "Gtpv2Header";
    const MIN_LEN: usize = Gtpv2C::HEADER_LEN_NO_TEID;
    type InnerType = Gtpv2MessageType;

    #[inline]
    fn inner_type(&self) -> Self::InnerType {
        self.message_type
    }

    #[inline]
    fn total_len(&self, _buf: &[u8]) -> usize {
        self.header_length()
    }

    #[inline]
    fn validate(&self) -> Result<(), Gtpv2Error> {
        match self.version() {
            Self::VERSION_2 => Ok(()),
            v => Err(Gtpv2Error::UnsupportedVersion(v)),
        }
    }
}

impl HeaderParser for Gtpv2FixedHeader {
    type Output<'a> = Gtpv2C;

    /// `from_bytes` always passes the full `header_length() - FIXED_LEN` bytes;
    /// a shorter `options` from a direct call is reported as truncated.
    fn into_view<'a>(header: &'a Self, options: &'a [u8]) -> Result<Gtpv2C, Gtpv2Error> {
        let truncated = || Gtpv2Error::TruncatedHeader {
            name: Self::NAME,
            needed: header.header_length(),
            available: Self::FIXED_LEN + options.len(),
        };

        let (teid, window) = if header.has_teid() {
            let (teid, rest) =
                Ref::<_, U32<BigEndian>>::from_prefix(options).map_err(|_| truncated())?;
            (teid.get(), rest)
        } else {
            (0, options)
        };

        let (sequence, _) =
            Ref::<_, Gtpv2Sequence>::from_prefix(window).map_err(|_| truncated())?;

        Ok(Gtpv2C {
            version: header.version(),
            piggybacking_flag: header.has_piggybacking(),
            teid_flag: header.has_teid(),
            message_type: header.message_type(),
            message_length: header.length(),
            teid,
            sequence_number: sequence.get(),
        })
    }
}

/// Sequence number window: 3 significant bytes followed by a spare byte
#[repr(C, packed)]
#[derive(FromBytes, IntoBytes, Unaligned, Debug, Clone, Copy, KnownLayout, Immutable)]
pub struct Gtpv2Sequence {
    number: [u8; 3],
    spare: u8,
}

impl Gtpv2Sequence {
    pub const MAX: u32 = 0x00FF_FFFF;

    /// Spare byte is always written as zero; bits above 24 are dropped
    #[inline]
    pub fn new(sequence_number: u32) -> Self {
        let [_, hi, mid, lo] = (sequence_number & Self::MAX).to_be_bytes();
        Gtpv2Sequence {
            number: [hi, mid, lo],
            spare: 0,
        }
    }

    #[inline]
    pub fn get(&self) -> u32 {
        let [hi, mid, lo] = self.number;
        u32::from_be_bytes([0, hi, mid, lo])
    }

    #[inline]
    pub fn spare(&self) -> u8 {
        self.spare
    }
}

/// A GTPv2-C header
///
/// `teid` is only carried on the wire when `teid_flag` is set; it is zero after
/// decoding a header without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gtpv2C {
    pub version: u8,
    pub piggybacking_flag: bool,
    pub teid_flag: bool,
    pub message_type: Gtpv2MessageType,
    pub message_length: u16,
    pub teid: u32,
    pub sequence_number: u32,
}

impl Default for Gtpv2C {
    fn default() -> Self {
        Gtpv2C {
            version: Gtpv2FixedHeader::VERSION_2,
            piggybacking_flag: false,
            teid_flag: false,
            message_type: Gtpv2MessageType::default(),
            message_length: 0,
            teid: 0,
            sequence_number: 0,
        }
    }
}

impl Gtpv2C {
    /// Header length without TEID
    pub const HEADER_LEN_NO_TEID: usize = 8;

    /// Header length with TEID
    pub const HEADER_LEN_WITH_TEID: usize = 12;

    /// Bytes of the header not counted by the message length field
    pub const LENGTH_EXCLUDED: usize = 4;

    /// Header with TEID and an empty body
    pub fn new(message_type: Gtpv2MessageType, teid: u32, sequence_number: u32) -> Self {
        Gtpv2C {
            teid_flag: true,
            message_type,
            message_length: (Self::HEADER_LEN_WITH_TEID - Self::LENGTH_EXCLUDED) as u16,
            teid,
            sequence_number,
            ..Default::default()
        }
    }

    /// Header without TEID and an empty body
    pub fn new_no_teid(message_type: Gtpv2MessageType, sequence_number: u32) -> Self {
        Gtpv2C {
            message_type,
            message_length: (Self::HEADER_LEN_NO_TEID - Self::LENGTH_EXCLUDED) as u16,
            sequence_number,
            ..Default::default()
        }
    }

    #[inline]
    pub fn header_length_for(teid_flag: bool) -> usize {
        if teid_flag {
            Self::HEADER_LEN_WITH_TEID
        } else {
            Self::HEADER_LEN_NO_TEID
        }
    }

    #[inline]
    pub fn header_length(&self) -> usize {
        Self::header_length_for(self.teid_flag)
    }

    /// First header byte as written on the wire
    #[inline]
    pub fn flags(&self) -> u8 {
        let mut flags = (self.version & 0x07) << Gtpv2FixedHeader::VERSION_SHIFT;
        if self.piggybacking_flag {
            flags |= Gtpv2FixedHeader::FLAG_P;
        }
        if self.teid_flag {
            flags |= Gtpv2FixedHeader::FLAG_T;
        }
        flags
    }

    /// Returns a string representation of active flags
    pub fn flags_string(&self) -> String {
        let mut flags = Vec::new();

        if self.piggybacking_flag {
            flags.push("P");
        }
        if self.teid_flag {
            flags.push("T");
        }

        if flags.is_empty() {
            "none".to_string()
        } else {
            flags.join(",")
        }
    }

    /// The TEID, if the header carries one
    #[inline]
    pub fn teid(&self) -> Option<u32> {
        self.teid_flag.then_some(self.teid)
    }

    /// Decode a header from the start of `data`.
    ///
    /// Returns the header and the number of bytes it occupies (8 or 12).
    pub fn decode(data: &[u8]) -> Result<(Gtpv2C, usize), Gtpv2Error> {
        let (header, payload) = Gtpv2FixedHeader::from_bytes(data)?;
        Ok((header, data.len() - payload.len()))
    }

    /// Prepend the encoded header to `buf`.
    ///
    /// Anything already in the buffer stays after the header. Failure to
    /// reserve space is returned as [`Gtpv2Error::BufferAllocation`].
    pub fn serialize_to<B: SerializeBuffer + ?Sized>(&self, buf: &mut B) -> Result<(), Gtpv2Error> {
        let bytes = buf.prepend_bytes(self.header_length())?;
        self.write_header(bytes);
        Ok(())
    }

    /// Encode the header into a new vector
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = vec![0; self.header_length()];
        self.write_header(&mut bytes);
        bytes
    }

    // `dst` is exactly `header_length()` bytes
    fn write_header(&self, dst: &mut [u8]) {
        let fixed = Gtpv2FixedHeader::new(self.flags(), self.message_type, self.message_length);
        let (fixed_dst, rest) = dst.split_at_mut(Gtpv2FixedHeader::FIXED_LEN);
        fixed_dst.copy_from_slice(fixed.as_bytes());

        let sequence_dst = if self.teid_flag {
            let (teid_dst, sequence_dst) = rest.split_at_mut(4);
            teid_dst.copy_from_slice(U32::<BigEndian>::new(self.teid).as_bytes());
            sequence_dst
        } else {
            rest
        };

        sequence_dst.copy_from_slice(Gtpv2Sequence::new(self.sequence_number).as_bytes());
    }
}

impl fmt::Display for Gtpv2C {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GTPv2-C msg={} len={}",
            self.message_type, self.message_length
        )?;

        if let Some(teid) = self.teid() {
            write!(f, " teid=0x{:08x}", teid)?;
        }

        write!(f, " seq={} flags=[{}]", self.sequence_number, self.flags_string())
    }
}

/// A decoded GTPv2-C layer with the bytes it was decoded from.
///
/// `contents` and `payload` borrow from the caller's buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gtpv2Layer<'a> {
    pub header: Gtpv2C,
    pub contents: &'a [u8],
    pub payload: &'a [u8],
}

impl<'a> Gtpv2Layer<'a> {
    pub fn decode(data: &'a [u8]) -> Result<Self, Gtpv2Error> {
        let (header, payload) = Gtpv2FixedHeader::from_bytes(data)?;
        let (contents, _) = data.split_at(data.len() - payload.len());

        Ok(Gtpv2Layer {
            header,
            contents,
            payload,
        })
    }

    #[inline]
    pub fn layer_type(&self) -> LayerType {
        LayerType::GTPV2C
    }

    #[inline]
    pub fn layer_contents(&self) -> &'a [u8] {
        self.contents
    }

    #[inline]
    pub fn layer_payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Protocol carried in the payload, from its first nibble
    #[inline]
    pub fn next_layer_type(&self) -> Result<LayerType, Gtpv2Error> {
        detect_inner_protocol(self.payload)
    }
}

impl std::ops::Deref for Gtpv2Layer<'_> {
    type Target = Gtpv2C;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.header
    }
}

impl fmt::Display for Gtpv2Layer<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.header)
    }
}

/// Decoder registered for [`LayerType::GTPV2C`]
///
/// A header with nothing after it ends the packet.
pub fn decode_gtpv2c<'a>(
    data: &'a [u8],
    builder: &mut dyn PacketBuilder<'a>,
) -> Result<(), DecodeError> {
    let layer = Gtpv2Layer::decode(data)?;
    trace!(header = %layer.header, payload_len = layer.payload.len(), "decoded GTPv2-C");

    builder.add_layer(Layer::Gtpv2(layer));

    if layer.payload.is_empty() {
        return Ok(());
    }
    builder.next_decoder(layer.next_layer_type()?, layer.payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialize::{PrependBuffer, SerializeError};
    use proptest::prelude::*;

    const CREATE_SESSION_BARE: [u8; 12] = [
        0x48, 0x20, 0x01, 0x07, 0x00, 0x00, 0x00, 0x00, 0x00, 0x14, 0x4c, 0x00,
    ];

    #[test]
    fn test_gtpv2_fixed_header_size() {
        assert_eq!(std::mem::size_of::<Gtpv2FixedHeader>(), 4);
        assert_eq!(Gtpv2FixedHeader::FIXED_LEN, 4);
        assert_eq!(Gtpv2FixedHeader::MIN_LEN, 8);
        assert_eq!(std::mem::size_of::<Gtpv2Sequence>(), 4);
    }

    #[test]
    fn test_gtpv2_decode_create_session() {
        let (header, consumed) = Gtpv2C::decode(&CREATE_SESSION_BARE).unwrap();

        assert_eq!(consumed, 12);
        assert_eq!(header.version, 2);
        assert!(!header.piggybacking_flag);
        assert!(header.teid_flag);
        assert_eq!(header.message_type, Gtpv2MessageType(32));
        assert_eq!(header.message_length, 263);
        assert_eq!(header.teid, 0);
        assert_eq!(header.teid(), Some(0));
        assert_eq!(header.sequence_number, 5196);
    }

    #[test]
    fn test_gtpv2_flag_bits() {
        let (header, _) = Gtpv2FixedHeader::from_bytes(&CREATE_SESSION_BARE).unwrap();
        assert_eq!(header.version, 2);
        assert!(!header.piggybacking_flag);
        assert!(header.teid_flag);

        let packet = [0x58, 0x21, 0x00, 0x08, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x01, 0x00];
        let (header, _) = Gtpv2C::decode(&packet).unwrap();
        assert!(header.piggybacking_flag);
        assert!(header.teid_flag);
        assert_eq!(header.teid, 2);
        assert_eq!(header.flags_string(), "P,T");
    }

    #[test]
    fn test_gtpv2_reserved_bits_ignored() {
        // low three bits of byte 0 set: consumed, not exposed, not re-emitted
        let packet = [0x47, 0x01, 0x00, 0x04, 0x00, 0x00, 0x09, 0x00];
        let (header, consumed) = Gtpv2C::decode(&packet).unwrap();
        assert_eq!(consumed, 8);
        assert_eq!(header.version, 2);
        assert!(!header.teid_flag);
        assert!(!header.piggybacking_flag);
        assert_eq!(header.encode()[0], 0x40);
    }

    #[test]
    fn test_gtpv2_echo_request_no_teid() {
        let packet = [
            0x40, // Version 2, P=0, T=0
            0x01, // Echo Request
            0x00, 0x04, // Length: 4
            0x00, 0x00, 0x01, // Sequence number: 1
            0x00, // Spare
        ];

        let (header, consumed) = Gtpv2C::decode(&packet).unwrap();
        assert_eq!(consumed, 8);
        assert!(!header.teid_flag);
        assert_eq!(header.teid, 0);
        assert_eq!(header.teid(), None);
        assert_eq!(header.message_type, Gtpv2MessageType::ECHO_REQUEST);
        assert_eq!(header.sequence_number, 1);
        assert_eq!(header.flags_string(), "none");
    }

    #[test]
    fn test_gtpv2_consumed_ignores_trailing_bytes() {
        let mut packet = CREATE_SESSION_BARE.to_vec();
        packet.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef, 0x00]);
        let (_, consumed) = Gtpv2C::decode(&packet).unwrap();
        assert_eq!(consumed, 12);

        // same bytes with T cleared: TEID bytes now read as sequence window
        packet[0] = 0x40;
        let (header, consumed) = Gtpv2C::decode(&packet).unwrap();
        assert_eq!(consumed, 8);
        assert_eq!(header.sequence_number, 0);
    }

    #[test]
    fn test_gtpv2_sequence_after_teid() {
        // TEID bytes must not bleed into the sequence number
        let packet = [0x48, 0x20, 0x00, 0x08, 0xAA, 0xBB, 0xCC, 0xDD, 0x12, 0x34, 0x56, 0xff];
        let (header, _) = Gtpv2C::decode(&packet).unwrap();
        assert_eq!(header.teid, 0xAABBCCDD);
        assert_eq!(header.sequence_number, 0x123456);
    }

    #[test]
    fn test_gtpv2_max_values() {
        let packet = [0x48, 0x20, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00];
        let (header, _) = Gtpv2C::decode(&packet).unwrap();
        assert_eq!(header.message_length, 0xFFFF);
        assert_eq!(header.teid, 0xFFFF_FFFF);
        assert_eq!(header.sequence_number, 0xFF_FFFF);
    }

    #[test]
    fn test_gtpv2_truncated() {
        for len in 0..8 {
            let err = Gtpv2C::decode(&CREATE_SESSION_BARE[..len]).unwrap_err();
            assert_eq!(
                err,
                Gtpv2Error::TruncatedHeader {
                    name: "Gtpv2Header",
                    needed: 8,
                    available: len
                }
            );
        }

        // T=1 needs the full 12 bytes
        for len in 8..12 {
            let err = Gtpv2C::decode(&CREATE_SESSION_BARE[..len]).unwrap_err();
            assert!(matches!(
                err,
                Gtpv2Error::TruncatedHeader { needed: 12, .. }
            ));
        }
    }

    #[test]
    fn test_gtpv2_sequence_window_excludes_trailing_spare() {
        // sequence bytes 8-10 are 00 00 14, byte 11 (0x4c) is the spare byte
        let packet = [0x48, 0x20, 0x01, 0x07, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x14, 0x4c];
        let (header, consumed) = Gtpv2C::decode(&packet).unwrap();

        assert_eq!(consumed, 12);
        assert_eq!(header.message_type, Gtpv2MessageType::CREATE_SESSION_REQUEST);
        assert_eq!(header.message_length, 263);
        assert_eq!(header.teid, 0);
        assert_eq!(header.sequence_number, 0x14);

        // re-encoding zeroes the spare byte
        assert_eq!(&header.encode()[8..], &[0x00, 0x00, 0x14, 0x00]);
    }

    #[test]
    fn test_gtpv2_into_view_short_options() {
        let fixed = Gtpv2FixedHeader::new(0x48, Gtpv2MessageType::CREATE_SESSION_REQUEST, 8);

        let err = Gtpv2FixedHeader::into_view(&fixed, &[0x00, 0x00, 0x00, 0x01, 0x00]).unwrap_err();
        assert_eq!(
            err,
            Gtpv2Error::TruncatedHeader {
                name: "Gtpv2Header",
                needed: 12,
                available: 9
            }
        );

        let view = Gtpv2FixedHeader::into_view(&fixed, &[0, 0, 0, 1, 0, 0, 2, 0]).unwrap();
        assert_eq!(view.teid, 1);
        assert_eq!(view.sequence_number, 2);
    }

    #[test]
    fn test_gtpv2_truncated_before_version_check() {
        // a short GTPv1 buffer is reported as truncated
        let err = Gtpv2C::decode(&[0x30, 0x01, 0x00]).unwrap_err();
        assert!(matches!(err, Gtpv2Error::TruncatedHeader { .. }));
    }

    #[test]
    fn test_gtpv2_unsupported_version() {
        let packet = [0x30, 0x01, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00];
        assert_eq!(
            Gtpv2C::decode(&packet).unwrap_err(),
            Gtpv2Error::UnsupportedVersion(1)
        );

        let packet = [0x68, 0x01, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00];
        assert_eq!(
            Gtpv2C::decode(&packet).unwrap_err(),
            Gtpv2Error::UnsupportedVersion(3)
        );
    }

    #[test]
    fn test_gtpv2_encode_with_teid() {
        let header = Gtpv2C {
            message_length: 263,
            ..Gtpv2C::new(Gtpv2MessageType::CREATE_SESSION_REQUEST, 0, 5196)
        };
        assert_eq!(header.encode(), CREATE_SESSION_BARE.to_vec());
    }

    #[test]
    fn test_gtpv2_encode_without_teid() {
        let header = Gtpv2C {
            piggybacking_flag: true,
            ..Gtpv2C::new_no_teid(Gtpv2MessageType::ECHO_REQUEST, 0x010203)
        };
        assert_eq!(
            header.encode(),
            vec![0x50, 0x01, 0x00, 0x04, 0x01, 0x02, 0x03, 0x00]
        );
    }

    #[test]
    fn test_gtpv2_encode_ignores_teid_without_flag() {
        let header = Gtpv2C {
            teid: 0xdeadbeef,
            ..Gtpv2C::new_no_teid(Gtpv2MessageType::ECHO_REQUEST, 1)
        };
        let bytes = header.encode();
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[4..], &[0x00, 0x00, 0x01, 0x00]);
    }

    #[test]
    fn test_gtpv2_encode_masks_sequence() {
        let header = Gtpv2C::new_no_teid(Gtpv2MessageType::ECHO_REQUEST, 0xAB12_3456);
        let bytes = header.encode();
        assert_eq!(&bytes[4..], &[0x12, 0x34, 0x56, 0x00]);
    }

    #[test]
    fn test_gtpv2_roundtrip_with_teid() {
        let want = Gtpv2C {
            message_length: 263,
            ..Gtpv2C::new(Gtpv2MessageType::CREATE_SESSION_REQUEST, 8, 5196)
        };

        let mut buf = PrependBuffer::new();
        want.serialize_to(&mut buf).unwrap();

        let (got, consumed) = Gtpv2C::decode(buf.bytes()).unwrap();
        assert_eq!(consumed, 12);
        assert_eq!(got, want);
    }

    #[test]
    fn test_gtpv2_layer_reserialize_matches_contents() {
        let layer = Gtpv2Layer::decode(&CREATE_SESSION_BARE).unwrap();
        assert_eq!(layer.contents, &CREATE_SESSION_BARE[..]);
        assert!(layer.payload.is_empty());

        let mut buf = PrependBuffer::new();
        layer.serialize_to(&mut buf).unwrap();
        assert_eq!(buf.bytes(), layer.contents);
    }

    #[test]
    fn test_gtpv2_serialize_prepends() {
        let mut buf = PrependBuffer::new();
        buf.append_bytes(4).unwrap().copy_from_slice(&[0x45, 0x00, 0x00, 0x14]);

        Gtpv2C::new(Gtpv2MessageType::CREATE_SESSION_REQUEST, 1, 2)
            .serialize_to(&mut buf)
            .unwrap();

        assert_eq!(buf.len(), 16);
        assert_eq!(&buf.bytes()[12..], &[0x45, 0x00, 0x00, 0x14]);

        let layer = Gtpv2Layer::decode(buf.bytes()).unwrap();
        assert_eq!(layer.teid, 1);
        assert_eq!(layer.sequence_number, 2);
        assert_eq!(layer.next_layer_type(), Ok(LayerType::IPV4));
    }

    #[test]
    fn test_gtpv2_serialize_allocation_failure() {
        let mut buf = PrependBuffer::with_capacity_limit(10);
        let err = Gtpv2C::new(Gtpv2MessageType::ECHO_REQUEST, 1, 1)
            .serialize_to(&mut buf)
            .unwrap_err();

        assert_eq!(
            err,
            Gtpv2Error::BufferAllocation(SerializeError::HeadroomExhausted {
                requested: 12,
                available: 10
            })
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn test_gtpv2_encode_deterministic() {
        let header = Gtpv2C::new(Gtpv2MessageType::MODIFY_BEARER_REQUEST, 0x1234, 99);
        assert_eq!(header.encode(), header.encode());
    }

    #[test]
    fn test_gtpv2_layer_next_layer_type() {
        let mut packet = CREATE_SESSION_BARE.to_vec();
        packet.push(0x60);
        let layer = Gtpv2Layer::decode(&packet).unwrap();
        assert_eq!(layer.layer_type(), LayerType::GTPV2C);
        assert_eq!(layer.layer_payload(), &[0x60]);
        assert_eq!(layer.next_layer_type(), Ok(LayerType::IPV6));

        let layer = Gtpv2Layer::decode(&CREATE_SESSION_BARE).unwrap();
        assert_eq!(layer.next_layer_type(), Err(Gtpv2Error::EmptyPayload));
    }

    #[test]
    fn test_gtpv2_display() {
        let header = Gtpv2C::new(Gtpv2MessageType::CREATE_SESSION_REQUEST, 1, 66);
        let display = format!("{}", header);
        assert_eq!(
            display,
            "GTPv2-C msg=create-session-request len=8 teid=0x00000001 seq=66 flags=[T]"
        );

        let header = Gtpv2C::new_no_teid(Gtpv2MessageType::ECHO_REQUEST, 3);
        assert!(!format!("{}", header).contains("teid"));
    }

    #[test]
    fn test_gtpv2_port() {
        assert!(is_gtpv2_c_port(2123));
        assert!(!is_gtpv2_c_port(2152));
    }

    #[test]
    fn test_gtpv2_sequence_window() {
        let seq = Gtpv2Sequence::new(0x00AB_CDEF);
        assert_eq!(seq.as_bytes(), &[0xAB, 0xCD, 0xEF, 0x00]);
        assert_eq!(seq.get(), 0xAB_CDEF);
        assert_eq!(seq.spare(), 0);
    }

    fn arb_header() -> impl Strategy<Value = Gtpv2C> {
        (
            any::<bool>(),
            any::<bool>(),
            any::<u8>(),
            any::<u16>(),
            any::<u32>(),
            0u32..=Gtpv2Sequence::MAX,
        )
            .prop_map(|(piggybacking_flag, teid_flag, mt, message_length, teid, sequence_number)| {
                Gtpv2C {
                    version: 2,
                    piggybacking_flag,
                    teid_flag,
                    message_type: Gtpv2MessageType(mt),
                    message_length,
                    // not carried on the wire without the flag
                    teid: if teid_flag { teid } else { 0 },
                    sequence_number,
                }
            })
    }

    proptest! {
        #[test]
        fn prop_gtpv2_roundtrip(
            header in arb_header(),
            body in prop::collection::vec(any::<u8>(), 0..16),
        ) {
            let mut buf = PrependBuffer::new();
            buf.append_bytes(body.len()).unwrap().copy_from_slice(&body);
            header.serialize_to(&mut buf).unwrap();

            let layer = Gtpv2Layer::decode(buf.bytes()).unwrap();
            prop_assert_eq!(layer.header, header);
            prop_assert_eq!(layer.contents.len(), header.header_length());
            prop_assert_eq!(layer.payload, &body[..]);
        }

        #[test]
        fn prop_gtpv2_encode_deterministic(header in arb_header()) {
            let mut buf = PrependBuffer::new();
            header.serialize_to(&mut buf).unwrap();
            prop_assert_eq!(buf.bytes(), &header.encode()[..]);
        }
    }
}
