use std::mem;
use thiserror::Error;
use zerocopy::{FromBytes, Immutable, KnownLayout, Ref, Unaligned};

use crate::serialize::SerializeError;

pub mod detect;
pub mod gtpv2;
pub mod message;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Gtpv2Error {
    #[error("truncated {name}: need {needed} bytes, have {available}")]
    TruncatedHeader {
        name: &'static str,
        needed: usize,
        available: usize,
    },
    #[error("unsupported GTP version {0} (expected 2)")]
    UnsupportedVersion(u8),
    #[error("empty payload, nothing to dispatch")]
    EmptyPayload,
    #[error("serialize buffer: {0}")]
    BufferAllocation(#[from] SerializeError),
}

pub trait PacketHeader: Sized {
    const FIXED_LEN: usize = mem::size_of::<Self>();
    /// Smallest buffer any variant of this header can occupy
    const MIN_LEN: usize = Self::FIXED_LEN;
    const NAME: &'static str;
    type InnerType;

    /// return the inner type of the header
    fn inner_type(&self) -> Self::InnerType;

    /// Returns the length of the header on the wire.
    /// Variable-length headers derive it from the fixed part.
    fn total_len(&self, buf: &[u8]) -> usize {
        let _ = buf;
        Self::FIXED_LEN
    }

    /// check whether the fixed part describes a header this parser claims
    #[inline]
    fn validate(&self) -> Result<(), Gtpv2Error> {
        Ok(())
    }
}

pub trait HeaderParser: PacketHeader + FromBytes + KnownLayout + Immutable + Unaligned {
    /// The decoded view returned to the user.
    type Output<'a>
    where
        Self: 'a;

    /// Build the output from the fixed part and the variable part that follows it.
    /// `options` is exactly `total_len() - FIXED_LEN` bytes long.
    fn into_view<'a>(header: &'a Self, options: &'a [u8]) -> Result<Self::Output<'a>, Gtpv2Error>;

    /// parse the header, ensuring validity and length, and split off the payload
    #[inline]
    fn from_bytes<'a>(buf: &'a [u8]) -> Result<(Self::Output<'a>, &'a [u8]), Gtpv2Error> {
        let too_short = |needed: usize| Gtpv2Error::TruncatedHeader {
            name: Self::NAME,
            needed,
            available: buf.len(),
        };

        if buf.len() < Self::MIN_LEN {
            return Err(too_short(Self::MIN_LEN));
        }

        let (header_ref, rest_buf) =
            Ref::<_, Self>::from_prefix(buf).map_err(|_| too_short(Self::FIXED_LEN))?;
        let header = Ref::into_ref(header_ref);

        header.validate()?;

        let total_len = header.total_len(buf);
        let options_len = total_len - Self::FIXED_LEN;

        if rest_buf.len() < options_len {
            return Err(too_short(total_len));
        }

        let (options, payload) = rest_buf.split_at(options_len);
        let view = Self::into_view(header, options)?;

        Ok((view, payload))
    }
}
