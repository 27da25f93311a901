//! Payload protocol detection.
//!
//! A GTPv2-C message can be followed by an encapsulated packet. Its protocol
//! is told apart by the high nibble of the first payload byte, the same way
//! an MPLS or GTP-U payload is classified.

use crate::layer::LayerType;
use crate::packet::Gtpv2Error;

/// IP version nibble of an IPv4 header
const IPV4_VERSION: u8 = 4;

/// IP version nibble of an IPv6 header
const IPV6_VERSION: u8 = 6;

/// Choose the layer that decodes `payload`.
///
/// | high nibble | layer                 |
/// |-------------|-----------------------|
/// | 4           | [`LayerType::IPV4`]   |
/// | 6           | [`LayerType::IPV6`]   |
/// | other       | [`LayerType::PPP`]    |
///
/// ```
/// use gtpv2c::layer::LayerType;
/// use gtpv2c::packet::detect::detect_inner_protocol;
///
/// assert_eq!(detect_inner_protocol(&[0x45, 0x00]), Ok(LayerType::IPV4));
/// assert!(detect_inner_protocol(&[]).is_err());
/// ```
#[inline]
pub fn detect_inner_protocol(payload: &[u8]) -> Result<LayerType, Gtpv2Error> {
    let first = payload.first().ok_or(Gtpv2Error::EmptyPayload)?;

    match first >> 4 {
        IPV4_VERSION => Ok(LayerType::IPV4),
        IPV6_VERSION => Ok(LayerType::IPV6),
        _ => Ok(LayerType::PPP),
    }
}

/// Quick check whether `data` starts like a GTPv2 header.
///
/// Only the version bits are inspected; callers still need a full decode.
#[inline]
pub fn can_decode(data: &[u8]) -> bool {
    data.first().is_some_and(|b| b >> 5 == 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_ipv4() {
        assert_eq!(detect_inner_protocol(&[0x45]), Ok(LayerType::IPV4));
        assert_eq!(detect_inner_protocol(&[0x4f, 0xff, 0xff]), Ok(LayerType::IPV4));
    }

    #[test]
    fn test_detect_ipv6() {
        assert_eq!(detect_inner_protocol(&[0x60, 0x00, 0x00, 0x00]), Ok(LayerType::IPV6));
    }

    #[test]
    fn test_detect_fallback_ppp() {
        for first in [0x00u8, 0x10, 0x50, 0x7f, 0xff, 0xc0] {
            assert_eq!(detect_inner_protocol(&[first]), Ok(LayerType::PPP));
        }
    }

    #[test]
    fn test_detect_only_first_byte() {
        assert_eq!(detect_inner_protocol(&[0x00, 0x45]), Ok(LayerType::PPP));
    }

    #[test]
    fn test_detect_empty_payload() {
        assert_eq!(detect_inner_protocol(&[]), Err(Gtpv2Error::EmptyPayload));
    }

    #[test]
    fn test_can_decode() {
        assert!(can_decode(&[0x48, 0x20]));
        assert!(can_decode(&[0x40]));
        assert!(!can_decode(&[0x30, 0x01]));
        assert!(!can_decode(&[]));
    }
}
