//! # gtpv2c
//!
//! Zero-copy codec for the GTPv2-C header (3GPP TS 29.274) with a small
//! layer framework to chain it into a packet decoder.
//!
//! - [`packet::gtpv2`]: header decode and encode
//! - [`packet::detect`]: choice of the layer that follows a GTPv2-C header
//! - [`layer`]: layer types, decoder registry and the decoded layer stack
//! - [`serialize`]: buffers that encoders prepend headers into
//!
//! ## Example
//!
//! ```
//! use gtpv2c::layer::{LayerRegistry, LayerStack, LayerType};
//!
//! let packet = [
//!     0x48, 0x20, 0x00, 0x0c, // v2, T=1, Create Session Request, len 12
//!     0x00, 0x00, 0x00, 0x2a, // TEID
//!     0x00, 0x00, 0x05, 0x00, // sequence 5
//!     0x60, 0x00, 0x00, 0x00, // IPv6 payload
//! ];
//!
//! let registry = LayerRegistry::with_gtpv2c();
//! let stack = LayerStack::decode(&registry, &packet, LayerType::GTPV2C);
//!
//! let gtp = stack.gtpv2().unwrap();
//! assert_eq!(gtp.teid, 42);
//! assert_eq!(gtp.sequence_number, 5);
//! assert_eq!(stack.layer_types(), vec![LayerType::GTPV2C, LayerType::IPV6]);
//! ```

#[macro_use]
mod macros;

pub mod layer;
pub mod packet;
pub mod serialize;

pub use layer::{DecodeError, LayerRegistry, LayerStack, LayerType};
pub use packet::detect::{can_decode, detect_inner_protocol};
pub use packet::gtpv2::{Gtpv2C, Gtpv2Layer, GTPV2_C_PORT};
pub use packet::message::Gtpv2MessageType;
pub use packet::Gtpv2Error;
pub use serialize::{PrependBuffer, SerializeBuffer, SerializeError};
