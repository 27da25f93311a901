//! Layer types, decoder registry and packet builder
//!
//! A [`LayerRegistry`] maps a [`LayerType`] to the decoder for it. It is an
//! ordinary value built once by the caller and passed to a [`LayerStack`],
//! which drives decoding layer by layer.
//!
//! ```
//! use gtpv2c::layer::{Layer, LayerRegistry, LayerStack, LayerType};
//!
//! let registry = LayerRegistry::with_gtpv2c();
//! let data = [
//!     0x48, 0x20, 0x00, 0x0c,  // Version 2, T=1, Create Session Request
//!     0x00, 0x00, 0x00, 0x07,  // TEID: 7
//!     0x00, 0x00, 0x01, 0x00,  // Sequence: 1
//!     0x45, 0x00, 0x00, 0x14,  // IPv4 follows
//! ];
//!
//! let stack = LayerStack::decode(&registry, &data, LayerType::GTPV2C);
//! assert!(stack.error_layer().is_none());
//! assert_eq!(stack.layer_types(), vec![LayerType::GTPV2C, LayerType::IPV4]);
//! ```

use std::collections::HashMap;
use std::fmt;

use ahash::RandomState;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, trace};

use crate::packet::gtpv2::{decode_gtpv2c, Gtpv2Layer};
use crate::packet::Gtpv2Error;

/// Identifier of a decodable layer
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct LayerType(pub i32);

impl LayerType {
    pub const DECODE_FAILURE: LayerType = LayerType(0);
    pub const PAYLOAD: LayerType = LayerType(1);
    pub const IPV4: LayerType = LayerType(20);
    pub const IPV6: LayerType = LayerType(21);
    pub const PPP: LayerType = LayerType(22);
    /// Custom layers use ids of 2000 and above
    pub const GTPV2C: LayerType = LayerType(2001);

    pub fn name(&self) -> Option<&'static str> {
        match *self {
            LayerType::DECODE_FAILURE => Some("decode-failure"),
            LayerType::PAYLOAD => Some("payload"),
            LayerType::IPV4 => Some("ipv4"),
            LayerType::IPV6 => Some("ipv6"),
            LayerType::PPP => Some("ppp"),
            LayerType::GTPV2C => Some("gtpv2c"),
            _ => None,
        }
    }
}

impl fmt::Display for LayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "layer-type({})", self.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error(transparent)]
    Gtpv2(#[from] Gtpv2Error),
    #[error("{0}")]
    Other(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("layer type {0} is already registered")]
    Duplicate(LayerType),
}

/// A single decoded layer
#[derive(Debug, Clone)]
pub enum Layer<'a> {
    Gtpv2(Gtpv2Layer<'a>),

    /// Bytes for a layer type nobody registered a decoder for
    Payload {
        layer_type: LayerType,
        data: &'a [u8],
    },

    /// Decoding stopped here
    DecodeFailure {
        error: DecodeError,
        data: &'a [u8],
    },
}

impl<'a> Layer<'a> {
    pub fn layer_type(&self) -> LayerType {
        match self {
            Layer::Gtpv2(_) => LayerType::GTPV2C,
            Layer::Payload { layer_type, .. } => *layer_type,
            Layer::DecodeFailure { .. } => LayerType::DECODE_FAILURE,
        }
    }

    /// Bytes making up this layer
    pub fn contents(&self) -> &'a [u8] {
        match self {
            Layer::Gtpv2(gtp) => gtp.contents,
            Layer::Payload { data, .. } | Layer::DecodeFailure { data, .. } => *data,
        }
    }

    /// Bytes carried by this layer for the layers above it
    pub fn payload(&self) -> &'a [u8] {
        match self {
            Layer::Gtpv2(gtp) => gtp.payload,
            Layer::Payload { .. } | Layer::DecodeFailure { .. } => &[],
        }
    }
}

impl fmt::Display for Layer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Gtpv2(gtp) => write!(f, "{}", gtp),
            Layer::Payload { layer_type, data } => {
                write!(f, "Payload({}, {} bytes)", layer_type, data.len())
            }
            Layer::DecodeFailure { error, data } => {
                write!(f, "DecodeFailure({}, {} bytes)", error, data.len())
            }
        }
    }
}

/// Sink the decoders report to
pub trait PacketBuilder<'a> {
    /// Record a decoded layer
    fn add_layer(&mut self, layer: Layer<'a>);

    /// Hand `data` to the decoder registered for `layer_type`
    fn next_decoder(&mut self, layer_type: LayerType, data: &'a [u8]) -> Result<(), DecodeError>;
}

/// Decoder entry point stored in the registry
pub type DecodeFn = for<'a> fn(&'a [u8], &mut dyn PacketBuilder<'a>) -> Result<(), DecodeError>;

#[derive(Clone, Copy)]
pub struct LayerTypeMetadata {
    pub name: &'static str,
    pub decoder: DecodeFn,
}

impl fmt::Debug for LayerTypeMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerTypeMetadata")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LayerRegistry {
    decoders: HashMap<LayerType, LayerTypeMetadata, RandomState>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that knows how to decode GTPv2-C
    pub fn with_gtpv2c() -> Self {
        let mut registry = Self::new();
        registry.decoders.insert(
            LayerType::GTPV2C,
            LayerTypeMetadata {
                name: "GTPv2C",
                decoder: decode_gtpv2c,
            },
        );
        registry
    }

    pub fn register(
        &mut self,
        layer_type: LayerType,
        metadata: LayerTypeMetadata,
    ) -> Result<(), RegistryError> {
        if self.decoders.contains_key(&layer_type) {
            return Err(RegistryError::Duplicate(layer_type));
        }
        debug!(%layer_type, name = metadata.name, "registering decoder");
        self.decoders.insert(layer_type, metadata);
        Ok(())
    }

    #[inline]
    pub fn get(&self, layer_type: LayerType) -> Option<&LayerTypeMetadata> {
        self.decoders.get(&layer_type)
    }

    #[inline]
    pub fn can_decode(&self, layer_type: LayerType) -> bool {
        self.decoders.contains_key(&layer_type)
    }
}

/// Maximum number of layers stored inline (without heap allocation)
const MAX_INLINE_LAYERS: usize = 4;

/// Default [`PacketBuilder`]: collects the layers of one packet
#[derive(Debug, Clone)]
pub struct LayerStack<'a, 'r> {
    registry: &'r LayerRegistry,
    layers: SmallVec<[Layer<'a>; MAX_INLINE_LAYERS]>,
}

impl<'a, 'r> LayerStack<'a, 'r> {
    pub fn new(registry: &'r LayerRegistry) -> Self {
        LayerStack {
            registry,
            layers: SmallVec::new(),
        }
    }

    /// Decode `data` starting with `first`, stopping at the first error
    pub fn decode(registry: &'r LayerRegistry, data: &'a [u8], first: LayerType) -> Self {
        let mut stack = Self::new(registry);
        // errors are recorded in the stack as a DecodeFailure layer
        let _ = stack.next_decoder(first, data);
        stack
    }

    #[inline]
    pub fn layers(&self) -> &[Layer<'a>] {
        &self.layers
    }

    pub fn layer_types(&self) -> Vec<LayerType> {
        self.layers.iter().map(Layer::layer_type).collect()
    }

    /// First layer of the given type
    pub fn layer(&self, layer_type: LayerType) -> Option<&Layer<'a>> {
        self.layers.iter().find(|l| l.layer_type() == layer_type)
    }

    pub fn gtpv2(&self) -> Option<&Gtpv2Layer<'a>> {
        self.layers.iter().find_map(|l| match l {
            Layer::Gtpv2(gtp) => Some(gtp),
            _ => None,
        })
    }

    pub fn error_layer(&self) -> Option<&DecodeError> {
        self.layers.iter().find_map(|l| match l {
            Layer::DecodeFailure { error, .. } => Some(error),
            _ => None,
        })
    }
}

impl<'a> PacketBuilder<'a> for LayerStack<'a, '_> {
    fn add_layer(&mut self, layer: Layer<'a>) {
        self.layers.push(layer);
    }

    fn next_decoder(&mut self, layer_type: LayerType, data: &'a [u8]) -> Result<(), DecodeError> {
        let Some(metadata) = self.registry.get(layer_type).copied() else {
            trace!(%layer_type, len = data.len(), "no decoder registered, keeping payload");
            self.add_layer(Layer::Payload { layer_type, data });
            return Ok(());
        };

        trace!(%layer_type, decoder = metadata.name, len = data.len(), "decoding layer");
        let result = (metadata.decoder)(data, self);
        if let Err(error) = &result {
            // only the innermost failing decoder records the failure
            if self.error_layer().is_none() {
                debug!(%layer_type, %error, "decode failed");
                self.add_layer(Layer::DecodeFailure {
                    error: error.clone(),
                    data,
                });
            }
        }
        result
    }
}
