//! Serialize buffers that grow at the front
//!
//! Layers are serialized innermost first: a body is written, then each header
//! is prepended in front of whatever the buffer already holds. Bytes already
//! in the buffer are never overwritten by a prepend.
//!
//! ```text
//! |<-- headroom -->|<-- bytes() -->|
//!                  ^ start
//! ```
//!
//! ```
//! use gtpv2c::serialize::{PrependBuffer, SerializeBuffer};
//!
//! let mut buf = PrependBuffer::new();
//! buf.append_bytes(2).unwrap().copy_from_slice(&[0xbe, 0xef]);
//! buf.prepend_bytes(1).unwrap()[0] = 0xaa;
//! assert_eq!(buf.bytes(), &[0xaa, 0xbe, 0xef]);
//! ```

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SerializeError {
    #[error("cannot reserve {requested} bytes, only {available} left")]
    HeadroomExhausted { requested: usize, available: usize },
}

/// Buffer capability used by encoders
pub trait SerializeBuffer {
    /// Reserve `num` zeroed bytes in front of the current contents and return them.
    fn prepend_bytes(&mut self, num: usize) -> Result<&mut [u8], SerializeError>;

    /// Reserve `num` zeroed bytes after the current contents and return them.
    fn append_bytes(&mut self, num: usize) -> Result<&mut [u8], SerializeError>;

    /// The serialized bytes
    fn bytes(&self) -> &[u8];

    /// Drop the contents, keeping the allocation where possible
    fn clear(&mut self);
}

/// Vec-backed [`SerializeBuffer`] with headroom in front of the data
pub struct PrependBuffer {
    data: Vec<u8>,
    start: usize,
    limit: Option<usize>,
}

impl PrependBuffer {
    /// Headroom reserved on the first prepend into an unbounded buffer
    const MIN_HEADROOM: usize = 64;

    /// Create an unbounded buffer; headroom grows on demand
    pub fn new() -> Self {
        PrependBuffer {
            data: Vec::new(),
            start: 0,
            limit: None,
        }
    }

    /// Create a buffer whose contents may never exceed `limit` bytes.
    ///
    /// The whole capacity is allocated up front as headroom, so prepends
    /// never reallocate. A prepend or append past the limit fails with
    /// [`SerializeError::HeadroomExhausted`].
    pub fn with_capacity_limit(limit: usize) -> Self {
        PrependBuffer {
            data: vec![0; limit],
            start: limit,
            limit: Some(limit),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn headroom(&self) -> usize {
        self.start
    }

    /// Consume the buffer and return its contents
    pub fn into_vec(mut self) -> Vec<u8> {
        self.data.drain(..self.start);
        self.data
    }

    fn check_limit(&self, num: usize) -> Result<(), SerializeError> {
        match self.limit {
            Some(limit) if self.len() + num > limit => Err(SerializeError::HeadroomExhausted {
                requested: num,
                available: limit - self.len(),
            }),
            _ => Ok(()),
        }
    }

    fn grow_headroom(&mut self, num: usize) {
        let len = self.len();
        let headroom = (num + len).max(Self::MIN_HEADROOM);

        let mut data = Vec::with_capacity(headroom + len);
        data.resize(headroom, 0);
        data.extend_from_slice(&self.data[self.start..]);

        self.data = data;
        self.start = headroom;
    }
}

impl Default for PrependBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl SerializeBuffer for PrependBuffer {
    fn prepend_bytes(&mut self, num: usize) -> Result<&mut [u8], SerializeError> {
        self.check_limit(num)?;

        if self.start < num {
            self.grow_headroom(num);
        }

        self.start -= num;
        let window = &mut self.data[self.start..self.start + num];
        window.fill(0);
        Ok(window)
    }

    fn append_bytes(&mut self, num: usize) -> Result<&mut [u8], SerializeError> {
        self.check_limit(num)?;

        let end = self.data.len();
        self.data.resize(end + num, 0);
        Ok(&mut self.data[end..])
    }

    #[inline]
    fn bytes(&self) -> &[u8] {
        &self.data[self.start..]
    }

    fn clear(&mut self) {
        match self.limit {
            Some(limit) => {
                self.data.truncate(limit);
                self.start = limit;
            }
            None => {
                self.data.truncate(self.start);
            }
        }
    }
}

impl fmt::Debug for PrependBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrependBuffer")
            .field("headroom", &self.headroom())
            .field("len", &self.len())
            .field("limit", &self.limit)
            .finish()
    }
}
