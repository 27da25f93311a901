use std::{fmt::Display, sync::atomic::AtomicU64};

/// Per-run message counters
///
/// Counted locally for every message and flushed to the shared `Stats` every
/// `FLUSH_INTERVAL` messages and once at the end.
#[derive(Default, Debug, Clone)]
pub struct LocalStats {
    // General statistics
    pub total_messages: u64,
    pub total_bytes: u64,
    pub header_bytes: u64,

    // Error statistics
    pub bad_input: u64,
    pub truncated: u64,
    pub unsupported_version: u64,
    pub other_errors: u64,

    // Header flags
    pub with_teid: u64,
    pub piggybacked: u64,
    pub path_management: u64,
    pub unknown_message_type: u64,

    // Payload classification
    pub no_payload: u64,
    pub ipv4: u64,
    pub ipv6: u64,
    pub ppp: u64,
}

impl LocalStats {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flush all local counters to the shared atomic stats and reset them to zero
    #[inline]
    pub fn flush(&mut self, stats: &Stats) {
        macro_rules! flush_counter {
            ($field:ident) => {
                if self.$field > 0 {
                    stats
                        .$field
                        .fetch_add(self.$field, std::sync::atomic::Ordering::Relaxed);
                    self.$field = 0;
                }
            };
        }

        flush_counter!(total_messages);
        flush_counter!(total_bytes);
        flush_counter!(header_bytes);
        flush_counter!(bad_input);
        flush_counter!(truncated);
        flush_counter!(unsupported_version);
        flush_counter!(other_errors);
        flush_counter!(with_teid);
        flush_counter!(piggybacked);
        flush_counter!(path_management);
        flush_counter!(unknown_message_type);
        flush_counter!(no_payload);
        flush_counter!(ipv4);
        flush_counter!(ipv6);
        flush_counter!(ppp);
    }

    /// Returns true every `interval` messages (`interval` must be a power of 2)
    #[inline]
    pub fn should_flush(&self, interval: u64) -> bool {
        self.total_messages & (interval - 1) == 0
    }
}

/// Flush interval for local stats (must be power of 2)
pub const FLUSH_INTERVAL: u64 = 256;

#[derive(Default, Debug)]
pub struct Stats {
    pub total_messages: AtomicU64,
    pub total_bytes: AtomicU64,
    pub header_bytes: AtomicU64,

    pub bad_input: AtomicU64,
    pub truncated: AtomicU64,
    pub unsupported_version: AtomicU64,
    pub other_errors: AtomicU64,

    pub with_teid: AtomicU64,
    pub piggybacked: AtomicU64,
    pub path_management: AtomicU64,
    pub unknown_message_type: AtomicU64,

    pub no_payload: AtomicU64,
    pub ipv4: AtomicU64,
    pub ipv6: AtomicU64,
    pub ppp: AtomicU64,
}

impl Stats {
    #[inline]
    fn get(&self, counter: &AtomicU64) -> u64 {
        counter.load(std::sync::atomic::Ordering::Relaxed)
    }

    pub fn total_errors(&self) -> u64 {
        self.get(&self.bad_input)
            + self.get(&self.truncated)
            + self.get(&self.unsupported_version)
            + self.get(&self.other_errors)
    }

    pub fn total_decoded(&self) -> u64 {
        self.get(&self.total_messages) - self.total_errors()
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== GTPv2-C Statistics ===")?;
        writeln!(f)?;

        writeln!(f, "--- General ---")?;
        writeln!(f, "Messages processed: {}", self.get(&self.total_messages))?;
        writeln!(f, "Messages decoded: {}", self.total_decoded())?;
        writeln!(f, "Total bytes: {}", self.get(&self.total_bytes))?;
        writeln!(f, "Header bytes: {}", self.get(&self.header_bytes))?;
        writeln!(f)?;

        writeln!(f, "--- Errors ---")?;
        writeln!(f, "Total errors: {}", self.total_errors())?;
        writeln!(f, "  Bad input: {}", self.get(&self.bad_input))?;
        writeln!(f, "  Truncated header: {}", self.get(&self.truncated))?;
        writeln!(
            f,
            "  Unsupported version: {}",
            self.get(&self.unsupported_version)
        )?;
        writeln!(f, "  Other errors: {}", self.get(&self.other_errors))?;
        writeln!(f)?;

        writeln!(f, "--- Header ---")?;
        writeln!(f, "With TEID: {}", self.get(&self.with_teid))?;
        writeln!(f, "Piggybacked: {}", self.get(&self.piggybacked))?;
        writeln!(f, "Path management: {}", self.get(&self.path_management))?;
        if self.get(&self.unknown_message_type) > 0 {
            writeln!(
                f,
                "Unknown message type: {}",
                self.get(&self.unknown_message_type)
            )?;
        }
        writeln!(f)?;

        writeln!(f, "--- Payload ---")?;
        writeln!(f, "None: {}", self.get(&self.no_payload))?;
        writeln!(f, "IPv4: {}", self.get(&self.ipv4))?;
        writeln!(f, "IPv6: {}", self.get(&self.ipv6))?;
        writeln!(f, "PPP: {}", self.get(&self.ppp))?;

        Ok(())
    }
}
