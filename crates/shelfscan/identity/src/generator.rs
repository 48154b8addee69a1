//! UUID v4 generation for new device identities.
//!
//! The operating system's CSPRNG is used when it is available. If it fails, a
//! `SmallRng` seeded from the clock and a process-wide counter supplies the
//! bits instead. The fallback is lower entropy: good enough for anonymous
//! device correlation, not for anything that must resist guessing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use tracing::warn;
use uuid::Builder;

use crate::identity::DeviceIdentity;

static FALLBACK_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Source of cryptographically strong random bytes.
pub trait EntropySource: Send + Sync {
    fn fill(&self, dest: &mut [u8]) -> Result<(), getrandom::Error>;
}

/// Operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, dest: &mut [u8]) -> Result<(), getrandom::Error> {
        getrandom::getrandom(dest)
    }
}

/// Produces fresh UUID v4 identities. Holds no state between calls.
#[derive(Clone)]
pub struct IdentityGenerator {
    strong: Option<Arc<dyn EntropySource>>,
}

impl std::fmt::Debug for IdentityGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityGenerator")
            .field("strong_source", &self.strong.is_some())
            .finish()
    }
}

impl Default for IdentityGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityGenerator {
    /// Generator backed by the OS CSPRNG.
    pub fn new() -> Self {
        Self::with_source(Arc::new(OsEntropy))
    }

    pub fn with_source(source: Arc<dyn EntropySource>) -> Self {
        Self {
            strong: Some(source),
        }
    }

    /// Generator for runtimes without a strong source.
    pub fn fallback_only() -> Self {
        Self { strong: None }
    }

    pub fn generate(&self) -> DeviceIdentity {
        let mut bytes = [0u8; 16];
        let strong = match &self.strong {
            Some(source) => match source.fill(&mut bytes) {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "Strong entropy unavailable, using pseudo-random fallback");
                    false
                }
            },
            None => false,
        };
        if !strong {
            fallback_bytes(&mut bytes);
        }

        // Builder fixes the version nibble to 4 and the variant bits to 10xx.
        DeviceIdentity::from_uuid(Builder::from_random_bytes(bytes).into_uuid())
    }
}

fn fallback_bytes(dest: &mut [u8; 16]) {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    let count = FALLBACK_COUNTER.fetch_add(1, Ordering::Relaxed);
    let seed = nanos ^ count.rotate_left(32) ^ (std::process::id() as u64).rotate_left(16);
    SmallRng::seed_from_u64(seed).fill_bytes(dest);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    struct FixedEntropy([u8; 16]);

    impl EntropySource for FixedEntropy {
        fn fill(&self, dest: &mut [u8]) -> Result<(), getrandom::Error> {
            dest.copy_from_slice(&self.0[..dest.len()]);
            Ok(())
        }
    }

    struct BrokenEntropy;

    impl EntropySource for BrokenEntropy {
        fn fill(&self, _dest: &mut [u8]) -> Result<(), getrandom::Error> {
            Err(getrandom::Error::UNSUPPORTED)
        }
    }

    fn assert_v4_shape(id: &DeviceIdentity) {
        let s = id.as_str();
        assert_eq!(s.len(), 36);
        let groups: Vec<&str> = s.split('-').collect();
        assert_eq!(
            groups.iter().map(|g| g.len()).collect::<Vec<_>>(),
            vec![8, 4, 4, 4, 12]
        );
        assert!(s.chars().all(|c| c == '-' || c.is_ascii_hexdigit()));
        assert_eq!(&groups[2][..1], "4");
        assert!(matches!(&groups[3][..1], "8" | "9" | "a" | "b"));
    }

    #[test]
    fn os_generator_produces_v4() {
        let id = IdentityGenerator::new().generate();
        assert_v4_shape(&id);
        assert!(id.is_uuid_v4());
    }

    #[test]
    fn fallback_generator_produces_v4() {
        let generator = IdentityGenerator::fallback_only();
        for _ in 0..64 {
            let id = generator.generate();
            assert_v4_shape(&id);
        }
    }

    #[test]
    fn broken_source_falls_back() {
        let generator = IdentityGenerator::with_source(Arc::new(BrokenEntropy));
        assert_v4_shape(&generator.generate());
    }

    #[test]
    fn calls_are_independent() {
        for generator in [IdentityGenerator::new(), IdentityGenerator::fallback_only()] {
            let ids: HashSet<_> = (0..500).map(|_| generator.generate()).collect();
            assert_eq!(ids.len(), 500);
        }
    }

    proptest! {
        /// Whatever bytes the strong source returns, the result is a UUID v4.
        #[test]
        fn any_entropy_yields_v4(bytes in any::<[u8; 16]>()) {
            let generator = IdentityGenerator::with_source(Arc::new(FixedEntropy(bytes)));
            let id = generator.generate();
            prop_assert!(id.is_uuid_v4());
            assert_v4_shape(&id);
        }
    }
}
