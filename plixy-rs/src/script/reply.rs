//! Playful replies for `print` once `local think = create.ai.print` has run.
//!
//! The random source is a trait object so callers (and tests) can supply
//! their own.  The default is a small xorshift64 generator seeded from the
//! OS.

/// A source of random numbers for reply selection.
pub trait RandomSource {
    fn next_u64(&mut self) -> u64;
}

/// Every reply template applied to `msg`, in a fixed order.
pub fn variants(msg: &str) -> [String; 5] {
    [
        format!("You said: {msg}"),
        format!("I’m thinking about '{msg}'..."),
        format!("Interesting—tell me more about {msg}."),
        format!("Why do you say '{msg}'?"),
        format!("'{msg}' makes me curious."),
    ]
}

/// Pick one of [`variants`] using `rng`.
pub fn playful_reply(msg: &str, rng: &mut dyn RandomSource) -> String {
    let mut all = variants(msg);
    let i = (rng.next_u64() % all.len() as u64) as usize;
    std::mem::take(&mut all[i])
}

// ── XorShift64 ────────────────────────────────────────────────────────────────

/// xorshift64 generator.
#[derive(Debug, Clone)]
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    /// Seed from `/dev/urandom`, falling back to the clock.
    pub fn from_os() -> Self {
        Self::with_seed(os_rand_seed())
    }

    /// A zero seed is replaced with a fixed non-zero constant.
    pub fn with_seed(seed: u64) -> Self {
        let state = if seed == 0 { 0x517c_c1b7_2722_0a95 } else { seed };
        XorShift64 { state }
    }
}

impl Default for XorShift64 {
    fn default() -> Self {
        Self::from_os()
    }
}

impl RandomSource for XorShift64 {
    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

fn os_rand_seed() -> u64 {
    use std::io::Read;
    let mut buf = [0u8; 8];
    if std::fs::File::open("/dev/urandom")
        .and_then(|mut f| f.read_exact(&mut buf))
        .is_err()
    {
        use std::time::{SystemTime, UNIX_EPOCH};
        let ns = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or(1);
        buf[..4].copy_from_slice(&ns.to_ne_bytes());
        buf[4..].copy_from_slice(&ns.wrapping_add(0x9e37_79b9).to_ne_bytes());
    }
    u64::from_ne_bytes(buf)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
