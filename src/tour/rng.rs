//! Reproducible lagged-Fibonacci generator for the annealer.

const TABLE_LEN: usize = 55;
const SHORT_LAG: usize = 24;
const MODULUS: i64 = 1_000_000_000;
const WARMUP: usize = 165;

/// Subtractive lagged-Fibonacci generator with a 55-word state.
///
/// Output depends only on the seed and is identical on every platform, so
/// a tour solve is bit-for-bit reproducible. Values lie in `[0, 10^9)`.
#[derive(Debug, Clone)]
pub struct TourRng {
    table: [i64; TABLE_LEN],
    a: usize,
    b: usize,
}

impl TourRng {
    /// Seed used by [`AnnealingConfig`](super::AnnealingConfig) by default.
    pub const DEFAULT_SEED: i64 = -314_159;

    /// Creates a generator from `seed`.
    pub fn new(seed: i64) -> Self {
        let mut seed = seed % MODULUS;
        if seed < 0 {
            seed += MODULUS;
        }

        let mut table = [0i64; TABLE_LEN];
        table[0] = seed;
        let mut last = seed;
        let mut next = 1i64;
        for i in 1..TABLE_LEN {
            let slot = (21 * i) % TABLE_LEN;
            table[slot] = next;
            next = last - next;
            if next < 0 {
                next += MODULUS;
            }
            last = table[slot];
        }

        let mut rng = Self {
            table,
            a: 0,
            b: SHORT_LAG,
        };
        for _ in 0..WARMUP {
            rng.next_u32();
        }
        rng
    }

    /// Next raw value in `[0, 10^9)`.
    pub fn next_u32(&mut self) -> u32 {
        self.a = if self.a == 0 { TABLE_LEN - 1 } else { self.a - 1 };
        self.b = if self.b == 0 { TABLE_LEN - 1 } else { self.b - 1 };
        let mut value = self.table[self.a] - self.table[self.b];
        if value < 0 {
            value += MODULUS;
        }
        self.table[self.a] = value;
        value as u32
    }

    /// Integer in `[0, n)`. `n` must be positive.
    pub fn below(&mut self, n: usize) -> usize {
        self.next_u32() as usize % n
    }

    /// Real in `[0, 1)`.
    pub fn real(&mut self) -> f64 {
        f64::from(self.next_u32()) / MODULUS as f64
    }
}

impl Default for TourRng {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SEED)
    }
}
