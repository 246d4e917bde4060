//! Synthetic measurement files in the format the engine reads.

use std::io::{self, Write};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

pub const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const DEFAULT_KEYS: usize = 500;
pub const MAX_KEY_LEN: usize = 15;

/// Lines rendered per batch before handing them to the writer.
const BATCH_LINES: u64 = 1_000_000;

#[derive(Debug, Clone)]
pub struct Generator {
    keys: Vec<Vec<u8>>,
    seed: u64,
}

impl Generator {
    pub fn new(seed: u64) -> Self {
        Self::with_keys(seed, DEFAULT_KEYS)
    }

    /// Draws `count` random keys of 1 to 15 letters. Duplicates are possible.
    pub fn with_keys(seed: u64, count: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let keys = (0..count.max(1))
            .map(|_| {
                let len = rng.gen_range(1..=MAX_KEY_LEN);
                (0..len)
                    .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
                    .collect::<Vec<u8>>()
            })
            .collect();
        Self { keys, seed }
    }

    pub fn keys(&self) -> &[Vec<u8>] {
        &self.keys
    }

    /// Renders `lines` records into memory.
    pub fn render(&self, lines: u64) -> Vec<u8> {
        let mut buf = Vec::with_capacity(lines as usize * 12);
        self.render_batch(0, lines, &mut buf);
        buf
    }

    /// Streams `lines` records to `out`, rendering batches in parallel.
    pub fn write<W: Write>(&self, out: &mut W, lines: u64) -> io::Result<()> {
        let batches = lines.div_ceil(BATCH_LINES);
        let group = rayon::current_num_threads() as u64;

        let mut first = 0;
        while first < batches {
            let last = (first + group).min(batches);
            let rendered: Vec<Vec<u8>> = (first..last)
                .into_par_iter()
                .map(|batch| {
                    let count = BATCH_LINES.min(lines - batch * BATCH_LINES);
                    let mut buf = Vec::with_capacity(count as usize * 12);
                    self.render_batch(batch, count, &mut buf);
                    buf
                })
                .collect();
            for buf in rendered {
                out.write_all(&buf)?;
            }
            first = last;
        }
        out.flush()
    }

    fn render_batch(&self, batch: u64, lines: u64, buf: &mut Vec<u8>) {
        let stream = batch.wrapping_add(1).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        let mut rng = StdRng::seed_from_u64(self.seed ^ stream);
        for _ in 0..lines {
            let key = &self.keys[rng.gen_range(0..self.keys.len())];
            let whole: i32 = rng.gen_range(-99..99);
            let fraction: u8 = rng.gen_range(0..9);
            buf.extend_from_slice(key);
            buf.push(b';');
            let _ = write!(buf, "{whole}.{fraction}");
            buf.push(b'\n');
        }
    }
}
