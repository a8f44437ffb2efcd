//! Random names and payloads.
//!
//! Everything is drawn uniformly from the 52 ASCII letters. The generator is
//! `thread_rng`, which is fine for probe names: collisions between
//! concurrent requests are possible in principle and not guarded against.

use rand::distributions::{Distribution, Uniform};

const LETTERS: &[u8; 52] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of every generated file name component.
pub const NAME_LEN: usize = 10;

/// Random letters as raw bytes.
pub fn letters(len: usize) -> Vec<u8> {
    let dist = Uniform::from(0..LETTERS.len());
    dist.sample_iter(rand::thread_rng())
        .take(len)
        .map(|i| LETTERS[i])
        .collect()
}

/// A random file name component of [`NAME_LEN`] letters.
pub fn name() -> String {
    // Only ASCII letters are produced.
    letters(NAME_LEN).into_iter().map(char::from).collect()
}
