//! Hashing of simulation results.
//!
//! Uses FNV-1a over the exact bit patterns of every value, so two results
//! hash equal only if they are bit-identical. These hashes are not
//! cryptographically secure; they detect corruption and divergence.

use basinflow_core::{LayerTable, SimulationResult};

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

/// Marker folded in for a cell with no value.
const ABSENT: u8 = 0;
/// Marker folded in before a present optional value.
const PRESENT: u8 = 1;

#[inline]
fn fnv1a_byte(hash: u64, byte: u8) -> u64 {
    (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
}

#[inline]
fn fnv1a_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

#[inline]
fn fnv1a_u64(hash: u64, v: u64) -> u64 {
    fnv1a_bytes(hash, &v.to_le_bytes())
}

#[inline]
fn fnv1a_f64(hash: u64, v: f64) -> u64 {
    fnv1a_u64(hash, v.to_bits())
}

fn fnv1a_optional(hash: u64, table: &LayerTable<Option<f64>>) -> u64 {
    table.cells().iter().fold(hash, |h, cell| match cell {
        Some(v) => fnv1a_f64(fnv1a_byte(h, PRESENT), *v),
        None => fnv1a_byte(h, ABSENT),
    })
}

fn fnv1a_plain(hash: u64, table: &LayerTable<f64>) -> u64 {
    table.cells().iter().fold(hash, |h, &v| fnv1a_f64(h, v))
}

/// Hash of everything a result contains.
///
/// Folds in the layer ids, the time axis, and each table in a fixed
/// order with its index at the boundary, so moving data between tables
/// changes the hash.
pub fn result_hash(result: &SimulationResult) -> u64 {
    let mut hash = FNV_OFFSET;
    hash = fnv1a_u64(hash, result.layer_count() as u64);
    for layer in &result.meta().layers {
        hash = fnv1a_bytes(hash, layer.id.as_str().as_bytes());
        // 0xFF never occurs in UTF-8, so ids cannot run together.
        hash = fnv1a_byte(hash, 0xFF);
    }
    hash = fnv1a_u64(hash, result.time_steps().len() as u64);
    for &age in result.time_steps() {
        hash = fnv1a_f64(hash, age);
    }

    let d = result.data();
    hash = fnv1a_byte(hash, 0);
    for cell in d.burial.cells() {
        hash = match cell {
            Some(interval) => {
                let h = fnv1a_byte(hash, PRESENT);
                fnv1a_f64(fnv1a_f64(h, interval.top), interval.bottom)
            }
            None => fnv1a_byte(hash, ABSENT),
        };
    }
    for (index, table) in [&d.porosity, &d.temperature, &d.maturity]
        .into_iter()
        .enumerate()
    {
        hash = fnv1a_byte(hash, 1 + index as u8);
        hash = fnv1a_optional(hash, table);
    }
    for (index, table) in [&d.transformation, &d.generation, &d.expulsion]
        .into_iter()
        .enumerate()
    {
        hash = fnv1a_byte(hash, 4 + index as u8);
        hash = fnv1a_plain(hash, table);
    }
    hash
}
