//! SIMD-aware dot-product kernels.
//!
//! The kernel is picked once per instruction at construction time; the hot
//! loop only dispatches on a copied enum.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DotKernel {
    Scalar,
    #[cfg(target_arch = "x86_64")]
    Avx2Fma,
}

impl DotKernel {
    pub(crate) fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            if std::is_x86_feature_detected!("avx2") && std::is_x86_feature_detected!("fma") {
                return DotKernel::Avx2Fma;
            }
        }

        DotKernel::Scalar
    }
}

/// Dot product over the common prefix of `a` and `b`.
#[inline(always)]
pub(crate) fn dot(kernel: DotKernel, a: &[f32], b: &[f32]) -> f32 {
    let len = a.len().min(b.len());
    let (a, b) = (&a[..len], &b[..len]);
    match kernel {
        DotKernel::Scalar => dot_scalar(a, b),
        // SAFETY: `detect` only returns this variant when the CPU reports avx2 and fma,
        // and both slices hold exactly `len` elements.
        #[cfg(target_arch = "x86_64")]
        DotKernel::Avx2Fma => unsafe { avx2::dot_avx2_fma(a.as_ptr(), b.as_ptr(), len) },
    }
}

#[inline(always)]
fn dot_scalar(a: &[f32], b: &[f32]) -> f32 {
    let mut acc = [0.0f32; 4];
    let a_chunks = a.chunks_exact(4);
    let b_chunks = b.chunks_exact(4);
    let a_rest = a_chunks.remainder();
    let b_rest = b_chunks.remainder();

    for (ca, cb) in a_chunks.zip(b_chunks) {
        for ((lane, &x), &y) in acc.iter_mut().zip(ca).zip(cb) {
            *lane = x.mul_add(y, *lane);
        }
    }

    let mut sum = (acc[0] + acc[1]) + (acc[2] + acc[3]);
    for (&x, &y) in a_rest.iter().zip(b_rest) {
        sum = x.mul_add(y, sum);
    }
    sum
}

#[cfg(target_arch = "x86_64")]
mod avx2 {
    use core::arch::x86_64::*;

    #[target_feature(enable = "avx2,fma")]
    pub(super) unsafe fn dot_avx2_fma(a: *const f32, b: *const f32, len: usize) -> f32 {
        let mut acc = _mm256_setzero_ps();
        let mut i = 0usize;

        while i + 8 <= len {
            let va = unsafe { _mm256_loadu_ps(a.add(i)) };
            let vb = unsafe { _mm256_loadu_ps(b.add(i)) };
            acc = _mm256_fmadd_ps(va, vb, acc);
            i += 8;
        }

        let mut lanes = [0.0f32; 8];
        unsafe { _mm256_storeu_ps(lanes.as_mut_ptr(), acc) };
        let mut sum = lanes.iter().sum::<f32>();

        while i < len {
            let av = unsafe { *a.add(i) };
            let bv = unsafe { *b.add(i) };
            sum = av.mul_add(bv, sum);
            i += 1;
        }

        sum
    }
}
