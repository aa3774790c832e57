/// Smallest denominator / log argument used by guarded divisions.
pub const EPSILON: f32 = 1e-6;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Fnv1a64(u64);

impl Fnv1a64 {
    pub(crate) const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01B3;

    pub(crate) fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub(crate) fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= u64::from(b);
            h = h.wrapping_mul(Self::PRIME);
        }
        self.0 = h;
    }

    pub(crate) fn finish(self) -> u64 {
        self.0
    }
}

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// Blend `dst` toward `src` by `alpha / 255`, rounding to nearest.
pub(crate) fn lerp_u8(dst: u8, src: u8, alpha: u8) -> u8 {
    if alpha == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(alpha);
    let v = mul_div255_u16(u16::from(src), u16::from(alpha)) + mul_div255_u16(u16::from(dst), inv);
    v.min(255) as u8
}

/// `num / max(den, EPSILON)`; never yields NaN or infinity for finite input.
pub(crate) fn guarded_div(num: f32, den: f32) -> f32 {
    num / den.max(EPSILON)
}

pub(crate) fn round_to_u8(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
