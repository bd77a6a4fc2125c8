// Gamma-correct blending with table lookups instead of powf.
// Used wherever a pixel is only partly covered: anti-aliased stroke edges on
// the canvas and the translucent toolbar/panels in the overlay.
// Visual: soft edges without dark fringes around bright ink.

use crate::types::Rgb;

pub struct GammaLut {
    // sRGB(0..255) -> linear (0..1)
    to_linear: [f32; 256],
    // linear(0..1) quantised to 4096 steps -> sRGB(0..255)
    to_srgb: [u8; 4096],
}

impl Default for GammaLut {
    fn default() -> Self {
        Self::new()
    }
}

impl GammaLut {
    /// Build both tables once at startup.
    pub fn new() -> Self {
        let mut to_linear = [0.0f32; 256];
        for (v, slot) in to_linear.iter_mut().enumerate() {
            let c = v as f32 / 255.0;
            *slot = if c <= 0.04045 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) };
        }

        let mut to_srgb = [0u8; 4096];
        for (i, slot) in to_srgb.iter_mut().enumerate() {
            let l = i as f32 / 4095.0;
            let s = if l <= 0.003_130_8 { 12.92 * l } else { 1.055 * l.powf(1.0 / 2.4) - 0.055 };
            *slot = (s * 255.0).round().clamp(0.0, 255.0) as u8;
        }

        Self { to_linear, to_srgb }
    }

    #[inline]
    pub fn linear(&self, v: u8) -> f32 {
        self.to_linear[v as usize]
    }

    #[inline]
    pub fn srgb(&self, l: f32) -> u8 {
        self.to_srgb[(l.clamp(0.0, 1.0) * 4095.0).round() as usize]
    }

    /// Mix `src` over `dst` with `coverage` in [0,1], in linear light.
    /// Full and zero coverage are exact (no round trip through the tables).
    #[inline]
    pub fn mix(&self, dst: Rgb, src: Rgb, coverage: f32) -> Rgb {
        if coverage >= 1.0 {
            return src;
        }
        if coverage <= 0.0 {
            return dst;
        }
        let inv = 1.0 - coverage;
        let mut out = [0u8; 3];
        for c in 0..3 {
            out[c] = self.srgb(coverage * self.linear(src[c]) + inv * self.linear(dst[c]));
        }
        out
    }
}
