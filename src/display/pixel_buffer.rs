//! RGBA8888 software canvas
//!
//! All simulation output lands here before being streamed to the display
//! texture. The renderer leans on three things this buffer provides: a partial
//! "fade" clear that leaves light trails behind, saturating additive blends so
//! overlapping sparks intensify, and soft alpha stamps for smoke.

/// Alpha blend a single color channel
/// Uses fast approximation: (x + 1 + (x >> 8)) >> 8 instead of x / 255
#[inline]
fn blend_channel(src: u8, dst: u8, alpha: u16) -> u8 {
    let result = src as u16 * alpha + dst as u16 * (255 - alpha);
    ((result + 1 + (result >> 8)) >> 8) as u8
}

/// RGBA8888 pixel buffer (ABGR byte order, little-endian RGBA8888)
pub struct PixelBuffer {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0; (width * height * 4) as usize],
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        ((y * self.width + x) * 4) as usize
    }

    /// Clear to a solid color
    pub fn clear(&mut self, r: u8, g: u8, b: u8) {
        for chunk in self.pixels.chunks_exact_mut(4) {
            chunk[0] = 255; // A
            chunk[1] = b;
            chunk[2] = g;
            chunk[3] = r;
        }
    }

    /// Partial clear: multiply every RGB channel by `retain` (0..1), leaving
    /// the trailing-light residue of previous frames. `retain = 1.0` keeps
    /// everything, `0.0` is a hard clear to black.
    pub fn fade(&mut self, retain: f32) {
        let retain = retain.clamp(0.0, 1.0);
        let factor = (retain * 256.0) as u16;
        for chunk in self.pixels.chunks_exact_mut(4) {
            // Skip alpha (chunk[0]); bit shift instead of division
            chunk[1] = ((chunk[1] as u16 * factor) >> 8) as u8;
            chunk[2] = ((chunk[2] as u16 * factor) >> 8) as u8;
            chunk[3] = ((chunk[3] as u16 * factor) >> 8) as u8;
        }
    }

    /// Read back one pixel as (r, g, b), or None when out of bounds
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<(u8, u8, u8)> {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            Some((self.pixels[idx + 3], self.pixels[idx + 2], self.pixels[idx + 1]))
        } else {
            None
        }
    }

    /// Additive blend a pixel (channels saturate at 255)
    #[inline]
    pub fn blend_pixel_additive(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            self.pixels[idx] = 255;
            self.pixels[idx + 1] = self.pixels[idx + 1].saturating_add(b);
            self.pixels[idx + 2] = self.pixels[idx + 2].saturating_add(g);
            self.pixels[idx + 3] = self.pixels[idx + 3].saturating_add(r);
        }
    }

    /// Set pixel with source-over alpha blending
    #[inline]
    pub fn blend_pixel(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8, a: u8) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            let alpha = a as u16;
            self.pixels[idx] = 255;
            self.pixels[idx + 1] = blend_channel(b, self.pixels[idx + 1], alpha);
            self.pixels[idx + 2] = blend_channel(g, self.pixels[idx + 2], alpha);
            self.pixels[idx + 3] = blend_channel(r, self.pixels[idx + 3], alpha);
        }
    }

    /// Small additive square centered on (cx, cy). Cheaper than an arc for
    /// tiny sparks; visually indistinguishable at these sizes.
    pub fn fill_square_additive(&mut self, cx: i32, cy: i32, size: i32, r: u8, g: u8, b: u8) {
        let half = size / 2;
        for y in (cy - half)..=(cy - half + size.max(1) - 1) {
            for x in (cx - half)..=(cx - half + size.max(1) - 1) {
                self.blend_pixel_additive(x, y, r, g, b);
            }
        }
    }

    /// Additive line segment (Bresenham), used for motion streaks
    pub fn line_additive(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, r: u8, g: u8, b: u8) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);
        loop {
            self.blend_pixel_additive(x, y, r, g, b);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Soft additive disc with quadratic radial falloff, used for glow halos
    pub fn soft_disc_additive(&mut self, cx: f32, cy: f32, radius: f32, r: u8, g: u8, b: u8, intensity: f32) {
        if radius < 0.5 || intensity <= 0.0 {
            return;
        }
        let ri = radius.ceil() as i32;
        let (icx, icy) = (cx as i32, cy as i32);
        for oy in -ri..=ri {
            for ox in -ri..=ri {
                let d2 = (ox * ox + oy * oy) as f32;
                let falloff = 1.0 - d2 / (radius * radius);
                if falloff <= 0.0 {
                    continue;
                }
                let k = falloff * falloff * intensity;
                self.blend_pixel_additive(
                    icx + ox,
                    icy + oy,
                    (r as f32 * k) as u8,
                    (g as f32 * k) as u8,
                    (b as f32 * k) as u8,
                );
            }
        }
    }

    /// Soft alpha-blended disc for smoke stamps (deliberately not additive)
    pub fn soft_disc_blend(&mut self, cx: f32, cy: f32, radius: f32, r: u8, g: u8, b: u8, alpha: f32) {
        if radius < 0.5 || alpha <= 0.0 {
            return;
        }
        let ri = radius.ceil() as i32;
        let (icx, icy) = (cx as i32, cy as i32);
        for oy in -ri..=ri {
            for ox in -ri..=ri {
                let d2 = (ox * ox + oy * oy) as f32;
                let falloff = 1.0 - d2 / (radius * radius);
                if falloff <= 0.0 {
                    continue;
                }
                let a = (falloff * alpha * 255.0).min(255.0) as u8;
                self.blend_pixel(icx + ox, icy + oy, r, g, b, a);
            }
        }
    }

    /// Raw bytes for streaming into a texture
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_additive_blend_saturates() {
        let mut buf = PixelBuffer::with_size(4, 4);
        buf.blend_pixel_additive(1, 1, 200, 200, 200);
        buf.blend_pixel_additive(1, 1, 200, 200, 200);
        assert_eq!(buf.get_pixel(1, 1), Some((255, 255, 255)));
    }

    #[test]
    fn test_fade_dims_toward_black() {
        let mut buf = PixelBuffer::with_size(2, 2);
        buf.clear(100, 100, 100);
        buf.fade(0.5);
        let (r, _, _) = buf.get_pixel(0, 0).unwrap();
        assert!(r < 100 && r > 40);
        buf.fade(0.0);
        assert_eq!(buf.get_pixel(0, 0), Some((0, 0, 0)));
    }

    #[test]
    fn test_out_of_bounds_writes_ignored() {
        let mut buf = PixelBuffer::with_size(4, 4);
        buf.blend_pixel_additive(-1, 0, 255, 255, 255);
        buf.blend_pixel_additive(4, 4, 255, 255, 255);
        buf.fill_square_additive(-10, -10, 3, 255, 255, 255);
        assert_eq!(buf.get_pixel(0, 0), Some((0, 0, 0)));
    }

    #[test]
    fn test_line_additive_hits_both_endpoints() {
        let mut buf = PixelBuffer::with_size(8, 8);
        buf.line_additive(1, 1, 6, 4, 50, 60, 70);
        assert_eq!(buf.get_pixel(1, 1), Some((50, 60, 70)));
        assert_eq!(buf.get_pixel(6, 4), Some((50, 60, 70)));
    }

    #[test]
    fn test_soft_disc_brightest_at_center() {
        let mut buf = PixelBuffer::with_size(16, 16);
        buf.soft_disc_additive(8.0, 8.0, 4.0, 200, 200, 200, 1.0);
        let (center, _, _) = buf.get_pixel(8, 8).unwrap();
        let (edge, _, _) = buf.get_pixel(11, 8).unwrap();
        assert!(center > edge);
    }
}
