//! Software rasterizer for the windowed frontend.
//!
//! Quads are drawn as a triangle strip `(v0, v1, v2)`, `(v1, v2, v3)` with
//! per-vertex colours interpolated across each triangle. Sprites are flat
//! mid-grey squares. Pixels outside the framebuffer are clipped. Nothing is
//! ever cleared between frames except by a GPU reset.

use crate::error::Result;
use crate::primitive::{Color, Point, Primitive, Vertex};
use crate::render::{Renderer, Resolution};
use tracing::{debug, trace};

/// Colour every sprite is drawn in, `0x00RRGGBB`
pub const SPRITE_COLOR: u32 = 0x007F_7F7F;

/// Renderer that draws into an `0x00RRGGBB` framebuffer
#[derive(Debug)]
pub struct SoftwareRenderer {
    resolution: Resolution,
    framebuffer: Vec<u32>,
}

impl SoftwareRenderer {
    pub fn new() -> Self {
        let resolution = Resolution::default();
        Self {
            resolution,
            framebuffer: vec![0; (resolution.width * resolution.height) as usize],
        }
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn framebuffer(&self) -> &[u32] {
        &self.framebuffer
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.resolution.width || y >= self.resolution.height {
            return None;
        }
        Some(self.framebuffer[(y * self.resolution.width + x) as usize])
    }

    fn put(&mut self, x: i32, y: i32, rgb: u32) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x < self.resolution.width && y < self.resolution.height {
            self.framebuffer[(y * self.resolution.width + x) as usize] = rgb;
        }
    }

    fn fill_square(&mut self, origin: Point, size: u16, rgb: u32) {
        let (x0, y0) = (origin.x as i32, origin.y as i32);
        for y in y0..y0 + size as i32 {
            for x in x0..x0 + size as i32 {
                self.put(x, y, rgb);
            }
        }
    }

    fn fill_triangle(&mut self, v: [Vertex; 3]) {
        let p = v.map(|vertex| (vertex.point.x as i64, vertex.point.y as i64));
        let area = edge(p[0], p[1], p[2]);
        if area == 0 {
            return;
        }

        let max_x = self.resolution.width as i64 - 1;
        let max_y = self.resolution.height as i64 - 1;
        let min_x = p.iter().map(|q| q.0).min().unwrap_or(0).max(0);
        let min_y = p.iter().map(|q| q.1).min().unwrap_or(0).max(0);
        let hi_x = p.iter().map(|q| q.0).max().unwrap_or(0).min(max_x);
        let hi_y = p.iter().map(|q| q.1).max().unwrap_or(0).min(max_y);

        for y in min_y..=hi_y {
            for x in min_x..=hi_x {
                let at = (x, y);
                // Weights share the sign of `area` when the point is inside
                let w = [edge(p[1], p[2], at), edge(p[2], p[0], at), edge(p[0], p[1], at)];
                let inside = if area > 0 {
                    w.iter().all(|&w| w >= 0)
                } else {
                    w.iter().all(|&w| w <= 0)
                };
                if inside {
                    let rgb = shade([v[0].color, v[1].color, v[2].color], w, area);
                    self.put(x as i32, y as i32, rgb);
                }
            }
        }
    }
}

impl Default for SoftwareRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Twice the signed area of triangle `(a, b, c)`
fn edge(a: (i64, i64), b: (i64, i64), c: (i64, i64)) -> i64 {
    (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
}

fn shade(colors: [Color; 3], w: [i64; 3], area: i64) -> u32 {
    let channel = |pick: fn(&Color) -> u8| {
        let sum: i64 = (0..3).map(|i| pick(&colors[i]) as i64 * w[i]).sum();
        (sum / area).clamp(0, 255) as u32
    };
    channel(|c| c.r) << 16 | channel(|c| c.g) << 8 | channel(|c| c.b)
}

impl Renderer for SoftwareRenderer {
    fn reset(&mut self, resolution: Resolution) {
        debug!(
            "Software renderer reset to {}x{}",
            resolution.width, resolution.height
        );
        self.resolution = resolution;
        self.framebuffer = vec![0; (resolution.width * resolution.height) as usize];
    }

    fn draw(&mut self, opcode: u8, words: &[u32]) -> Result<()> {
        let primitive = Primitive::decode(opcode, words)?;
        trace!("Rasterizing {:?}", primitive);
        match primitive {
            Primitive::GouraudQuad([a, b, c, d]) => {
                self.fill_triangle([a, b, c]);
                self.fill_triangle([b, c, d]);
            }
            Primitive::Sprite { size, origin, .. } => self.fill_square(origin, size, SPRITE_COLOR),
            Primitive::Operation(_) => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: i16, y: i16) -> u32 {
        (y as u16 as u32) << 16 | x as u16 as u32
    }

    #[test]
    fn starts_black_at_default_resolution() {
        let renderer = SoftwareRenderer::new();
        assert_eq!(renderer.framebuffer().len(), 320 * 240);
        assert!(renderer.framebuffer().iter().all(|&p| p == 0));
        assert_eq!(renderer.pixel(320, 0), None);
    }

    #[test]
    fn flat_quad_fills_its_area() {
        let mut renderer = SoftwareRenderer::new();
        let red = 0x3800_00FF;
        renderer
            .draw(
                0x38,
                &[
                    red,
                    point(10, 10),
                    0xFF,
                    point(20, 10),
                    0xFF,
                    point(10, 20),
                    0xFF,
                    point(20, 20),
                ],
            )
            .unwrap();

        assert_eq!(renderer.pixel(10, 10), Some(0xFF_0000));
        assert_eq!(renderer.pixel(15, 15), Some(0xFF_0000));
        assert_eq!(renderer.pixel(20, 20), Some(0xFF_0000));
        assert_eq!(renderer.pixel(9, 15), Some(0));
        assert_eq!(renderer.pixel(21, 15), Some(0));
    }

    #[test]
    fn gouraud_quad_interpolates() {
        let mut renderer = SoftwareRenderer::new();
        // Black on the left edge, blue on the right edge
        renderer
            .draw(
                0x38,
                &[
                    0x3800_0000,
                    point(0, 0),
                    0x00FF_0000,
                    point(100, 0),
                    0x0000_0000,
                    point(0, 10),
                    0x00FF_0000,
                    point(100, 10),
                ],
            )
            .unwrap();

        let left = renderer.pixel(0, 5).unwrap();
        let middle = renderer.pixel(50, 5).unwrap();
        let right = renderer.pixel(100, 5).unwrap();
        assert_eq!(left, 0);
        assert_eq!(right, 0xFF);
        assert!((0x70..=0x90).contains(&middle), "middle was {middle:#x}");
    }

    #[test]
    fn sprite_is_grey_square_clipped_at_edges() {
        let mut renderer = SoftwareRenderer::new();
        renderer
            .draw(0x7C, &[0x7CFF_FFFF, point(312, 232), 0])
            .unwrap();

        assert_eq!(renderer.pixel(312, 232), Some(SPRITE_COLOR));
        assert_eq!(renderer.pixel(319, 239), Some(SPRITE_COLOR));
        assert_eq!(renderer.pixel(311, 232), Some(0));

        renderer.draw(0x74, &[0x7400_0000, point(-4, -4), 0]).unwrap();
        assert_eq!(renderer.pixel(0, 0), Some(SPRITE_COLOR));
        assert_eq!(renderer.pixel(3, 3), Some(SPRITE_COLOR));
        assert_eq!(renderer.pixel(4, 4), Some(0));
    }

    #[test]
    fn reset_clears_and_resizes() {
        let mut renderer = SoftwareRenderer::new();
        renderer.draw(0x74, &[0x7400_0000, point(0, 0), 0]).unwrap();
        renderer.reset(Resolution {
            width: 64,
            height: 32,
        });

        assert_eq!(renderer.framebuffer().len(), 64 * 32);
        assert_eq!(renderer.pixel(0, 0), Some(0));
    }

    #[test]
    fn operations_draw_nothing_and_unknown_shapes_fail() {
        let mut renderer = SoftwareRenderer::new();
        renderer.draw(0xE1, &[0xE100_0000]).unwrap();
        assert!(renderer.framebuffer().iter().all(|&p| p == 0));

        assert!(renderer.draw(0x20, &[0; 4]).is_err());
    }
}
