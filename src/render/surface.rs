use super::color::Color;

/// Software raster target: an RGBA pixel buffer with the fill/stroke/gradient
/// primitives the effects draw with. All operations clip to the surface and
/// are safe on degenerate sizes (including 0x0 and 1x1).
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        if x >= self.width || y >= self.height {
            return Color::TRANSPARENT;
        }
        let i = ((y * self.width + x) * 4) as usize;
        Color::rgba(
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        )
    }

    /// Reset to opaque black.
    pub fn clear(&mut self) {
        self.fill(Color::BLACK);
    }

    /// Overwrite every pixel.
    pub fn fill(&mut self, color: Color) {
        for px in self.pixels.chunks_exact_mut(4) {
            px[0] = color.r;
            px[1] = color.g;
            px[2] = color.b;
            px[3] = color.a;
        }
    }

    /// Source-over blend a translucent color across the whole surface.
    /// A low-alpha black here is the motion-trail fade the effects rely on.
    pub fn fill_blend(&mut self, color: Color) {
        let a = color.a as f32 / 255.0;
        let inv = 1.0 - a;
        for px in self.pixels.chunks_exact_mut(4) {
            px[0] = (color.r as f32 * a + px[0] as f32 * inv) as u8;
            px[1] = (color.g as f32 * a + px[1] as f32 * inv) as u8;
            px[2] = (color.b as f32 * a + px[2] as f32 * inv) as u8;
            px[3] = 255;
        }
    }

    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let i = ((y as u32 * self.width + x as u32) * 4) as usize;
        let a = color.a as f32 / 255.0;
        let inv = 1.0 - a;
        self.pixels[i] = (color.r as f32 * a + self.pixels[i] as f32 * inv) as u8;
        self.pixels[i + 1] = (color.g as f32 * a + self.pixels[i + 1] as f32 * inv) as u8;
        self.pixels[i + 2] = (color.b as f32 * a + self.pixels[i + 2] as f32 * inv) as u8;
        self.pixels[i + 3] = 255;
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        if w <= 0.0 || h <= 0.0 || self.width == 0 || self.height == 0 {
            return;
        }
        let x0 = (x.floor().max(0.0)) as i32;
        let y0 = (y.floor().max(0.0)) as i32;
        let x1 = ((x + w).ceil().min(self.width as f32)) as i32;
        let y1 = ((y + h).ceil().min(self.height as f32)) as i32;
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend_pixel(px, py, color);
            }
        }
    }

    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color) {
        if radius <= 0.0 {
            return;
        }
        let x0 = ((cx - radius).floor().max(0.0)) as i32;
        let y0 = ((cy - radius).floor().max(0.0)) as i32;
        let x1 = ((cx + radius).ceil().min(self.width as f32)) as i32;
        let y1 = ((cy + radius).ceil().min(self.height as f32)) as i32;
        let r2 = radius * radius;
        for py in y0..y1 {
            for px in x0..x1 {
                let dx = px as f32 + 0.5 - cx;
                let dy = py as f32 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.blend_pixel(px, py, color);
                }
            }
        }
    }

    /// Scanline-fill a convex polygon, shading each pixel through `shade`.
    fn scan_convex(&mut self, points: &[(f32, f32)], mut shade: impl FnMut(f32, f32) -> Color) {
        if points.len() < 3 || self.width == 0 || self.height == 0 {
            return;
        }
        let min_y = points.iter().map(|p| p.1).fold(f32::INFINITY, f32::min);
        let max_y = points.iter().map(|p| p.1).fold(f32::NEG_INFINITY, f32::max);
        let y0 = (min_y.floor().max(0.0)) as i32;
        let y1 = (max_y.ceil().min(self.height as f32)) as i32;

        for py in y0..y1 {
            let yc = py as f32 + 0.5;
            let mut min_x = f32::INFINITY;
            let mut max_x = f32::NEG_INFINITY;
            let mut hit = false;
            for i in 0..points.len() {
                let (ax, ay) = points[i];
                let (bx, by) = points[(i + 1) % points.len()];
                if (ay <= yc && yc < by) || (by <= yc && yc < ay) {
                    let x = ax + (yc - ay) * (bx - ax) / (by - ay);
                    min_x = min_x.min(x);
                    max_x = max_x.max(x);
                    hit = true;
                }
            }
            if !hit {
                continue;
            }
            let x0 = (min_x.floor().max(0.0)) as i32;
            let x1 = (max_x.ceil().min(self.width as f32)) as i32;
            for px in x0..x1 {
                let xc = px as f32 + 0.5;
                if xc >= min_x && xc < max_x {
                    self.blend_pixel(px, py, shade(xc, yc));
                }
            }
        }
    }

    pub fn fill_convex_polygon(&mut self, points: &[(f32, f32)], color: Color) {
        self.scan_convex(points, |_, _| color);
    }

    pub fn fill_triangle(&mut self, a: (f32, f32), b: (f32, f32), c: (f32, f32), color: Color) {
        self.fill_convex_polygon(&[a, b, c], color);
    }

    /// Fill a convex polygon with a gradient evaluated along the axis
    /// `p0 -> p1`. Stops are `(t, color)` pairs with t in [0,1], sorted.
    pub fn fill_convex_polygon_gradient(
        &mut self,
        points: &[(f32, f32)],
        p0: (f32, f32),
        p1: (f32, f32),
        stops: &[(f32, Color)],
    ) {
        if stops.is_empty() {
            return;
        }
        let dx = p1.0 - p0.0;
        let dy = p1.1 - p0.1;
        let len2 = dx * dx + dy * dy;
        self.scan_convex(points, |x, y| {
            let t = if len2 > 0.0 {
                ((x - p0.0) * dx + (y - p0.1) * dy) / len2
            } else {
                0.0
            };
            eval_stops(stops, t)
        });
    }

    /// Stroke a line segment as a filled quad of the given thickness.
    pub fn stroke_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, thickness: f32, color: Color) {
        self.fill_convex_polygon(&line_quad(x0, y0, x1, y1, thickness), color);
    }

    /// Stroke a line whose color interpolates from `start` at (x0,y0) to
    /// `end` at (x1,y1).
    pub fn stroke_line_gradient(
        &mut self,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        thickness: f32,
        start: Color,
        end: Color,
    ) {
        self.fill_convex_polygon_gradient(
            &line_quad(x0, y0, x1, y1, thickness),
            (x0, y0),
            (x1, y1),
            &[(0.0, start), (1.0, end)],
        );
    }

    /// Overwrite the surface with a horizontal gradient across the palette,
    /// stops evenly spaced. A single color fills solid.
    pub fn fill_linear_gradient(&mut self, colors: &[Color]) {
        match colors {
            [] => {}
            [only] => self.fill(*only),
            _ => {
                let last = (colors.len() - 1) as f32;
                let w = self.width.max(1) as f32;
                for x in 0..self.width {
                    let pos = x as f32 / w * last;
                    let idx = (pos as usize).min(colors.len() - 2);
                    let color = colors[idx].lerp(colors[idx + 1], pos - idx as f32);
                    for y in 0..self.height {
                        let i = ((y * self.width + x) * 4) as usize;
                        self.pixels[i] = color.r;
                        self.pixels[i + 1] = color.g;
                        self.pixels[i + 2] = color.b;
                        self.pixels[i + 3] = color.a;
                    }
                }
            }
        }
    }
}

fn line_quad(x0: f32, y0: f32, x1: f32, y1: f32, thickness: f32) -> [(f32, f32); 4] {
    let dx = x1 - x0;
    let dy = y1 - y0;
    let len = (dx * dx + dy * dy).sqrt();
    let half = thickness.max(1.0) / 2.0;
    // Degenerate segment: a small axis-aligned square
    let (nx, ny) = if len > 0.0 {
        (-dy / len * half, dx / len * half)
    } else {
        (half, 0.0)
    };
    [
        (x0 - nx, y0 - ny),
        (x0 + nx, y0 + ny),
        (x1 + nx, y1 + ny),
        (x1 - nx, y1 - ny),
    ]
}

fn eval_stops(stops: &[(f32, Color)], t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    if t <= stops[0].0 {
        return stops[0].1;
    }
    for pair in stops.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        if t <= t1 {
            let span = t1 - t0;
            let f = if span > 0.0 { (t - t0) / span } else { 0.0 };
            return c0.lerp(c1, f);
        }
    }
    stops[stops.len() - 1].1
}
