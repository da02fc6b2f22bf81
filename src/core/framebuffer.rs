use nalgebra::Vector3;

/// A 2D buffer holding colour and depth, optionally supersampled.
///
/// Depth is cleared to `f32::INFINITY`; anything drawn is finite, so an infinite depth marks
/// a pixel no geometry covered.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub sample_count: usize,
    pub buffer_width: usize,
    pub buffer_height: usize,
    color: Vec<Vector3<f32>>,
    depth: Vec<f32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize, sample_count: usize) -> Self {
        let sample_count = sample_count.max(1);
        let buffer_width = width * sample_count;
        let buffer_height = height * sample_count;
        let size = buffer_width * buffer_height;

        Self {
            width,
            height,
            sample_count,
            buffer_width,
            buffer_height,
            color: vec![Vector3::zeros(); size],
            depth: vec![f32::INFINITY; size],
        }
    }

    /// Fills colour with `color` and resets depth.
    pub fn clear(&mut self, color: Vector3<f32>) {
        self.color.fill(color);
        self.depth.fill(f32::INFINITY);
    }

    #[inline(always)]
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.buffer_width && y < self.buffer_height
    }

    #[inline(always)]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.buffer_width + x
    }

    /// Less-than depth test. Updates the stored depth and returns true when `depth` wins.
    #[inline]
    pub fn depth_test_and_update(&mut self, x: usize, y: usize, depth: f32) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        if depth < self.depth[idx] {
            self.depth[idx] = depth;
            true
        } else {
            false
        }
    }

    /// Writes a sample in buffer coordinates.
    #[inline]
    pub fn set_sample(&mut self, x: usize, y: usize, color: Vector3<f32>) {
        if self.in_bounds(x, y) {
            let idx = self.index(x, y);
            self.color[idx] = color;
        }
    }

    /// Depth of a sample in buffer coordinates.
    #[inline]
    pub fn sample_depth(&self, x: usize, y: usize) -> Option<f32> {
        self.in_bounds(x, y).then(|| self.depth[self.index(x, y)])
    }

    /// Nearest depth of an output pixel across its samples.
    pub fn depth_at(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let (sx, sy) = (x * self.sample_count, y * self.sample_count);
        let mut nearest = f32::INFINITY;
        for dy in 0..self.sample_count {
            for dx in 0..self.sample_count {
                nearest = nearest.min(self.depth[self.index(sx + dx, sy + dy)]);
            }
        }
        Some(nearest)
    }

    /// Resolved colour of an output pixel (box filter over its samples).
    pub fn get_pixel(&self, x: usize, y: usize) -> Option<Vector3<f32>> {
        if x >= self.width || y >= self.height {
            return None;
        }

        if self.sample_count == 1 {
            return Some(self.color[self.index(x, y)]);
        }

        let mut sum = Vector3::zeros();
        let (sx, sy) = (x * self.sample_count, y * self.sample_count);
        for dy in 0..self.sample_count {
            for dx in 0..self.sample_count {
                sum += self.color[self.index(sx + dx, sy + dy)];
            }
        }

        let samples = (self.sample_count * self.sample_count) as f32;
        Some(sum / samples)
    }
}
