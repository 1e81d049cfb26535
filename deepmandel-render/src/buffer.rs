/// Per-pixel iteration counts for a completed frame.
///
/// This is the raw output of a frame build before coloring. A count equal
/// to `max_iterations` marks a presumed-interior pixel; anything smaller is
/// the escape iteration. Mapping counts to colors is the display layer's
/// job, which keeps the build loop lean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationGrid {
    pub width: u32,
    pub height: u32,
    pub max_iterations: u32,
    /// Row-major counts, `width * height` entries.
    pub counts: Vec<u32>,
}

impl IterationGrid {
    pub fn new(width: u32, height: u32, max_iterations: u32) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            max_iterations,
            counts: vec![0; size],
        }
    }

    /// The count for one pixel.
    #[inline]
    pub fn count_at(&self, px: u32, py: u32) -> u32 {
        self.counts[(py * self.width + px) as usize]
    }

    /// Whether the pixel saturated the iteration bound.
    #[inline]
    pub fn is_interior(&self, px: u32, py: u32) -> bool {
        self.count_at(px, py) == self.max_iterations
    }

    /// Number of interior (saturated) pixels.
    pub fn interior_count(&self) -> usize {
        self.counts
            .iter()
            .filter(|&&n| n == self.max_iterations)
            .count()
    }

    /// Number of escaped pixels.
    pub fn escaped_count(&self) -> usize {
        self.counts.len() - self.interior_count()
    }
}
