use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info};

use deepmandel_core::{evaluate_extended, evaluate_scalar, EscapeParams, Viewport};

use crate::buffer::IterationGrid;

/// Which arithmetic the frame build runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// Native `f64` throughout. The general case.
    Native,
    /// Double-double state and coordinates, for zoom depths where native
    /// precision is exhausted.
    Extended,
}

impl Precision {
    /// Pick the cheapest precision that still resolves adjacent pixels.
    pub fn select(viewport: &Viewport) -> Self {
        if viewport.needs_extended_precision() {
            Self::Extended
        } else {
            Self::Native
        }
    }
}

/// Build a complete frame of iteration counts.
///
/// The grid is allocated once and its rows are filled in place, in
/// parallel via Rayon; each pixel is mapped through the viewport and fed
/// to the evaluator matching `precision`. The grid is fully populated
/// before it is returned; partial frames are never published.
pub fn build_frame(
    viewport: &Viewport,
    params: &EscapeParams,
    precision: Precision,
) -> IterationGrid {
    let start = Instant::now();
    let max_iter = params.max_iterations;
    debug!(
        width = viewport.width,
        height = viewport.height,
        zoom = viewport.zoom,
        ?precision,
        "Starting frame build"
    );

    let mut grid = IterationGrid::new(viewport.width, viewport.height, max_iter);
    grid.counts
        .par_chunks_mut(viewport.width as usize)
        .enumerate()
        .for_each(|(py, row)| fill_row(viewport, py as u32, max_iter, precision, row));

    info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        width = viewport.width,
        height = viewport.height,
        max_iter,
        ?precision,
        "Frame build complete"
    );
    grid
}

fn fill_row(viewport: &Viewport, py: u32, max_iter: u32, precision: Precision, row: &mut [u32]) {
    match precision {
        Precision::Native => {
            for (px, slot) in row.iter_mut().enumerate() {
                let c = viewport.pixel_to_coord(px as u32, py);
                *slot = evaluate_scalar(c.x, c.y, max_iter);
            }
        }
        Precision::Extended => {
            for (px, slot) in row.iter_mut().enumerate() {
                let c = viewport.pixel_to_coord_dd(px as u32, py);
                *slot = evaluate_extended(c.x, c.y, max_iter);
            }
        }
    }
}
