use crate::coord::{Coord, CoordDD};
use crate::double_double::DoubleDouble;
use crate::error::CoreError;

/// Defines the visible region of the parameter plane.
///
/// Maps pixel coordinates to plane coordinates: a pixel's offset from the
/// viewport centre is divided by `zoom` (pixels per plane unit) and
/// translated by `center`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Centre of the viewport on the plane.
    pub center: Coord,

    /// Pixels per plane unit. Larger is deeper.
    pub zoom: f64,

    /// Viewport width in pixels.
    pub width: u32,

    /// Viewport height in pixels.
    pub height: u32,
}

impl Viewport {
    /// Default view: the whole Mandelbrot set, centred on (-0.5, 0).
    ///
    /// The set fits in roughly `[-2.0, 0.47] × [-1.12, 1.12]`; pick the
    /// zoom that keeps it visible at any aspect ratio, with some margin.
    pub fn default_view(width: u32, height: u32) -> Self {
        let target_x = 3.6; // real span with padding
        let target_y = 2.6; // imaginary span with padding
        let zoom = (width as f64 / target_x).min(height as f64 / target_y);
        Self {
            center: Coord::new(-0.5, 0.0),
            zoom,
            width,
            height,
        }
    }

    pub fn new(center: Coord, zoom: f64, width: u32, height: u32) -> crate::Result<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidViewport {
                reason: format!("dimensions must be > 0, got {width}×{height}"),
            });
        }
        if zoom <= 0.0 || !zoom.is_finite() {
            return Err(CoreError::InvalidViewport {
                reason: format!("zoom must be positive and finite, got {zoom}"),
            });
        }
        Ok(Self {
            center,
            zoom,
            width,
            height,
        })
    }

    /// Plane units spanned by one pixel.
    #[inline]
    pub fn units_per_pixel(&self) -> f64 {
        self.zoom.recip()
    }

    /// Map a pixel to a native-precision plane point.
    ///
    /// `(0, 0)` is the top-left pixel. The y-axis is flipped so that
    /// increasing pixel-y moves downward on the plane.
    #[inline]
    pub fn pixel_to_coord(&self, px: u32, py: u32) -> Coord {
        let half_w = self.width as f64 / 2.0;
        let half_h = self.height as f64 / 2.0;
        Coord::new(
            (px as f64 - half_w) / self.zoom + self.center.x,
            (half_h - py as f64) / self.zoom + self.center.y,
        )
    }

    /// Map a pixel to a double-double plane point.
    ///
    /// The pixel offset is exact in `f64`; the division by the zoom factor
    /// and the centre translation run in double-double, so adjacent pixels
    /// stay distinguishable past the native zoom limit.
    #[inline]
    pub fn pixel_to_coord_dd(&self, px: u32, py: u32) -> CoordDD {
        let half_w = self.width as f64 / 2.0;
        let half_h = self.height as f64 / 2.0;
        CoordDD::new(
            DoubleDouble::from(px as f64 - half_w) / self.zoom + self.center.x,
            DoubleDouble::from(half_h - py as f64) / self.zoom + self.center.y,
        )
    }

    /// Whether this zoom depth has exhausted native precision.
    ///
    /// True once the per-pixel spacing is within a few ulps of the centre
    /// coordinate, i.e. the translation/zoom ratio approaches native
    /// epsilon and adjacent pixels start collapsing to equal `f64` values.
    pub fn needs_extended_precision(&self) -> bool {
        let magnitude = self.center.x.abs().max(self.center.y.abs()).max(1.0);
        self.units_per_pixel() <= magnitude * f64::EPSILON * 64.0
    }

    /// The viewport extent in plane units.
    pub fn plane_width(&self) -> f64 {
        self.width as f64 / self.zoom
    }

    /// The viewport extent in plane units.
    pub fn plane_height(&self) -> f64 {
        self.height as f64 / self.zoom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-10;

    #[test]
    fn default_view_contains_the_set() {
        let vp = Viewport::default_view(800, 600);
        assert_eq!(vp.width, 800);
        assert_eq!(vp.height, 600);
        assert!((vp.center.x - (-0.5)).abs() < EPSILON);
        assert!(vp.plane_width() >= 3.5);
        assert!(vp.plane_height() >= 2.5);
    }

    #[test]
    fn pixel_to_coord_center() {
        let vp = Viewport::new(Coord::ZERO, 100.0, 100, 100).unwrap();
        let c = vp.pixel_to_coord(50, 50);
        assert!(c.x.abs() < EPSILON);
        assert!(c.y.abs() < EPSILON);
    }

    #[test]
    fn pixel_to_coord_corners() {
        let vp = Viewport::new(Coord::ZERO, 1.0, 100, 100).unwrap();

        // Top-left pixel → negative x, positive y.
        let tl = vp.pixel_to_coord(0, 0);
        assert!((tl.x - (-50.0)).abs() < EPSILON);
        assert!((tl.y - 50.0).abs() < EPSILON);

        // Bottom-right pixel → positive x, negative y.
        let br = vp.pixel_to_coord(99, 99);
        assert!((br.x - 49.0).abs() < EPSILON);
        assert!((br.y - (-49.0)).abs() < EPSILON);
    }

    #[test]
    fn dd_mapping_agrees_with_native_at_shallow_zoom() {
        let vp = Viewport::new(Coord::new(-0.5, 0.0), 250.0, 640, 480).unwrap();
        for &(px, py) in &[(0, 0), (320, 240), (639, 479), (17, 401)] {
            let native = vp.pixel_to_coord(px, py);
            let wide = vp.pixel_to_coord_dd(px, py).to_coord();
            assert!(
                (native.x - wide.x).abs() < 1e-12 && (native.y - wide.y).abs() < 1e-12,
                "mappings diverged at pixel ({px}, {py}): {native} vs {wide}"
            );
        }
    }

    #[test]
    fn dd_mapping_distinguishes_adjacent_pixels_at_deep_zoom() {
        // Zoom deep enough that one pixel spans less than an ulp of the
        // centre: the native mapping collapses neighbours, the DD one
        // must not.
        let vp = Viewport::new(Coord::new(-0.75, 0.1), 1e18, 800, 600).unwrap();
        let a = vp.pixel_to_coord(400, 300);
        let b = vp.pixel_to_coord(401, 300);
        assert_eq!(a.x, b.x, "native precision should be exhausted here");

        let a_dd = vp.pixel_to_coord_dd(400, 300);
        let b_dd = vp.pixel_to_coord_dd(401, 300);
        assert_ne!(a_dd.x, b_dd.x, "DD mapping must keep pixels distinct");
    }

    #[test]
    fn extended_precision_trigger() {
        assert!(!Viewport::default_view(800, 600).needs_extended_precision());
        let deep = Viewport::new(Coord::new(-0.75, 0.1), 1e16, 800, 600).unwrap();
        assert!(deep.needs_extended_precision());
    }

    #[test]
    fn invalid_dimensions() {
        assert!(Viewport::new(Coord::ZERO, 100.0, 0, 100).is_err());
        assert!(Viewport::new(Coord::ZERO, 100.0, 100, 0).is_err());
    }

    #[test]
    fn invalid_zoom() {
        assert!(Viewport::new(Coord::ZERO, 0.0, 100, 100).is_err());
        assert!(Viewport::new(Coord::ZERO, -1.0, 100, 100).is_err());
        assert!(Viewport::new(Coord::ZERO, f64::NAN, 100, 100).is_err());
        assert!(Viewport::new(Coord::ZERO, f64::INFINITY, 100, 100).is_err());
    }
}
