//! Contains the Region and Grid structs.  A Region describes a
//! rectangle on the complex plane by its lower-left corner and its
//! extent; a Grid materializes that rectangle into two evenly spaced
//! coordinate axes at a requested sample density, and is the thing
//! every kernel in this crate iterates over.

use num::Complex;

/// A rectangle on the complex plane, described by its lower-left
/// corner and its extent along each axis.  Width and height must be
/// positive; that is checked when a Grid is built from the region,
/// not here.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Region {
    /// Real coordinate of the left edge.
    pub start_x: f64,
    /// Imaginary coordinate of the bottom edge.
    pub start_y: f64,
    /// Extent along the real axis.
    pub width: f64,
    /// Extent along the imaginary axis.
    pub height: f64,
}

impl Region {
    /// Constructor, in (corner, extent) order.
    pub fn new(start_x: f64, start_y: f64, width: f64, height: f64) -> Region {
        Region {
            start_x,
            start_y,
            width,
            height,
        }
    }
}

/// The error produced when a Grid is requested over a degenerate
/// region: non-positive width, height, or density, or a combination
/// that leaves an axis with fewer than two samples.  This is the only
/// error the evaluation core ever surfaces; everything downstream of
/// construction is a per-point sentinel in the output matrix.
#[derive(Debug, Fail)]
#[fail(display = "invalid region: {}", _0)]
pub struct InvalidRegion(String);

/// The sampling grid: one evenly spaced coordinate sequence per axis,
/// with both endpoints of the region included.  Immutable once built;
/// a fractal configuration owns exactly one of these.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    /// Sample coordinates along the real axis, strictly increasing,
    /// starting at the region's `start_x`.
    pub real_axis: Vec<f64>,
    /// Sample coordinates along the imaginary axis, strictly
    /// increasing, starting at the region's `start_y`.
    pub imag_axis: Vec<f64>,
    region: Region,
    density: f64,
}

/// `n` points evenly spaced over `[start, start + length]`, both ends
/// included, so the spacing is `length / (n - 1)`.
fn linspace(start: f64, length: f64, n: usize) -> Vec<f64> {
    let step = length / ((n - 1) as f64);
    (0..n).map(|k| start + step * (k as f64)).collect()
}

impl Grid {
    /// Builds the grid for a region at `density` samples per unit
    /// length.  The axis lengths are `round(extent * density)`.
    pub fn build(region: Region, density: f64) -> Result<Grid, InvalidRegion> {
        if !(region.width > 0.0) || !(region.height > 0.0) {
            return Err(InvalidRegion(format!(
                "width and height must be positive, got {} by {}",
                region.width, region.height
            )));
        }
        if !(density > 0.0) {
            return Err(InvalidRegion(format!(
                "density must be positive, got {}",
                density
            )));
        }
        let nx = (region.width * density).round() as usize;
        let ny = (region.height * density).round() as usize;
        if nx < 2 || ny < 2 {
            return Err(InvalidRegion(format!(
                "density {} over a {}x{} region leaves fewer than two samples on an axis",
                density, region.width, region.height
            )));
        }
        Ok(Grid {
            real_axis: linspace(region.start_x, region.width, nx),
            imag_axis: linspace(region.start_y, region.height, ny),
            region,
            density,
        })
    }

    /// The complex number at grid coordinates (i, j), with `i`
    /// indexing the real axis and `j` the imaginary axis.
    pub fn point(&self, i: usize, j: usize) -> Complex<f64> {
        Complex::new(self.real_axis[i], self.imag_axis[j])
    }

    /// The (real, imaginary) axis lengths.
    pub fn shape(&self) -> (usize, usize) {
        (self.real_axis.len(), self.imag_axis.len())
    }

    /// The total number of sample points in the grid.
    pub fn len(&self) -> usize {
        self.real_axis.len() * self.imag_axis.len()
    }

    /// The region this grid was built over.
    pub fn region(&self) -> Region {
        self.region
    }

    /// The sample density this grid was built at.
    pub fn density(&self) -> f64 {
        self.density
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_fails_on_bad_width() {
        assert!(Grid::build(Region::new(0.0, 0.0, 0.0, 1.0), 10.0).is_err());
        assert!(Grid::build(Region::new(0.0, 0.0, -3.0, 1.0), 10.0).is_err());
    }

    #[test]
    fn grid_fails_on_bad_height() {
        assert!(Grid::build(Region::new(0.0, 0.0, 1.0, 0.0), 10.0).is_err());
        assert!(Grid::build(Region::new(0.0, 0.0, 1.0, -1.0), 10.0).is_err());
    }

    #[test]
    fn grid_fails_on_bad_density() {
        assert!(Grid::build(Region::new(0.0, 0.0, 1.0, 1.0), 0.0).is_err());
        assert!(Grid::build(Region::new(0.0, 0.0, 1.0, 1.0), -2.0).is_err());
    }

    #[test]
    fn grid_fails_when_too_coarse() {
        // One sample per axis is not a grid.
        assert!(Grid::build(Region::new(0.0, 0.0, 1.0, 1.0), 1.0).is_err());
    }

    #[test]
    fn axis_lengths_follow_density() {
        let grid = Grid::build(Region::new(-2.0, -1.5, 3.0, 3.0), 250.0).unwrap();
        assert_eq!(grid.real_axis.len(), 750);
        assert_eq!(grid.imag_axis.len(), 750);
        assert_eq!(grid.shape(), (750, 750));
        assert_eq!(grid.len(), 750 * 750);
    }

    #[test]
    fn axis_lengths_round_rather_than_truncate() {
        let grid = Grid::build(Region::new(0.0, 0.0, 1.0, 1.0), 2.6).unwrap();
        assert_eq!(grid.real_axis.len(), 3);
    }

    #[test]
    fn axes_start_at_the_region_corner() {
        let grid = Grid::build(Region::new(-2.0, -1.5, 3.0, 3.0), 10.0).unwrap();
        assert_eq!(grid.real_axis[0], -2.0);
        assert_eq!(grid.imag_axis[0], -1.5);
    }

    #[test]
    fn axes_span_the_region_inclusively() {
        let grid = Grid::build(Region::new(-2.0, -2.0, 4.0, 4.0), 25.0).unwrap();
        let last = grid.real_axis[grid.real_axis.len() - 1];
        assert!((last - 2.0).abs() < 1e-9);
    }

    #[test]
    fn axes_increase_strictly_and_evenly() {
        let grid = Grid::build(Region::new(-1.0, -1.0, 2.0, 2.0), 50.0).unwrap();
        let step = 2.0 / ((grid.real_axis.len() - 1) as f64);
        for pair in grid.real_axis.windows(2) {
            assert!(pair[1] > pair[0]);
            assert!((pair[1] - pair[0] - step).abs() < 1e-12);
        }
    }

    #[test]
    fn point_combines_the_two_axes() {
        let grid = Grid::build(Region::new(0.0, 0.0, 2.0, 2.0), 2.0).unwrap();
        assert_eq!(grid.point(0, 0), Complex::new(0.0, 0.0));
        let (nx, ny) = grid.shape();
        let corner = grid.point(nx - 1, ny - 1);
        assert!((corner.re - 2.0).abs() < 1e-12);
        assert!((corner.im - 2.0).abs() < 1e-12);
    }
}
