//! The escape-time kernels: Mandelbrot, Julia, and Burning Ship.
//!
//! All three share one divergence rule: iterate the variant's update
//! map and, the moment the orbit's modulus exceeds 4, report the
//! 0-indexed iteration at which that happened.  The early exit is the
//! dominant cost saving for escaping points, whose average cost is far
//! below the budget.  An orbit that never crosses the threshold within
//! the budget is reported as `Bounded` rather than as a fake iteration
//! count; callers that need the reference renderer's collapsed numeric
//! scale get it back through [`Escape::palette_index`].

use num::Complex;

// |z| > 4, compared against the squared modulus to skip the sqrt.
const THRESHOLD_SQR: f64 = 16.0;

/// The fixed additive parameter of the Burning Ship map.
const SHIP_C: Complex<f64> = Complex { re: -0.8, im: -0.8 };

/// The outcome of iterating an escape-time map at one point.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Escape {
    /// The orbit's modulus exceeded the divergence threshold at this
    /// 0-indexed iteration.
    Escaped(usize),
    /// The orbit stayed within the threshold for the whole budget.
    /// This covers both genuinely bounded points and points that
    /// merely ran out of budget; the two are indistinguishable here.
    Bounded,
}

impl Escape {
    /// Collapses the result onto the reference renderer's numeric
    /// scale: escaped points map to their escape iteration, bounded
    /// points to `budget - 1`.
    pub fn palette_index(&self, budget: usize) -> usize {
        match *self {
            Escape::Escaped(i) => i,
            Escape::Bounded => budget.saturating_sub(1),
        }
    }
}

// The negated comparison classifies an orbit whose squaring overflowed
// to infinity or NaN as diverged at that step instead of letting it
// spin until the budget runs out.
fn diverged(z: Complex<f64>) -> bool {
    !(z.norm_sqr() <= THRESHOLD_SQR)
}

/// The Mandelbrot map at point `c`: `z0 = 0`, `z[i+1] = z[i]^2 + c`.
pub fn mandelbrot(c: Complex<f64>, budget: usize) -> Escape {
    let mut z = Complex::new(0.0, 0.0);
    for i in 0..budget {
        z = z * z + c;
        if diverged(z) {
            return Escape::Escaped(i);
        }
    }
    Escape::Bounded
}

/// The Julia map with parameter `c`, started at the grid point itself:
/// `z0 = p`, `z[i+1] = z[i]^2 + c`.  The parameter is fixed within a
/// frame and swept between frames by the scheduler.
pub fn julia(p: Complex<f64>, c: Complex<f64>, budget: usize) -> Escape {
    let mut z = p;
    for i in 0..budget {
        z = z * z + c;
        if diverged(z) {
            return Escape::Escaped(i);
        }
    }
    Escape::Bounded
}

/// The Burning Ship map at point `p = x + iy`, started at the point
/// itself.  Each step first folds the orbit through
/// `w = (re(z)^2 - im(z)^2 + x) + i(2|re(z) im(z)| + y)` and then
/// squares again, `z[i+1] = w^2 + c`, with `c` fixed at (-0.8, -0.8).
/// The absolute-value fold before the second squaring is what makes
/// this map different from the Mandelbrot; the operation order is not
/// a simple reflection of the standard map and must stay as written.
pub fn burning_ship(p: Complex<f64>, budget: usize) -> Escape {
    let mut z = p;
    for i in 0..budget {
        let w = Complex::new(
            z.re * z.re - z.im * z.im + p.re,
            2.0 * (z.re * z.im).abs() + p.im,
        );
        z = w * w + SHIP_C;
        if diverged(z) {
            return Escape::Escaped(i);
        }
    }
    Escape::Bounded
}
