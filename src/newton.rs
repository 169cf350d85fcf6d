//! The root-convergence kernel: Newton-Raphson iteration over the
//! complex plane, plus the registry that assigns stable integer
//! labels to the roots it discovers.
//!
//! Unlike the escape-time kernels, a Newton orbit is classified by
//! where it settles rather than how fast it leaves: the iteration
//! stops as soon as the step `dz = f(z)/f'(z)` shrinks below the
//! tolerance, and the `z` it stopped at names the root.  Points whose
//! orbit neither settles within the budget nor survives the division
//! (a vanishing derivative, an overflowing quotient) are reported as
//! non-convergent, mirroring the "does not escape" semantics of the
//! other kernels; they never abort a frame.

use num::Complex;

/// The signature of the map and its derivative: an arbitrary callable
/// from the complex plane to itself, shareable across worker threads.
pub type ComplexMap = Box<dyn Fn(Complex<f64>) -> Complex<f64> + Send + Sync>;

/// The parameters of a Newton-basin evaluation.  Once built, this
/// should not be mutated.
pub struct NewtonMap {
    f: ComplexMap,
    fprime: ComplexMap,
    // Convergence tolerance, doubling as the root-identity tolerance
    // used by the registry.
    tolerance: f64,
    // Hard ceiling on the per-frame iteration budget.
    max_iterations: usize,
}

/// The outcome of a single Newton-Raphson run.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum NewtonOutcome {
    /// The step shrank below tolerance.
    Converged {
        /// The 0-indexed iteration at which the step shrank below
        /// tolerance.
        iterations: usize,
        /// The value of `z` at that point, i.e. the root reached.
        root: Complex<f64>,
    },
    /// The budget ran out, the derivative vanished, or the quotient
    /// left the representable range.  Recorded as a sentinel in the
    /// output matrix, never surfaced as an error.
    NonConvergent,
}

impl NewtonMap {
    /// Assembles a map from `f`, its derivative, the convergence
    /// tolerance, and the hard iteration cap.
    pub fn new(
        f: ComplexMap,
        fprime: ComplexMap,
        tolerance: f64,
        max_iterations: usize,
    ) -> NewtonMap {
        NewtonMap {
            f,
            fprime,
            tolerance,
            max_iterations,
        }
    }

    /// The classic cubic preset, `f(z) = z^3 - 1`, whose three basins
    /// tile the plane around the cube roots of unity.  Tolerance 1e-8,
    /// cap 1000.
    pub fn cubic() -> NewtonMap {
        NewtonMap::new(
            Box::new(|z| z * z * z - Complex::new(1.0, 0.0)),
            Box::new(|z| Complex::new(3.0, 0.0) * z * z),
            1e-8,
            1000,
        )
    }

    /// The convergence (and root-identity) tolerance.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// The hard ceiling on any frame's iteration budget.
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Runs Newton-Raphson from `z0` for at most `budget` iterations:
    /// `z[i+1] = z[i] - f(z[i])/f'(z[i])`, stopping at the first step
    /// whose modulus falls below the tolerance.
    pub fn evaluate(&self, z0: Complex<f64>, budget: usize) -> NewtonOutcome {
        let mut z = z0;
        for i in 0..budget {
            let d = (self.fprime)(z);
            if d.norm_sqr() == 0.0 {
                return NewtonOutcome::NonConvergent;
            }
            let dz = (self.f)(z) / d;
            if !dz.re.is_finite() || !dz.im.is_finite() {
                return NewtonOutcome::NonConvergent;
            }
            if dz.norm() < self.tolerance {
                return NewtonOutcome::Converged {
                    iterations: i,
                    root: z,
                };
            }
            z = z - dz;
        }
        NewtonOutcome::NonConvergent
    }
}

/// The dynamic root-identity registry.  An append-only list of the
/// distinct roots discovered during one frame's scan; a candidate is
/// matched against existing entries by the modulus of the difference,
/// the first entry within tolerance (in insertion order) wins, and an
/// unmatched candidate is appended and labeled with its index.  Labels
/// are therefore determined by scan order, which is why the frame
/// evaluator assigns them in a single deterministic pass.
#[derive(Debug)]
pub struct RootRegistry {
    roots: Vec<Complex<f64>>,
    tolerance: f64,
}

impl RootRegistry {
    /// An empty registry with the given identity tolerance.
    pub fn new(tolerance: f64) -> RootRegistry {
        RootRegistry {
            roots: vec![],
            tolerance,
        }
    }

    /// The label for a converged value: the index of the first known
    /// root within tolerance, or the index this value is appended at
    /// when no known root matches.
    pub fn label(&mut self, root: Complex<f64>) -> usize {
        for (k, known) in self.roots.iter().enumerate() {
            if (*known - root).norm() <= self.tolerance {
                return k;
            }
        }
        self.roots.push(root);
        self.roots.len() - 1
    }

    /// The number of distinct roots discovered so far.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// True before the first root has been recorded.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// The discovered roots, in label order.
    pub fn roots(&self) -> &[Complex<f64>] {
        &self.roots
    }
}
