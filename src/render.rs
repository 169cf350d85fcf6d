// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The frame evaluator: drives a grid, a kernel, and a frame's budget
//! into one dense output matrix.
//!
//! Evaluation is a pure per-point map with no cross-point dependency
//! except one: the Newton root registry, whose labels depend on which
//! point discovers a root first.  The scan order is therefore fixed
//! (real axis outer, imaginary axis inner), and the threaded evaluator
//! splits the work into two phases: workers compute every point's
//! outcome in parallel, and the registry labels are assigned afterward
//! in a single sequential pass over the finished scan.  Threaded and
//! sequential output are identical.

extern crate crossbeam;

use crossbeam::thread::ScopedJoinHandle;
use itertools::iproduct;
use num::Complex;
use std::sync::{Arc, Mutex};

use escape::{self, Escape};
use grid::{Grid, InvalidRegion, Region};
use newton::{NewtonMap, NewtonOutcome, RootRegistry};
use schedule::{self, FrameRequest, Sweep};

/// Which quantity a Newton evaluation records in the matrix.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NewtonColoring {
    /// The iteration at which each point converged.
    Iterations,
    /// The registry label of the root each point reached.
    Roots,
}

/// A fractal family together with its kind-specific parameters.
pub enum FractalKind {
    /// The Mandelbrot map, budget on the exponential ramp.
    Mandelbrot,
    /// The Burning Ship map, budget on the exponential ramp.
    BurningShip,
    /// The Julia map: fixed budget, parameter swept between frames.
    Julia {
        /// The sweep radius R.
        radius: f64,
        /// The fixed per-frame iteration budget.
        threshold: usize,
        /// Which sweep formula derives the parameter from the angle.
        sweep: Sweep,
    },
    /// Newton-Raphson basins, budget on the ramp but capped by the
    /// map's hard iteration ceiling.
    Newton {
        /// The map, its derivative, tolerance, and cap.
        map: NewtonMap,
        /// Whether the matrix records iterations or root labels.
        coloring: NewtonColoring,
    },
}

/// A complete animation description: the fractal kind, the sampling
/// grid it owns, and the number of frames to schedule.
pub struct FractalConfig {
    /// The fractal family and its parameters.
    pub kind: FractalKind,
    /// The sampling grid, owned exclusively by this configuration.
    pub grid: Grid,
    /// The number of frames in the animation.
    pub frame_count: usize,
}

/// One point's entry in a frame's output matrix.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PointResult {
    /// An escape-time orbit diverged at this 0-indexed iteration.
    Escaped(usize),
    /// The orbit stayed within the threshold for the whole budget.
    /// Under iteration coloring, a Newton run that hit the cap lands
    /// here too.
    Bounded,
    /// A Newton orbit converged at this iteration (iteration
    /// coloring).
    Converged(usize),
    /// The label of the root a Newton orbit reached (root coloring).
    Root(usize),
    /// A Newton orbit that neither converged nor diverged (root
    /// coloring).
    NonConvergent,
}

impl PointResult {
    /// Collapses the result onto the reference renderer's numeric
    /// scale: iteration counts and root labels map to themselves,
    /// everything unclassifiable to `budget - 1`.
    pub fn palette_index(&self, budget: usize) -> usize {
        match *self {
            PointResult::Escaped(i) | PointResult::Converged(i) => i,
            PointResult::Bounded | PointResult::NonConvergent => budget.saturating_sub(1),
            PointResult::Root(label) => label,
        }
    }
}

/// A frame's dense output matrix.  Storage is row-major with the real
/// axis as the outer index: the result for grid point (i, j) lives at
/// offset `i * imag_len + j`.  Produced fresh for every frame and
/// handed off to the consumer; the evaluator retains nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    cells: Vec<PointResult>,
    real_len: usize,
    imag_len: usize,
}

impl FrameBuffer {
    fn from_cells(cells: Vec<PointResult>, real_len: usize, imag_len: usize) -> FrameBuffer {
        debug_assert_eq!(cells.len(), real_len * imag_len);
        FrameBuffer {
            cells,
            real_len,
            imag_len,
        }
    }

    /// The (real, imaginary) axis lengths of the matrix.
    pub fn shape(&self) -> (usize, usize) {
        (self.real_len, self.imag_len)
    }

    /// The result at grid coordinates (i, j).
    pub fn get(&self, i: usize, j: usize) -> PointResult {
        self.cells[i * self.imag_len + j]
    }

    /// Every cell, in scan order (real axis outer).
    pub fn cells(&self) -> &[PointResult] {
        &self.cells
    }

    /// The total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True for a matrix with no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl FractalConfig {
    /// Assembles a configuration from its parts.
    pub fn new(kind: FractalKind, grid: Grid, frame_count: usize) -> FractalConfig {
        FractalConfig {
            kind,
            grid,
            frame_count,
        }
    }

    /// The Mandelbrot preset: the region (-2, -1.5) to (1, 1.5) at 250
    /// samples per unit, 45 frames.
    pub fn mandelbrot() -> Result<FractalConfig, InvalidRegion> {
        let grid = Grid::build(Region::new(-2.0, -1.5, 3.0, 3.0), 250.0)?;
        Ok(FractalConfig::new(FractalKind::Mandelbrot, grid, 45))
    }

    /// The Julia preset: R = 0.7885 with the offset sweep, a 4x4
    /// region centered on the origin at 200 samples per unit, budget
    /// pinned to 20, 100 frames.
    pub fn julia() -> Result<FractalConfig, InvalidRegion> {
        let grid = Grid::build(Region::new(-2.0, -2.0, 4.0, 4.0), 200.0)?;
        Ok(FractalConfig::new(
            FractalKind::Julia {
                radius: 0.7885,
                threshold: 20,
                sweep: Sweep::Offset,
            },
            grid,
            100,
        ))
    }

    /// The Burning Ship preset: same region and density as the
    /// Mandelbrot, 35 frames.
    pub fn burning_ship() -> Result<FractalConfig, InvalidRegion> {
        let grid = Grid::build(Region::new(-2.0, -1.5, 3.0, 3.0), 250.0)?;
        Ok(FractalConfig::new(FractalKind::BurningShip, grid, 35))
    }

    /// The Newton preset: the cubic map over a 2x2 region centered on
    /// the origin at 250 samples per unit, root coloring, 20 frames.
    pub fn newton() -> Result<FractalConfig, InvalidRegion> {
        let grid = Grid::build(Region::new(-1.0, -1.0, 2.0, 2.0), 250.0)?;
        Ok(FractalConfig::new(
            FractalKind::Newton {
                map: NewtonMap::cubic(),
                coloring: NewtonColoring::Roots,
            },
            grid,
            20,
        ))
    }

    /// The request for a frame: the ramped (or, for Julia, pinned)
    /// iteration budget, and the swept parameter where one applies.
    pub fn schedule(&self, frame_index: usize) -> FrameRequest {
        match self.kind {
            FractalKind::Julia {
                radius,
                threshold,
                sweep,
            } => FrameRequest {
                frame_index,
                iteration_budget: threshold,
                parameter: Some(sweep.parameter(
                    radius,
                    schedule::sweep_angle(frame_index, self.frame_count),
                )),
            },
            FractalKind::Newton { ref map, .. } => FrameRequest {
                frame_index,
                iteration_budget: schedule::ramp_budget(frame_index).min(map.max_iterations()),
                parameter: None,
            },
            FractalKind::Mandelbrot | FractalKind::BurningShip => FrameRequest {
                frame_index,
                iteration_budget: schedule::ramp_budget(frame_index),
                parameter: None,
            },
        }
    }

    // The per-frame kernel: the kind with its frame-varying parameter
    // resolved.  A request without a Julia parameter falls back to
    // deriving one from the request's own frame index.
    fn kernel(&self, request: &FrameRequest) -> FrameKernel {
        match self.kind {
            FractalKind::Mandelbrot => FrameKernel::Mandelbrot,
            FractalKind::BurningShip => FrameKernel::BurningShip,
            FractalKind::Julia { radius, sweep, .. } => {
                let c = match request.parameter {
                    Some(c) => c,
                    None => sweep.parameter(
                        radius,
                        schedule::sweep_angle(request.frame_index, self.frame_count),
                    ),
                };
                FrameKernel::Julia(c)
            }
            FractalKind::Newton { ref map, coloring } => FrameKernel::Newton(map, coloring),
        }
    }
}

// One point's state after the compute phase: either final, or a
// convergence still waiting for its registry label.
#[derive(Copy, Clone, Debug)]
enum PointPass {
    Done(PointResult),
    Unlabeled(Complex<f64>),
}

// The dispatchable per-frame kernel.  Cheap to copy into worker
// threads; the Newton map is borrowed, not cloned.
#[derive(Copy, Clone)]
enum FrameKernel<'a> {
    Mandelbrot,
    BurningShip,
    Julia(Complex<f64>),
    Newton(&'a NewtonMap, NewtonColoring),
}

fn from_escape(e: Escape) -> PointResult {
    match e {
        Escape::Escaped(i) => PointResult::Escaped(i),
        Escape::Bounded => PointResult::Bounded,
    }
}

impl<'a> FrameKernel<'a> {
    fn evaluate(&self, p: Complex<f64>, budget: usize) -> PointPass {
        match *self {
            FrameKernel::Mandelbrot => PointPass::Done(from_escape(escape::mandelbrot(p, budget))),
            FrameKernel::BurningShip => {
                PointPass::Done(from_escape(escape::burning_ship(p, budget)))
            }
            FrameKernel::Julia(c) => PointPass::Done(from_escape(escape::julia(p, c, budget))),
            FrameKernel::Newton(map, coloring) => match (map.evaluate(p, budget), coloring) {
                (NewtonOutcome::Converged { iterations, .. }, NewtonColoring::Iterations) => {
                    PointPass::Done(PointResult::Converged(iterations))
                }
                (NewtonOutcome::NonConvergent, NewtonColoring::Iterations) => {
                    PointPass::Done(PointResult::Bounded)
                }
                (NewtonOutcome::Converged { root, .. }, NewtonColoring::Roots) => {
                    PointPass::Unlabeled(root)
                }
                (NewtonOutcome::NonConvergent, NewtonColoring::Roots) => {
                    PointPass::Done(PointResult::NonConvergent)
                }
            },
        }
    }
}

// A fresh registry for configurations that need one this frame.  The
// registry is rebuilt for every frame, so labels are stable within a
// frame but not across frames.
fn frame_registry(config: &FractalConfig) -> Option<RootRegistry> {
    match config.kind {
        FractalKind::Newton {
            ref map,
            coloring: NewtonColoring::Roots,
        } => Some(RootRegistry::new(map.tolerance())),
        _ => None,
    }
}

// The sequential labeling phase: convergences are stamped with their
// registry label in scan order, everything else passes through.
fn assign_labels(
    config: &FractalConfig,
    passes: Vec<PointPass>,
    real_len: usize,
    imag_len: usize,
) -> FrameBuffer {
    let mut registry = frame_registry(config);
    let cells = passes
        .into_iter()
        .map(|pass| match pass {
            PointPass::Done(result) => result,
            PointPass::Unlabeled(root) => match registry {
                Some(ref mut registry) => PointResult::Root(registry.label(root)),
                // Only the Newton root kernel emits unlabeled passes.
                None => PointResult::NonConvergent,
            },
        })
        .collect();
    FrameBuffer::from_cells(cells, real_len, imag_len)
}

/// Evaluates one frame sequentially: every grid point is mapped
/// through the configured kernel at the request's budget, in the fixed
/// scan order (real axis outer, imaginary axis inner), and the results
/// land in a fresh matrix.
pub fn render_frame(config: &FractalConfig, request: &FrameRequest) -> FrameBuffer {
    let (real_len, imag_len) = config.grid.shape();
    let kernel = config.kernel(request);
    let passes: Vec<PointPass> = iproduct!(0..real_len, 0..imag_len)
        .map(|(i, j)| kernel.evaluate(config.grid.point(i, j), request.iteration_budget))
        .collect();
    assign_labels(config, passes, real_len, imag_len)
}

/// Evaluates one frame across `threads` workers.  Workers pull whole
/// rows of the real axis from a shared queue and compute each point's
/// outcome; root labels are assigned afterward in one sequential pass
/// over the assembled scan, so the output is identical to
/// [`render_frame`]'s.
///
/// [`render_frame`]: fn.render_frame.html
pub fn render_frame_threaded(
    config: &FractalConfig,
    request: &FrameRequest,
    threads: usize,
) -> FrameBuffer {
    if threads <= 1 {
        return render_frame(config, request);
    }
    let (real_len, imag_len) = config.grid.shape();
    let kernel = config.kernel(request);
    let kernel = &kernel;
    let budget = request.iteration_budget;
    let rows = Arc::new(Mutex::new(0..real_len));

    let mut computed: Vec<(usize, Vec<PointPass>)> = vec![];
    crossbeam::scope(|spawner| {
        let handles: Vec<ScopedJoinHandle<Vec<(usize, Vec<PointPass>)>>> = (0..threads)
            .map(|_| {
                let rows = rows.clone();
                spawner.spawn(move |_| {
                    let mut mine: Vec<(usize, Vec<PointPass>)> = vec![];
                    loop {
                        let row = { rows.lock().unwrap().next() };
                        match row {
                            Some(i) => {
                                let cells = (0..imag_len)
                                    .map(|j| kernel.evaluate(config.grid.point(i, j), budget))
                                    .collect();
                                mine.push((i, cells));
                            }
                            None => {
                                break;
                            }
                        }
                    }
                    mine
                })
            })
            .collect();

        computed = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .flatten()
            .collect()
    })
    .unwrap();

    computed.sort_by_key(|&(i, _)| i);
    let mut passes: Vec<PointPass> = Vec::with_capacity(real_len * imag_len);
    for (_, row) in computed {
        passes.extend(row);
    }
    assign_labels(config, passes, real_len, imag_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_mandelbrot() -> FractalConfig {
        let grid = Grid::build(Region::new(-2.0, -1.5, 3.0, 3.0), 8.0).unwrap();
        FractalConfig::new(FractalKind::Mandelbrot, grid, 45)
    }

    fn small_newton(coloring: NewtonColoring) -> FractalConfig {
        let grid = Grid::build(Region::new(-1.0, -1.0, 2.0, 2.0), 10.0).unwrap();
        FractalConfig::new(
            FractalKind::Newton {
                map: NewtonMap::cubic(),
                coloring,
            },
            grid,
            20,
        )
    }

    #[test]
    fn matrix_shape_matches_the_grid() {
        let config = small_mandelbrot();
        let request = config.schedule(10);
        let frame = render_frame(&config, &request);
        assert_eq!(frame.shape(), config.grid.shape());
        assert_eq!(frame.len(), config.grid.len());
        assert!(!frame.is_empty());
    }

    #[test]
    fn escape_results_collapse_within_the_budget() {
        let config = small_mandelbrot();
        let request = config.schedule(12);
        let frame = render_frame(&config, &request);
        for cell in frame.cells() {
            assert!(cell.palette_index(request.iteration_budget) < request.iteration_budget);
        }
    }

    #[test]
    fn rendering_is_deterministic() {
        let config = small_mandelbrot();
        let request = config.schedule(15);
        assert_eq!(
            render_frame(&config, &request),
            render_frame(&config, &request)
        );
    }

    #[test]
    fn threaded_output_matches_sequential() {
        let config = small_mandelbrot();
        let request = config.schedule(15);
        let sequential = render_frame(&config, &request);
        for threads in [2, 3, 7].iter() {
            assert_eq!(
                render_frame_threaded(&config, &request, *threads),
                sequential
            );
        }
    }

    #[test]
    fn threaded_newton_labels_match_sequential() {
        let config = small_newton(NewtonColoring::Roots);
        let request = FrameRequest {
            frame_index: 19,
            iteration_budget: 100,
            parameter: None,
        };
        let sequential = render_frame(&config, &request);
        assert_eq!(render_frame_threaded(&config, &request, 4), sequential);
    }

    #[test]
    fn cubic_newton_discovers_three_roots() {
        let config = small_newton(NewtonColoring::Roots);
        let request = FrameRequest {
            frame_index: 19,
            iteration_budget: 100,
            parameter: None,
        };
        let frame = render_frame(&config, &request);
        let mut seen = [false; 3];
        for cell in frame.cells() {
            match *cell {
                PointResult::Root(label) => {
                    assert!(label < 3);
                    seen[label] = true;
                }
                PointResult::NonConvergent => {}
                ref other => panic!("unexpected result in a root-colored frame: {:?}", other),
            }
        }
        assert_eq!(seen, [true, true, true]);
    }

    #[test]
    fn newton_iteration_coloring_reports_counts() {
        let config = small_newton(NewtonColoring::Iterations);
        let request = FrameRequest {
            frame_index: 19,
            iteration_budget: 100,
            parameter: None,
        };
        let frame = render_frame(&config, &request);
        let mut converged = 0;
        for cell in frame.cells() {
            match *cell {
                PointResult::Converged(i) => {
                    assert!(i < 100);
                    converged += 1;
                }
                PointResult::Bounded => {}
                ref other => panic!("unexpected result under iteration coloring: {:?}", other),
            }
        }
        assert!(converged > 0);
    }

    #[test]
    fn newton_budget_is_capped_by_the_map() {
        let config = small_newton(NewtonColoring::Roots);
        // Far past the ramp's crossing point with the cap.
        let request = config.schedule(80);
        assert_eq!(request.iteration_budget, 1000);
    }

    #[test]
    fn julia_schedule_pins_the_budget_and_sweeps_the_parameter() {
        let config = FractalConfig::julia().unwrap();
        let first = config.schedule(0);
        let later = config.schedule(25);
        assert_eq!(first.iteration_budget, 20);
        assert_eq!(later.iteration_budget, 20);
        assert_eq!(first.parameter, Some(Complex::new(0.7885, 0.7885)));
        assert!(later.parameter != first.parameter);
    }

    #[test]
    fn ramped_budgets_are_monotone_across_the_animation() {
        let config = small_mandelbrot();
        for frame in 0..config.frame_count - 1 {
            assert!(
                config.schedule(frame + 1).iteration_budget
                    >= config.schedule(frame).iteration_budget
            );
        }
    }

    #[test]
    fn julia_kernel_falls_back_to_the_scheduled_parameter() {
        let grid = Grid::build(Region::new(-2.0, -2.0, 4.0, 4.0), 5.0).unwrap();
        let config = FractalConfig::new(
            FractalKind::Julia {
                radius: 0.7885,
                threshold: 20,
                sweep: Sweep::Circle,
            },
            grid,
            10,
        );
        let scheduled = config.schedule(3);
        let bare = FrameRequest {
            frame_index: 3,
            iteration_budget: 20,
            parameter: None,
        };
        assert_eq!(
            render_frame(&config, &scheduled),
            render_frame(&config, &bare)
        );
    }
}
