#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fractal animation frame evaluator
//!
//! This crate evaluates escape-time fractals (Mandelbrot, Julia,
//! Burning Ship) and Newton-Raphson root basins over a rectangular
//! region of the complex plane, one animation frame at a time.  Each
//! frame gets an iteration budget from a schedule that grows
//! exponentially with the frame index, so early frames are cheap and
//! blurry and later frames approach full detail; Julia animations
//! instead hold the budget fixed and sweep the map's parameter around
//! a circle.
//!
//! The output of a frame is a dense matrix of per-point results: the
//! iteration at which a point's orbit diverged, a "stayed bounded"
//! marker, or (for Newton basins) the label of the root the point
//! converged to.  Mapping those numbers to colors, assembling frames
//! into an animation, and writing files are all the business of
//! whatever consumes the matrix, not of this crate.

extern crate crossbeam;
#[macro_use]
extern crate failure;
extern crate itertools;
extern crate num;

pub mod escape;
pub mod grid;
pub mod newton;
pub mod render;
pub mod schedule;

pub use escape::Escape;
pub use grid::{Grid, InvalidRegion, Region};
pub use newton::{NewtonMap, NewtonOutcome, RootRegistry};
pub use render::{
    render_frame, render_frame_threaded, FractalConfig, FractalKind, FrameBuffer, NewtonColoring,
    PointResult,
};
pub use schedule::{FrameRequest, Sweep};
