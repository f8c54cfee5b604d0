//! Numerical building blocks shared by the smile and surface code.

pub(crate) mod black;
pub(crate) mod normal;
pub(crate) mod solver;
pub(crate) mod spline;

pub(crate) use black::{black_call, d1};
pub(crate) use normal::{norm_cdf, norm_inv_cdf, norm_pdf};
pub(crate) use solver::{RootConfig, bracketed_newton};
pub(crate) use spline::CubicSpline;
