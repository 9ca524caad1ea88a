#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map-facing side of the county bands view.
//!
//! The map library itself is reached only through [`adapter::MapAdapter`].
//! This crate supplies everything that library is fed: layer definitions
//! and paint expressions per metric, legend and popup markup, and the
//! [`controller::MapController`] that turns control input into adapter
//! calls and band animations.

pub mod adapter;
pub mod controller;
pub mod format;
pub mod hit;
pub mod legend;
pub mod popup;
pub mod style;

pub use adapter::{HeadlessMap, MapAdapter, MapError};
pub use controller::{MapController, ViewOptions};
pub use legend::Legend;
