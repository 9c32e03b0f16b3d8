//! Common test utilities for wrfinterp.
//!
//! Fixtures synthesise small wrfout, RAP and GridRad files with known
//! contents so the jobs can be run end to end.

#![allow(dead_code)]

pub mod assertions;
pub mod image_utils;
pub mod test_data;
