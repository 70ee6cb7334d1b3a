//! Core reusable components for pairwise alignment.
//!
//! This module contains the dynamic-programming kernels and the alignment
//! driver. They are agnostic to where the sequences come from and are reused
//! by the command line front end and by callers of the library.

pub mod alignment;
