//! Batch utilities for an SRA RNA-seq workflow: BioProject sample
//! sheet fetching, Salmon counts aggregation, and QC plotting. Each
//! binary is a single pass over flat files; the only coupling between
//! them is the sample sheet CSV and the counts matrix TSV.

pub mod domain;
pub mod ena;
pub mod error;
pub mod eutils;
pub mod fetch;
pub mod fs_util;
pub mod matrix;
pub mod pca;
pub mod plot;
pub mod quant;
pub mod sheet;
