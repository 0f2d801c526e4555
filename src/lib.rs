//! jeju-onul - multi-wave delivery orchestration.
//!
//! Builds a three-wave pickup/assembly/delivery plan for one operating day:
//! classifies every parcel's eligibility, runs the two-stage optimization
//! pipeline against the VRP solver collaborator, and reconciles the result
//! into per-vehicle task sequences and inter-wave swap manifests.

pub mod classify;
pub mod config;
pub mod cost;
pub mod domain;
pub mod error;
pub mod http;
pub mod index;
pub mod minsearch;
pub mod optimize;
pub mod reconcile;
pub mod routing;
pub mod skills;
pub mod solver;
pub mod waves;
