//! Report pipeline orchestration.
//!
//! This module owns the per-experiment work (load, statistics, plots) and the
//! processing that runs once a (batch size, wait) group is complete
//! (composites, markdown). The CLI layer drives the loop and presentation.

mod experiment;
mod post_process;

pub(crate) use experiment::process_experiment;
pub(crate) use post_process::process_group_completion;
