//! Phase sequencer
//!
//! Runs `create → setxattr → getxattr → unlink` once, in order. Each phase
//! is timed on its own; cache control runs after the timer closes so its
//! cost never lands in a measurement. The first failure ends the run and
//! no cleanup is attempted, leaving the corpus on disk for inspection.

use serde::Serialize;

use crate::cache::{CacheControl, HookRunner, ProcessRunner};
use crate::config::RunConfig;
use crate::corpus::Corpus;
use crate::error::Result;
use crate::payload::SizeSampler;
use crate::reader::AttrReader;
use crate::timing::{Elapsed, PhaseTimer};
use crate::writer::AttrWriter;
use crate::xattr::{LinkXattr, XattrOps};

/// Argument passed to the hook after every phase
pub const POST_HOOK_TOKEN: &str = "post";

/// One stage of a run, serialized as its label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    #[serde(rename = "create")]
    Create,
    #[serde(rename = "setxattr")]
    Write,
    #[serde(rename = "getxattr")]
    Read,
    #[serde(rename = "unlink")]
    Teardown,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Create, Phase::Write, Phase::Read, Phase::Teardown];

    /// Label used in progress lines and the report
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Create => "create",
            Phase::Write => "setxattr",
            Phase::Read => "getxattr",
            Phase::Teardown => "unlink",
        }
    }
}

/// Measured duration of one completed phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseReport {
    pub phase: Phase,
    pub elapsed: Elapsed,
}

impl PhaseReport {
    pub fn label(&self) -> &'static str {
        self.phase.label()
    }
}

/// A single benchmark run over one configuration
pub struct Benchmark<'a, X: XattrOps = LinkXattr, R: HookRunner = ProcessRunner> {
    config: &'a RunConfig,
    xattr: X,
    cache: CacheControl<R>,
    sampler: SizeSampler,
}

impl<'a> Benchmark<'a> {
    /// Kernel xattrs and a spawned hook process
    pub fn from_config(config: &'a RunConfig) -> Self {
        Self::new(config, LinkXattr, CacheControl::from_config(config))
    }
}

impl<'a, X: XattrOps, R: HookRunner> Benchmark<'a, X, R> {
    pub fn new(config: &'a RunConfig, xattr: X, cache: CacheControl<R>) -> Self {
        Self {
            config,
            xattr,
            cache,
            sampler: SizeSampler::from_config(config),
        }
    }

    /// Phases this configuration will run, in order
    pub fn phases(&self) -> Vec<Phase> {
        Phase::ALL
            .into_iter()
            .filter(|phase| !(self.config.keep && *phase == Phase::Teardown))
            .collect()
    }

    /// Run every phase, calling `on_phase` as each one completes
    ///
    /// `on_phase` is called after the timer stops and before cache control.
    pub fn run(mut self, mut on_phase: impl FnMut(&PhaseReport)) -> Result<Vec<PhaseReport>> {
        let mut reports = Vec::with_capacity(Phase::ALL.len());

        for phase in self.phases() {
            tracing::info!(phase = phase.label(), "phase started");

            let timer = PhaseTimer::start()?;
            self.run_phase(phase)?;
            let elapsed = timer.stop()?;

            let report = PhaseReport { phase, elapsed };
            on_phase(&report);
            reports.push(report);

            self.cache.after_phase(POST_HOOK_TOKEN)?;
        }

        Ok(reports)
    }

    fn run_phase(&mut self, phase: Phase) -> Result<()> {
        match phase {
            Phase::Create => Corpus::new(self.config).populate(),
            Phase::Write => AttrWriter::new(self.config, &self.xattr).run(&mut self.sampler),
            Phase::Read => AttrReader::new(self.config, &self.xattr).run(),
            Phase::Teardown => Corpus::new(self.config).teardown(),
        }
    }
}
