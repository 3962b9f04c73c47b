// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Serialize;

use crate::bench_e2e::SystemUnderTest;

/// The deterministic key for record `i`, shared by all phases.
pub fn record_key(i: usize) -> String {
    format!("key_{i}")
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Insert,
    Query,
    Delete,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Insert => write!(f, "insert"),
            Phase::Query => write!(f, "query"),
            Phase::Delete => write!(f, "delete"),
        }
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct PhaseResult {
    pub phase: Phase,
    pub op_cnt: usize,
    pub elapsed_secs: f64,
}

impl PhaseResult {
    pub fn new(phase: Phase, op_cnt: usize, elapsed: Duration) -> Self {
        Self {
            phase,
            op_cnt,
            elapsed_secs: elapsed.as_secs_f64(),
        }
    }

    pub fn ops_per_sec(&self) -> f64 {
        if self.elapsed_secs == 0.0 {
            return 0.0;
        }
        self.op_cnt as f64 / self.elapsed_secs
    }
}

impl std::fmt::Display for PhaseResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Time taken to {} {} documents: {:.4} seconds",
            self.phase, self.op_cnt, self.elapsed_secs
        )
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct BenchResult {
    pub name: String,
    pub sut: SystemUnderTest,
    pub record_cnt: usize,
    pub phases: Vec<PhaseResult>,
}

impl std::fmt::Display for BenchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "[{}] {:?}, {} records", self.name, self.sut, self.record_cnt)?;
        for phase in &self.phases {
            writeln!(f, "{phase}")?;
        }
        Ok(())
    }
}

/// Write all results of a run to a timestamped JSON file under
/// `target/benchmark/`, returning the path.
pub fn write_json(results: &[BenchResult]) -> std::io::Result<PathBuf> {
    let dir = Path::new("target/benchmark");
    std::fs::create_dir_all(dir)?;

    let name = results.first().map(|r| r.name.as_str()).unwrap_or("bench");
    let stamp = chrono::Local::now().format("%Y-%m-%d-%H-%M-%S");
    let path = dir.join(format!("{name}-{stamp}.json"));

    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(&path, json)?;
    Ok(path)
}
