// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::{path::Path, time::Instant};

use serde::{Deserialize, Serialize};

use crate::{
    common::{record_key, write_json, BenchResult, Phase, PhaseResult},
    wrappers::MemodocsWrapper,
    DocStore,
};

#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub enum SystemUnderTest {
    Memodocs,
    Sqlite,
}

impl SystemUnderTest {
    fn file_extension(&self) -> &'static str {
        match self {
            SystemUnderTest::Memodocs => "mdb",
            SystemUnderTest::Sqlite => "sqlite",
        }
    }
}

/// Benchmark description parsed from `bench.toml`.
/// `sut` is a matrix field: one run per listed system under test.
#[derive(Deserialize, Clone, Debug)]
pub struct E2EBench {
    pub name: String,
    pub repeat: usize,
    pub record_cnt: usize,
    pub file_path: String,
    pub sut: Vec<SystemUnderTest>,
}

/// One expanded run: a single system under test against its own backing file.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub name: String,
    pub repeat: usize,
    pub record_cnt: usize,
    pub file_path: String,
    pub sut: SystemUnderTest,
}

impl E2EBench {
    pub fn load(config_file_path: impl AsRef<Path>) -> Result<Vec<RunConfig>, String> {
        let raw = std::fs::read_to_string(config_file_path)
            .map_err(|e| format!("couldn't read bench config: {e}"))?;
        let bench: E2EBench =
            toml::from_str(&raw).map_err(|e| format!("failed to parse bench config: {e}"))?;
        Ok(bench.expand())
    }

    pub fn expand(&self) -> Vec<RunConfig> {
        self.sut
            .iter()
            .map(|&sut| RunConfig {
                name: self.name.clone(),
                repeat: self.repeat.max(1),
                record_cnt: self.record_cnt,
                file_path: format!("{}.{}", self.file_path, sut.file_extension()),
                sut,
            })
            .collect()
    }
}

struct TestBench<V: DocStore> {
    store: V,
    config: RunConfig,
}

impl<V: DocStore> TestBench<V> {
    fn new(c: &RunConfig) -> Self {
        let path = Path::new(&c.file_path);
        if let Some(parent) = path.parent() {
            _ = std::fs::create_dir_all(parent);
        }

        // Start from a clean slate so repeated runs are fair for every
        // system under test (a bare INSERT against leftover rows would
        // fail with a uniqueness violation).
        _ = std::fs::remove_file(path);
        _ = std::fs::remove_file(path.with_extension("tmp"));

        Self {
            store: V::open(path).expect("failed to open store"),
            config: c.clone(),
        }
    }

    fn run(mut self) -> BenchResult {
        let record_cnt = self.config.record_cnt;

        let phases = vec![
            insert_phase(&mut self.store, record_cnt),
            query_phase(&mut self.store, record_cnt),
            delete_phase(&mut self.store, record_cnt),
        ];

        // Persistence finalizer: serialize whatever survived the sweeps.
        self.store.flush().expect("flush failed");

        BenchResult {
            name: self.config.name,
            sut: self.config.sut,
            record_cnt,
            phases,
        }
    }
}

pub fn insert_phase<V: DocStore>(store: &mut V, record_cnt: usize) -> PhaseResult {
    let start = Instant::now();
    for i in 0..record_cnt {
        store
            .insert(&record_key(i), i as i64)
            .expect("insert failed");
    }
    PhaseResult::new(Phase::Insert, record_cnt, start.elapsed())
}

pub fn query_phase<V: DocStore>(store: &mut V, record_cnt: usize) -> PhaseResult {
    let start = Instant::now();
    for i in 0..record_cnt {
        // A miss is fine, only the fetch itself may fail the run.
        let _ = store.get(&record_key(i)).expect("query failed");
    }
    PhaseResult::new(Phase::Query, record_cnt, start.elapsed())
}

pub fn delete_phase<V: DocStore>(store: &mut V, record_cnt: usize) -> PhaseResult {
    let start = Instant::now();
    for i in 0..record_cnt {
        store.delete(&record_key(i)).expect("delete failed");
    }
    PhaseResult::new(Phase::Delete, record_cnt, start.elapsed())
}

pub fn run_e2e_bench(c: RunConfig) {
    let mut results = Vec::with_capacity(c.repeat);

    for _ in 0..c.repeat {
        let result = match c.sut {
            SystemUnderTest::Memodocs => TestBench::<MemodocsWrapper>::new(&c).run(),
            SystemUnderTest::Sqlite => {
                #[cfg(feature = "sqlite")]
                {
                    use crate::wrappers::SqliteWrapper;
                    TestBench::<SqliteWrapper>::new(&c).run()
                }
                #[cfg(not(feature = "sqlite"))]
                {
                    panic!("SQLite is not enabled in the build, run with --features `sqlite`!")
                }
            }
        };

        print!("{result}");
        results.push(result);
    }

    let path = write_json(&results).expect("Failed to write results!");
    println!("Results written to {}", path.display());
}
