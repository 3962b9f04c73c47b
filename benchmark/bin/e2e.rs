// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use benchmark::bench_e2e::E2EBench;
use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/bench.toml");

/// We use fork to make sure each run starts with a clean state.
/// Every system under test gets its own child process; the parent only
/// collects exit statuses.
fn main() {
    let configs = E2EBench::load(CONFIG_PATH).expect("Failed to parse config!");

    for c in configs {
        match unsafe { libc::fork() } {
            -1 => {
                panic!("Failed to fork!");
            }
            0 => {
                // child process
                benchmark::bench_e2e::run_e2e_bench(c);
                std::process::exit(0);
            }
            child_pid => {
                // parent process
                let mut status = 0;
                unsafe {
                    libc::waitpid(child_pid, &mut status, 0);
                }

                if libc::WIFEXITED(status) && libc::WEXITSTATUS(status) != 0 {
                    panic!(
                        "Child process exited with status {}",
                        libc::WEXITSTATUS(status)
                    );
                }
            }
        }
    }
}
