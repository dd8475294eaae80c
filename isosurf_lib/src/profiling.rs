//! Implementation details for the [`profile`](crate::profile) macro
//!
//! Every thread records its own tree of scopes, identified by the chain of scope names from the
//! outermost scope. The trees of all threads are merged when the results are written.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::error::Error;
use std::io;
use std::sync::LazyLock;
use std::time::{Duration, Instant};
use thread_local::ThreadLocal;

/// Thread local storage of the [`Profiler`]s of all threads
pub static PROFILER: LazyLock<ThreadLocal<RwLock<Profiler>>> = LazyLock::new(ThreadLocal::new);

/// Chain of scope names from the outermost scope to a scope
type ScopePath = Vec<&'static str>;

/// A scope guard recording the elapsed time until it is dropped
pub struct Guard {
    enter_time: Instant,
}

impl Drop for Guard {
    fn drop(&mut self) {
        let elapsed = self.enter_time.elapsed();
        if let Some(profiler) = PROFILER.get() {
            profiler.write().leave(elapsed);
        }
    }
}

/// Enters a scope with the given name on the profiler of the current thread
pub fn enter(name: &'static str) -> Guard {
    PROFILER.get_or(Default::default).write().enter(name);
    Guard {
        enter_time: Instant::now(),
    }
}

#[derive(Clone, Debug)]
struct ScopeStats {
    num_calls: usize,
    duration_sum: Duration,
    first_call: Instant,
}

impl ScopeStats {
    fn merge(&mut self, other: &Self) {
        self.num_calls += other.num_calls;
        self.duration_sum += other.duration_sum;
        self.first_call = self.first_call.min(other.first_call);
    }
}

/// Profiler storing the timings of all scopes entered on one thread
#[derive(Default)]
pub struct Profiler {
    scopes: HashMap<ScopePath, ScopeStats>,
    stack: ScopePath,
}

impl Profiler {
    /// Resets all profiling data of this profiler
    pub fn reset(&mut self) {
        self.scopes.clear();
        self.stack.clear();
    }

    fn enter(&mut self, name: &'static str) {
        self.stack.push(name);
        self.scopes
            .entry(self.stack.clone())
            .or_insert_with(|| ScopeStats {
                num_calls: 0,
                duration_sum: Duration::default(),
                first_call: Instant::now(),
            });
    }

    fn leave(&mut self, elapsed: Duration) {
        if let Some(stats) = self.scopes.get_mut(&self.stack) {
            stats.num_calls += 1;
            stats.duration_sum += elapsed;
        }
        self.stack.pop();
    }
}

/// Pretty prints the collected profiling data of all threads to the given writer
pub fn write<W: io::Write>(out: &mut W) -> io::Result<()> {
    let mut merged = HashMap::<ScopePath, ScopeStats>::new();
    for profiler in PROFILER.iter() {
        for (path, stats) in &profiler.read().scopes {
            merged
                .entry(path.clone())
                .and_modify(|s| s.merge(stats))
                .or_insert_with(|| stats.clone());
        }
    }

    let mut scopes = merged.into_iter().collect::<Vec<_>>();
    scopes.sort_unstable_by_key(|(_, stats)| stats.first_call);

    let roots = scopes.iter().filter(|(path, _)| path.len() == 1);
    for root in roots {
        write_recursively(out, &scopes, root, None)?;
    }

    Ok(())
}

fn write_recursively<W: io::Write>(
    out: &mut W,
    scopes: &[(ScopePath, ScopeStats)],
    (path, stats): &(ScopePath, ScopeStats),
    parent_duration: Option<Duration>,
) -> io::Result<()> {
    let duration_secs = stats.duration_sum.as_secs_f64();
    let parent_secs = parent_duration.map_or(duration_secs, |d| d.as_secs_f64());
    let percent = if parent_secs > 0.0 {
        duration_secs / parent_secs * 100.0
    } else {
        100.0
    };

    writeln!(
        out,
        "{:indent$}{}: {:3.2}%, {:>4.2}ms avg, {} {} (total: {:.3}s)",
        "",
        path.last().copied().unwrap_or_default(),
        percent,
        duration_secs * 1000.0 / (stats.num_calls.max(1) as f64),
        stats.num_calls,
        if stats.num_calls == 1 { "call" } else { "calls" },
        duration_secs,
        indent = 2 * (path.len() - 1),
    )?;

    let children = scopes
        .iter()
        .filter(|(child, _)| child.len() == path.len() + 1 && child.starts_with(path));
    for child in children {
        write_recursively(out, scopes, child, Some(stats.duration_sum))?;
    }

    Ok(())
}

/// Returns the pretty printed output of the collected profiling data as a `String`
pub fn write_to_string() -> Result<String, Box<dyn Error>> {
    let mut buffer = Vec::new();
    write(&mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Resets the profiling data of all threads
pub fn reset() {
    for profiler in PROFILER.iter() {
        profiler.write().reset();
    }
}
