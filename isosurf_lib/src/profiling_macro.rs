//! Provides the [`profile`](crate::profile) macro or a dummy implementation depending on the selected feature

#[cfg(feature = "profiling")]
/// Creates a named profiling scope that lasts until the end of the enclosing block
///
/// The scope guard is stored in a variable called `_profiling_scope_guard` of the enclosing block
/// and records the elapsed time in the thread local [`Profiler`](crate::profiling::Profiler) when it is
/// dropped. Nested scopes are attributed to the scope that surrounds them on the current thread.
/// The collected timings of all threads can be printed using [`write`](crate::profiling::write):
/// ```text
/// extract_surface: 100.00%, 41.20ms avg, 1 call (total: 0.041s)
///   march_cells: 82.17%, 33.85ms avg, 1 call (total: 0.034s)
///   weld_by_spatial_hash: 17.61%, 7.26ms avg, 1 call (total: 0.007s)
/// ```
///
/// If the `profiling` feature is disabled, the macro expands to nothing.
#[macro_export]
macro_rules! profile {
    ($name:expr) => {
        let _profiling_scope_guard = $crate::profiling::enter($name);
    };
}

#[cfg(not(feature = "profiling"))]
/// No-op macro if profiling is disabled
#[macro_export]
macro_rules! profile {
    ($name:expr) => {};
}
