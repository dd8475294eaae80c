pub mod bench_extraction;
pub mod bench_mesh;
pub mod bench_welding;
