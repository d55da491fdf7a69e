pub mod generator;
pub mod reconstruct;
pub mod types;

pub use generator::{
    generate, generate_cancellable, generate_with, RangePolicy, SurfaceRequest, SurfaceSweep,
};
#[cfg(feature = "parallel")]
pub use generator::generate_parallel;
pub use reconstruct::reconstruct;
pub use types::{PriceGrid, Surface, SurfaceRange, SurfaceSample};
