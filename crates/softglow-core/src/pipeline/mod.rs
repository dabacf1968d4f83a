//! Enhancement pipeline stages and the drivers that chain them.
//!
//! Stages, in the order they run:
//! - **resize**: bring the width into the working range
//! - **denoise**: non-local means in L*a*b*
//! - **smooth**: edge-preserving smoothing blended with the original
//! - **grade**: lightness lift/fade plus warm/cool offsets
//! - **sharpen**: unsharp mask gated by gradient strength
//! - **bloom**: additive Gaussian glow
//!
//! Around them: **validate** and **discovery** for inputs, and **processor**,
//! which holds the [`Pipeline`] chain and the file-level [`ImageProcessor`].

pub mod bloom;
pub mod denoise;
pub mod discovery;
pub mod grade;
pub mod processor;
pub mod resize;
pub mod sharpen;
pub mod smooth;
pub mod validate;

pub use bloom::Bloom;
pub use denoise::Denoiser;
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use grade::ColorGrader;
pub use processor::{ImageProcessor, Pipeline};
pub use resize::{ResizeDirection, Resizer};
pub use sharpen::Sharpener;
pub use smooth::Smoother;
pub use validate::Validator;
