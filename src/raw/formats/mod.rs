//! Vendor drivers

mod cr2;
mod dng;
mod orf;
mod rw2;
mod tiffep;

pub use cr2::Cr2File;
pub use dng::DngFile;
pub use orf::OrfFile;
pub use rw2::Rw2File;
pub use tiffep::TiffEpFile;
