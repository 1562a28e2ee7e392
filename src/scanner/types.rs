use std::path::PathBuf;

use compact_str::CompactString;

use crate::error::Result;
use crate::tree::arena::ImageId;
use crate::tree::pool::AspectRatioUnit;

/// An input image whose dimensions have been probed.
#[derive(Debug, Clone)]
pub struct ImageEntry {
    /// Dense id, equal to the entry's position in the probed list
    pub id: ImageId,
    /// Path as given (list file) or as found (directory walk)
    pub path: PathBuf,
    /// File name only, for logs and reports
    pub name: CompactString,
    pub width: u32,
    pub height: u32,
}

impl ImageEntry {
    pub fn ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    pub fn ratio_unit(&self) -> Result<AspectRatioUnit> {
        AspectRatioUnit::from_dimensions(self.id, self.width, self.height)
    }
}
