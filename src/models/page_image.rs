use std::path::Path;
use std::sync::Arc;

use image::DynamicImage;

use crate::error::Result;
use crate::geometry::ImageSize;

/// A captured page raster. Cheap to clone; the pixels are shared and never
/// mutated after capture.
#[derive(Debug, Clone)]
pub struct PageImage {
    raster: Arc<DynamicImage>,
}

impl PageImage {
    pub fn new(raster: DynamicImage) -> Self {
        PageImage {
            raster: Arc::new(raster),
        }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let raster = image::open(path.as_ref())?;
        Ok(Self::new(raster))
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    /// Intrinsic pixel dimensions, as used by the coordinate mapper.
    pub fn size(&self) -> ImageSize {
        ImageSize {
            width: self.width(),
            height: self.height(),
        }
    }

    pub fn raster(&self) -> &DynamicImage {
        &self.raster
    }
}

impl From<DynamicImage> for PageImage {
    fn from(raster: DynamicImage) -> Self {
        PageImage::new(raster)
    }
}
