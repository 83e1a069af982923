use std::path::Path;

use anyhow::Context as _;

use crate::{
    foundation::{
        core::Viewport,
        error::{VernissageError, VernissageResult},
    },
    render::composite::unpremultiply,
};

/// Retained pixel target the renderer draws into.
///
/// Backed by a CPU pixmap: premultiplied RGBA8, row-major, tightly packed.
#[derive(Clone, Debug)]
pub struct Surface {
    pixmap: vello_cpu::Pixmap,
}

impl PartialEq for Surface {
    fn eq(&self, other: &Self) -> bool {
        self.pixmap.width() == other.pixmap.width()
            && self.pixmap.height() == other.pixmap.height()
            && self.data() == other.data()
    }
}

impl Eq for Surface {}

impl Surface {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            pixmap: vello_cpu::Pixmap::new(width, height),
        }
    }

    /// Surface for a host viewport; both sides must fit the pixmap's `u16` range.
    pub fn for_viewport(viewport: Viewport) -> VernissageResult<Self> {
        let (w, h) = pixmap_size(viewport)?;
        Ok(Self::new(w, h))
    }

    pub fn width(&self) -> u32 {
        u32::from(self.pixmap.width())
    }

    pub fn height(&self) -> u32 {
        u32::from(self.pixmap.height())
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width(), self.height())
    }

    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        self.pixmap.data_as_u8_slice_mut()
    }

    pub(crate) fn pixmap_mut(&mut self) -> &mut vello_cpu::Pixmap {
        &mut self.pixmap
    }

    /// Reallocate to a new size; contents are cleared.
    pub fn resize(&mut self, viewport: Viewport) -> VernissageResult<()> {
        if viewport == self.viewport() {
            return Ok(());
        }
        let (w, h) = pixmap_size(viewport)?;
        self.pixmap = vello_cpu::Pixmap::new(w, h);
        Ok(())
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let i = (y as usize * self.width() as usize + x as usize) * 4;
        let data = self.data();
        Some([data[i], data[i + 1], data[i + 2], data[i + 3]])
    }

    /// Straight-alpha copy of the pixels, as image encoders expect.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data().to_vec();
        for px in out.chunks_exact_mut(4) {
            let straight = unpremultiply([px[0], px[1], px[2], px[3]]);
            px.copy_from_slice(&straight);
        }
        out
    }

    pub fn save_png(&self, path: &Path) -> VernissageResult<()> {
        if self.viewport().is_empty() {
            return Err(VernissageError::validation("cannot write an empty surface"));
        }
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        image::save_buffer_with_format(
            path,
            &self.to_straight_rgba8(),
            self.width(),
            self.height(),
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }
}

fn pixmap_size(viewport: Viewport) -> VernissageResult<(u16, u16)> {
    let w: u16 = viewport
        .width
        .try_into()
        .map_err(|_| VernissageError::validation("surface width exceeds u16"))?;
    let h: u16 = viewport
        .height
        .try_into()
        .map_err(|_| VernissageError::validation("surface height exceeds u16"))?;
    Ok((w, h))
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
