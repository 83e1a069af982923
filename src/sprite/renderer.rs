use std::sync::Arc;

use crate::{
    assets::PreparedImage,
    foundation::{
        core::{Affine, FrameIndex, Viewport},
        error::{VernissageError, VernissageResult},
    },
    render::surface::Surface,
    sprite::sheet::{FrameDescriptor, FrameTable, SheetLayout},
};

/// Scale and placement that make a frame cover the whole surface.
///
/// Horizontally centered, anchored to the top edge: overflow is cropped from
/// the left/right sides and from the bottom only, which keeps the focal point
/// of the artwork steady across resizes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverFit {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub dest_width: f64,
    pub dest_height: f64,
}

impl CoverFit {
    pub fn compute(surface: Viewport, frame_w: u32, frame_h: u32) -> Option<Self> {
        if surface.is_empty() || frame_w == 0 || frame_h == 0 {
            return None;
        }
        let sw = f64::from(surface.width);
        let sh = f64::from(surface.height);
        let fw = f64::from(frame_w);
        let fh = f64::from(frame_h);

        let scale = (sw / fw).max(sh / fh);
        let dest_width = fw * scale;
        let dest_height = fh * scale;
        Some(Self {
            scale,
            offset_x: (sw - dest_width) / 2.0,
            offset_y: 0.0,
            dest_width,
            dest_height,
        })
    }

    /// Sheet-space to surface-space transform for a frame whose cell starts at `origin`.
    pub fn transform(&self, origin_x: u32, origin_y: u32) -> Affine {
        Affine::translate((self.offset_x, self.offset_y))
            * Affine::scale(self.scale)
            * Affine::translate((-f64::from(origin_x), -f64::from(origin_y)))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum SheetStatus {
    /// Sheets have not been installed yet.
    Pending,
    Ready,
    /// Decoding or measuring failed; the first frame is held for the session.
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawOutcome {
    Drawn(FrameIndex),
    /// The clamped frame was already on the surface.
    Unchanged(FrameIndex),
    /// No usable frame table; nothing was touched.
    Pending,
}

#[derive(Clone, Copy, Debug)]
struct CachedFit {
    viewport: Viewport,
    frame_size: (u32, u32),
    fit: CoverFit,
}

/// Draws sprite-sheet frames onto a [`Surface`].
#[derive(Debug)]
pub struct SpriteRenderer {
    sheets: Vec<vello_cpu::Image>,
    table: FrameTable,
    status: SheetStatus,
    last_drawn: Option<FrameIndex>,
    fit: Option<CachedFit>,
}

impl Default for SpriteRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpriteRenderer {
    pub fn new() -> Self {
        Self {
            sheets: Vec::new(),
            table: FrameTable::empty(),
            status: SheetStatus::Pending,
            last_drawn: None,
            fit: None,
        }
    }

    /// Install the outcome of an asset load.
    ///
    /// Failures are logged and absorbed: the renderer stays without a table and
    /// the sequence holds on frame 0. Returns whether a usable table exists.
    pub fn install(
        &mut self,
        sheets: VernissageResult<Vec<PreparedImage>>,
        layout: &SheetLayout,
    ) -> bool {
        let built = sheets.and_then(|sheets| {
            let table = FrameTable::for_sheets(&sheets, layout)?;
            let paints = sheets.iter().map(sheet_paint).collect::<VernissageResult<Vec<_>>>()?;
            Ok((paints, table))
        });

        self.last_drawn = None;
        self.fit = None;
        match built {
            Ok((sheets, table)) => {
                tracing::debug!(frames = table.len(), "sprite sheets installed");
                self.sheets = sheets;
                self.table = table;
                self.status = SheetStatus::Ready;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "sprite sheets unavailable; holding first frame");
                self.sheets.clear();
                self.table = FrameTable::empty();
                self.status = SheetStatus::Failed;
                false
            }
        }
    }

    pub fn status(&self) -> SheetStatus {
        self.status
    }

    pub fn table(&self) -> &FrameTable {
        &self.table
    }

    pub fn last_drawn(&self) -> Option<FrameIndex> {
        self.last_drawn
    }

    /// Last frame that may be shown; frame 0 while no table is installed.
    pub fn last_usable_frame(&self) -> FrameIndex {
        self.table.last_usable_frame()
    }

    /// Forget the cached fit and the last-drawn memo after a viewport change.
    ///
    /// The scale is recomputed on the next draw; the frame table is untouched.
    pub fn invalidate_fit(&mut self) {
        self.fit = None;
        self.last_drawn = None;
    }

    pub fn draw_frame(&mut self, n: i64, surface: &mut Surface) -> DrawOutcome {
        let Some((idx, desc)) = self.table.lookup_clamped(n) else {
            return DrawOutcome::Pending;
        };
        let desc = *desc;
        if self.last_drawn == Some(idx) {
            return DrawOutcome::Unchanged(idx);
        }
        let Some(fit) = self.fit_for(surface.viewport(), &desc) else {
            return DrawOutcome::Pending;
        };
        let Some(sheet) = self.sheets.get(desc.sheet.0) else {
            return DrawOutcome::Pending;
        };

        paint_cover(surface, sheet, &desc, fit);
        self.last_drawn = Some(idx);
        DrawOutcome::Drawn(idx)
    }

    fn fit_for(&mut self, viewport: Viewport, desc: &FrameDescriptor) -> Option<CoverFit> {
        let frame_size = (desc.width, desc.height);
        if let Some(c) = self.fit
            && c.viewport == viewport
            && c.frame_size == frame_size
        {
            return Some(c.fit);
        }
        let fit = CoverFit::compute(viewport, desc.width, desc.height)?;
        self.fit = Some(CachedFit {
            viewport,
            frame_size,
            fit,
        });
        Some(fit)
    }
}

/// Fill the surface with one frame cell, replacing what was there.
///
/// The cell rectangle doubles as the clip, so neighbouring frames on the sheet
/// never bleed in. Sampling is nearest-neighbour to keep the artwork crisp.
fn paint_cover(
    surface: &mut Surface,
    sheet: &vello_cpu::Image,
    desc: &FrameDescriptor,
    fit: CoverFit,
) {
    let pixmap = surface.pixmap_mut();
    let mut ctx = vello_cpu::RenderContext::new(pixmap.width(), pixmap.height());
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(vello_cpu::kurbo::Affine::new(
        fit.transform(desc.source_x, desc.source_y).as_coeffs(),
    ));
    ctx.set_paint(sheet.clone());
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        f64::from(desc.source_x),
        f64::from(desc.source_y),
        f64::from(desc.source_x + desc.width),
        f64::from(desc.source_y + desc.height),
    ));
    ctx.flush();

    pixmap.data_as_u8_slice_mut().fill(0);
    ctx.render_to_pixmap(pixmap);
}

fn sheet_paint(sheet: &PreparedImage) -> VernissageResult<vello_cpu::Image> {
    let w: u16 = sheet
        .width
        .try_into()
        .map_err(|_| VernissageError::asset("sheet width exceeds u16"))?;
    let h: u16 = sheet
        .height
        .try_into()
        .map_err(|_| VernissageError::asset("sheet height exceeds u16"))?;
    if sheet.rgba8_premul.len() != sheet.width as usize * sheet.height as usize * 4 {
        return Err(VernissageError::asset("sheet byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let pixels: Vec<_> = sheet
        .rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);

    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler {
            quality: vello_cpu::peniko::ImageQuality::Low,
            ..Default::default()
        },
    })
}

#[cfg(test)]
#[path = "../../tests/unit/sprite/renderer.rs"]
mod tests;
