use crate::{
    assets::PreparedImage,
    foundation::{
        core::FrameIndex,
        error::{VernissageError, VernissageResult},
    },
};

/// How logical frames are packed into one or more sprite sheets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SheetLayout {
    /// Frames per row in every sheet.
    pub columns: u32,
    /// Logical frame count across all sheets, padding included.
    pub total_frames: u32,
    /// Filler frames at the end of the sequence that must never be shown.
    pub trailing_padding: u32,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            columns: 10,
            total_frames: 180,
            trailing_padding: 0,
        }
    }
}

impl SheetLayout {
    pub fn validate(&self) -> VernissageResult<()> {
        if self.columns == 0 {
            return Err(VernissageError::validation("sheet columns must be > 0"));
        }
        if self.total_frames == 0 {
            return Err(VernissageError::validation("total_frames must be > 0"));
        }
        if self.trailing_padding >= self.total_frames {
            return Err(VernissageError::validation(
                "trailing_padding must leave at least one usable frame",
            ));
        }
        Ok(())
    }

    pub fn last_usable_frame(&self) -> FrameIndex {
        FrameIndex(
            self.total_frames
                .saturating_sub(self.trailing_padding)
                .saturating_sub(1),
        )
    }

    pub fn frames_per_sheet(&self, sheet_count: usize) -> u32 {
        let n = sheet_count.max(1) as u32;
        self.total_frames.div_ceil(n)
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct SheetRef(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameDescriptor {
    pub sheet: SheetRef,
    pub source_x: u32,
    pub source_y: u32,
    pub width: u32,
    pub height: u32,
}

/// Lookup from logical frame number to a source rectangle.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct FrameTable {
    frames: Vec<FrameDescriptor>,
    last_usable: FrameIndex,
}

impl FrameTable {
    /// Table with no frames, used while sheets are still pending.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from decoded sheets.
    pub fn for_sheets(sheets: &[PreparedImage], layout: &SheetLayout) -> VernissageResult<Self> {
        let dims: Vec<(u32, u32)> = sheets.iter().map(|s| (s.width, s.height)).collect();
        Self::build(&dims, layout)
    }

    /// Build from sheet pixel dimensions `(width, height)`, in sheet order.
    #[tracing::instrument(skip(sheet_dims), fields(sheets = sheet_dims.len()))]
    pub fn build(sheet_dims: &[(u32, u32)], layout: &SheetLayout) -> VernissageResult<Self> {
        layout.validate()?;
        if sheet_dims.is_empty() {
            return Err(VernissageError::asset("frame table needs at least one sheet"));
        }

        let per_sheet = layout.frames_per_sheet(sheet_dims.len());
        let mut frames = Vec::with_capacity(layout.total_frames as usize);

        for (sheet_idx, &(sheet_w, sheet_h)) in sheet_dims.iter().enumerate() {
            let first = per_sheet.saturating_mul(sheet_idx as u32);
            if first >= layout.total_frames {
                break;
            }
            let in_sheet = per_sheet.min(layout.total_frames - first);
            let rows = in_sheet.div_ceil(layout.columns);

            let frame_w = sheet_w / layout.columns;
            let frame_h = sheet_h / rows;
            if frame_w == 0 || frame_h == 0 {
                return Err(VernissageError::asset(format!(
                    "sheet {sheet_idx} ({sheet_w}x{sheet_h}) is too small for {} columns x {rows} rows",
                    layout.columns
                )));
            }
            if sheet_w % layout.columns != 0 || sheet_h % rows != 0 {
                tracing::debug!(
                    sheet = sheet_idx,
                    sheet_w,
                    sheet_h,
                    "sheet size is not an exact multiple of the grid; trailing pixels are ignored"
                );
            }

            for local in 0..in_sheet {
                frames.push(FrameDescriptor {
                    sheet: SheetRef(sheet_idx),
                    source_x: (local % layout.columns) * frame_w,
                    source_y: (local / layout.columns) * frame_h,
                    width: frame_w,
                    height: frame_h,
                });
            }
        }

        let last_usable = FrameIndex(
            layout
                .last_usable_frame()
                .0
                .min(frames.len().saturating_sub(1) as u32),
        );
        tracing::debug!(frames = frames.len(), last_usable = last_usable.0, "frame table built");
        Ok(Self {
            frames,
            last_usable,
        })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn last_usable_frame(&self) -> FrameIndex {
        self.last_usable
    }

    pub fn get(&self, frame: FrameIndex) -> Option<&FrameDescriptor> {
        self.frames.get(frame.as_usize())
    }

    /// Clamp a signed request into the usable range and look it up.
    pub fn lookup_clamped(&self, n: i64) -> Option<(FrameIndex, &FrameDescriptor)> {
        if self.frames.is_empty() {
            return None;
        }
        let idx = FrameIndex::clamped(n, self.last_usable);
        self.get(idx).map(|d| (idx, d))
    }

    pub fn frames(&self) -> &[FrameDescriptor] {
        &self.frames
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sprite/sheet.rs"]
mod tests;
