use std::{path::Path, sync::Arc};

use anyhow::Context;

use crate::{
    assets::PreparedImage,
    foundation::error::{VernissageError, VernissageResult},
};

pub fn decode_image(bytes: &[u8]) -> VernissageResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(prepare_rgba(dyn_img.to_rgba8()))
}

pub fn load_image(path: &Path) -> VernissageResult<PreparedImage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    decode_image(&bytes).map_err(|e| {
        VernissageError::asset(format!("decode image '{}': {e}", path.display()))
    })
}

/// Decode every sheet in order; the first failure aborts the whole set.
///
/// A partially decoded set cannot produce a consistent frame table, so there
/// is no "best effort" mode here.
pub fn decode_sheets<B: AsRef<[u8]>>(sheets: &[B]) -> VernissageResult<Vec<PreparedImage>> {
    sheets
        .iter()
        .enumerate()
        .map(|(i, bytes)| {
            decode_image(bytes.as_ref())
                .map_err(|e| VernissageError::asset(format!("sheet {i}: {e}")))
        })
        .collect()
}

pub(crate) fn prepare_rgba(rgba: image::RgbaImage) -> PreparedImage {
    let (width, height) = rgba.dimensions();
    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    }
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
