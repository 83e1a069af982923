use crate::foundation::{
    error::{VernissageError, VernissageResult},
    math::mul_div255_u8,
};

pub type PremulRgba8 = [u8; 4];

/// Scale a premultiplied pixel by a coverage value (destination-in).
pub fn mask(px: PremulRgba8, coverage: u8) -> PremulRgba8 {
    let c = u16::from(coverage);
    [
        mul_div255_u8(u16::from(px[0]), c),
        mul_div255_u8(u16::from(px[1]), c),
        mul_div255_u8(u16::from(px[2]), c),
        mul_div255_u8(u16::from(px[3]), c),
    ]
}

pub fn unpremultiply(px: PremulRgba8) -> PremulRgba8 {
    let a = px[3];
    if a == 0 {
        return [0, 0, 0, 0];
    }
    if a == 255 {
        return px;
    }
    let un = |c: u8| -> u8 { ((u32::from(c) * 255 + u32::from(a) / 2) / u32::from(a)).min(255) as u8 };
    [un(px[0]), un(px[1]), un(px[2]), a]
}

/// Keep only the parts of `dst` covered by `coverage` (one byte per pixel).
pub fn apply_reveal_mask(dst: &mut [u8], coverage: &[u8]) -> VernissageResult<()> {
    if dst.len() != coverage.len() * 4 {
        return Err(VernissageError::validation(
            "reveal mask must have one coverage byte per rgba8 pixel",
        ));
    }
    for (d, &c) in dst.chunks_exact_mut(4).zip(coverage) {
        let out = mask([d[0], d[1], d[2], d[3]], c);
        d.copy_from_slice(&out);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
