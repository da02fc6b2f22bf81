use nalgebra::Vector3;

/// Clamps a linear colour into [0, 1].
#[inline]
pub fn saturate(color: Vector3<f32>) -> Vector3<f32> {
    color.map(|c| if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) })
}

/// Quantizes a colour to 8-bit RGBA. No gamma curve is applied: textures are sampled as
/// stored and written back as computed.
pub fn to_rgba8(color: Vector3<f32>) -> [u8; 4] {
    let c = saturate(color);
    [
        (c.x * 255.0).round() as u8,
        (c.y * 255.0).round() as u8,
        (c.z * 255.0).round() as u8,
        255,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_channels_are_clamped() {
        assert_eq!(to_rgba8(Vector3::new(2.0, -1.0, 0.5)), [255, 0, 128, 255]);
        assert_eq!(to_rgba8(Vector3::new(f32::NAN, 0.0, 1.0)), [0, 0, 255, 255]);
    }
}
