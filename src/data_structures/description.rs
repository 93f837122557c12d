//! Texture descriptions: the format plus the ordered mip chain.
//!
//! A description is parsed once from its JSON document and never mutated.
//! All derived data (layout, geometry, decoded pixels) is recomputed from it.

use serde::Deserialize;

use crate::{data_structures::format::TextureFormat, error::DescriptionError};

/// Widest mip accepted. The canvas is `2 * width - 1` wide and must fit a `u32`.
pub const MAX_MIP_WIDTH: u32 = 1 << 31;

/// One resolution level of a texture.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MipDescriptor {
    width: u32,
    height: u32,
    payload_size: u64,
}

impl MipDescriptor {
    pub fn new(width: u32, height: u32, payload_size: u64) -> Result<Self, DescriptionError> {
        if width == 0 || height == 0 {
            return Err(DescriptionError::InvalidDescription(format!(
                "mip dimensions must be positive, got {width}x{height}"
            )));
        }
        if width > MAX_MIP_WIDTH {
            return Err(DescriptionError::InvalidDescription(format!(
                "mip width {width} exceeds the maximum of {MAX_MIP_WIDTH}"
            )));
        }
        if payload_size == 0 {
            return Err(DescriptionError::InvalidDescription(
                "mip payload size must be positive".to_string(),
            ));
        }
        Ok(Self {
            width,
            height,
            payload_size,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn payload_size(&self) -> u64 {
        self.payload_size
    }
}

/// Format and mip chain of one texture. Mip index is the position in `mips`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureDescription {
    format: TextureFormat,
    mips: Vec<MipDescriptor>,
}

impl TextureDescription {
    pub fn new(format: TextureFormat, mips: Vec<MipDescriptor>) -> Result<Self, DescriptionError> {
        if mips.is_empty() {
            return Err(DescriptionError::InvalidDescription(
                "a texture needs at least one mip".to_string(),
            ));
        }
        Ok(Self { format, mips })
    }

    /// Parse a description document.
    ///
    /// ```
    /// use mipview::data_structures::description::TextureDescription;
    ///
    /// let desc = TextureDescription::from_json(
    ///     r#"{"format": "bc1", "mips": [{"width": 64, "height": 64, "payloadSize": 2048}]}"#,
    /// ).unwrap();
    /// assert_eq!(desc.mips().len(), 1);
    /// ```
    pub fn from_json(document: &str) -> Result<Self, DescriptionError> {
        let raw: RawDescription = serde_json::from_str(document)?;
        let format: TextureFormat = raw.format.parse()?;
        let mips = raw
            .mips
            .iter()
            .enumerate()
            .map(|(level, mip)| mip.validate(level))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(format, mips)
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    pub fn mips(&self) -> &[MipDescriptor] {
        &self.mips
    }

    /// Base level, always present.
    pub fn base(&self) -> &MipDescriptor {
        &self.mips[0]
    }
}

// Sizes are read as signed integers so that `0` and negative values surface as
// `InvalidDescription` instead of a generic parse error. The format is parsed
// afterwards for the same reason.
#[derive(Deserialize)]
struct RawDescription {
    format: String,
    mips: Vec<RawMip>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMip {
    width: i64,
    height: i64,
    payload_size: i64,
}

impl RawMip {
    fn validate(&self, level: usize) -> Result<MipDescriptor, DescriptionError> {
        let to_u32 = |value: i64, what: &str| {
            u32::try_from(value).ok().filter(|v| *v > 0).ok_or_else(|| {
                DescriptionError::InvalidDescription(format!(
                    "mip {level}: {what} must be a positive 32-bit integer, got {value}"
                ))
            })
        };
        let width = to_u32(self.width, "width")?;
        let height = to_u32(self.height, "height")?;
        let payload_size = u64::try_from(self.payload_size)
            .ok()
            .filter(|v| *v > 0)
            .ok_or_else(|| {
                DescriptionError::InvalidDescription(format!(
                    "mip {level}: payloadSize must be positive, got {}",
                    self.payload_size
                ))
            })?;
        MipDescriptor::new(width, height, payload_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatError;

    #[test]
    fn parses_the_two_level_bc1_example() {
        let desc = TextureDescription::from_json(
            r#"{
                "format": "BC1",
                "mips": [
                    {"width": 64, "height": 64, "payloadSize": 2048},
                    {"width": 32, "height": 32, "payloadSize": 512}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(desc.format(), TextureFormat::Bc1);
        assert_eq!(desc.mips().len(), 2);
        assert_eq!(desc.base().width(), 64);
        assert_eq!(desc.mips()[1].payload_size(), 512);
    }

    #[test]
    fn empty_mip_list_is_invalid() {
        let err = TextureDescription::from_json(r#"{"format": "bc3", "mips": []}"#).unwrap_err();
        assert!(matches!(err, DescriptionError::InvalidDescription(_)));
    }

    #[test]
    fn non_positive_dimensions_are_invalid() {
        for (w, h) in [(0, 4), (4, 0), (-4, 4)] {
            let doc = format!(
                r#"{{"format": "bc1", "mips": [{{"width": {w}, "height": {h}, "payloadSize": 8}}]}}"#
            );
            let err = TextureDescription::from_json(&doc).unwrap_err();
            assert!(
                matches!(err, DescriptionError::InvalidDescription(_)),
                "{w}x{h} gave {err:?}"
            );
        }
    }

    #[test]
    fn widths_without_a_representable_canvas_are_invalid() {
        assert!(MipDescriptor::new(MAX_MIP_WIDTH, 1, 8).is_ok());
        let doc = format!(
            r#"{{"format": "bc1", "mips": [{{"width": {}, "height": 4, "payloadSize": 8}}]}}"#,
            MAX_MIP_WIDTH as u64 + 1
        );
        let err = TextureDescription::from_json(&doc).unwrap_err();
        assert!(matches!(err, DescriptionError::InvalidDescription(_)));
    }

    #[test]
    fn unknown_format_is_reported() {
        let err = TextureDescription::from_json(
            r#"{"format": "etc2", "mips": [{"width": 4, "height": 4, "payloadSize": 8}]}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DescriptionError::Format(FormatError::UnknownFormat(ref name)) if name == "etc2"
        ));
        assert_eq!(err.to_string(), "unknown texture format `etc2`");
    }
}
