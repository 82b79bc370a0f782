//! The image descriptor and per-component metadata (spec §3), plus the
//! derived dimensions every controller reads at start-of-pass.
//!
//! Grounded on the teacher's `Components`/`ColorSpace` (`components.rs`,
//! `misc.rs`), narrowed to the baseline profile: sampling factors 1..=4
//! rather than the teacher's power-of-two-only constraint (this profile
//! follows spec §3's literal `1..4` range, not libjpeg's power-of-two
//! restriction), and no progressive/arithmetic bookkeeping.
use crate::consts::{MAX_BLOCKS_IN_MCU, MAX_COMPONENTS};
use crate::errors::{JscError, JscResult};

/// Color space tag attached to an [`ImageInfo`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ColorSpace {
    Grayscale,
    YCbCr,
    Rgb,
}

impl ColorSpace {
    #[must_use]
    pub const fn num_components(self) -> usize {
        match self {
            Self::Grayscale => 1,
            Self::YCbCr | Self::Rgb => 3,
        }
    }
}

/// Per-channel metadata extracted from (or destined for) the SOF segment.
#[derive(Debug, Clone)]
pub struct ComponentSpec {
    /// Component index within the image (0-based).
    pub index: usize,
    /// Horizontal sampling factor `hi`, 1..=4.
    pub h_samp: u8,
    /// Vertical sampling factor `vi`, 1..=4.
    pub v_samp: u8,
    /// Quantization table slot, 0..NUM_QUANT_TBLS.
    pub quant_table_no: u8,
    /// Whether this component is needed on the decode side -- components
    /// without `component_needed` set keep a zero multiplier table and
    /// decode as neutral gray (spec §3, "Divisor table").
    pub component_needed: bool,
}

impl ComponentSpec {
    #[must_use]
    pub fn new(index: usize, h_samp: u8, v_samp: u8, quant_table_no: u8) -> Self {
        Self {
            index,
            h_samp,
            v_samp,
            quant_table_no,
            component_needed: true,
        }
    }
}

/// Flat, row-major, interleaved image buffer plus the metadata spec §3
/// calls the "image descriptor".
#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub width: usize,
    pub height: usize,
    pub color_space: ColorSpace,
    pub components: Vec<ComponentSpec>,
}

impl ImageInfo {
    pub fn new(
        width: usize,
        height: usize,
        color_space: ColorSpace,
        components: Vec<ComponentSpec>,
    ) -> JscResult<Self> {
        if width == 0 || height == 0 {
            return Err(JscError::invariant("image width/height must be non-zero"));
        }
        if components.is_empty() || components.len() > MAX_COMPONENTS {
            return Err(JscError::invariant(format!(
                "component count must be in 1..={}, got {}",
                MAX_COMPONENTS,
                components.len()
            )));
        }
        for c in &components {
            if !(1..=4).contains(&c.h_samp) || !(1..=4).contains(&c.v_samp) {
                return Err(JscError::invariant(format!(
                    "component {} has sampling factors ({}, {}), expected 1..=4",
                    c.index, c.h_samp, c.v_samp
                )));
            }
        }
        let blocks_in_mcu: usize = components
            .iter()
            .map(|c| usize::from(c.h_samp) * usize::from(c.v_samp))
            .sum();
        if blocks_in_mcu > MAX_BLOCKS_IN_MCU {
            return Err(JscError::invariant(format!(
                "sampling factors imply {blocks_in_mcu} blocks per MCU, expected at most {MAX_BLOCKS_IN_MCU}"
            )));
        }
        Ok(Self {
            width,
            height,
            color_space,
            components,
        })
    }

    #[must_use]
    pub fn max_h(&self) -> u8 {
        self.components.iter().map(|c| c.h_samp).max().unwrap_or(1)
    }

    #[must_use]
    pub fn max_v(&self) -> u8 {
        self.components.iter().map(|c| c.v_samp).max().unwrap_or(1)
    }

    /// Derived per-image dimensions from spec §3, computed once at
    /// start-of-pass and shared read-only by every controller.
    #[must_use]
    pub fn derive(&self) -> DerivedDimensions {
        let max_h = usize::from(self.max_h());
        let max_v = usize::from(self.max_v());

        let mcus_per_row = ceil_div(self.width, max_h * 8);
        let total_imcu_rows = ceil_div(self.height, max_v * 8);

        let mut width_in_blocks = Vec::with_capacity(self.components.len());
        let mut last_col_width = Vec::with_capacity(self.components.len());
        let mut last_row_height = Vec::with_capacity(self.components.len());

        for c in &self.components {
            let hi = usize::from(c.h_samp);
            let vi = usize::from(c.v_samp);

            let wib = ceil_div(self.width * hi, max_h * 8);
            width_in_blocks.push(wib);
            last_col_width.push(edge_block_count(wib, hi));

            let hib = ceil_div(self.height * vi, max_v * 8);
            last_row_height.push(edge_block_count(hib, vi));
        }

        let blocks_in_mcu: usize = self
            .components
            .iter()
            .map(|c| usize::from(c.h_samp) * usize::from(c.v_samp))
            .sum();

        DerivedDimensions {
            max_h,
            max_v,
            mcus_per_row,
            total_imcu_rows,
            width_in_blocks,
            last_col_width,
            last_row_height,
            blocks_in_mcu,
        }
    }
}

/// How many real (non-dummy) blocks occupy the edge MCU along one axis,
/// given the component's total block count and its MCU-block extent along
/// that axis (`hi` or `vi`).
fn edge_block_count(total_blocks: usize, mcu_extent: usize) -> usize {
    if total_blocks == 0 {
        return 0;
    }
    let remainder = total_blocks % mcu_extent;
    if remainder == 0 {
        mcu_extent
    } else {
        remainder
    }
}

#[must_use]
pub fn ceil_div(a: usize, b: usize) -> usize {
    (a + b - 1) / b
}

/// Dimensions derived from an [`ImageInfo`] at start-of-pass (spec §3).
#[derive(Debug, Clone)]
pub struct DerivedDimensions {
    pub max_h: usize,
    pub max_v: usize,
    pub mcus_per_row: usize,
    pub total_imcu_rows: usize,
    pub width_in_blocks: Vec<usize>,
    pub last_col_width: Vec<usize>,
    pub last_row_height: Vec<usize>,
    pub blocks_in_mcu: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(width: usize, height: usize, samp: &[(u8, u8)]) -> ImageInfo {
        let components = samp
            .iter()
            .enumerate()
            .map(|(i, &(h, v))| ComponentSpec::new(i, h, v, 0))
            .collect();
        ImageInfo::new(width, height, ColorSpace::YCbCr, components).unwrap()
    }

    #[test]
    fn derived_dims_for_9x9_420() {
        // 9x9 image, Y=(2,2) Cb=Cr=(1,1): forces right+bottom dummy blocks.
        let img = info(9, 9, &[(2, 2), (1, 1), (1, 1)]);
        let d = img.derive();
        assert_eq!(d.mcus_per_row, 1);
        assert_eq!(d.total_imcu_rows, 1);
        assert_eq!(d.width_in_blocks, vec![2, 1, 1]);
        assert_eq!(d.last_col_width, vec![2, 1, 1]);
        assert_eq!(d.last_row_height, vec![2, 1, 1]);
        assert_eq!(d.blocks_in_mcu, 6);
    }

    #[test]
    fn derived_dims_exact_multiple_has_no_dummy_blocks() {
        let img = info(16, 16, &[(1, 1)]);
        let d = img.derive();
        assert_eq!(d.last_col_width, vec![1]);
        assert_eq!(d.last_row_height, vec![1]);
    }

    #[test]
    fn rejects_zero_dimensions() {
        let components = vec![ComponentSpec::new(0, 1, 1, 0)];
        assert!(ImageInfo::new(0, 10, ColorSpace::Grayscale, components).is_err());
    }

    #[test]
    fn rejects_blocks_in_mcu_over_max() {
        // Each component's (h, v) is individually valid (1..=4), but the
        // sum of h*v exceeds MAX_BLOCKS_IN_MCU (10).
        let components = vec![
            ComponentSpec::new(0, 4, 4, 0),
            ComponentSpec::new(1, 1, 1, 1),
        ];
        let err = ImageInfo::new(8, 8, ColorSpace::YCbCr, components).unwrap_err();
        assert!(matches!(err, JscError::InvariantViolation(_)));
    }
}
