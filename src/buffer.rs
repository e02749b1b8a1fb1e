//! Static layout and validation for a stream's build-time parameter block
//! (spec §6 "Per-operator entry points").
//!
//! Grounded on the teacher's `Descriptor`/`BufferLayout` pair: a descriptor
//! names a scalar kind and a shape, `is_consistent` checks that the named
//! fields do not contradict each other, and construction goes through a
//! validating `with_*` constructor rather than public field assignment.
//! This port drops the GPU-facing color-space fields (`Texel`, `Color`,
//! `Primaries`, `Whitepoint`, `Transfer`, `Luminance`, the row/column
//! matrices) entirely — none of them describe anything this crate's
//! streams carry — and keeps only the shape-consistency idiom, applied to
//! `rows`, `cols`, `batches` and lane width instead of pixel byte layout.

use crate::element::{Scalar, ScalarKind};
use crate::error::ConfigError;

/// The static shape of one stream: a raster of `rows * cols` elements per
/// batch, `batches` batches, each element carrying `lanes` scalars of
/// `kind`.
///
/// This is the `Vec<T,N>`-stream analogue of the teacher's `BufferLayout`:
/// it exists so every kernel's build-time parameter block can validate its
/// row/col/vector-width relationship once, in one place, with one error
/// type, instead of re-deriving the same divisibility check per operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StreamLayout {
    rows: u32,
    cols: u32,
    batches: u32,
    lanes: u32,
    kind: ScalarKind,
}

impl StreamLayout {
    /// Supported vector widths (spec §7: "vector widths not in {1,2,4,8}").
    const VALID_LANES: [u32; 4] = [1, 2, 4, 8];

    /// Validates and builds a layout for `T`.
    ///
    /// Fails if `lanes` is not one of `{1,2,4,8}` or if `rows * cols` does
    /// not divide evenly by `lanes` (spec §7's "ROWS × COLS not divisible
    /// by the vector width").
    pub fn new<T: Scalar>(rows: u32, cols: u32, batches: u32, lanes: u32) -> Result<Self, ConfigError> {
        if !Self::VALID_LANES.contains(&lanes) {
            return Err(ConfigError::BadVectorWidth(lanes));
        }
        if rows == 0 || cols == 0 || batches == 0 {
            return Err(ConfigError::MustBePositive {
                what: "rows, cols and batches",
            });
        }
        let total = u64::from(rows) * u64::from(cols);
        if total % u64::from(lanes) != 0 {
            return Err(ConfigError::NotDivisible {
                what: "rows * cols by the vector width",
                dividend: total,
                divisor: u64::from(lanes),
            });
        }
        Ok(StreamLayout {
            rows,
            cols,
            batches,
            lanes,
            kind: T::KIND,
        })
    }

    /// A layout is consistent when its declared element count is an exact
    /// multiple of its lane width; `new` never returns an inconsistent
    /// value, but this is kept as a standalone check for layouts a caller
    /// constructed by hand (e.g. by copying one field at a time in a
    /// builder) before handing it to a kernel.
    pub fn is_consistent(&self) -> bool {
        (u64::from(self.rows) * u64::from(self.cols)) % u64::from(self.lanes) == 0
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn batches(&self) -> u32 {
        self.batches
    }

    pub fn lanes(&self) -> u32 {
        self.lanes
    }

    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    /// Elements per batch (`rows * cols / lanes`).
    pub fn elements_per_batch(&self) -> u64 {
        (u64::from(self.rows) * u64::from(self.cols)) / u64::from(self.lanes)
    }

    /// Total elements across every batch.
    pub fn total_elements(&self) -> u64 {
        self.elements_per_batch() * u64::from(self.batches)
    }
}

/// A plain `rows x cols` extent, used by the windowing/pooling/scale-down
/// configs to describe an input or output raster without committing to a
/// particular element type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridExtent {
    pub rows: u32,
    pub cols: u32,
}

impl GridExtent {
    pub fn new(rows: u32, cols: u32) -> Self {
        GridExtent { rows, cols }
    }

    /// The extent grown by `pad_y`/`pad_x` on every side.
    pub fn padded(&self, pad_y: u32, pad_x: u32) -> Self {
        GridExtent {
            rows: self.rows + 2 * pad_y,
            cols: self.cols + 2 * pad_x,
        }
    }

    pub fn len(&self) -> u64 {
        u64::from(self.rows) * u64::from(self.cols)
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }
}
