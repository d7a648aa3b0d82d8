//! Sub-block motion positions of a picture.

use nalgebra::DMatrix;
use omnimv_core::{floating_to_fixed, PlanarGrid, Pt2, Real};
use omnimv_motion::SubblockWindow;

use crate::{
    BlockPosition, BlockSize, ChromaFormat, ComponentId, ConfigError, ReprojectionError,
    SubblockPositions,
};

/// Width and height of a sub-block, in samples of its component.
pub const SUBBLOCK_SIZE: usize = 4;

/// A block resolved against the sub-block grid of its component.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct LocatedBlock {
    /// Sub-block window in the component's own grid.
    pub window: SubblockWindow,
    pub luma: bool,
    /// Chroma subsampling as powers of two (zero for luma).
    pub scale_x: u32,
    pub scale_y: u32,
    /// Block center in luma samples.
    pub center: Pt2,
}

/// Motion positions of all 4x4 luma sub-blocks of a picture, with a single
/// slot holding the slice of the last block.
#[derive(Clone, Debug)]
pub(crate) struct SubblockPicture {
    width: usize,
    height: usize,
    offset: Real,
    grid: PlanarGrid,
    last_block: Option<(SubblockWindow, PlanarGrid)>,
}

impl SubblockPicture {
    pub fn new(width: usize, height: usize, offset: Real) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 || width % SUBBLOCK_SIZE != 0 || height % SUBBLOCK_SIZE != 0 {
            return Err(ConfigError::InvalidResolution { width, height });
        }
        let step = SUBBLOCK_SIZE as Real;
        let grid = PlanarGrid::lattice(
            height / SUBBLOCK_SIZE,
            width / SUBBLOCK_SIZE,
            offset,
            offset,
            step,
            step,
        );
        Ok(Self {
            width,
            height,
            offset,
            grid,
            last_block: None,
        })
    }

    pub fn offset(&self) -> Real {
        self.offset
    }

    /// Motion positions of every luma sub-block, one entry per sub-block.
    pub fn grid(&self) -> &PlanarGrid {
        &self.grid
    }

    pub fn last_window(&self) -> Option<SubblockWindow> {
        self.last_block.as_ref().map(|(w, _)| *w)
    }

    /// Check a block against the component's picture and sub-block grid.
    pub fn locate(
        &self,
        position: BlockPosition,
        size: BlockSize,
        component: ComponentId,
        chroma_format: ChromaFormat,
    ) -> Result<LocatedBlock, ReprojectionError> {
        let (scale_x, scale_y) = if component.is_luma() {
            (0, 0)
        } else if chroma_format.has_chroma() {
            (chroma_format.scale_x(), chroma_format.scale_y())
        } else {
            return Err(ReprojectionError::NoChroma(component));
        };

        let BlockPosition { x, y } = position;
        let BlockSize { width, height } = size;
        if [x, y, width, height].iter().any(|v| v % SUBBLOCK_SIZE != 0) || width == 0 || height == 0
        {
            return Err(ReprojectionError::Misaligned {
                x,
                y,
                width,
                height,
            });
        }
        let picture_width = self.width >> scale_x;
        let picture_height = self.height >> scale_y;
        if x + width > picture_width || y + height > picture_height {
            return Err(ReprojectionError::OutsidePicture {
                x,
                y,
                width,
                height,
                picture_width,
                picture_height,
            });
        }

        let center = Pt2::new(
            ((x + width / 2) << scale_x) as Real,
            ((y + height / 2) << scale_y) as Real,
        );
        Ok(LocatedBlock {
            window: SubblockWindow {
                row: y / SUBBLOCK_SIZE,
                col: x / SUBBLOCK_SIZE,
                rows: height / SUBBLOCK_SIZE,
                cols: width / SUBBLOCK_SIZE,
            },
            luma: component.is_luma(),
            scale_x,
            scale_y,
            center,
        })
    }

    /// Luma motion positions of a block, sliced from the picture grid.
    pub fn luma_block(&mut self, window: SubblockWindow) -> &PlanarGrid {
        if self.last_window() != Some(window) {
            self.last_block = None;
        }
        let grid = &self.grid;
        let (_, block) = self.last_block.get_or_insert_with(|| {
            (
                window,
                grid.window(window.row, window.col, window.rows, window.cols),
            )
        });
        block
    }

    /// Chroma motion positions of a block, in luma samples.
    ///
    /// Chroma sub-blocks do not line up with the luma grid, so they are
    /// generated from the chroma lattice instead of sliced.
    pub fn chroma_block(&self, block: &LocatedBlock) -> PlanarGrid {
        let w = block.window;
        let step = SUBBLOCK_SIZE as Real;
        let sx = Real::from(1u32 << block.scale_x);
        let sy = Real::from(1u32 << block.scale_y);
        PlanarGrid::lattice(
            w.rows,
            w.cols,
            (w.col as Real * step + self.offset) * sx,
            (w.row as Real * step + self.offset) * sy,
            step * sx,
            step * sy,
        )
    }
}

/// Convert moved motion positions into fixed-point sub-block corners of
/// the block's component.
///
/// Points with a NaN coordinate keep their unmoved position.
pub(crate) fn finalize(
    base: &PlanarGrid,
    moved: &PlanarGrid,
    block: &LocatedBlock,
    offset: Real,
    precision: u32,
) -> SubblockPositions {
    let (rows, cols) = base.shape();
    let precision_x = precision + block.scale_x;
    let precision_y = precision + block.scale_y;
    let sx = Real::from(1u32 << block.scale_x);
    let sy = Real::from(1u32 << block.scale_y);
    let mut x = DMatrix::zeros(rows, cols);
    let mut y = DMatrix::zeros(rows, cols);
    for i in 0..base.len() {
        let p = if moved.x[i].is_nan() || moved.y[i].is_nan() {
            base.point(i)
        } else {
            moved.point(i)
        };
        x[i] = floating_to_fixed(p.x / sx - offset, precision_x);
        y[i] = floating_to_fixed(p.y / sy - offset, precision_y);
    }
    SubblockPositions {
        x,
        y,
        precision_x,
        precision_y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picture() -> SubblockPicture {
        SubblockPicture::new(64, 32, 2.0).unwrap()
    }

    #[test]
    fn picture_grid_holds_subblock_motion_positions() {
        let p = picture();
        assert_eq!(p.grid().shape(), (8, 16));
        assert_eq!(p.grid().point(0), Pt2::new(2.0, 2.0));
        assert_eq!(p.grid().x[(3, 5)], 22.0);
        assert_eq!(p.grid().y[(3, 5)], 14.0);
        assert!(SubblockPicture::new(66, 32, 2.0).is_err());
    }

    #[test]
    fn locate_checks_alignment_and_bounds() {
        let p = picture();
        let b = p
            .locate(
                BlockPosition::new(8, 4),
                BlockSize::new(16, 8),
                ComponentId::Y,
                ChromaFormat::Yuv420,
            )
            .unwrap();
        assert_eq!(
            b.window,
            SubblockWindow {
                row: 1,
                col: 2,
                rows: 2,
                cols: 4
            }
        );
        assert_eq!(b.center, Pt2::new(16.0, 8.0));

        let chroma = p
            .locate(
                BlockPosition::new(4, 4),
                BlockSize::new(8, 4),
                ComponentId::Cb,
                ChromaFormat::Yuv420,
            )
            .unwrap();
        assert_eq!(chroma.center, Pt2::new(16.0, 12.0));

        assert!(matches!(
            p.locate(
                BlockPosition::new(2, 0),
                BlockSize::new(4, 4),
                ComponentId::Y,
                ChromaFormat::Yuv420
            ),
            Err(ReprojectionError::Misaligned { .. })
        ));
        assert!(matches!(
            p.locate(
                BlockPosition::new(28, 0),
                BlockSize::new(8, 4),
                ComponentId::Cr,
                ChromaFormat::Yuv420
            ),
            Err(ReprojectionError::OutsidePicture {
                picture_width: 32,
                ..
            })
        ));
        assert_eq!(
            p.locate(
                BlockPosition::new(0, 0),
                BlockSize::new(4, 4),
                ComponentId::Cb,
                ChromaFormat::Yuv400
            ),
            Err(ReprojectionError::NoChroma(ComponentId::Cb))
        );
    }

    #[test]
    fn chroma_lattice_matches_luma_slice_for_444() {
        let mut p = picture();
        let b = p
            .locate(
                BlockPosition::new(8, 4),
                BlockSize::new(8, 8),
                ComponentId::Cb,
                ChromaFormat::Yuv444,
            )
            .unwrap();
        let chroma = p.chroma_block(&b);
        assert_eq!(&chroma, p.luma_block(b.window));
    }

    #[test]
    fn unmoved_positions_become_subblock_corners() {
        let mut p = picture();
        let b = p
            .locate(
                BlockPosition::new(4, 4),
                BlockSize::new(8, 4),
                ComponentId::Cb,
                ChromaFormat::Yuv420,
            )
            .unwrap();
        let base = p.chroma_block(&b);
        let out = finalize(&base, &base, &b, p.offset(), 4);
        assert_eq!((out.precision_x, out.precision_y), (5, 5));
        assert_eq!(out.x[(0, 0)], 4 << 5);
        assert_eq!(out.x[(0, 1)], 8 << 5);
        assert_eq!(out.y[(0, 1)], 4 << 5);

        let luma = p.luma_block(b.window).clone();
        let mut moved = luma.translated(1.0, 0.0);
        moved.y[1] = Real::NAN;
        let lb = LocatedBlock { luma: true, scale_x: 0, scale_y: 0, ..b };
        let out = finalize(&luma, &moved, &lb, p.offset(), 2);
        assert_eq!(out.x[0], 5 << 2);
        // Both coordinates of the NaN point fall back.
        assert_eq!(out.x[1], 8 << 2);
        assert_eq!(out.y[1], 4 << 2);
    }
}
