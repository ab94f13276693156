//! Glyph atlas for panel text.
//!
//! Rasterizes the printable ASCII range with fontdue into a single R8
//! texture at startup. No font file is bundled; a handful of well-known
//! system locations are probed instead, and the panel simply renders
//! without labels when none of them exists.

use fontdue::{Font, FontSettings};
use std::collections::HashMap;
use std::path::Path;

use crate::gpu::GpuContext;

/// Errors from font discovery and atlas construction.
#[derive(Debug)]
pub enum FontError {
    /// None of the probed font paths exist.
    NotFound,
    /// A candidate file existed but could not be read.
    Io(std::io::Error),
    /// The font data could not be parsed.
    Parse(String),
}

impl std::fmt::Display for FontError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FontError::NotFound => write!(f, "no usable system font found"),
            FontError::Io(e) => write!(f, "IO error: {}", e),
            FontError::Parse(msg) => write!(f, "font parse error: {}", msg),
        }
    }
}

impl std::error::Error for FontError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FontError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FontError {
    fn from(e: std::io::Error) -> Self {
        FontError::Io(e)
    }
}

/// Probed in order by [`FontAtlas::discover`].
const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Placement and advance data for one rasterized glyph.
#[derive(Clone, Copy, Debug)]
pub struct GlyphInfo {
    /// UV rectangle in the atlas (x, y, width, height), normalized.
    pub uv: [f32; 4],
    /// Bitmap size in pixels.
    pub width: u32,
    pub height: u32,
    /// Offset from the cursor to the glyph's draw position.
    pub offset_x: f32,
    pub offset_y: f32,
    /// Cursor advance after this glyph.
    pub advance: f32,
}

/// A font atlas containing pre-rasterized glyphs on the GPU.
pub struct FontAtlas {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    glyphs: HashMap<char, GlyphInfo>,
    size: f32,
}

impl FontAtlas {
    /// Probe the known system font locations and build an atlas from the
    /// first one that loads.
    pub fn discover(gpu: &GpuContext, size: f32) -> Result<Self, FontError> {
        for candidate in SYSTEM_FONT_PATHS {
            if Path::new(candidate).exists() {
                let data = std::fs::read(candidate)?;
                log::info!("panel font: {}", candidate);
                return Self::new(gpu, &data, size);
            }
        }
        Err(FontError::NotFound)
    }

    /// Build an atlas from raw TTF/OTF bytes at the given pixel size.
    pub fn new(gpu: &GpuContext, font_data: &[u8], size: f32) -> Result<Self, FontError> {
        let font =
            Font::from_bytes(font_data, FontSettings::default()).map_err(|e| FontError::Parse(e.to_string()))?;

        // Rasterize printable ASCII up front.
        let rasterized: Vec<(char, fontdue::Metrics, Vec<u8>)> = (32u8..=126u8)
            .map(|c| {
                let c = c as char;
                let (metrics, bitmap) = font.rasterize(c, size);
                (c, metrics, bitmap)
            })
            .collect();

        // Grow the atlas until a simple row packing fits everything.
        let padding = 1u32;
        let mut atlas_width = 256u32;
        let mut atlas_height = 256u32;
        while !Self::fits(&rasterized, atlas_width, atlas_height, padding) {
            if atlas_width <= atlas_height {
                atlas_width *= 2;
            } else {
                atlas_height *= 2;
            }
        }

        // Second pass: blit glyph bitmaps and record their placements.
        let mut atlas_data = vec![0u8; (atlas_width * atlas_height) as usize];
        let mut glyphs = HashMap::new();

        let mut x = padding;
        let mut y = padding;
        let mut row_height = 0u32;

        for (c, metrics, bitmap) in &rasterized {
            let glyph_w = metrics.width as u32;
            let glyph_h = metrics.height as u32;

            if x + glyph_w + padding > atlas_width {
                x = padding;
                y += row_height + padding;
                row_height = 0;
            }

            for gy in 0..glyph_h {
                for gx in 0..glyph_w {
                    let src = (gy * glyph_w + gx) as usize;
                    let dst = ((y + gy) * atlas_width + (x + gx)) as usize;
                    atlas_data[dst] = bitmap[src];
                }
            }

            glyphs.insert(
                *c,
                GlyphInfo {
                    uv: [
                        x as f32 / atlas_width as f32,
                        y as f32 / atlas_height as f32,
                        glyph_w as f32 / atlas_width as f32,
                        glyph_h as f32 / atlas_height as f32,
                    ],
                    width: glyph_w,
                    height: glyph_h,
                    offset_x: metrics.xmin as f32,
                    offset_y: metrics.ymin as f32,
                    advance: metrics.advance_width,
                },
            );

            x += glyph_w + padding;
            row_height = row_height.max(glyph_h);
        }

        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Font Atlas"),
            size: wgpu::Extent3d {
                width: atlas_width,
                height: atlas_height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        gpu.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &atlas_data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(atlas_width),
                rows_per_image: Some(atlas_height),
            },
            wgpu::Extent3d {
                width: atlas_width,
                height: atlas_height,
                depth_or_array_layers: 1,
            },
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Font Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Ok(Self {
            texture,
            view,
            sampler,
            glyphs,
            size,
        })
    }

    /// Dry-run the row packing at the given atlas dimensions.
    fn fits(
        rasterized: &[(char, fontdue::Metrics, Vec<u8>)],
        atlas_width: u32,
        atlas_height: u32,
        padding: u32,
    ) -> bool {
        let mut x = padding;
        let mut y = padding;
        let mut row_height = 0u32;

        for (_, metrics, _) in rasterized {
            let glyph_w = metrics.width as u32;
            let glyph_h = metrics.height as u32;

            if x + glyph_w + padding > atlas_width {
                x = padding;
                y += row_height + padding;
                row_height = 0;
            }

            if y + glyph_h + padding > atlas_height {
                return false;
            }

            x += glyph_w + padding;
            row_height = row_height.max(glyph_h);
        }

        true
    }

    /// Glyph info for a character, if it was rasterized.
    pub fn glyph(&self, c: char) -> Option<&GlyphInfo> {
        self.glyphs.get(&c)
    }

    /// Pixel size this atlas was rasterized at.
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Advance width of a string in pixels.
    pub fn measure(&self, text: &str) -> f32 {
        text.chars()
            .filter_map(|c| self.glyphs.get(&c))
            .map(|g| g.advance)
            .sum()
    }
}
