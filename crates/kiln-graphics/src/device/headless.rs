use crate::device::{DeviceDesc, DeviceError, RenderDevice};
use kiln::graphics::{RenderApi, TextureDesc, TextureFormat};
use kiln::types::Color;
use log::trace;

pub const HEADLESS_MAX_TEXTURE_SIZE: u32 = 16384;

/// Software device with no window and no GPU behind it.
///
/// Textures are plain memory; clears and presents are only recorded.
#[derive(Debug)]
pub struct HeadlessDevice {
    desc: DeviceDesc,
    clear_color: Color,
    presents: u64,
}

#[derive(Debug)]
pub struct HeadlessTexture {
    pub pixels: Vec<u8>,
}

impl HeadlessDevice {
    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn presents(&self) -> u64 {
        self.presents
    }

    pub fn desc(&self) -> &DeviceDesc {
        &self.desc
    }
}

fn mip_extent(extent: u32, level: u32) -> u32 {
    extent.checked_shr(level).unwrap_or(0).max(1)
}

impl RenderDevice for HeadlessDevice {
    type Texture = HeadlessTexture;

    const RENDER_API: RenderApi = RenderApi::Software;

    fn create(desc: &DeviceDesc) -> Result<Self, DeviceError> {
        trace!("headless: creating {}x{} device", desc.width, desc.height);
        Ok(Self {
            desc: *desc,
            clear_color: Color::BLACK,
            presents: 0,
        })
    }

    fn max_texture_size(&self) -> u32 {
        HEADLESS_MAX_TEXTURE_SIZE
    }

    fn supports_format(&self, format: TextureFormat) -> bool {
        !format.is_compressed()
    }

    fn create_texture(
        &mut self,
        desc: &TextureDesc<'_>,
        data: Option<&[u8]>,
    ) -> Result<Self::Texture, DeviceError> {
        if desc.mip_levels == 0 {
            return Err(DeviceError::Unsupported(
                "a texture needs at least one mip level".to_string(),
            ));
        }

        let too_large = || DeviceError::Unsupported("texture does not fit in memory".to_string());
        let top = desc
            .format
            .surface_size(desc.width, desc.height)
            .ok_or_else(too_large)?;
        let chain = (0..desc.mip_levels)
            .try_fold(0usize, |total, level| {
                let size = desc
                    .format
                    .surface_size(mip_extent(desc.width, level), mip_extent(desc.height, level))?;
                total.checked_add(size)
            })
            .ok_or_else(too_large)?;

        let mut pixels = vec![0u8; chain];
        if let Some(data) = data {
            if data.len() != top {
                return Err(DeviceError::InvalidData {
                    expected: top,
                    found: data.len(),
                });
            }
            pixels[..top].copy_from_slice(data);
        }

        Ok(HeadlessTexture { pixels })
    }

    fn clear(&mut self, color: Color) {
        self.clear_color = color;
    }

    fn present(&mut self) -> Result<(), DeviceError> {
        self.presents += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_storage_covers_the_mip_chain() {
        let mut device = HeadlessDevice::create(&DeviceDesc::default()).unwrap();
        let desc = TextureDesc {
            mip_levels: 3,
            ..TextureDesc::new(4, 4, TextureFormat::Rgba8UNorm)
        };
        let texture = device.create_texture(&desc, None).unwrap();
        assert_eq!(texture.pixels.len(), 64 + 16 + 4);
    }

    #[test]
    fn initial_data_must_match_the_top_level() {
        let mut device = HeadlessDevice::create(&DeviceDesc::default()).unwrap();
        let desc = TextureDesc::new(2, 2, TextureFormat::R8UNorm);
        let texture = device.create_texture(&desc, Some(&[1, 2, 3, 4])).unwrap();
        assert_eq!(texture.pixels, vec![1, 2, 3, 4]);
        assert!(matches!(
            device.create_texture(&desc, Some(&[1, 2])),
            Err(DeviceError::InvalidData { expected: 4, found: 2 })
        ));
    }

    #[test]
    fn unaddressable_textures_are_refused() {
        let mut device = HeadlessDevice::create(&DeviceDesc::default()).unwrap();
        let desc = TextureDesc::new(u32::MAX, u32::MAX, TextureFormat::Rgba16Float);
        assert!(matches!(
            device.create_texture(&desc, None),
            Err(DeviceError::Unsupported(_))
        ));
    }

    #[test]
    fn compressed_formats_are_unsupported() {
        let device = HeadlessDevice::create(&DeviceDesc::default()).unwrap();
        assert!(device.supports_format(TextureFormat::Rgba16Float));
        assert!(!device.supports_format(TextureFormat::Bc1UNorm));
    }
}
