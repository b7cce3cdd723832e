use super::GpuContext;

pub(crate) fn create_texture(
    size: crate::Size,
    format: wgpu::TextureFormat,
    usage: wgpu::TextureUsage,
    gpu: &GpuContext,
) -> wgpu::Texture {
    gpu.device.create_texture(&wgpu::TextureDescriptor {
        label: None,
        size: extent(size),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage,
    })
}

/// Creates a texture and uploads `data`, which holds the rows of the image back to back.
pub(crate) fn create_texture_with_data(
    size: crate::Size,
    format: wgpu::TextureFormat,
    usage: wgpu::TextureUsage,
    gpu: &GpuContext,
    data: &[u8],
) -> wgpu::Texture {
    let texture = create_texture(size, format, usage | wgpu::TextureUsage::COPY_DST, gpu);
    write_texture(&texture, size, gpu, data);
    texture
}

pub(crate) fn write_texture(
    texture: &wgpu::Texture,
    size: crate::Size,
    gpu: &GpuContext,
    data: &[u8],
) {
    let bytes_per_row = data.len() as u32 / size.height.max(1);

    gpu.queue.write_texture(
        wgpu::TextureCopyView {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
        },
        data,
        wgpu::TextureDataLayout {
            offset: 0,
            bytes_per_row,
            rows_per_image: size.height,
        },
        extent(size),
    );
}

pub fn view(texture: &wgpu::Texture) -> wgpu::TextureView {
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

pub(crate) fn create_linear_sampler(gpu: &GpuContext) -> wgpu::Sampler {
    gpu.device.create_sampler(&wgpu::SamplerDescriptor {
        label: None,
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}

fn extent(size: crate::Size) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: size.width,
        height: size.height,
        depth: 1,
    }
}
