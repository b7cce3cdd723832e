// Declare entries for bind groups
macro_rules! bind_group {
    ( $( $kind:ident $args:tt ),* $(,)? ) => {
        (
            [ $( bind_group!(@layout $kind $args) ),* ],
            [ $( bind_group!(@resource $kind $args) ),* ],
        )
    };

    // Uniforms
    (@layout Uniform($binding:expr => ($buffer:expr) in $visibility:ident)) => {
        wgpu::BindGroupLayoutEntry {
            binding: $binding,
            visibility: wgpu::ShaderStage::$visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: $buffer.size(),
            },
            count: None,
        }
    };
    (@resource Uniform($binding:expr => ($buffer:expr) in $visibility:ident)) => {
        wgpu::BindGroupEntry {
            binding: $binding,
            resource: wgpu::BindingResource::Buffer {
                buffer: &$buffer,
                offset: 0,
                size: None,
            },
        }
    };

    // Samplers
    (@layout Sampler($binding:expr => ($sampler:expr) in $visibility:ident)) => {
        wgpu::BindGroupLayoutEntry {
            binding: $binding,
            visibility: wgpu::ShaderStage::$visibility,
            ty: wgpu::BindingType::Sampler {
                filtering: true,
                comparison: false,
            },
            count: None,
        }
    };
    (@resource Sampler($binding:expr => ($sampler:expr) in $visibility:ident)) => {
        wgpu::BindGroupEntry {
            binding: $binding,
            resource: wgpu::BindingResource::Sampler($sampler),
        }
    };

    // Sampled textures
    (@layout Texture(
        $binding:expr => ($view:expr, $sample:ident $sample_args:tt, $dimension:ident) in $visibility:ident
    )) => {
        wgpu::BindGroupLayoutEntry {
            binding: $binding,
            visibility: wgpu::ShaderStage::$visibility,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::$sample $sample_args,
                view_dimension: wgpu::TextureViewDimension::$dimension,
                multisampled: false,
            },
            count: None,
        }
    };
    (@resource Texture(
        $binding:expr => ($view:expr, $sample:ident $sample_args:tt, $dimension:ident) in $visibility:ident
    )) => {
        wgpu::BindGroupEntry {
            binding: $binding,
            resource: wgpu::BindingResource::TextureView($view),
        }
    };
}
