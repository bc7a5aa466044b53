//! GPU substrate: wgpu compute pipelines compiled once per evaluator.
//!
//! The random lattice is built on the CPU and uploaded as a storage buffer; the
//! kernel runs one invocation per texel and the result is read back through a
//! staging buffer. `dispatch` blocks until the readback has completed.

use std::sync::mpsc;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::{GridEvaluator, Kernel, WORKGROUP_EDGE};
use crate::error::{NoiseError, Result};
use crate::field::{Dimension, Domain};

/// 3D work-groups are 8x8x4 so they stay within the default 256-invocation limit
const VOLUME_GROUP_DEPTH: u32 = 4;

/// Uniform block shared by both kernels (matches `KernelParams` in WGSL)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct KernelParams {
    size: u32,
    cells_per_axis: u32,
    cell_size: f32,
    depth: u32,
}

/// Entry points of one kernel shader
struct KernelPipelines {
    flat: wgpu::ComputePipeline,
    volume: wgpu::ComputePipeline,
}

impl KernelPipelines {
    fn select(&self, dimension: Dimension) -> &wgpu::ComputePipeline {
        match dimension {
            Dimension::Two => &self.flat,
            Dimension::Three => &self.volume,
        }
    }
}

/// Compute-shader evaluator owning its device, queue and compiled kernels
pub struct GpuEvaluator {
    device: wgpu::Device,
    queue: wgpu::Queue,
    bind_group_layout: wgpu::BindGroupLayout,
    perlin: KernelPipelines,
    worley: KernelPipelines,
}

impl GpuEvaluator {
    /// Acquire an adapter and compile both kernels, blocking until ready
    pub fn new() -> Result<Self> {
        pollster::block_on(Self::new_async())
    }

    async fn new_async() -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| NoiseError::Gpu("no suitable GPU adapter".to_string()))?;

        // Large volumes need the adapter's full buffer sizes, not the portable defaults
        let supported = adapter.limits();
        let required_limits = wgpu::Limits {
            max_buffer_size: supported.max_buffer_size,
            max_storage_buffer_binding_size: supported.max_storage_buffer_binding_size,
            ..wgpu::Limits::default()
        };

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Noise Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits,
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| NoiseError::Gpu(format!("failed to request device: {}", e)))?;

        log::info!("gpu evaluator on {}", adapter.get_info().name);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Noise Kernel Bind Group Layout"),
            entries: &[
                storage_entry(0, false),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                storage_entry(2, true),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Noise Kernel Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let perlin = compile_kernel(
            &device,
            &pipeline_layout,
            "Perlin",
            include_str!("perlin.wgsl"),
        );
        let worley = compile_kernel(
            &device,
            &pipeline_layout,
            "Worley",
            include_str!("worley.wgsl"),
        );

        Ok(Self {
            device,
            queue,
            bind_group_layout,
            perlin,
            worley,
        })
    }
}

/// Reject a storage buffer the device could not create or bind
fn check_buffer_fits(label: &str, bytes: u64, limits: &wgpu::Limits) -> Result<()> {
    let max = limits
        .max_buffer_size
        .min(limits.max_storage_buffer_binding_size as u64);
    if bytes > max {
        return Err(NoiseError::Gpu(format!(
            "{} needs {} bytes, device allows {}",
            label, bytes, max
        )));
    }
    Ok(())
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn compile_kernel(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    name: &str,
    source: &str,
) -> KernelPipelines {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(name),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    let pipeline = |entry_point: &str| {
        device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(name),
            layout: Some(layout),
            module: &module,
            entry_point: Some(entry_point),
            compilation_options: Default::default(),
            cache: None,
        })
    };

    KernelPipelines {
        flat: pipeline("main_2d"),
        volume: pipeline("main_3d"),
    }
}

impl GridEvaluator for GpuEvaluator {
    fn name(&self) -> &'static str {
        "gpu"
    }

    fn dispatch(&self, domain: Domain, kernel: &Kernel<'_>) -> Result<Vec<f32>> {
        let (grid, cell_size, pipelines) = match kernel {
            Kernel::Perlin(k) => (k.gradients, k.cell_size, &self.perlin),
            Kernel::Worley(k) => (k.features, k.cell_size, &self.worley),
        };

        let output_size = (domain.len() * std::mem::size_of::<f32>()) as u64;
        let cells_size = (grid.cells().len() * std::mem::size_of::<[f32; 4]>()) as u64;
        let limits = self.device.limits();
        check_buffer_fits("field output", output_size, &limits)?;
        check_buffer_fits("lattice", cells_size, &limits)?;

        // vec3 storage arrays have a 16-byte stride, so pad to vec4
        let cells: Vec<[f32; 4]> = grid
            .cells()
            .iter()
            .map(|v| v.extend(0.0).to_array())
            .collect();

        let extent = grid.extent();
        let params = KernelParams {
            size: domain.size,
            cells_per_axis: extent.x,
            cell_size,
            depth: extent.z,
        };

        let cell_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Lattice Buffer"),
                contents: bytemuck::cast_slice(&cells),
                usage: wgpu::BufferUsages::STORAGE,
            });

        let params_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Kernel Params Buffer"),
                contents: bytemuck::cast_slice(&[params]),
                usage: wgpu::BufferUsages::UNIFORM,
            });

        let output_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Field Output Buffer"),
            size: output_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let staging_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Field Staging Buffer"),
            size: output_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Noise Kernel Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: output_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: cell_buffer.as_entire_binding(),
                },
            ],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Noise Kernel Encoder"),
            });

        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Noise Kernel Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(pipelines.select(domain.dimension));
            pass.set_bind_group(0, &bind_group, &[]);

            let groups_xy = domain.size.div_ceil(WORKGROUP_EDGE);
            let groups_z = match domain.dimension {
                Dimension::Two => 1,
                Dimension::Three => domain.size.div_ceil(VOLUME_GROUP_DEPTH),
            };
            pass.dispatch_workgroups(groups_xy, groups_xy, groups_z);
        }

        encoder.copy_buffer_to_buffer(&output_buffer, 0, &staging_buffer, 0, output_size);
        self.queue.submit(Some(encoder.finish()));

        let slice = staging_buffer.slice(..);
        let (sender, receiver) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);

        receiver
            .recv()
            .map_err(|e| NoiseError::Gpu(format!("readback channel closed: {}", e)))?
            .map_err(|e| NoiseError::Gpu(format!("failed to map output buffer: {}", e)))?;

        let data = slice.get_mapped_range();
        let values: Vec<f32> = bytemuck::cast_slice(&data).to_vec();
        drop(data);
        staging_buffer.unmap();

        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oversized_volume_rejected_before_allocation() {
        let limits = wgpu::Limits::default();
        let cube_512 = 512u64 * 512 * 512 * 4;
        assert!(matches!(
            check_buffer_fits("field output", cube_512, &limits),
            Err(NoiseError::Gpu(_))
        ));

        let cube_128 = 128u64 * 128 * 128 * 4;
        assert!(check_buffer_fits("field output", cube_128, &limits).is_ok());
    }

    #[test]
    fn test_raised_limits_admit_large_volume() {
        let limits = wgpu::Limits {
            max_buffer_size: 1 << 32,
            max_storage_buffer_binding_size: u32::MAX,
            ..wgpu::Limits::default()
        };
        assert!(check_buffer_fits("field output", 512u64 * 512 * 512 * 4, &limits).is_ok());
    }
}
