//! Meshview - a small 3D model viewer for the text mesh format
//!
//! Loads a model and a light marker, uploads them through the Vulkan
//! geometry backend (or host memory when no GPU is available) and runs the
//! viewer simulation for a fixed number of frames.

mod app;
mod camera;
mod input;
mod settings;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use glam::Vec3;
use meshview_assets::{AssetServer, MeshData};
use meshview_render::{
    CameraView, GeometryDevice, HostGeometryDevice, LightSource, MeshAsset, UniformBlock,
    VulkanoGeometryDevice,
};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use vulkano::{
    device::{
        physical::PhysicalDeviceType, Device, DeviceCreateInfo, QueueCreateInfo, QueueFlags,
    },
    instance::{Instance, InstanceCreateFlags, InstanceCreateInfo},
    VulkanLibrary,
};
use winit::event::{ElementState, MouseScrollDelta};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::app::ViewerContext;
use crate::input::InputHandler;
use crate::settings::ViewerSettings;

/// Simulated frame time
const FRAME_TIME: f32 = 1.0 / 60.0;

#[derive(Debug, Parser)]
#[command(name = "meshview", version, about = "View models in the text mesh format")]
struct Args {
    /// Model file, relative to the asset directory
    model: Option<PathBuf>,

    /// Light marker model; a small sphere is used when omitted
    #[arg(long)]
    light: Option<PathBuf>,

    /// Settings file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Move the model's origin to its centroid
    #[arg(long)]
    centered: bool,

    /// Skip normal generation
    #[arg(long)]
    no_normals: bool,

    /// Number of frames to run
    #[arg(long, default_value = "600")]
    frames: u32,

    /// Keep geometry in host memory instead of on the GPU
    #[arg(long)]
    host: bool,

    /// Hold the rotate-right key for the whole run
    #[arg(long)]
    spin: bool,

    /// Horizontal mouse motion fed to the camera every frame, in pixels
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pan: f64,

    /// Scroll-wheel lines applied before the first frame
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    zoom: f32,

    #[arg(short, long)]
    verbose: bool,

    /// Write a settings file with default values and exit
    #[arg(long)]
    write_default_config: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    info!("Starting meshview...");

    if args.write_default_config {
        ViewerSettings::default().save(args.config.as_deref())?;
        return Ok(());
    }

    let mut settings = ViewerSettings::load(args.config.as_deref());
    if args.centered {
        settings.mesh.centered = true;
    }
    if args.no_normals {
        settings.mesh.compute_normals = false;
    }

    let Some(model_path) = args.model.as_deref() else {
        bail!("No model file given (see --help)");
    };

    if !args.host {
        match create_vulkan_device() {
            Ok(device) => {
                let device = Arc::new(VulkanoGeometryDevice::new(device));
                // Without a swapchain there is no pipeline to draw with, so the
                // Vulkan run uploads geometry and composes push constants only.
                run(device, &args, model_path, &settings, |ctx| {
                    let (lit, flat) = ctx.uniforms();
                    debug!(
                        "Push constants: {} + {} bytes",
                        std::mem::size_of_val(&lit.push_constants()),
                        std::mem::size_of_val(&flat.push_constants())
                    );
                    Ok(0)
                })?;
                return Ok(());
            }
            Err(e) => warn!("Vulkan unavailable ({:#}), using host geometry", e),
        }
    }

    let device = Arc::new(HostGeometryDevice::new());
    let mut lit_program = UniformBlock::new();
    let mut flat_program = UniformBlock::new();
    let frame_device = device.clone();
    run(device, &args, model_path, &settings, |ctx| {
        let mut frame = frame_device.begin_frame();
        ctx.render(&mut frame, &mut lit_program, &mut flat_program)?;
        Ok(frame.draws.len())
    })?;
    Ok(())
}

/// Create a graphics-capable logical device without a window
fn create_vulkan_device() -> Result<Arc<Device>> {
    let library = VulkanLibrary::new().context("Failed to load Vulkan library")?;

    let instance = Instance::new(
        library,
        InstanceCreateInfo {
            flags: InstanceCreateFlags::ENUMERATE_PORTABILITY,
            ..Default::default()
        },
    )
    .context("Failed to create Vulkan instance")?;

    let (physical_device, queue_family_index) = instance
        .enumerate_physical_devices()
        .context("Failed to enumerate physical devices")?
        .filter_map(|p| {
            p.queue_family_properties()
                .iter()
                .position(|q| q.queue_flags.contains(QueueFlags::GRAPHICS))
                .map(|i| (p, i as u32))
        })
        .min_by_key(|(p, _)| match p.properties().device_type {
            PhysicalDeviceType::DiscreteGpu => 0,
            PhysicalDeviceType::IntegratedGpu => 1,
            PhysicalDeviceType::VirtualGpu => 2,
            PhysicalDeviceType::Cpu => 3,
            _ => 4,
        })
        .context("No suitable GPU found")?;

    info!(
        "Using GPU: {} ({:?})",
        physical_device.properties().device_name,
        physical_device.properties().device_type
    );

    let (device, _queues) = Device::new(
        physical_device,
        DeviceCreateInfo {
            queue_create_infos: vec![QueueCreateInfo {
                queue_family_index,
                ..Default::default()
            }],
            ..Default::default()
        },
    )
    .context("Failed to create logical device")?;

    Ok(device)
}

/// Load the scene onto `device` and run the frame loop.
///
/// `draw` records one frame and returns the number of draws issued. The
/// final context is handed back once the loop ends.
fn run<D: GeometryDevice>(
    device: Arc<D>,
    args: &Args,
    model_path: &Path,
    settings: &ViewerSettings,
    mut draw: impl FnMut(&ViewerContext<D>) -> Result<usize>,
) -> Result<ViewerContext<D>> {
    let mut assets = AssetServer::new(&settings.asset_dir);

    let model_path = assets.resolve(model_path);
    let model = MeshAsset::from_file(device.clone(), &model_path, &settings.mesh)
        .with_context(|| format!("Failed to load model {:?}", model_path))?;

    let marker = match &args.light {
        Some(path) => assets
            .load_mesh(path, settings.mesh)
            .with_context(|| format!("Failed to load light model {:?}", path))?,
        None => assets.add_mesh(MeshData::uv_sphere(0.1, 16, 8, Vec3::ONE)),
    };
    let marker = assets
        .clone_mesh(marker)
        .context("Light model missing from asset cache")?;
    let marker = MeshAsset::from_data(device, marker).context("Failed to upload light model")?;
    let light = LightSource::new(marker, settings.light.params());

    let mut ctx = ViewerContext::new(model, light, settings);
    let mut input = InputHandler::new();
    if args.spin {
        input.handle_keyboard(PhysicalKey::Code(KeyCode::ArrowRight), ElementState::Pressed);
    }
    if args.zoom != 0.0 {
        input.handle_scroll(MouseScrollDelta::LineDelta(0.0, args.zoom));
    }

    let mut draws = 0;
    for _ in 0..args.frames {
        if args.pan != 0.0 {
            input.handle_mouse_motion((args.pan, 0.0));
        }
        ctx.update(&input.state, FRAME_TIME);
        draws += draw(&ctx)?;
        input.end_frame();

        if ctx.quit_requested() {
            break;
        }
    }

    let data = ctx.model.data();
    info!(
        "Ran {} frames ({} draws): {} vertices, {} triangles",
        ctx.clock.frame_count,
        draws,
        data.vertex_count(),
        data.triangle_count()
    );
    info!(
        "Model at {:?}, light at {:?}, camera at {:?} (fov {:.1}, aspect {:.2}), last FPS report: {:?}",
        ctx.model.position(),
        ctx.light.position(),
        ctx.camera.position(),
        ctx.camera.fov(),
        ctx.camera.aspect_ratio(),
        ctx.clock.last_fps
    );

    Ok(ctx)
}
