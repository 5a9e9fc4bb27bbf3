use anyhow::{bail, Context};
use clap::Parser;
use log::info;

mod cli;
mod scenes;

use cli::{Args, IntegratorKind, SceneKind};
use lumen_math::UVec2;
use lumen_renderer::integrator::{
    AovIntegrator, AovVariable, DirectIntegrator, Integrator, PathTracer,
};
use lumen_renderer::RenderConfig;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.clone().into())
        .init();

    let resolution = UVec2::new(args.width, args.height);
    info!(
        "lumen: {}x{} at {} spp, integrator {:?}, scene {:?}",
        args.width, args.height, args.samples_per_pixel, args.integrator, args.scene
    );

    let (scene, camera) = match args.scene {
        SceneKind::Spheres => scenes::spheres(resolution),
        SceneKind::Cornell => scenes::cornell(resolution),
        SceneKind::Volume => scenes::volume(resolution),
    };

    let integrator: Box<dyn Integrator> = match args.integrator {
        IntegratorKind::Path => Box::new(PathTracer::new(args.depth, !args.no_nee)),
        IntegratorKind::Direct => Box::new(DirectIntegrator::new()),
        IntegratorKind::AovNormals => Box::new(AovIntegrator::new(AovVariable::Normals)),
        IntegratorKind::AovBvh => Box::new(AovIntegrator::new(AovVariable::Bvh)),
    };

    let config = RenderConfig {
        samples_per_pixel: args.samples_per_pixel,
        seed: args.seed,
    };

    let image = lumen_renderer::render(&scene, &camera, integrator.as_ref(), &config);

    if args.output.ends_with(".exr") {
        image
            .save_exr(&args.output)
            .with_context(|| format!("writing {}", args.output))?;
    } else if args.output.ends_with(".png") {
        image
            .save_png(&args.output)
            .with_context(|| format!("writing {}", args.output))?;
    } else {
        bail!(
            "unsupported output extension '{}': use .png or .exr",
            args.output
        );
    }

    Ok(())
}
