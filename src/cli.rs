// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! - Listing available cameras
//! - Taking photos
//! - Uploading photos (or writing the upload body for inspection)

use bodysnap::backends::camera::{CameraSession, Facing, MediaDevices, get_backend};
use bodysnap::config::Config;
use bodysnap::errors::AppError;
use bodysnap::pipelines::photo::{EncodedImage, FilterParameters, PhotoPipeline};
use bodysnap::storage;
use bodysnap::upload::{ImageCategory, UploadClient, UploadPayload};
use clap::Args;
use std::path::{Path, PathBuf};

/// Options shared by every command that captures a photo
#[derive(Args, Debug, Clone)]
pub struct CaptureArgs {
    /// Lens facing (user or environment)
    #[arg(short, long)]
    facing: Option<Facing>,

    /// Serve this image file as the camera instead of a real device
    #[arg(long)]
    source: Option<PathBuf>,

    /// Apply the colour filter even if the configuration disables it
    #[arg(long)]
    filter: bool,

    /// Skip the colour filter
    #[arg(long, conflicts_with_all = ["filter", "contrast", "brightness", "saturation"])]
    no_filter: bool,

    /// Contrast multiplier (1.0 = unchanged)
    #[arg(long)]
    contrast: Option<f32>,

    /// Brightness multiplier (1.0 = unchanged)
    #[arg(long)]
    brightness: Option<f32>,

    /// Saturation multiplier (1.0 = unchanged)
    #[arg(long)]
    saturation: Option<f32>,
}

impl CaptureArgs {
    /// Filter to apply: flags override the configured values
    fn filter(&self, config: &Config) -> Result<Option<FilterParameters>, AppError> {
        if self.no_filter {
            return Ok(None);
        }

        let overridden =
            self.contrast.is_some() || self.brightness.is_some() || self.saturation.is_some();
        if !overridden {
            let enabled = self.filter || config.filter_enabled;
            return Ok(enabled.then_some(config.filter));
        }

        let base = config.filter;
        FilterParameters::new(
            self.contrast.unwrap_or(base.contrast()),
            self.brightness.unwrap_or(base.brightness()),
            self.saturation.unwrap_or(base.saturation()),
        )
        .map(Some)
        .map_err(AppError::Config)
    }
}

/// Load the configuration from `path` or the default location
pub fn load_config(path: Option<&Path>) -> Result<Config, AppError> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// List all available cameras
pub fn list_cameras(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let backend = get_backend(config, None);
    let cameras = backend.enumerate_cameras()?;

    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras ({}):", backend.backend_type());
    println!();
    for (index, camera) in cameras.iter().enumerate() {
        let facing = camera
            .facing
            .map(|f| f.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        println!("  [{}] {}", index, camera.name);
        println!("      Path: {}", camera.path);
        println!("      Facing: {}", facing);
    }

    Ok(())
}

/// Open a session and capture one photo
fn capture(config: &Config, args: &CaptureArgs) -> Result<EncodedImage, AppError> {
    let facing = args.facing.unwrap_or(config.default_facing);
    let backend = get_backend(config, args.source.clone());
    let mut session = CameraSession::with_facing(backend, facing);

    session.request_access(facing)?;
    if let Some(device) = session.current_device() {
        println!("Using camera: {} ({})", device.name, facing);
    }

    let mut pipeline = PhotoPipeline::from_config(config);
    pipeline.set_filter(args.filter(config)?);

    println!("Capturing...");
    Ok(pipeline.capture(&mut session)?)
}

/// Take a photo and save it
pub fn take_photo(
    config: &Config,
    args: &CaptureArgs,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let encoded = capture(config, args)?;
    println!("Captured {}x{}", encoded.width, encoded.height);

    // A path that is not a directory is taken as the target file name
    if let Some(path) = output.as_ref()
        && !path.is_dir()
    {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &encoded.data)?;
        println!("Photo saved: {}", path.display());
        return Ok(());
    }

    let output_dir = output.unwrap_or_else(|| storage::default_photo_dir(&config.save_folder));
    let rt = tokio::runtime::Runtime::new()?;
    let path = rt.block_on(storage::save_photo(encoded, output_dir))?;

    println!("Photo saved: {}", path.display());
    Ok(())
}

/// Take a photo and upload it
pub fn upload_photo(
    config: &Config,
    args: &CaptureArgs,
    user: &str,
    category: ImageCategory,
    endpoint: Option<String>,
    dry_run: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    if user.trim().is_empty() {
        return Err("User identifier must not be empty".into());
    }

    let encoded = capture(config, args)?;
    let payload = UploadPayload::new(encoded, user, category);
    println!(
        "Prepared {} ({} bytes, type {})",
        payload.file.filename,
        payload.file.data.len(),
        payload.category
    );

    if let Some(path) = dry_run {
        let body = payload.to_multipart();
        std::fs::write(&path, &body.bytes)?;
        println!("Content-Type: {}", body.content_type());
        println!("Body written: {}", path.display());
        return Ok(());
    }

    let endpoint = endpoint.unwrap_or_else(|| config.upload_endpoint.clone());
    let client = UploadClient::new(endpoint)?;

    let rt = tokio::runtime::Runtime::new()?;
    let receipt = rt.block_on(client.send(&payload))?;

    println!("Uploaded: {}", receipt.url);
    Ok(())
}

/// Print (and optionally persist) the effective configuration
pub fn show_config(
    config: &Config,
    path: Option<&Path>,
    write: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(config)?);

    if write {
        let path = match path {
            Some(path) => {
                config.save_to(path)?;
                path.to_path_buf()
            }
            None => config.save()?,
        };
        println!("Configuration written: {}", path.display());
    }

    Ok(())
}
