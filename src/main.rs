use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use serde_json::json;
use snap_crop::config::SnapConfig;
use snap_crop::{CaptureSession, FileSource, OutputFormat, Snap};
use snap_geom::crop::{CropSpec, Offset};

/// Crop a still image the way the live preview shows it.
#[derive(Parser, Debug)]
#[command(name = "snap")]
#[command(about = "📸 Cut a declaratively described crop out of an image at full resolution")]
#[command(long_about = "Decode INPUT, resolve the crop against its native resolution and write the
cropped region. Offsets take a fraction (0.25) or an anchor keyword
(left/center/right, top/center/bottom, start/end).")]
struct Args {
    /// Image to crop
    input: PathBuf,

    /// Output path (defaults to snap.jpg or snap.png)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Width the preview is displayed at
    #[arg(long, default_value_t = snap_crop::config::DEFAULT_DISPLAY_WIDTH)]
    display_width: u32,

    /// Horizontal offset: fraction or left/center/right
    #[arg(long, allow_hyphen_values = true)]
    left: Option<Offset>,

    /// Vertical offset: fraction or top/center/bottom
    #[arg(long, allow_hyphen_values = true)]
    top: Option<Offset>,

    /// Crop width as a fraction of the image width
    #[arg(long)]
    width: Option<f64>,

    /// Crop height as a fraction of the image height
    #[arg(long)]
    height: Option<f64>,

    /// Multiplier deriving the missing side (1.0 = square)
    #[arg(long)]
    ratio: Option<f64>,

    /// Device pixel scale of the output
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Output encoding
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Jpeg)]
    format: OutputFormat,

    /// JPEG quality (1-100)
    #[arg(short, long, default_value_t = snap_crop::config::DEFAULT_JPEG_QUALITY)]
    quality: u8,

    /// Also write the preview overlay mask as PNG
    #[arg(long)]
    overlay: Option<PathBuf>,

    /// Print the capture summary as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn crop(&self) -> CropSpec {
        CropSpec {
            left: self.left.clone(),
            top: self.top.clone(),
            width: self.width,
            height: self.height,
            ratio: self.ratio,
        }
    }

    fn config(&self) -> SnapConfig {
        SnapConfig {
            display_width: self.display_width,
            crop: self.crop(),
            device_pixel_scale: self.scale,
            format: self.format,
            jpeg_quality: self.quality,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let config = args.config().sanitized();

    let mut session = CaptureSession::builder()
        .with_source(FileSource::from_path(&args.input))
        .with_config(&config)
        .build()?;
    session
        .start()
        .await
        .with_context(|| format!("Failed to open {}", args.input.display()))?;

    let overlay = session.overlay()?;
    if let Some(path) = &args.overlay {
        overlay
            .render_mask()
            .save(path)
            .with_context(|| format!("Failed to write overlay {}", path.display()))?;
        info!("Wrote overlay mask to {}", path.display());
    }

    let snap = session.capture(&config.to_capture_options())?;
    let native = session.native_resolution()?;
    session.detach();

    let result = match snap {
        Snap::Taken(result) => result,
        Snap::Cleared => {
            if args.json {
                println!(
                    "{}",
                    json!({ "cleared": true, "native": [native.w, native.h] })
                );
            } else {
                println!("Crop has no area at {}; nothing written", native);
            }
            return Ok(());
        }
    };

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("snap.{}", result.format.extension())));
    tokio::fs::write(&output, &result.data)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if args.json {
        let summary = json!({
            "cleared": false,
            "output": output.display().to_string(),
            "mime_type": result.mime_type(),
            "bytes": result.data.len(),
            "native": [native.w, native.h],
            "crop": { "width": result.width, "height": result.height },
            "pixels": [result.pixel_width, result.pixel_height],
            "preview": { "width": result.preview_width, "height": result.preview_height },
            "overlay": {
                "x": overlay.crop.x,
                "y": overlay.crop.y,
                "width": overlay.crop.w,
                "height": overlay.crop.h,
            },
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "✅ {} ({}x{} from {}, {} bytes)",
            output.display(),
            result.pixel_width,
            result.pixel_height,
            native,
            result.data.len()
        );
    }
    Ok(())
}
