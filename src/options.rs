use crate::linear::Vec3;
use clap::Parser;
use std::path::PathBuf;

/// Free-look camera visualizer: drag with the left mouse button to look around.
#[derive(Parser, Debug, Clone)]
#[command(name = "freelook")]
pub(crate) struct Options {
    /// Initial eye position, as `x,y,z`
    #[arg(long, value_parser = parse_vec3, default_value = "0,0,3")]
    pub position: Vec3,

    /// Initial yaw in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub yaw: f32,

    /// Initial pitch in degrees (clamped to +-89)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub pitch: f32,

    /// Degrees of rotation per pixel of pointer motion
    #[arg(long, value_parser = parse_sensitivity, default_value_t = 1.0)]
    pub sensitivity: f32,

    /// Directory containing the GLSL shaders (watched for changes)
    #[arg(long, default_value = "shaders")]
    pub shaders: PathBuf,

    /// Image drawn on the quad; a checkerboard is generated if omitted
    #[arg(long)]
    pub texture: Option<PathBuf>,

    /// Edge length of each window, in logical pixels
    #[arg(long, default_value_t = 900)]
    pub size: u32,

    /// Log at debug level unless `RUST_LOG` says otherwise
    #[arg(long, short)]
    pub verbose: bool,
}

fn parse_vec3(text: &str) -> Result<Vec3, String> {
    let components = text
        .split(',')
        .map(|part| {
            let value = part
                .trim()
                .parse::<f32>()
                .map_err(|e| format!("`{}`: {}", part.trim(), e))?;
            if value.is_finite() {
                Ok(value)
            } else {
                Err(format!("`{}` is not finite", part.trim()))
            }
        })
        .collect::<Result<Vec<f32>, String>>()?;

    match components.as_slice() {
        &[x, y, z] => Ok(Vec3::new(x, y, z)),
        other => Err(format!("expected 3 components, found {}", other.len())),
    }
}

fn parse_sensitivity(text: &str) -> Result<f32, String> {
    let value: f32 = text.parse().map_err(|e| format!("{}", e))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(String::from("must be a finite, positive number"))
    }
}
