use crate::error::{ReefError, Result};
use log::{error, info, warn};
use nalgebra::{Point3, Vector3};
use std::fs;
use std::path::Path;

const FIELD_COUNT: usize = 10;

/// What survives between runs: clear colour, overlay flag and where the camera was.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgramState {
    pub clear_color: Vector3<f32>,
    pub overlay_enabled: bool,
    pub camera_position: Point3<f32>,
    pub camera_front: Vector3<f32>,
}

impl Default for ProgramState {
    fn default() -> Self {
        Self {
            clear_color: Vector3::zeros(),
            overlay_enabled: false,
            camera_position: Point3::new(0.0, 0.0, 3.0),
            camera_front: Vector3::new(0.0, 0.0, -1.0),
        }
    }
}

impl ProgramState {
    /// Parses whitespace-separated tokens: r g b overlay px py pz fx fy fz.
    /// Tokens past the tenth are ignored.
    pub fn parse(content: &str) -> Result<Self> {
        let tokens: Vec<&str> = content.split_whitespace().take(FIELD_COUNT).collect();
        if tokens.len() < FIELD_COUNT {
            return Err(ReefError::StateTruncated {
                found: tokens.len(),
                expected: FIELD_COUNT,
            });
        }

        let float = |field: usize| -> Result<f32> {
            tokens[field].parse().map_err(|_| ReefError::StateParse {
                field,
                token: tokens[field].to_string(),
            })
        };
        let overlay = match tokens[3] {
            "0" => false,
            "1" => true,
            other => {
                return Err(ReefError::StateParse {
                    field: 3,
                    token: other.to_string(),
                });
            }
        };

        Ok(Self {
            clear_color: Vector3::new(float(0)?, float(1)?, float(2)?),
            overlay_enabled: overlay,
            camera_position: Point3::new(float(4)?, float(5)?, float(6)?),
            camera_front: Vector3::new(float(7)?, float(8)?, float(9)?),
        })
    }

    /// One field per line, in parse order.
    pub fn serialize(&self) -> String {
        let c = &self.clear_color;
        let p = &self.camera_position;
        let f = &self.camera_front;
        let fields = [
            c.x.to_string(),
            c.y.to_string(),
            c.z.to_string(),
            u8::from(self.overlay_enabled).to_string(),
            p.x.to_string(),
            p.y.to_string(),
            p.z.to_string(),
            f.x.to_string(),
            f.y.to_string(),
            f.z.to_string(),
        ];
        let mut out = fields.join("\n");
        out.push('\n');
        out
    }

    /// Missing file gives the defaults silently; an unreadable or malformed one warns first.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No program state at {:?}, using defaults", path);
            return Self::default();
        }

        match Self::load(path) {
            Ok(state) => {
                info!("Restored program state from {:?}", path);
                state
            }
            Err(e) => {
                warn!("{}, using default program state", e);
                Self::default()
            }
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ReefError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let write = || -> std::io::Result<()> {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, self.serialize())
        };
        write().map_err(|source| {
            error!("Failed to save program state to {:?}: {}", path, source);
            ReefError::Io {
                path: path.to_path_buf(),
                source,
            }
        })
    }
}
