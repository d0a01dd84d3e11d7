use glam::{Mat4, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Vertical field of view in radians; aspect comes from the canvas.
    Perspective { fov_y: f32, near: f32, far: f32 },
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
}

/// Fixed camera: a projection and a model-view translation. Nothing about it
/// changes between frames; the matrices are rebuilt on every draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub projection: Projection,
    pub translation: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraMatrices {
    pub projection: Mat4,
    pub model_view: Mat4,
}

impl Camera {
    /// 45° field of view, depth 0.1..100, pulled back six units.
    pub fn perspective() -> Self {
        Self {
            projection: Projection::Perspective {
                fov_y: 45.0_f32.to_radians(),
                near: 0.1,
                far: 100.0,
            },
            translation: Vec3::new(0.0, 0.0, -6.0),
        }
    }

    /// Pixel-space projection for a 640x480 viewport centred on the origin.
    pub fn orthographic() -> Self {
        Self {
            projection: Projection::Orthographic {
                left: -320.0,
                right: 320.0,
                bottom: -240.0,
                top: 240.0,
                near: 0.1,
                far: 100.0,
            },
            translation: Vec3::new(0.0, 0.0, -6.0),
        }
    }

    pub fn matrices(&self, aspect: f32) -> CameraMatrices {
        let projection = match self.projection {
            Projection::Perspective { fov_y, near, far } => {
                let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
                Mat4::perspective_rh_gl(fov_y, aspect, near, far)
            }
            Projection::Orthographic { left, right, bottom, top, near, far } => {
                Mat4::orthographic_rh_gl(left, right, bottom, top, near, far)
            }
        };
        CameraMatrices {
            projection,
            model_view: Mat4::from_translation(self.translation),
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::perspective()
    }
}
