use plotters::coord::ranged3d::{ProjectionMatrix, ProjectionMatrixBuilder};

/// Orientation handed to the plotters projection builder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub yaw: f64,
    pub pitch: f64,
    pub scale: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            yaw: 0.7,
            pitch: 0.45,
            scale: 0.9,
        }
    }
}

impl Camera {
    pub fn projection(&self, mut pb: ProjectionMatrixBuilder) -> ProjectionMatrix {
        pb.yaw = self.yaw;
        pb.pitch = self.pitch;
        pb.scale = self.scale;
        pb.into_matrix()
    }
}
