use glam::Vec3;

/// Camera pose as seen by a connected client: where it sits and what it looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// Camera position in world space.
    pub position: Vec3,
    /// Point the camera is aimed at.
    pub look_at: Vec3,
}

impl CameraPose {
    /// Create a new camera pose.
    pub fn new(position: Vec3, look_at: Vec3) -> Self {
        Self { position, look_at }
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::new(Vec3::splat(3.0), Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pose_looks_at_origin_from_diagonal() {
        let pose = CameraPose::default();
        assert_eq!(pose.position, Vec3::new(3.0, 3.0, 3.0));
        assert_eq!(pose.look_at, Vec3::ZERO);
    }
}
