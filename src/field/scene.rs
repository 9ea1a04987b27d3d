//! Scene ownership of the single point-cloud mesh.

use log::debug;

use super::grid::PointBuffer;
use crate::params::Rgb;

/// The attached point buffer tagged with the rebuild that produced it
#[derive(Debug)]
pub struct PointMesh {
    buffer: PointBuffer,
    generation: u64,
}

impl PointMesh {
    pub fn buffer(&self) -> &PointBuffer {
        &self.buffer
    }

    /// Increases by one every time a mesh is attached
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn grid_size(&self) -> usize {
        self.buffer.grid_size()
    }
}

/// Owns exactly one active mesh and the background color
#[derive(Debug)]
pub struct Scene {
    mesh: Option<PointMesh>,
    background: Rgb,
    next_generation: u64,
}

impl Scene {
    pub fn new(background: Rgb) -> Self {
        Self {
            mesh: None,
            background,
            next_generation: 1,
        }
    }

    /// Replace the mesh: the previous one is detached before the new one is
    /// attached and handed back so the caller can dispose of it.
    pub fn attach(&mut self, buffer: PointBuffer) -> Option<PointMesh> {
        let released = self.release();

        let generation = self.next_generation;
        self.next_generation += 1;
        debug!(
            "Attached mesh generation {} ({} points)",
            generation,
            buffer.len()
        );
        self.mesh = Some(PointMesh { buffer, generation });

        released
    }

    /// Detach the current mesh, leaving the scene empty
    pub fn release(&mut self) -> Option<PointMesh> {
        let released = self.mesh.take();
        if let Some(mesh) = &released {
            debug!("Released mesh generation {}", mesh.generation);
        }
        released
    }

    pub fn mesh(&self) -> Option<&PointMesh> {
        self.mesh.as_ref()
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    pub fn set_background(&mut self, color: Rgb) {
        self.background = color;
    }

    /// Whether the attached mesh disagrees with the requested grid size
    pub fn needs_rebuild(&self, grid_cells: usize) -> bool {
        self.mesh
            .as_ref()
            .map_or(true, |mesh| mesh.grid_size() != grid_cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::grid::GridBuilder;

    #[test]
    fn test_attach_returns_previous_mesh() {
        let mut scene = Scene::new(Rgb::from_hex(0x000000));
        assert!(scene.attach(GridBuilder::build(3)).is_none());

        let released = scene.attach(GridBuilder::build(5)).unwrap();
        assert_eq!(released.grid_size(), 3);
        assert_eq!(released.generation(), 1);

        let mesh = scene.mesh().unwrap();
        assert_eq!(mesh.grid_size(), 5);
        assert_eq!(mesh.generation(), 2);
    }

    #[test]
    fn test_release_empties_scene() {
        let mut scene = Scene::new(Rgb::from_hex(0x000000));
        scene.attach(GridBuilder::build(2));

        assert!(scene.release().is_some());
        assert!(scene.mesh().is_none());
        assert!(scene.release().is_none());
    }

    #[test]
    fn test_needs_rebuild() {
        let mut scene = Scene::new(Rgb::from_hex(0x000000));
        assert!(scene.needs_rebuild(4));

        scene.attach(GridBuilder::build(4));
        assert!(!scene.needs_rebuild(4));
        assert!(scene.needs_rebuild(5));
    }
}
