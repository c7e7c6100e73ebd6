use kiln::graphics::{Camera, MeshHandle, RenderStats, TextureHandle, Viewport};
use kiln::types::{Rectangle, Vector3};
use std::time::Instant;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub position: Vector3,
    /// Euler angles in radians.
    pub rotation: Vector3,
    pub scale: Vector3,
}

/// A submitted draw, with the view state it was submitted under.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum DrawCommand {
    Mesh {
        mesh: MeshHandle,
        transform: Transform,
        camera: Camera,
        viewport: Viewport,
    },
    Texture {
        texture: TextureHandle,
        destination: Rectangle,
        viewport: Viewport,
    },
}

/// Per-frame bookkeeping: the draw queue and its counters.
#[derive(Debug, Default)]
pub struct FrameState {
    started: Option<Instant>,
    commands: Vec<DrawCommand>,
    draw_calls: u32,
    triangles: u32,
    last: RenderStats,
    submitted: Vec<DrawCommand>,
}

impl FrameState {
    pub fn begin(&mut self) {
        self.started = Some(Instant::now());
        self.commands.clear();
        self.draw_calls = 0;
        self.triangles = 0;
    }

    pub fn in_frame(&self) -> bool {
        self.started.is_some()
    }

    pub fn push(&mut self, command: DrawCommand, triangles: u32) {
        self.commands.push(command);
        self.draw_calls += 1;
        self.triangles += triangles;
    }

    /// Closes the frame and publishes its counters.
    pub fn end(&mut self) {
        let frame_time = self
            .started
            .take()
            .map(|started| started.elapsed().as_secs_f32())
            .unwrap_or_default();

        self.last = RenderStats {
            draw_calls: self.draw_calls,
            triangles_drawn: self.triangles,
            frame_time,
            ..RenderStats::default()
        };
        self.submitted = std::mem::take(&mut self.commands);
    }

    /// Stats of the last completed frame. Resource counts are left at zero.
    pub fn last_stats(&self) -> RenderStats {
        self.last
    }

    /// Draws of the last completed frame, in submission order.
    pub fn submitted(&self) -> &[DrawCommand] {
        &self.submitted
    }

    pub fn reset(&mut self) {
        *self = FrameState::default();
    }
}
