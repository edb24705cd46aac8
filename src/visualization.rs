//! Optional visualization and recording bridge.
//!
//! A bridge mirrors the world for an external viewer on its own thread. The
//! environment holds [`render_lock`](VisualizationBridge::render_lock) around
//! every integration substep, so the viewer only ever reads a world between
//! two completed substeps. Nothing here changes simulation results.

use std::sync::Mutex;

use crate::core::Result;

pub trait VisualizationBridge: Send {
    /// Start the viewer server.
    fn launch(&mut self) -> Result<()>;

    /// Point the viewer camera at the named object.
    fn focus_on(&mut self, object_name: &str);

    /// Lock shared with the render thread.
    fn render_lock(&self) -> &Mutex<()>;

    /// Stop rendering without touching the physics.
    fn hibernate(&mut self);

    fn wakeup(&mut self);

    fn start_recording_video(&mut self, name: &str);

    fn stop_recording_video(&mut self);

    /// Shut the server down. Called at most once.
    fn kill(&mut self);
}
