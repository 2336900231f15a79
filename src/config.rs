use crate::domain::Domain;
use crate::scores::ScoreSource;
use crate::view::Thickness;
use std::path::PathBuf;

/// Configuration for the interactive roots view
#[derive(Clone)]
pub struct GrowConfig {
    pub frame_time: f32,
    pub seed: Option<u64>,
    pub base_hue: f32,
    pub thickness: Thickness,
    pub source: ScoreSource,
    pub snapshot_dir: PathBuf,
}

/// Configuration for headless rendering to a PNG
#[derive(Clone)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub frames: u32,
    pub seed: Option<u64>,
    pub base_hue: f32,
    pub thickness: Thickness,
    /// Meditations applied before the tree is grown
    pub meditations: u32,
    /// Domain growths applied, one per frame, once the trunk has seeded
    pub grow: Vec<Domain>,
    pub source: ScoreSource,
    pub out: PathBuf,
}
