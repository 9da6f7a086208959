//! WGSL sources for the card-table pipelines.

/// Background and table shaders; both read the same `FrameUniforms` block.
pub const TABLE_SHADER: &str = include_str!("table.wgsl");

pub const VS_BACKGROUND: &str = "vs_background";
pub const FS_BACKGROUND: &str = "fs_background";
pub const VS_TABLE: &str = "vs_table";
pub const FS_TABLE: &str = "fs_table";
