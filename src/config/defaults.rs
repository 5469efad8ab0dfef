pub const DEFAULT_LAUNCHER: &str = "./zynthian_gui_emu.sh";
pub const DEFAULT_TITLE: &str = "Zynthian emuface";
pub const EMUBIN_DIR_NAME: &str = "emubin";

pub const DEFAULT_FRAME_WIDTH: u16 = 480;
pub const DEFAULT_FRAME_HEIGHT: u16 = 320;
/// X11 coordinates are 16-bit signed; stay well inside that.
pub const MAX_FRAME_DIM: u16 = 4096;

pub const DEFAULT_POLL_MS: u64 = 330;
pub const MIN_POLL_MS: u64 = 10;
pub const MAX_POLL_MS: u64 = 10_000;
