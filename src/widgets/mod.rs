pub mod resize_handle;

pub use resize_handle::{Corner, HANDLE_RADIUS, corner_at, draw_handles, resize_from_corner};
