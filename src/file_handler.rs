use std::collections::HashSet;

use eframe::egui;
use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};

use crate::media::{IMAGE_MIME_TYPES, IncomingFile, VIDEO_MIME_TYPES, mime_from_name};

/// Extensions offered by the file picker
pub const PICKER_EXTENSIONS: [&str; 10] = ["png", "jpg", "jpeg", "gif", "webp", "mp4", "m4v", "webm", "mov", "qt"];

/// Accepted types as shown in the upload popup
pub fn accepted_types_label() -> String {
    IMAGE_MIME_TYPES
        .iter()
        .chain(VIDEO_MIME_TYPES.iter())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

/// Collects files from drag-and-drop and from the file picker.
///
/// The picker runs asynchronously on the web, so picked files arrive over a
/// channel and are drained once per frame together with dropped files.
pub struct FileHandler {
    sender: UnboundedSender<IncomingFile>,
    receiver: UnboundedReceiver<IncomingFile>,
}

impl Default for FileHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl FileHandler {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// Handle for queueing files from elsewhere (e.g. a picker future)
    pub fn sender(&self) -> UnboundedSender<IncomingFile> {
        self.sender.clone()
    }

    /// Files that arrived since the last call: this frame's drops first,
    /// then anything the picker delivered.
    pub fn take_incoming(&mut self, ctx: &egui::Context) -> Vec<IncomingFile> {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let mut seen = HashSet::new();
        let mut files: Vec<IncomingFile> = dropped
            .iter()
            .filter(|file| seen.insert(drop_key(file)))
            .filter_map(read_dropped)
            .collect();
        while let Ok(file) = self.receiver.try_recv() {
            files.push(file);
        }
        files
    }

    /// Open the system file picker. The chosen file shows up in
    /// [`FileHandler::take_incoming`] on a later frame.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn open_picker(&self, ctx: &egui::Context) {
        let dialog = rfd::FileDialog::new()
            .set_title("Upload image or video")
            .add_filter("Images and videos", &PICKER_EXTENSIONS);
        let Some(path) = dialog.pick_file() else {
            log::debug!("Upload cancelled");
            return;
        };
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        match std::fs::read(&path) {
            Ok(bytes) => {
                log::info!("Picked {} ({} bytes)", path.display(), bytes.len());
                let _ = self.sender.unbounded_send(IncomingFile::new(name, "", bytes));
                ctx.request_repaint();
            }
            Err(err) => log::error!("Failed to read {}: {}", path.display(), err),
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn open_picker(&self, ctx: &egui::Context) {
        let sender = self.sender.clone();
        let ctx = ctx.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let picked = rfd::AsyncFileDialog::new()
                .set_title("Upload image or video")
                .add_filter("Images and videos", &PICKER_EXTENSIONS)
                .pick_file()
                .await;
            let Some(handle) = picked else {
                log::debug!("Upload cancelled");
                return;
            };
            let name = handle.file_name();
            let bytes = handle.read().await;
            log::info!("Picked {} ({} bytes)", name, bytes.len());
            let _ = sender.unbounded_send(IncomingFile::new(name, "", bytes));
            ctx.request_repaint();
        });
    }

    /// Dim the window while files hover over it
    pub fn preview_files_being_dropped(&self, ctx: &egui::Context) {
        use egui::{Align2, Color32, FontId, Id, LayerId, Order};

        let names = ctx.input(|i| {
            i.raw
                .hovered_files
                .iter()
                .map(|file| match &file.path {
                    Some(path) => path.display().to_string(),
                    None if !file.mime.is_empty() => file.mime.clone(),
                    None => "(unnamed file)".to_owned(),
                })
                .collect::<Vec<_>>()
        });
        if names.is_empty() {
            return;
        }

        let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));
        let screen_rect = ctx.screen_rect();
        painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
        painter.text(
            screen_rect.center(),
            Align2::CENTER_CENTER,
            format!("Drop to add to the board:\n{}", names.join("\n")),
            FontId::proportional(20.0),
            Color32::WHITE,
        );
    }
}

/// Identity of a dropped file within one drop
fn drop_key(file: &egui::DroppedFile) -> String {
    match &file.path {
        Some(path) => path.display().to_string(),
        None => file.name.clone(),
    }
}

/// Bytes of a dropped file. Native drops carry a path, web drops carry bytes.
fn read_dropped(file: &egui::DroppedFile) -> Option<IncomingFile> {
    let name = match (&file.path, file.name.is_empty()) {
        (Some(path), _) => path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        (None, false) => file.name.clone(),
        (None, true) => "unknown".to_owned(),
    };
    let mime = if file.mime.is_empty() {
        mime_from_name(&name).unwrap_or_default().to_owned()
    } else {
        file.mime.clone()
    };

    if let Some(bytes) = &file.bytes {
        log::info!("Dropped {} ({} bytes)", name, bytes.len());
        return Some(IncomingFile::new(name, mime, bytes.to_vec()));
    }

    // The web has no filesystem to read a path from
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Some(path) = &file.path {
            return match std::fs::read(path) {
                Ok(bytes) => {
                    log::info!("Dropped {} ({} bytes)", path.display(), bytes.len());
                    Some(IncomingFile::new(name, mime, bytes))
                }
                Err(err) => {
                    log::error!("Failed to read dropped file {}: {}", path.display(), err);
                    None
                }
            };
        }
    }

    log::warn!("Dropped file has no accessible data: {}", name);
    None
}
