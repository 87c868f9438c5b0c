use std::fmt::Write;

use darkroom_core::{GalleryViewModel, PhotoRowView, PhotoState};

/// Renders the gallery as terminal text: one status line, one line per
/// photo row.
pub(crate) fn render(view: &GalleryViewModel) -> String {
    let mut out = String::new();
    match &view.notice {
        Some(notice) => {
            let _ = writeln!(out, "Photos: {} | {notice}", view.photo_count);
        }
        None if !view.listing_loaded => {
            let _ = writeln!(out, "Loading photo listing...");
        }
        None => {
            let _ = writeln!(out, "Photos: {}", view.photo_count);
        }
    }
    for row in &view.rows {
        out.push_str(&render_row(row));
    }
    out
}

fn render_row(row: &PhotoRowView) -> String {
    let marker = if row.busy { "*" } else { " " };
    let detail = match row.state {
        PhotoState::New => "queued".to_string(),
        PhotoState::Downloaded => "fetched".to_string(),
        PhotoState::Filtered => match &row.image {
            Some(image) => format!("filtered, {} bytes", image.len()),
            None => "filtered".to_string(),
        },
        PhotoState::Failed => "failed".to_string(),
    };
    format!("{marker} [{:>3}] {:<24} {detail}\n", row.id, row.text)
}
