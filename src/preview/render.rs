use gtk4 as gtk;

use gtk4::prelude::*;
use image::RgbaImage;
use log::debug;

use super::layer::PreviewLayer;

/// Convert an RGBA frame to a GDK Pixbuf
pub fn frame_to_pixbuf(frame: &RgbaImage) -> gtk::gdk_pixbuf::Pixbuf {
    let width = frame.width() as i32;
    let height = frame.height() as i32;
    let stride = width * 4; // RGBA = 4 bytes per pixel

    let bytes = gtk::glib::Bytes::from(frame.as_raw().as_slice());

    gtk::gdk_pixbuf::Pixbuf::from_bytes(
        &bytes,
        gtk::gdk_pixbuf::Colorspace::Rgb,
        true, // has_alpha
        8,    // bits_per_sample
        width,
        height,
        stride,
    )
}

/// Paint the latest frame into the layer using its gravity.
///
/// Without a frame only the background is painted.
pub fn draw_preview(cr: &gtk::cairo::Context, layer: &PreviewLayer, frame: Option<&RgbaImage>) {
    let bounds = layer.bounds;

    cr.set_source_rgb(0.0, 0.0, 0.0);
    if let Err(e) = cr.paint() {
        debug!("Failed to paint preview background: {}", e);
        return;
    }

    let Some(frame) = frame else {
        return;
    };
    if frame.width() == 0 || frame.height() == 0 {
        return;
    }

    let displayed = layer.stream_rotation.apply(frame);
    let pixbuf = frame_to_pixbuf(&displayed);
    let content = layer.content_rect();

    if cr.save().is_err() {
        return;
    }
    cr.rectangle(bounds.x, bounds.y, bounds.width, bounds.height);
    cr.clip();
    cr.translate(content.x, content.y);
    cr.scale(
        content.width / pixbuf.width() as f64,
        content.height / pixbuf.height() as f64,
    );
    cr.set_source_pixbuf(&pixbuf, 0.0, 0.0);
    if let Err(e) = cr.paint() {
        debug!("Failed to paint preview frame: {}", e);
    }
    let _ = cr.restore();
}
