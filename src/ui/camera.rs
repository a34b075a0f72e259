use gtk4 as gtk;
use libadwaita as adw;

use adw::prelude::*;
use gtk::{Align, DrawingArea, Orientation};
use std::cell::RefCell;
use std::rc::Rc;

use crate::app::AppState;
use crate::preview::draw_preview;

#[derive(Clone)]
pub struct CameraComponents {
    pub page: adw::NavigationPage,
    pub drawing_area: DrawingArea,
    pub status_page: adw::StatusPage,
    pub capture_btn: gtk::Button,
    pub close_btn: gtk::Button,
}

pub fn create_camera_page(state: &Rc<RefCell<AppState>>) -> CameraComponents {
    let drawing_area = DrawingArea::builder().hexpand(true).vexpand(true).build();
    setup_draw_function(&drawing_area, state);

    let status_page = adw::StatusPage::builder()
        .icon_name("camera-disabled-symbolic")
        .title("No Camera Available")
        .visible(false)
        .build();

    let capture_btn = gtk::Button::builder()
        .icon_name("camera-photo-symbolic")
        .tooltip_text("Take Photo")
        .width_request(60)
        .height_request(60)
        .halign(Align::Center)
        .valign(Align::End)
        .margin_bottom(16)
        .build();
    capture_btn.add_css_class("circular");
    capture_btn.add_css_class("osd");

    let overlay = gtk::Overlay::builder().child(&drawing_area).build();
    overlay.add_overlay(&status_page);
    overlay.add_overlay(&capture_btn);

    let close_btn = gtk::Button::builder()
        .icon_name("window-close-symbolic")
        .tooltip_text("Close")
        .build();

    let header_bar = adw::HeaderBar::builder().show_back_button(false).build();
    header_bar.pack_end(&close_btn);

    let content = gtk::Box::builder()
        .orientation(Orientation::Vertical)
        .build();
    content.append(&header_bar);
    content.append(&overlay);

    let page = adw::NavigationPage::builder()
        .title("Camera")
        .tag("camera")
        .child(&content)
        .build();

    CameraComponents {
        page,
        drawing_area,
        status_page,
        capture_btn,
        close_btn,
    }
}

/// Reflect the session state: a status page while the camera starts or when
/// it could not be set up, and a capture button that only works while
/// the camera is live and idle.
pub fn update_session_status(state: &Rc<RefCell<AppState>>, components: &CameraComponents) {
    let Ok(s) = state.try_borrow() else {
        return;
    };
    let Some(camera) = s.camera.as_ref() else {
        return;
    };

    let status = &components.status_page;
    match camera.setup_error() {
        Some(e) => {
            status.set_icon_name(Some("camera-disabled-symbolic"));
            status.set_title("No Camera Available");
            status.set_description(Some(&e.to_string()));
            status.set_visible(true);
        }
        None if camera.is_starting() => {
            status.set_icon_name(Some("camera-web-symbolic"));
            status.set_title("Starting Camera");
            status.set_description(None);
            status.set_visible(true);
        }
        None => status.set_visible(false),
    }
    components
        .capture_btn
        .set_sensitive(camera.is_live() && !camera.is_capturing());
}

fn setup_draw_function(drawing_area: &DrawingArea, state: &Rc<RefCell<AppState>>) {
    drawing_area.set_draw_func({
        let state = state.clone();
        move |_, cr, width, height| {
            let Ok(mut s) = state.try_borrow_mut() else {
                return;
            };
            let Some(camera) = s.camera.as_mut() else {
                return;
            };

            camera.set_viewport(width as f64, height as f64);
            let frame = camera.latest_frame();
            draw_preview(cr, camera.preview(), frame.as_deref());
        }
    });
}
