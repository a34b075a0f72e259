use gtk::glib;
use gtk4 as gtk;
use libadwaita as adw;
use log::debug;

use adw::prelude::*;
use gtk::EventControllerKey;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::app::{Action, AppState};
use crate::capture::DeviceProvider;
use crate::library::PhotoLibrary;
use crate::ui::camera::{update_session_status, CameraComponents};
use crate::ui::landing::LandingComponents;

pub struct UiComponents {
    pub window: adw::ApplicationWindow,
    pub navigation: adw::NavigationView,
    pub landing: LandingComponents,
    pub camera: CameraComponents,
    /// Collaborators handed to every camera screen
    pub provider: Arc<dyn DeviceProvider>,
    pub library: Rc<dyn PhotoLibrary>,
    /// Preview refresh source while the camera screen is showing
    pub refresh: Rc<RefCell<Option<glib::SourceId>>>,
}

pub fn connect_all_handlers(state: &Rc<RefCell<AppState>>, components: &Rc<UiComponents>) {
    connect_open_camera_handler(state, components);
    connect_capture_handler(state, components);
    connect_close_handler(components);
    connect_dismiss_handler(state, components);
    connect_key_handler(state, components);
}

pub fn open_camera(state: &Rc<RefCell<AppState>>, components: &UiComponents) {
    let presented = state
        .borrow_mut()
        .present_camera(components.provider.clone(), components.library.clone());
    if !presented {
        return;
    }

    update_session_status(state, &components.camera);
    components.navigation.push(&components.camera.page);
    start_refresh(state, components);
}

fn start_refresh(state: &Rc<RefCell<AppState>>, components: &UiComponents) {
    let interval = state.borrow().config.frame_interval;

    let source = glib::timeout_add_local(interval, {
        let state = state.clone();
        let camera_components = components.camera.clone();
        move || {
            if let Ok(mut s) = state.try_borrow_mut() {
                if let Some(camera) = s.camera.as_mut() {
                    camera.tick();
                }
            }
            update_session_status(&state, &camera_components);
            camera_components.drawing_area.queue_draw();
            glib::ControlFlow::Continue
        }
    });

    if let Some(previous) = components.refresh.borrow_mut().replace(source) {
        previous.remove();
    }
}

pub fn connect_open_camera_handler(state: &Rc<RefCell<AppState>>, components: &Rc<UiComponents>) {
    components.landing.camera_btn.connect_clicked({
        let state = state.clone();
        let components = Rc::downgrade(components);
        move |_| {
            if let Some(components) = components.upgrade() {
                open_camera(&state, &components);
            }
        }
    });
}

pub fn connect_capture_handler(state: &Rc<RefCell<AppState>>, components: &UiComponents) {
    components.camera.capture_btn.connect_clicked({
        let state = state.clone();
        move |_| {
            let mut s = state.borrow_mut();
            if let Some(camera) = s.camera.as_mut() {
                if let Err(e) = camera.capture() {
                    debug!("Capture not started: {}", e);
                }
            }
        }
    });
}

pub fn connect_close_handler(components: &UiComponents) {
    components.camera.close_btn.connect_clicked({
        let navigation = components.navigation.clone();
        move |_| {
            navigation.pop();
        }
    });
}

/// Tear the session down however the camera page goes away (close button,
/// Escape or back navigation).
pub fn connect_dismiss_handler(state: &Rc<RefCell<AppState>>, components: &UiComponents) {
    components.camera.page.connect_hidden({
        let state = state.clone();
        let refresh = components.refresh.clone();
        move |_| {
            if let Some(source) = refresh.borrow_mut().take() {
                source.remove();
            }
            state.borrow_mut().dismiss_camera();
        }
    });
}

pub fn connect_key_handler(state: &Rc<RefCell<AppState>>, components: &Rc<UiComponents>) {
    let key_controller = EventControllerKey::new();

    key_controller.connect_key_pressed({
        let state = state.clone();
        let components = Rc::downgrade(components);
        move |_, key, _, modifiers| {
            let Some(components) = components.upgrade() else {
                return glib::Propagation::Proceed;
            };

            let (action, presented) = {
                let s = state.borrow();
                (s.shortcuts.get_action(key, modifiers), s.is_camera_presented())
            };

            match (action, presented) {
                (Some(Action::OpenCamera), false) => open_camera(&state, &components),
                (Some(Action::Capture), true) => components.camera.capture_btn.emit_clicked(),
                (Some(Action::Close), true) => {
                    components.navigation.pop();
                }
                _ => return glib::Propagation::Proceed,
            }
            glib::Propagation::Stop
        }
    });

    components.window.add_controller(key_controller);
}
