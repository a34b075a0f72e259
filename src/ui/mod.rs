pub mod camera;
pub mod handlers;
pub mod landing;

use gtk4 as gtk;
use libadwaita as adw;

use adw::prelude::*;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::app::{AppConfig, AppState};
use crate::capture::{DeviceProvider, WebcamProvider};
use crate::library::{PhotoLibrary, PicturesLibrary};

pub fn build_ui(app: &adw::Application) {
    let config = AppConfig::from_env();

    let provider: Arc<dyn DeviceProvider> = Arc::new(WebcamProvider::new(config.stream_rotation));
    let library: Rc<dyn PhotoLibrary> = Rc::new(PicturesLibrary::new(
        config.save_dir.clone(),
        config.output_format,
        config.photo.jpeg_quality,
    ));
    log::info!("Saving photos to {:?}", config.save_dir);

    app.connect_shutdown({
        let library = library.clone();
        move |_| library.flush()
    });

    let state = Rc::new(RefCell::new(AppState::new(config)));

    let landing = landing::create_landing_page();
    let camera = camera::create_camera_page(&state);

    let navigation = adw::NavigationView::new();
    navigation.add(&landing.page);

    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Viewcam")
        .content(&navigation)
        .default_width(480)
        .default_height(800)
        .build();

    let components = Rc::new(handlers::UiComponents {
        window: window.clone(),
        navigation,
        landing,
        camera,
        provider,
        library,
        refresh: Rc::new(RefCell::new(None::<gtk::glib::SourceId>)),
    });

    handlers::connect_all_handlers(&state, &components);

    window.present();
}
