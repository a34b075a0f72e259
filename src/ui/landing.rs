use gtk4 as gtk;
use libadwaita as adw;

use adw::prelude::*;
use gtk::{Align, Orientation};

pub struct LandingComponents {
    pub page: adw::NavigationPage,
    pub camera_btn: gtk::Button,
}

pub fn create_landing_page() -> LandingComponents {
    let camera_btn = gtk::Button::builder()
        .icon_name("camera-photo-symbolic")
        .tooltip_text("Open Camera")
        .width_request(50)
        .height_request(50)
        .halign(Align::Center)
        .valign(Align::End)
        .vexpand(true)
        .margin_bottom(32)
        .build();
    camera_btn.add_css_class("circular");
    camera_btn.add_css_class("suggested-action");

    let header_bar = adw::HeaderBar::new();

    let content = gtk::Box::builder()
        .orientation(Orientation::Vertical)
        .build();
    content.append(&header_bar);
    content.append(&camera_btn);

    let page = adw::NavigationPage::builder()
        .title("Viewcam")
        .tag("landing")
        .child(&content)
        .build();

    LandingComponents { page, camera_btn }
}
