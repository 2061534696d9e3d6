mod map;
mod timer;
mod toast;

pub use self::map::{Map, MapOperation};
pub use self::timer::{Timer, TimerId, TimerOperation, TimerOutput};
pub use self::toast::{Toast, ToastOperation};

pub use crux_core::render::Render;
pub use crux_http::Http;

use crate::app::App;
use crate::event::Event;

pub type AppHttp = Http<Event>;
pub type AppRender = Render<Event>;
pub type AppMap = Map<Event>;
pub type AppTimer = Timer<Event>;
pub type AppToast = Toast<Event>;

#[derive(crux_core::macros::Effect)]
#[effect(app = "App")]
pub struct Capabilities {
    pub render: Render<Event>,
    pub http: Http<Event>,
    pub map: Map<Event>,
    pub timer: Timer<Event>,
    pub toast: Toast<Event>,
}
