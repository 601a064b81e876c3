//! Plotmap core: pure state machine, input classification and view-model helpers.
mod bounds;
mod classify;
mod effect;
mod error;
mod geo;
mod msg;
mod notify;
mod result;
mod slots;
mod state;
mod update;
mod upload;
mod view_model;

pub use bounds::BoundsController;
pub use classify::{
    classify, content_type_for_name, kind_for_name, ClassifyOutcome, FileKind,
    ACCEPTED_EXTENSIONS,
};
pub use effect::Effect;
pub use error::{AnalysisError, ValidationError};
pub use geo::{BoundingBox, BoundsError, LatLng};
pub use msg::Msg;
pub use notify::{Notification, NotificationLevel};
pub use result::{is_svg_resource, AnalysisResponse, AnalysisResult};
pub use slots::{InputFile, InputSlots, Submission};
pub use state::AppState;
pub use update::update;
pub use upload::{percent_complete, RequestId, UploadState};
pub use view_model::AppViewModel;

pub use geojson::FeatureCollection;
