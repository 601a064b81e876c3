//! Plotmap engine: network IO, map-side resources and effect execution.
mod bitmap;
mod download;
mod engine;
mod fetch;
mod formats;
mod map;
mod overlay;
mod types;
mod upload;
mod vector;

pub use bitmap::{BitmapError, BitmapHandle, BitmapId, BitmapStore, MemoryBitmapStore, TempDirBitmapStore};
pub use download::{download_overlay, ensure_output_dir, write_atomically, DOWNLOAD_FILENAME};
pub use engine::EngineHandle;
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use formats::{register_overlay_formats, OverlayFormat, OverlayFormats};
pub use map::{HeadlessMap, LayerId, MapLayer, MapSurface, PolygonLayer, PolygonStyle};
pub use overlay::{Generation, OverlayError, OverlayManager, OverlayOutcome, OverlayStatus, OverlayTicket};
pub use types::{
    DownloadError, EngineEvent, FailureKind, FetchError, FetchMetadata, FetchOutput, PersistError,
    UploadError, UploadProgress,
};
pub use upload::{
    upload_endpoint, ChannelProgressSink, ProgressSink, ReqwestUploader, UploadSettings, Uploader,
    PLOT_FILES_FIELD, SAMPLE_FILE_FIELD,
};
pub use vector::{feature_label, polygon_layers, point_in_polygon, VectorLayerRenderer, FALLBACK_LABEL};
