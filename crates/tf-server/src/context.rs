//! Application context shared by every route handler via axum state.

use std::sync::Arc;

use tf_av::{ToolRegistry, Transcoder};
use tf_core::config::Config;
use tf_db::TrackRepository;
use tf_pipeline::{IngestService, IngestSettings, ListingSettings, StreamResolver, TrackCatalog};
use tf_storage::ObjectStore;

/// Cheaply cloneable bundle of configuration and services.
///
/// The pipeline services are built once here from the capabilities passed
/// in, so handlers never assemble them per request.
#[derive(Clone)]
pub struct AppContext {
    /// Immutable configuration snapshot.
    pub config: Arc<Config>,
    pub tracks: Arc<dyn TrackRepository>,
    pub store: Arc<dyn ObjectStore>,
    /// Discovered external tools.
    pub tools: Arc<ToolRegistry>,
    pub ingest: IngestService,
    pub resolver: StreamResolver,
    pub catalog: TrackCatalog,
}

impl AppContext {
    pub fn new(
        config: Config,
        tracks: Arc<dyn TrackRepository>,
        store: Arc<dyn ObjectStore>,
        transcoder: Arc<dyn Transcoder>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        let ingest = IngestService::new(
            tracks.clone(),
            store.clone(),
            transcoder,
            IngestSettings::from(&config),
        );
        let resolver = StreamResolver::new(tracks.clone(), store.clone());
        let catalog = TrackCatalog::new(tracks.clone(), ListingSettings::from(&config.listing));

        Self {
            config: Arc::new(config),
            tracks,
            store,
            tools,
            ingest,
            resolver,
            catalog,
        }
    }
}
