use std::fs::{self, OpenOptions};
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use crate::app::App;
use crate::audio::{AudioLoader, HttpFetcher, SinkFactory};
use crate::config;
use crate::playlist::Playlist;
use crate::resolve::HttpResolver;
use crate::store::{BlobStore, FileStore, MemoryStore};
use crate::track::{AudioUrls, TrackContext};

/// Send log records to `tubeloop.log` in the data directory; the terminal
/// belongs to the UI. `RUST_LOG` overrides `log.level`.
pub fn init_logging(settings: &config::Settings, data_dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(data_dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join("tubeloop.log"))?;

    let env = env_logger::Env::default().default_filter_or(settings.log.level.as_str());
    if let Err(e) = env_logger::Builder::from_env(env)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
    {
        eprintln!("tubeloop: logging disabled: {e}");
    }
    Ok(())
}

fn open_store(settings: &config::Settings, dir: &Path) -> Result<Arc<dyn BlobStore>, Box<dyn std::error::Error>> {
    if settings.storage.in_memory {
        return Ok(Arc::new(MemoryStore::new()));
    }
    Ok(Arc::new(FileStore::open(dir)?))
}

/// Wire stores, loader, resolver and audio output together and load the saved
/// playlist. The loader is returned separately so it can be shut down last.
pub fn build_app(
    settings: &config::Settings,
    data_dir: &Path,
) -> Result<(App, Arc<AudioLoader>), Box<dyn std::error::Error>> {
    let audio_cache = open_store(settings, &data_dir.join("audio"))?;
    let state_store = open_store(settings, &data_dir.join("state"))?;

    let fetcher = Arc::new(HttpFetcher::new(&settings.service));
    let loader = Arc::new(AudioLoader::new(fetcher, audio_cache, &settings.fetch)?);
    let elements = Rc::new(SinkFactory::open_default()?);

    let ctx = TrackContext {
        loader: Arc::clone(&loader),
        resolver: Arc::new(HttpResolver::new(&settings.service)),
        elements,
        audio_urls: AudioUrls::from_settings(&settings.service),
    };

    let mut playlist = Playlist::new(ctx, state_store, settings.storage.state_key.clone());
    if let Err(e) = playlist.restore() {
        log::error!("could not restore the saved playlist: {e}");
    }

    Ok((App::new(playlist, settings.controls.clone()), loader))
}
