//! Fakes shared by the unit tests.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::audio::{AudioLoader, Blob, ElementFactory, Fetcher, MediaElement};
use crate::config::FetchSettings;
use crate::error::{FetchError, MediaError, ResolveError};
use crate::resolve::{Resolver, VideoRecord};
use crate::store::MemoryStore;
use crate::track::{AudioUrls, TrackContext, VideoMetadata};

/// A resolution answer for `id`: five minutes long, fully populated.
pub fn record(id: &str) -> VideoRecord {
    VideoRecord {
        id: id.to_string(),
        url: format!("https://www.youtube.com/watch?v={id}"),
        audio: format!("https://svc.example/api/audio/{id}"),
        thumb: format!("https://i.ytimg.com/vi/{id}/1.jpg"),
        title: format!("Title of {id}"),
        duration: "00:05:00".to_string(),
        author: Some("Author".to_string()),
        description: Some("Description".to_string()),
    }
}

pub fn metadata(id: &str) -> VideoMetadata {
    VideoMetadata::from_record(record(id)).unwrap()
}

/// Poll `check` until it holds or five seconds pass.
pub fn eventually(mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    check()
}

/// Blocks keyed calls until the test opens their gate.
#[derive(Default)]
struct Gates {
    gates: Mutex<HashMap<String, Receiver<()>>>,
}

impl Gates {
    fn gate(&self, key: &str) -> Sender<()> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut g) = self.gates.lock() {
            g.insert(key.to_string(), rx);
        }
        tx
    }

    fn wait(&self, key: &str) {
        let rx = self.gates.lock().ok().and_then(|mut g| g.remove(key));
        if let Some(rx) = rx {
            let _ = rx.recv();
        }
    }
}

/// Serves `url.as_bytes()` for every URL, optionally gated or failing.
#[derive(Default)]
pub struct ScriptedFetcher {
    gates: Gates,
    failing: Mutex<HashSet<String>>,
    pub log: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Hold `url` until the returned sender fires (or is dropped).
    pub fn gate(&self, url: &str) -> Sender<()> {
        self.gates.gate(url)
    }

    pub fn fail(&self, url: &str) {
        if let Ok(mut f) = self.failing.lock() {
            f.insert(url.to_string());
        }
    }

    /// URLs whose fetch finished, in completion order.
    pub fn completed(&self) -> Vec<String> {
        self.log.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl Fetcher for ScriptedFetcher {
    fn fetch(&self, url: &str) -> Result<Blob, FetchError> {
        self.gates.wait(url);
        if let Ok(mut l) = self.log.lock() {
            l.push(url.to_string());
        }
        let fails = self.failing.lock().map(|f| f.contains(url)).unwrap_or(false);
        if fails {
            return Err(FetchError::Http("503 Service Unavailable".to_string()));
        }
        Ok(Blob::from(url.as_bytes()))
    }
}

/// Answers with [`record`] unless told otherwise, optionally gated per id.
#[derive(Default)]
pub struct ScriptedResolver {
    gates: Gates,
    answers: Mutex<HashMap<String, Result<VideoRecord, ResolveError>>>,
    pub calls: Mutex<Vec<String>>,
}

impl ScriptedResolver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn gate(&self, id: &str) -> Sender<()> {
        self.gates.gate(id)
    }

    pub fn answer(&self, id: &str, answer: Result<VideoRecord, ResolveError>) {
        if let Ok(mut a) = self.answers.lock() {
            a.insert(id.to_string(), answer);
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl Resolver for ScriptedResolver {
    fn resolve(&self, id: &str) -> Result<VideoRecord, ResolveError> {
        if let Ok(mut c) = self.calls.lock() {
            c.push(id.to_string());
        }
        self.gates.wait(id);
        self.answers
            .lock()
            .ok()
            .and_then(|a| a.get(id).cloned())
            .unwrap_or_else(|| Ok(record(id)))
    }
}

#[derive(Debug)]
pub struct FakeState {
    pub position: f64,
    pub length: f64,
    pub paused: bool,
    pub ended: bool,
    pub bound: Option<usize>,
    pub volume: f32,
    pub plays: usize,
}

pub type FakeHandle = Rc<RefCell<FakeState>>;

/// A media element whose clock only moves when the test says so.
pub struct FakeElement(FakeHandle);

impl FakeElement {
    /// Simulate playback having advanced to `pos`.
    pub fn advance_to(handle: &FakeHandle, pos: f64) {
        let mut st = handle.borrow_mut();
        st.position = pos.min(st.length);
        if st.position >= st.length && !st.paused {
            st.ended = true;
            st.paused = true;
        }
    }
}

impl MediaElement for FakeElement {
    fn bind(&mut self, blob: Blob) -> Result<(), MediaError> {
        if blob.is_empty() {
            return Err(MediaError::Decode("empty".to_string()));
        }
        let mut st = self.0.borrow_mut();
        st.bound = Some(blob.len());
        st.paused = true;
        Ok(())
    }

    fn play(&mut self) {
        let mut st = self.0.borrow_mut();
        if st.bound.is_none() {
            return;
        }
        if st.ended {
            st.position = 0.0;
            st.ended = false;
        }
        st.paused = false;
        st.plays += 1;
    }

    fn pause(&mut self) {
        self.0.borrow_mut().paused = true;
    }

    fn is_paused(&self) -> bool {
        self.0.borrow().paused
    }

    fn seek(&mut self, secs: f64) {
        let mut st = self.0.borrow_mut();
        st.position = secs.clamp(0.0, st.length);
        if st.position >= st.length {
            if !st.paused {
                st.ended = true;
                st.paused = true;
            }
        } else {
            st.ended = false;
        }
    }

    fn position(&self) -> f64 {
        self.0.borrow().position
    }

    fn set_volume(&mut self, volume: f32) {
        self.0.borrow_mut().volume = volume;
    }

    fn ended(&self) -> bool {
        self.0.borrow().ended
    }
}

/// Hands out [`FakeElement`]s and remembers their handles in creation order.
#[derive(Default)]
pub struct FakeFactory {
    pub created: RefCell<Vec<FakeHandle>>,
}

impl FakeFactory {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn handle(&self, i: usize) -> FakeHandle {
        Rc::clone(&self.created.borrow()[i])
    }

    pub fn last(&self) -> FakeHandle {
        let created = self.created.borrow();
        Rc::clone(&created[created.len() - 1])
    }
}

impl ElementFactory for FakeFactory {
    fn create(&self, length: f64) -> Box<dyn MediaElement> {
        let handle = Rc::new(RefCell::new(FakeState {
            position: 0.0,
            length,
            paused: true,
            ended: false,
            bound: None,
            volume: 1.0,
            plays: 0,
        }));
        self.created.borrow_mut().push(Rc::clone(&handle));
        Box::new(FakeElement(handle))
    }
}

/// Everything a track needs, wired to fakes.
pub struct Rig {
    pub fetcher: Arc<ScriptedFetcher>,
    pub resolver: Arc<ScriptedResolver>,
    pub factory: Rc<FakeFactory>,
    pub ctx: TrackContext,
}

impl Rig {
    pub fn new() -> Self {
        let fetcher = ScriptedFetcher::new();
        let resolver = ScriptedResolver::new();
        let factory = FakeFactory::new();
        let settings = FetchSettings {
            stall_timeout_ms: 0,
            cache_audio: true,
        };
        let loader = AudioLoader::new(fetcher.clone(), Arc::new(MemoryStore::new()), &settings).unwrap();
        let ctx = TrackContext {
            loader: Arc::new(loader),
            resolver: resolver.clone(),
            elements: factory.clone(),
            audio_urls: AudioUrls {
                base: "https://svc.example/api/audio".to_string(),
                legacy_prefixes: vec!["https://old.example/audio".to_string()],
            },
        };
        Self {
            fetcher,
            resolver,
            factory,
            ctx,
        }
    }
}
