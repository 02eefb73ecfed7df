use super::*;
use crate::testing::{FakeElement, Rig, eventually, metadata, record};
use std::cell::Cell;
use std::rc::Rc;

fn loaded_track(rig: &Rig, id: &str, settings: TrackSettings) -> Track {
    let mut track = Track::new(metadata(id), settings, &rig.ctx);
    assert!(eventually(|| {
        track.tick();
        track.loaded()
    }));
    track
}

fn counter(track: &mut Track) -> (Rc<Cell<usize>>, EndSubscription) {
    let fired = Rc::new(Cell::new(0));
    let seen = Rc::clone(&fired);
    let sub = track.on_end(move || seen.set(seen.get() + 1));
    (fired, sub)
}

#[test]
fn new_track_binds_audio_once_fetched() {
    let rig = Rig::new();
    let track = loaded_track(&rig, "dQw4w9WgXcQ", TrackSettings::full(300.0));

    let el = rig.factory.last();
    assert!(el.borrow().bound.is_some());
    assert!(el.borrow().paused);
    assert_eq!(track.length(), 300.0);
    assert_eq!(track.end_time(), 300.0);
    assert!(!track.is_playing());
}

#[test]
fn trim_updates_keep_start_below_end() {
    let rig = Rig::new();
    let mut track = Track::new(metadata("dQw4w9WgXcQ"), TrackSettings::full(300.0), &rig.ctx);

    assert!(track.set_end_time(200.0));
    assert!(track.set_start_time(199.5));
    assert!(!track.set_start_time(200.0));
    assert!(!track.set_end_time(199.5));
    assert!(!track.set_end_time(300.5));
    assert!(!track.set_start_time(-1.0));
    assert!(!track.set_start_time(f64::NAN));
    assert_eq!((track.start_time(), track.end_time()), (199.5, 200.0));

    assert!(track.set_start_time(0.0));
    assert!(track.set_end_time(300.0));
    assert_eq!((track.start_time(), track.end_time()), (0.0, 300.0));
}

#[test]
fn volume_is_percent_and_reaches_the_element() {
    let rig = Rig::new();
    let mut track = Track::new(metadata("dQw4w9WgXcQ"), TrackSettings::full(300.0), &rig.ctx);

    assert!(track.set_volume(50));
    assert_eq!(rig.factory.last().borrow().volume, 0.5);
    assert!(!track.set_volume(101));
    assert_eq!(track.volume(), 50);
}

#[test]
fn watchdog_ends_playback_at_the_trim_point() {
    let rig = Rig::new();
    let settings = TrackSettings {
        volume: 100,
        start: 0.0,
        end: 200.0,
    };
    let mut track = loaded_track(&rig, "dQw4w9WgXcQ", settings);
    let (fired, _sub) = counter(&mut track);
    let el = rig.factory.last();

    track.play();
    FakeElement::advance_to(&el, 199.0);
    assert!(!track.tick().ended);
    assert_eq!(track.position(), 199.0);
    assert_eq!(fired.get(), 0);

    FakeElement::advance_to(&el, 200.0);
    assert!(track.tick().ended);
    assert_eq!(track.position(), 300.0);
    assert_eq!(fired.get(), 1);
    assert!(!track.is_playing());

    // edge triggered
    assert!(!track.tick().ended);
    assert_eq!(fired.get(), 1);
}

#[test]
fn natural_end_fires_when_untrimmed() {
    let rig = Rig::new();
    let mut track = loaded_track(&rig, "dQw4w9WgXcQ", TrackSettings::full(300.0));
    let (fired, _sub) = counter(&mut track);

    track.play();
    FakeElement::advance_to(&rig.factory.last(), 300.0);
    track.tick();
    assert_eq!(fired.get(), 1);

    // replaying and ending again fires again
    track.play();
    assert!(track.is_playing());
    track.tick();
    FakeElement::advance_to(&rig.factory.last(), 300.0);
    track.tick();
    assert_eq!(fired.get(), 2);
}

#[test]
fn was_playing_tracks_position_past_start() {
    let rig = Rig::new();
    let settings = TrackSettings {
        volume: 100,
        start: 10.0,
        end: 300.0,
    };
    let mut track = loaded_track(&rig, "dQw4w9WgXcQ", settings);

    track.play();
    assert!(track.is_playing());
    assert!(!track.was_playing());

    FakeElement::advance_to(&rig.factory.last(), 10.5);
    assert!(track.was_playing());

    track.pause();
    assert!(!track.is_playing());
    assert!(track.was_playing());
    track.resume();
    assert!(track.is_playing());
    assert_eq!(track.position(), 10.5);
}

#[test]
fn play_before_load_starts_once_bound() {
    let rig = Rig::new();
    let meta = metadata("dQw4w9WgXcQ");
    let gate = rig.fetcher.gate(&meta.audio_url);
    let settings = TrackSettings {
        volume: 100,
        start: 30.0,
        end: 300.0,
    };
    let mut track = Track::new(meta, settings, &rig.ctx);

    track.play();
    track.tick();
    assert!(!track.loaded());
    assert!(track.is_playing());
    assert_eq!(rig.factory.last().borrow().plays, 0);

    gate.send(()).unwrap();
    assert!(eventually(|| {
        track.tick();
        track.loaded()
    }));
    let el = rig.factory.last();
    assert!(!el.borrow().paused);
    assert_eq!(el.borrow().position, 30.0);
}

#[test]
fn failed_audio_load_is_reported() {
    let rig = Rig::new();
    let meta = metadata("dQw4w9WgXcQ");
    rig.fetcher.fail(&meta.audio_url);
    let mut track = Track::new(meta, TrackSettings::full(300.0), &rig.ctx);

    assert!(eventually(|| track.tick().changed));
    assert!(!track.loaded());
    assert!(track.load_error().unwrap().contains("503"));

    assert!(track.retry_load());
    assert!(track.load_error().is_none());
    assert!(!track.retry_load());
}

#[test]
fn play_after_failed_load_does_not_report_playing() {
    let rig = Rig::new();
    let meta = metadata("dQw4w9WgXcQ");
    rig.fetcher.fail(&meta.audio_url);
    let mut track = Track::new(meta, TrackSettings::full(300.0), &rig.ctx);
    assert!(eventually(|| track.tick().changed));
    assert!(track.load_error().is_some());

    track.play();
    assert!(!track.is_playing());
    track.resume();
    assert!(!track.is_playing());
    assert!(rig.factory.last().borrow().paused);
}

#[test]
fn ended_track_restarts_inside_its_window() {
    let rig = Rig::new();
    let settings = TrackSettings {
        volume: 100,
        start: 60.0,
        end: 200.0,
    };
    let mut track = loaded_track(&rig, "dQw4w9WgXcQ", settings);
    let el = rig.factory.last();

    track.play();
    FakeElement::advance_to(&el, 200.0);
    assert!(track.tick().ended);
    assert!(!track.is_playing());
    assert!(!track.was_playing());

    track.resume();
    assert!(track.is_playing());
    assert_eq!(track.position(), 60.0);
}

#[test]
fn listeners_unsubscribe_independently() {
    let rig = Rig::new();
    let mut track = loaded_track(&rig, "dQw4w9WgXcQ", TrackSettings::full(300.0));
    let (first, sub_first) = counter(&mut track);
    let (second, _sub_second) = counter(&mut track);

    sub_first.unsubscribe();
    track.play();
    FakeElement::advance_to(&rig.factory.last(), 300.0);
    track.tick();

    assert_eq!(first.get(), 0);
    assert_eq!(second.get(), 1);
}

#[test]
fn missing_author_is_backfilled() {
    let rig = Rig::new();
    let mut meta = metadata("dQw4w9WgXcQ");
    meta.author = None;
    let mut track = Track::new(meta, TrackSettings::full(300.0), &rig.ctx);

    assert!(eventually(|| {
        track.tick();
        track.video().author.is_some()
    }));
    assert_eq!(track.video().author.as_deref(), Some("Author"));
    assert_eq!(rig.resolver.call_count(), 1);
}

#[test]
fn complete_metadata_is_not_refetched() {
    let rig = Rig::new();
    let _track = loaded_track(&rig, "dQw4w9WgXcQ", TrackSettings::full(300.0));
    assert_eq!(rig.resolver.call_count(), 0);
}

#[test]
fn prioritize_moves_the_track_audio_forward() {
    let rig = Rig::new();
    let first = metadata("aaaaaaaaaaa");
    let gate = rig.fetcher.gate(&first.audio_url);

    let _a = Track::new(first, TrackSettings::full(300.0), &rig.ctx);
    let mut b = Track::new(metadata("bbbbbbbbbbb"), TrackSettings::full(300.0), &rig.ctx);
    let mut c = Track::new(metadata("ccccccccccc"), TrackSettings::full(300.0), &rig.ctx);
    c.prioritize();
    gate.send(()).unwrap();

    assert!(eventually(|| {
        b.tick();
        c.tick();
        b.loaded() && c.loaded()
    }));
    let order: Vec<String> = rig
        .fetcher
        .completed()
        .iter()
        .map(|u| crate::audio::cache_key(u).to_string())
        .collect();
    assert_eq!(order, vec!["aaaaaaaaaaa", "ccccccccccc", "bbbbbbbbbbb"]);
}

#[test]
fn codec_round_trips_settings_and_metadata() {
    let urls = AudioUrls::default();
    let video = metadata("dQw4w9WgXcQ");
    let settings = TrackSettings {
        volume: 42,
        start: 12.5,
        end: 250.0,
    };

    let persisted = encode_parts(&video, &settings);
    let json = serde_json::to_string(&persisted).unwrap();
    let back: PersistedTrack = serde_json::from_str(&json).unwrap();

    assert_eq!(decode_parts(back, &urls).unwrap(), (video, settings));
}

#[test]
fn encoded_track_uses_saved_field_names() {
    let rig = Rig::new();
    let mut track = Track::new(metadata("dQw4w9WgXcQ"), TrackSettings::full(300.0), &rig.ctx);
    track.set_end_time(120.0);

    let value = serde_json::to_value(encode(&track)).unwrap();
    assert_eq!(value["vol"], 100.0);
    assert_eq!(value["startTime"], 0.0);
    assert_eq!(value["endTime"], 120.0);
    assert_eq!(value["video"]["_id"], "dQw4w9WgXcQ");
    assert_eq!(value["video"]["duration"], "00:05:00");

    let decoded = decode(serde_json::from_value(value).unwrap(), &rig.ctx).unwrap();
    assert_eq!(decoded.settings(), track.settings());
}

#[test]
fn decode_fills_in_fields_older_records_lack() {
    let old = r#"{"video":{"_id":"dQw4w9WgXcQ","url":"u","audio":"https://svc.example/api/audio/dQw4w9WgXcQ",
        "thumb":"t","title":"Caf\\u00e9","duration":"00:03:32"},"vol":80,"startTime":5}"#;
    let persisted: PersistedTrack = serde_json::from_str(old).unwrap();
    let (video, settings) = decode_parts(persisted, &AudioUrls::default()).unwrap();

    assert_eq!(settings.end, 212.0);
    assert_eq!(settings.start, 5.0);
    assert_eq!(settings.volume, 80);
    assert_eq!(video.title, "Café");
    assert!(video.needs_backfill());

    let bare: PersistedTrack = serde_json::from_str(
        r#"{"video":{"_id":"dQw4w9WgXcQ","audio":"a","title":"T","duration":"00:01:00"}}"#,
    )
    .unwrap();
    let (_, settings) = decode_parts(bare, &AudioUrls::default()).unwrap();
    assert_eq!(settings, TrackSettings::full(60.0));
}

#[test]
fn decode_repairs_out_of_range_values() {
    let persisted = PersistedTrack {
        video: record("dQw4w9WgXcQ"),
        vol: 250.0,
        start_time: 400.0,
        end_time: Some(900.0),
    };
    let (_, settings) = decode_parts(persisted, &AudioUrls::default()).unwrap();
    assert_eq!(settings, TrackSettings::full(300.0));
}

#[test]
fn decode_rejects_unparseable_durations() {
    let mut video = record("dQw4w9WgXcQ");
    video.duration = "3:32".to_string();
    let persisted = PersistedTrack {
        video,
        vol: 100.0,
        start_time: 0.0,
        end_time: None,
    };
    assert!(decode_parts(persisted, &AudioUrls::default()).is_err());
}

#[test]
fn decode_moves_legacy_audio_urls() {
    let rig = Rig::new();
    let mut video = record("dQw4w9WgXcQ");
    video.audio = "https://old.example/audio/dQw4w9WgXcQ".to_string();
    let persisted = PersistedTrack {
        video,
        vol: 100.0,
        start_time: 0.0,
        end_time: None,
    };

    let (video, _) = decode_parts(persisted, &rig.ctx.audio_urls).unwrap();
    assert_eq!(video.audio_url, "https://svc.example/api/audio/dQw4w9WgXcQ");

    let mut current = metadata("dQw4w9WgXcQ");
    assert!(!rig.ctx.audio_urls.migrate(&mut current));
}
