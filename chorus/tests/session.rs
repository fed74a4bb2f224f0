//! End-to-end session lifecycle over a catalog-format star list.

use chorus::{AudioOut, ChorusConfig, Session, SilentAudio};
use chrono::{TimeZone, Utc};
use skymap::load_catalog;
use std::time::Duration;

// At 2022-09-08T20:00:00Z, longitude 0, the local sidereal time is
// 5.0241104258 rad. HR 9001 below sits 0.1 rad east of the meridian
// (hour angle -0.1), well inside the default approach window.
const CATALOG: &str = r#"[
    {"harvard_ref_#": 9001, "RA": "19:34:21.58", "DEC": "+28:38:52.40", "MAG": "1.00"},
    {"harvard_ref_#": 9002, "RA": "02:00:00.00", "DEC": "+10:00:00.00", "MAG": "4.50"}
]"#;

fn session(rate: f64) -> Session<SilentAudio> {
    let stars = load_catalog(CATALOG.as_bytes()).expect("catalog parses");
    let start = Utc.with_ymd_and_hms(2022, 9, 8, 20, 0, 0).unwrap();
    Session::new(
        start,
        0.0,
        0.7,
        rate,
        stars,
        SilentAudio::new(),
        ChorusConfig::default(),
    )
}

#[test]
fn tone_runs_queue_play_end() {
    let rate = 100.0;
    let mut session = session(rate);

    session.tick(Duration::ZERO, |_| {});
    assert!(session.is_queued(9001), "meridian-bound star queues a tone");
    assert!(!session.is_playing(9001));

    // the crossing lies this many audio-clock seconds ahead
    let star = session.star(9001).expect("catalog star present");
    let start = star.next_transit(session.observer(), rate) / 1000.0;
    assert!(start > 13.0 && start < 14.5, "transit about 13.75s out");

    // one queue-buffer before start the voice is built on the endpoint
    session.audio_mut().set_now(start - 0.05);
    session.tick(Duration::ZERO, |_| {});
    assert!(session.is_queued(9001));
    assert_eq!(session.audio().started.len(), 1);
    let (_, tone) = &session.audio().started[0];
    assert!(tone.frequency > 300.0, "near-zenith transit plays high in the band");
    let stop = tone.stop;

    // the start time arrives
    session.audio_mut().set_now(start + 0.01);
    session.tick(Duration::ZERO, |_| {});
    assert!(session.is_playing(9001));

    // the tone runs out naturally, with no cancellation fade
    session.audio_mut().set_now(stop + 0.1);
    session.tick(Duration::ZERO, |_| {});
    assert!(!session.is_playing(9001));
    assert!(session.audio().released.is_empty());
}

#[test]
fn relocation_cancels_queued_tone() {
    let mut session = session(100.0);
    session.tick(Duration::ZERO, |_| {});
    assert!(session.is_queued(9001));

    session.set_location(-1.3, -0.4);
    assert!(!session.is_queued(9001));
    assert!(!session.is_playing(9001));
    // no voice existed yet, so nothing needed a fade-out
    assert!(session.audio().released.is_empty());
}

#[test]
fn relocation_fades_playing_tone() {
    let rate = 100.0;
    let mut session = session(rate);
    session.tick(Duration::ZERO, |_| {});
    let start = session
        .star(9001)
        .unwrap()
        .next_transit(session.observer(), rate)
        / 1000.0;

    session.audio_mut().set_now(start - 0.05);
    session.tick(Duration::ZERO, |_| {});
    session.audio_mut().set_now(start + 0.01);
    session.tick(Duration::ZERO, |_| {});
    assert!(session.is_playing(9001));

    session.set_location(-1.3, -0.4);
    assert!(!session.is_playing(9001));
    let &(_, ramp_to, stop_at) = session
        .audio()
        .released
        .first()
        .expect("active voice released");
    let now = session.audio().now();
    assert!(ramp_to > now && stop_at > ramp_to, "ramp to silence, then stop");
}

#[test]
fn rate_change_requeues_at_new_rate() {
    let mut session = session(100.0);
    session.tick(Duration::ZERO, |_| {});
    let fast = session
        .star(9001)
        .unwrap()
        .next_transit(session.observer(), 100.0);

    session.set_rate(10.0);
    assert!(!session.is_queued(9001));

    session.tick(Duration::ZERO, |_| {});
    assert!(session.is_queued(9001));
    let slow = session
        .star(9001)
        .unwrap()
        .next_transit(session.observer(), 10.0);
    assert!((slow - fast * 10.0).abs() < 1e-6, "countdown rescales with rate");
}
