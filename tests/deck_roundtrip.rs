use diorama::config::SessionConfig;
use diorama::frame::{
    seed_deck, ContentKind, ContentSource, FrameId, UploadKind, DEFAULT_DISPLAY_NAME,
};
use diorama::media::MediaCache;
use diorama::session::Session;
use diorama::store::{self, ContentData, DeckStore, FrameRecord, Vec3Data};
use glam::Vec3;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

fn store_config(root: &Path) -> SessionConfig {
    let mut config = SessionConfig::default();
    config.store.data_dir = root.join("store");
    config
}

fn encoded_png(width: u32, height: u32) -> Arc<[u8]> {
    let image = image::RgbaImage::from_pixel(width, height, image::Rgba([90, 30, 120, 255]));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("png encode");
    Arc::from(bytes.into_boxed_slice())
}

#[test]
fn first_run_seeds_canonical_deck_and_persists_it() {
    let dir = tempfile::tempdir().expect("temp store");
    let config = store_config(dir.path());
    {
        let session = Session::restore(&config).expect("first session");
        assert_eq!(session.frames().len(), 5);
        assert_eq!(session.active_index(), 0);
        session.flush();
    }
    let reader = DeckStore::open(&config.store.data_dir).expect("open store");
    let records = reader.load_frames().expect("load records");
    assert_eq!(records.len(), 5, "seeding writes one record per canonical frame");
}

#[test]
fn edits_survive_restart() {
    let dir = tempfile::tempdir().expect("temp store");
    let config = store_config(dir.path());
    let bytes = encoded_png(6, 3);
    let added_id;
    let added_position;
    {
        let mut session = Session::restore(&config).expect("first session");
        assert!(session.update_title(FrameId::Seed(2), "Orbit Review"));
        assert!(session.update_content(
            FrameId::Seed(3),
            ContentSource::Upload {
                file_name: "satellite.png".to_string(),
                kind: UploadKind::Image,
                bytes: bytes.clone(),
            }
        ));
        added_id = session.add_frame();
        added_position = session.frame(added_id).expect("added frame").position;
        session.flush();
    }

    let session = Session::restore(&config).expect("second session");
    assert_eq!(session.frames().len(), 6);

    let renamed = session.frame(FrameId::Seed(2)).expect("seed 2 survives");
    assert_eq!(renamed.title, "Orbit Review");

    let pictured = session.frame(FrameId::Seed(3)).expect("seed 3 survives");
    assert_eq!(pictured.content.kind, ContentKind::Image);
    assert_eq!(pictured.display_name, "satellite.png");
    assert!(
        MediaCache::is_transient(&pictured.content.locator),
        "restored payload content gets a fresh session handle"
    );
    assert_eq!(pictured.content.payload.as_deref(), Some(bytes.as_ref()));

    let added = session.frame(added_id).expect("added frame survives");
    assert!(
        added.position.abs_diff_eq(added_position, 1e-5),
        "token frame transforms are trusted from the store"
    );
    assert_eq!(
        session.frames().last().expect("deck never empty").id,
        added_id,
        "the deepest frame restores into the last slot"
    );
}

#[test]
fn rename_does_not_clobber_stored_content() {
    let dir = tempfile::tempdir().expect("temp store");
    let config = store_config(dir.path());
    let bytes = encoded_png(4, 4);
    {
        let mut session = Session::restore(&config).expect("first session");
        assert!(session.update_content(
            FrameId::Seed(1),
            ContentSource::Upload {
                file_name: "title-card.png".to_string(),
                kind: UploadKind::Image,
                bytes: bytes.clone(),
            }
        ));
        assert!(session.update_title(FrameId::Seed(1), "Welcome"));
        session.flush();
    }
    let session = Session::restore(&config).expect("second session");
    let frame = session.frame(FrameId::Seed(1)).expect("seed 1 survives");
    assert_eq!(frame.title, "Welcome");
    assert_eq!(frame.display_name, "title-card.png", "rename keeps the content label");
    assert_eq!(frame.content.payload.as_deref(), Some(bytes.as_ref()));
}

#[test]
fn stored_seed_transforms_are_recomputed() {
    let dir = tempfile::tempdir().expect("temp store");
    let config = store_config(dir.path());
    {
        let session = Session::restore(&config).expect("seed session");
        session.flush();
    }
    let store = DeckStore::open(&config.store.data_dir).expect("open store");
    let mut records = store.load_frames().expect("load records");
    let record = records
        .iter_mut()
        .find(|record| record.id == FrameId::Seed(2))
        .expect("seed 2 record");
    record.position = Vec3::new(250.0, -40.0, 33.0).into();
    record.rotation = Vec3::new(1.0, 1.0, 1.0).into();
    store.put_frame(record).expect("tampered write");
    drop(store);

    let session = Session::restore(&config).expect("restored session");
    let frame = session.frame(FrameId::Seed(2)).expect("seed 2 survives");
    let canonical = seed_deck()
        .into_iter()
        .find(|frame| frame.id == FrameId::Seed(2))
        .expect("canonical seed 2");
    assert_eq!(frame.position, canonical.position, "stored seed positions are discarded");
    assert_eq!(frame.rotation, canonical.rotation);
    assert_eq!(session.frames()[1].id, FrameId::Seed(2), "canonical depth restores the slot");
}

#[test]
fn stale_display_handles_fall_back_to_placeholder() {
    let dir = tempfile::tempdir().expect("temp store");
    let config = store_config(dir.path());
    {
        let session = Session::restore(&config).expect("seed session");
        session.flush();
    }
    let store = DeckStore::open(&config.store.data_dir).expect("open store");
    let mut records = store.load_frames().expect("load records");
    let record = records
        .iter_mut()
        .find(|record| record.id == FrameId::Seed(4))
        .expect("seed 4 record");
    record.content =
        ContentData { kind: ContentKind::Video, locator: "mem://0bsolete-handle".to_string() };
    record.display_name = "clip.mp4".to_string();
    store.put_frame(record).expect("tampered write");
    drop(store);

    let session = Session::restore(&config).expect("restored session");
    let frame = session.frame(FrameId::Seed(4)).expect("seed 4 survives");
    assert!(frame.content.is_placeholder(), "unresolvable handles degrade to the placeholder");
    assert_eq!(frame.content.kind, ContentKind::Image);
    assert_eq!(frame.display_name, DEFAULT_DISPLAY_NAME, "label resets with the content");
}

#[test]
fn missing_payload_falls_back_to_placeholder() {
    let dir = tempfile::tempdir().expect("temp store");
    let config = store_config(dir.path());
    let store = DeckStore::open(&config.store.data_dir).expect("open store");
    let record = FrameRecord {
        id: FrameId::fresh(),
        position: Vec3::new(2.0, 0.0, -5.0).into(),
        rotation: Vec3Data::default(),
        title: "Lonely".to_string(),
        content: ContentData {
            kind: ContentKind::Image,
            locator: "media/no-such-payload".to_string(),
        },
        display_name: "ghost.png".to_string(),
    };
    store.put_frame(&record).expect("write record");
    drop(store);

    let session = Session::restore(&config).expect("restore");
    assert_eq!(session.frames().len(), 1);
    let frame = &session.frames()[0];
    assert!(frame.content.is_placeholder());
    assert_eq!(frame.display_name, DEFAULT_DISPLAY_NAME);
    assert_eq!(frame.title, "Lonely", "title is untouched by content fallback");
}

#[test]
fn corrupt_records_are_skipped() {
    let dir = tempfile::tempdir().expect("temp store");
    let config = store_config(dir.path());
    {
        let session = Session::restore(&config).expect("seed session");
        session.flush();
    }
    std::fs::write(config.store.data_dir.join("frames").join("junk.json"), b"{ not json")
        .expect("write junk");

    let session = Session::restore(&config).expect("restore tolerates junk");
    assert_eq!(session.frames().len(), 5, "the readable records still load");
}

#[test]
fn external_video_round_trip() {
    let dir = tempfile::tempdir().expect("temp store");
    let config = store_config(dir.path());
    {
        let mut session = Session::restore(&config).expect("first session");
        assert!(session.update_content(
            FrameId::Seed(5),
            ContentSource::External { reference: "dQw4w9WgXcQ".to_string() }
        ));
        session.flush();
    }
    let session = Session::restore(&config).expect("second session");
    let frame = session.frame(FrameId::Seed(5)).expect("seed 5 survives");
    assert_eq!(frame.content.kind, ContentKind::ExternalVideo);
    assert_eq!(frame.content.locator, "dQw4w9WgXcQ", "external references persist verbatim");
    assert!(frame.content.payload.is_none());
    assert_eq!(frame.display_name, "External video: dQw4w9WgXcQ");
}

#[test]
fn deleting_a_frame_removes_record_and_payload() {
    let dir = tempfile::tempdir().expect("temp store");
    let config = store_config(dir.path());
    {
        let mut session = Session::restore(&config).expect("first session");
        assert!(session.update_content(
            FrameId::Seed(5),
            ContentSource::Upload {
                file_name: "art.png".to_string(),
                kind: UploadKind::Image,
                bytes: encoded_png(2, 2),
            }
        ));
        session.flush();
        assert!(session.remove_frame(FrameId::Seed(5)));
        session.flush();
    }
    let reader = DeckStore::open(&config.store.data_dir).expect("open store");
    let records = reader.load_frames().expect("load records");
    assert_eq!(records.len(), 4);
    assert!(records.iter().all(|record| record.id != FrameId::Seed(5)));
    assert!(
        !reader.media_exists(&store::frame_media_key(FrameId::Seed(5))),
        "payload files go with their record"
    );

    let session = Session::restore(&config).expect("second session");
    assert_eq!(session.frames().len(), 4);
}

#[test]
fn reset_discards_stored_edits() {
    let dir = tempfile::tempdir().expect("temp store");
    let config = store_config(dir.path());
    {
        let mut session = Session::restore(&config).expect("first session");
        session.add_frame();
        assert!(session.update_title(FrameId::Seed(1), "Edited"));
        session.flush();
    }
    {
        let session = Session::reset(&config).expect("reset session");
        assert_eq!(session.frames().len(), 5);
        assert_eq!(session.frame(FrameId::Seed(1)).expect("seed 1").title, "Slide 1");
        session.flush();
    }
    let reader = DeckStore::open(&config.store.data_dir).expect("open store");
    assert_eq!(reader.load_frames().expect("load records").len(), 5, "reset drops the extra record");
}

#[test]
fn ambient_settings_round_trip() {
    let dir = tempfile::tempdir().expect("temp store");
    let config = store_config(dir.path());
    let bytes = encoded_png(8, 2);
    let logo_id;
    let phase;
    let angular_speed;
    {
        let mut session = Session::restore(&config).expect("first session");
        session.set_logo_distance(80.0);
        logo_id = session.add_logo(ContentSource::Upload {
            file_name: "logo.png".to_string(),
            kind: UploadKind::Image,
            bytes: bytes.clone(),
        });
        let logo = session.ambient().logo(logo_id).expect("logo exists");
        assert_eq!(logo.aspect_ratio, Some(4.0), "aspect comes from the payload header");
        phase = logo.phase;
        angular_speed = logo.angular_speed;
        session.flush();
    }

    let session = Session::restore(&config).expect("second session");
    assert_eq!(session.ambient().logo_distance, 80.0);
    let logo = session.ambient().logo(logo_id).expect("logo survives");
    assert_eq!(logo.phase, phase, "orbital phase survives restarts");
    assert_eq!(logo.angular_speed, angular_speed);
    assert_eq!(logo.aspect_ratio, Some(4.0));
    assert_eq!(logo.content.payload.as_deref(), Some(bytes.as_ref()));
    assert!(MediaCache::is_transient(&logo.content.locator));
}

#[test]
fn removing_a_logo_persists() {
    let dir = tempfile::tempdir().expect("temp store");
    let config = store_config(dir.path());
    let logo_id;
    {
        let mut session = Session::restore(&config).expect("first session");
        logo_id = session.add_logo(ContentSource::Upload {
            file_name: "logo.png".to_string(),
            kind: UploadKind::Image,
            bytes: encoded_png(3, 3),
        });
        session.flush();
        assert!(session.remove_logo(logo_id));
        session.flush();
    }
    let reader = DeckStore::open(&config.store.data_dir).expect("open store");
    assert!(
        !reader.media_exists(&store::logo_media_key(logo_id)),
        "logo payload removed with the logo"
    );
    let session = Session::restore(&config).expect("second session");
    assert!(session.ambient().logos.is_empty());
}
