use anyhow::{anyhow, Context, Result};
use diorama::media::MediaCache;
use diorama::store::{AmbientRecord, DeckStore, FrameRecord, MEDIA_PREFIX, SETTINGS_KEY};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::Path;
use std::process;

fn main() {
    diorama::init_logging();
    if let Err(err) = run() {
        eprintln!("error: {err:?}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut args = env::args().skip(1);
    let Some(command) = args.next() else {
        print_usage();
        return Ok(());
    };
    match command.as_str() {
        "list" => {
            let store_dir = args
                .next()
                .ok_or_else(|| anyhow!("list requires a path: deck_tool list <store_dir>"))?;
            cmd_list(&store_dir)
        }
        "validate" => {
            let store_dir = args
                .next()
                .ok_or_else(|| anyhow!("validate requires a path: deck_tool validate <store_dir>"))?;
            cmd_validate(&store_dir)
        }
        "export" => {
            let store_dir = args.next().ok_or_else(|| {
                anyhow!("export requires arguments: deck_tool export <store_dir> <bundle_dir>")
            })?;
            let bundle_dir =
                args.next().ok_or_else(|| anyhow!("export missing bundle directory argument"))?;
            cmd_export(&store_dir, &bundle_dir)
        }
        "import" => {
            let store_dir = args.next().ok_or_else(|| {
                anyhow!("import requires arguments: deck_tool import <store_dir> <bundle_dir>")
            })?;
            let bundle_dir =
                args.next().ok_or_else(|| anyhow!("import missing bundle directory argument"))?;
            cmd_import(&store_dir, &bundle_dir)
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => Err(anyhow!("unknown command '{other}'")),
    }
}

fn print_usage() {
    eprintln!(
        "Deck Tool

Usage:
  deck_tool list <store_dir>               List stored frame records in display order
  deck_tool validate <store_dir>           Check records, payload files and settings
  deck_tool export <store_dir> <bundle>    Bundle records and payloads into a directory
  deck_tool import <store_dir> <bundle>    Load a bundle into a store (latest write wins)
  deck_tool help                           Show this message
"
    );
}

#[derive(Serialize, Deserialize)]
struct DeckBundle {
    frames: Vec<FrameRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    settings: Option<AmbientRecord>,
}

fn open_store(path: &str) -> Result<DeckStore> {
    DeckStore::open(path).with_context(|| format!("opening store '{path}'"))
}

fn sorted_records(store: &DeckStore) -> Result<Vec<FrameRecord>> {
    let mut records = store.load_frames()?;
    records.sort_by(|a, b| {
        b.position
            .z
            .partial_cmp(&a.position.z)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    Ok(records)
}

fn referenced_media_keys(frames: &[FrameRecord], settings: Option<&AmbientRecord>) -> Vec<String> {
    let mut keys = Vec::new();
    for record in frames {
        if DeckStore::is_media_key(&record.content.locator) {
            keys.push(record.content.locator.clone());
        }
    }
    if let Some(settings) = settings {
        for item in &settings.items {
            if DeckStore::is_media_key(&item.content.locator) {
                keys.push(item.content.locator.clone());
            }
        }
    }
    keys
}

fn cmd_list(store_dir: &str) -> Result<()> {
    let store = open_store(store_dir)?;
    let records = sorted_records(&store)?;
    if records.is_empty() {
        println!("Store '{store_dir}' holds no frame records; a session will seed the canonical deck.");
    } else {
        println!("{:<5} {:<38} {:<14} {:<16} {}", "Idx", "Frame ID", "Title", "Kind", "Locator");
        println!("{}", "-".repeat(100));
        for (index, record) in records.iter().enumerate() {
            println!(
                "{:<5} {:<38} {:<14} {:<16} {}",
                index,
                record.id.to_string(),
                record.title,
                record.content.kind.label(),
                record.content.locator
            );
        }
    }
    match store.load_settings(SETTINGS_KEY)? {
        Some(settings) => println!(
            "Ambient: {} logo(s), orbit distance {:.1}",
            settings.items.len(),
            settings.distance
        ),
        None => println!("Ambient: no settings stored (defaults apply)."),
    }
    Ok(())
}

fn cmd_validate(store_dir: &str) -> Result<()> {
    let store = open_store(store_dir)?;
    let records = store.load_frames()?;
    let settings = store.load_settings(SETTINGS_KEY)?;
    let mut issues = Vec::new();

    let mut ids = HashSet::with_capacity(records.len());
    for record in &records {
        if !ids.insert(record.id) {
            issues.push(format!("duplicate frame id '{}'", record.id));
        }
    }

    for record in &records {
        let locator = &record.content.locator;
        if MediaCache::is_transient(locator) {
            issues.push(format!(
                "frame '{}' stores stale display handle '{locator}' (sessions will substitute the placeholder)",
                record.id
            ));
        } else if DeckStore::is_media_key(locator) && !store.media_exists(locator) {
            issues.push(format!(
                "frame '{}' references missing payload '{locator}'",
                record.id
            ));
        }
    }

    let mut depths = HashSet::new();
    for record in &records {
        if !depths.insert(record.position.z.to_bits()) {
            issues.push(format!(
                "frame '{}' shares depth {:.3} with another record; restored order between them falls back to id",
                record.id, record.position.z
            ));
        }
    }

    if let Some(settings) = &settings {
        for item in &settings.items {
            let locator = &item.content.locator;
            if MediaCache::is_transient(locator) {
                issues.push(format!("logo '{}' stores stale display handle '{locator}'", item.id));
            } else if DeckStore::is_media_key(locator) && !store.media_exists(locator) {
                issues.push(format!("logo '{}' references missing payload '{locator}'", item.id));
            }
        }
    }

    if issues.is_empty() {
        println!(
            "Store '{store_dir}' is consistent. Frames: {}  Logos: {}",
            records.len(),
            settings.map(|s| s.items.len()).unwrap_or(0)
        );
        Ok(())
    } else {
        Err(anyhow!(format!(
            "store '{store_dir}' has issues:\n  - {}",
            issues.join("\n  - ")
        )))
    }
}

fn cmd_export(store_dir: &str, bundle_dir: &str) -> Result<()> {
    let store = open_store(store_dir)?;
    let frames = sorted_records(&store)?;
    let settings = store.load_settings(SETTINGS_KEY)?;
    let keys = referenced_media_keys(&frames, settings.as_ref());

    let bundle_root = Path::new(bundle_dir);
    let media_dir = bundle_root.join("media");
    fs::create_dir_all(&media_dir)
        .with_context(|| format!("creating bundle directory {}", media_dir.display()))?;

    let mut copied = 0usize;
    let mut missing = Vec::new();
    for key in &keys {
        let Some(stem) = key.strip_prefix(MEDIA_PREFIX) else {
            continue;
        };
        match store.read_media(key) {
            Ok(bytes) => {
                let target = media_dir.join(stem);
                fs::write(&target, bytes)
                    .with_context(|| format!("writing bundle payload {}", target.display()))?;
                copied += 1;
            }
            Err(_) => missing.push(key.clone()),
        }
    }

    let bundle = DeckBundle { frames, settings };
    let json = serde_json::to_string_pretty(&bundle).context("encoding deck bundle")?;
    let bundle_path = bundle_root.join("deck.json");
    fs::write(&bundle_path, json.as_bytes())
        .with_context(|| format!("writing bundle index {}", bundle_path.display()))?;

    println!(
        "Exported {} frame record(s) and {copied} payload(s) into '{bundle_dir}'",
        bundle.frames.len()
    );
    if missing.is_empty() {
        Ok(())
    } else {
        Err(anyhow!(format!(
            "bundle is incomplete, payloads unavailable in the store:\n  - {}",
            missing.join("\n  - ")
        )))
    }
}

fn cmd_import(store_dir: &str, bundle_dir: &str) -> Result<()> {
    let store = open_store(store_dir)?;
    let bundle_path = Path::new(bundle_dir).join("deck.json");
    let bytes = fs::read(&bundle_path)
        .with_context(|| format!("reading bundle index {}", bundle_path.display()))?;
    let bundle: DeckBundle = serde_json::from_slice(&bytes)
        .with_context(|| format!("parsing bundle index {}", bundle_path.display()))?;

    let keys = referenced_media_keys(&bundle.frames, bundle.settings.as_ref());
    let media_dir = Path::new(bundle_dir).join("media");
    let mut copied = 0usize;
    let mut missing = Vec::new();
    for key in &keys {
        let Some(stem) = key.strip_prefix(MEDIA_PREFIX) else {
            continue;
        };
        let source = media_dir.join(stem);
        match fs::read(&source) {
            Ok(bytes) => {
                store.put_media(key, &bytes)?;
                copied += 1;
            }
            Err(_) => missing.push(key.clone()),
        }
    }

    for record in &bundle.frames {
        store.put_frame(record)?;
    }
    if let Some(settings) = &bundle.settings {
        store.put_settings(SETTINGS_KEY, settings)?;
    }

    println!(
        "Imported {} frame record(s) and {copied} payload(s) into '{store_dir}'",
        bundle.frames.len()
    );
    if missing.is_empty() {
        Ok(())
    } else {
        Err(anyhow!(format!(
            "bundle was missing payload file(s); affected records reference:\n  - {}",
            missing.join("\n  - ")
        )))
    }
}
