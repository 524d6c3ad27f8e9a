use std::env;
use std::fs;
use std::path::PathBuf;

use datasets::{
    AtlasManifest, AtlasPackage, DatasetEntry, MANIFEST_FILE_NAME, content_hash_hex,
    load_atlas_from_package_dir,
};
use foundation::math::GeoCoordinate;
use search::{DEFAULT_RESULT_LIMIT, PostalTable, ProximityIndex};

/// Conventional file name per dataset kind, used by `pack`.
const PACK_KINDS: [(&str, &str); 4] = [
    ("regions", "regions.json"),
    ("media", "media.json"),
    ("aggregates", "aggregates.json"),
    ("postal", "postal.json"),
];

fn main() {
    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let mut args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }

    let cmd = args[1].clone();
    args.drain(0..2);

    match cmd.as_str() {
        "query" => cmd_query(args),
        "pack" => cmd_pack(args),
        "verify" => cmd_verify(args),
        _ => Err(usage()),
    }
}

fn cmd_pack(args: Vec<String>) -> Result<(), String> {
    // media-atlas pack <package_dir> [--id PACKAGE_ID] [--name NAME]
    if args.is_empty() {
        return Err(usage());
    }

    let root = PathBuf::from(&args[0]);
    let mut package_id = "media-atlas-package".to_string();
    let mut name: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--id" => package_id = take_value(&args, &mut i)?,
            "--name" => name = Some(take_value(&args, &mut i)?),
            s => return Err(format!("unknown arg: {s}\n\n{}", usage())),
        }
        i += 1;
    }

    let mut manifest = AtlasManifest::new(package_id);
    manifest.name = name;

    for (kind, file_name) in PACK_KINDS {
        let path = root.join(file_name);
        if !path.exists() {
            continue;
        }
        let bytes = fs::read(&path).map_err(|e| format!("read {path:?}: {e}"))?;
        manifest.entries.push(DatasetEntry {
            kind: kind.to_string(),
            path: file_name.to_string(),
            content_hash: Some(content_hash_hex(&bytes)),
        });
    }

    if manifest.entries.is_empty() {
        return Err(format!("no dataset files found under {root:?}"));
    }

    let manifest_path = root.join(MANIFEST_FILE_NAME);
    let payload = serde_json::to_string_pretty(&manifest).map_err(|e| format!("json: {e}"))?;
    fs::write(&manifest_path, payload).map_err(|e| format!("write {manifest_path:?}: {e}"))?;

    println!(
        "wrote {} with {} entries",
        manifest_path.display(),
        manifest.entries.len()
    );
    Ok(())
}

fn cmd_query(args: Vec<String>) -> Result<(), String> {
    // media-atlas query <package_dir> (--postal CODE | --lat L --lon L) [--radius MILES] [--limit N]
    if args.is_empty() {
        return Err(usage());
    }

    let root = PathBuf::from(&args[0]);
    let mut postal: Option<String> = None;
    let mut lat: Option<f64> = None;
    let mut lon: Option<f64> = None;
    let mut radius: f64 = 100.0;
    let mut limit: usize = DEFAULT_RESULT_LIMIT;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--postal" => postal = Some(take_value(&args, &mut i)?),
            "--lat" => lat = Some(take_parsed(&args, &mut i)?),
            "--lon" => lon = Some(take_parsed(&args, &mut i)?),
            "--radius" => radius = take_parsed(&args, &mut i)?,
            "--limit" => limit = take_parsed(&args, &mut i)?,
            s => return Err(format!("unknown arg: {s}\n\n{}", usage())),
        }
        i += 1;
    }

    let data = load_atlas_from_package_dir(&root).map_err(|e| format!("load {root:?}: {e}"))?;
    let table = PostalTable::new(data.postal_entries);

    let origin = match (postal, lat, lon) {
        (Some(code), _, _) => table
            .get(&code)
            .ok_or_else(|| format!("postal code {code} not found in the package table"))?,
        (None, Some(lat), Some(lon)) => GeoCoordinate::try_new(lat, lon)
            .ok_or_else(|| format!("coordinate out of range: {lat}, {lon}"))?,
        _ => return Err("query needs --postal CODE or both --lat and --lon".to_string()),
    };

    let results = ProximityIndex::with_limit(limit).query(origin, radius, &data.records);
    if results.is_empty() {
        println!("no records within {radius} miles");
        return Ok(());
    }

    for (rank, result) in results.iter().enumerate() {
        let record = &data.records[result.record];
        let place = match (&record.locality, &record.admin_area) {
            (Some(city), Some(area)) => format!("{city}, {area}"),
            (Some(city), None) => city.clone(),
            (None, Some(area)) => area.clone(),
            (None, None) => String::new(),
        };
        println!(
            "{:>4}. {:>7.1} mi  {} ({}){}",
            rank + 1,
            result.distance_miles,
            record.name,
            record.class.label(),
            if place.is_empty() {
                String::new()
            } else {
                format!("  — {place}")
            }
        );
    }

    Ok(())
}

fn cmd_verify(args: Vec<String>) -> Result<(), String> {
    // media-atlas verify <package_dir>
    if args.len() != 1 {
        return Err(usage());
    }

    let root = PathBuf::from(&args[0]);
    let package = AtlasPackage::load(&root).map_err(|e| format!("load {root:?}: {e}"))?;

    for entry in &package.manifest().entries {
        package
            .entry_bytes(&entry.kind)
            .map_err(|e| format!("{e}"))?;
        let status = if entry.content_hash.is_some() {
            "ok (hash verified)"
        } else {
            "ok (no hash recorded)"
        };
        println!("{:<12} {:<24} {status}", entry.kind, entry.path);
    }

    println!(
        "package {} verified ({} entries)",
        package.manifest().package_id,
        package.manifest().entries.len()
    );
    Ok(())
}

fn take_value(args: &[String], i: &mut usize) -> Result<String, String> {
    *i += 1;
    args.get(*i)
        .cloned()
        .ok_or_else(|| format!("{} requires a value", args[*i - 1]))
}

fn take_parsed<T: std::str::FromStr>(args: &[String], i: &mut usize) -> Result<T, String> {
    let raw = take_value(args, i)?;
    raw.parse()
        .map_err(|_| format!("invalid value for {}: {raw}", args[*i - 1]))
}

fn usage() -> String {
    [
        "usage:",
        "  media-atlas query <package_dir> (--postal CODE | --lat L --lon L) [--radius MILES] [--limit N]",
        "  media-atlas pack <package_dir> [--id PACKAGE_ID] [--name NAME]",
        "  media-atlas verify <package_dir>",
    ]
    .join("\n")
}
