use crate::error::{Result, SheetError};
use crate::model::song::{KeySignature, SongRecord, TimeSignature};
use log::{debug, warn};
use std::fs;
use std::path::Path;

const FIELD_SEPARATOR: &str = ", ";
const FIELD_COUNT: usize = 4;

/// Reads the song catalog, e.g.
///
/// ```text
/// file, time signature, pickup, key signature
/// Amazing_Grace.mid, 3/4, 1, Csharp
/// ```
pub fn read_catalog<P: AsRef<Path>>(path: P) -> Result<Vec<SongRecord>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SheetError::AssetMissing(path.to_path_buf()));
    }

    let contents = fs::read_to_string(path)?;
    let records = parse_catalog(&contents)?;
    debug!(
        "Read {} song record(s) from '{}'..!",
        records.len(),
        path.display()
    );

    Ok(records)
}

pub fn parse_catalog(contents: &str) -> Result<Vec<SongRecord>> {
    let mut records = Vec::new();

    // Line 0 is the header, so record indices start at 1.
    for (line_num, line) in contents.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            debug!("Skipping blank catalog line {}..!", line_num);
            continue;
        }

        records.push(parse_record(line, line_num)?);
    }

    Ok(records)
}

fn parse_record(line: &str, line_num: usize) -> Result<SongRecord> {
    let malformed = |message: String| SheetError::CatalogFormat {
        line: line_num,
        message,
    };

    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if fields.len() != FIELD_COUNT {
        return Err(malformed(format!(
            "expected {} fields, found {}",
            FIELD_COUNT,
            fields.len()
        )));
    }

    let time_signature = parse_time_signature(fields[1]).ok_or_else(|| {
        malformed(format!("invalid time signature '{}'", fields[1]))
    })?;

    let pickup_beats = fields[2]
        .trim()
        .parse::<i32>()
        .map_err(|e| malformed(format!("invalid pickup '{}': {}", fields[2], e)))?;

    let key = fields[3].trim_end_matches(['\n', '\r']);
    let key_signature = KeySignature::new(key);
    if !key_signature.is_sharp() && !key_signature.is_flat() {
        debug!(
            "Key signature '{}' on line {} has no sharps or flats..!",
            key, line_num
        );
    }

    let file_name = fields[0].to_string();
    if !file_name.to_lowercase().ends_with(".mid") {
        warn!(
            "Catalog entry '{}' on line {} doesn't look like a MIDI file..!",
            file_name, line_num
        );
    }

    Ok(SongRecord {
        file_name,
        time_signature,
        pickup_beats,
        key_signature,
        display_index: line_num,
    })
}

/// Parses `N/D`, e.g. `3/4`.
pub fn parse_time_signature(s: &str) -> Option<TimeSignature> {
    let (num, den) = s.trim().split_once('/')?;
    TimeSignature::new(num.trim().parse().ok()?, den.trim().parse().ok()?)
}

/// Human readable title from a catalog file name: `Amazing_Grace.mid` -> `Amazing Grace`.
pub fn song_title(file_name: &str) -> String {
    let stem = match file_name.rsplit_once('.') {
        Some((stem, _ext)) => stem,
        None => file_name,
    };

    stem.split('_').collect::<Vec<_>>().join(" ")
}

/// Menu entries as shown in song selection, e.g. `1. Amazing Grace`.
pub fn menu_entries(records: &[SongRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| format!("{}. {}", r.display_index, song_title(&r.file_name)))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    const HEADER: &str = "file, time signature, pickup, key signature\n";

    #[test]
    fn read_single_record() {
        env_logger::try_init().unwrap_or(());

        let contents = format!("{}Amazing_Grace.mid, 3/4, 1, Csharp\n", HEADER);
        let records = parse_catalog(&contents).unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.file_name, "Amazing_Grace.mid");
        assert_eq!(record.time_signature, TimeSignature::new(3, 4).unwrap());
        assert_eq!(record.pickup_beats, 1);
        assert_eq!(record.key_signature.token, "Csharp");
        assert_eq!(record.display_index, 1);
    }

    #[test]
    fn indices_follow_line_numbers() {
        env_logger::try_init().unwrap_or(());

        let contents = format!(
            "{}Twinkle_Twinkle.mid, 4/4, 0, C\nOde_To_Joy.mid, 4/4, 0, Gsharp\r\n\nSaints.mid, 2/2, 3, Bflat",
            HEADER
        );
        let records = parse_catalog(&contents).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].display_index, 1);
        assert_eq!(records[1].display_index, 2);
        assert_eq!(records[1].key_signature.token, "Gsharp");
        assert_eq!(records[2].display_index, 4);
        assert_eq!(records[2].time_signature, TimeSignature::new(2, 2).unwrap());
        assert_eq!(records[2].pickup_beats, 3);
        assert!(records[2].key_signature.is_flat());
    }

    #[test]
    fn malformed_lines() {
        env_logger::try_init().unwrap_or(());

        let missing_field = format!("{}Song.mid, 4/4, 0\n", HEADER);
        assert!(matches!(
            parse_catalog(&missing_field),
            Err(SheetError::CatalogFormat { line: 1, .. })
        ));

        let bad_signature = format!("{}Song.mid, four/4, 0, C\n", HEADER);
        assert!(matches!(
            parse_catalog(&bad_signature),
            Err(SheetError::CatalogFormat { line: 1, .. })
        ));

        let bad_denominator = format!("{}Song.mid, 4/3, 0, C\n", HEADER);
        assert!(parse_catalog(&bad_denominator).is_err());

        let bad_pickup = format!("{}A.mid, 4/4, 0, C\nB.mid, 4/4, x, C\n", HEADER);
        assert!(matches!(
            parse_catalog(&bad_pickup),
            Err(SheetError::CatalogFormat { line: 2, .. })
        ));
    }

    #[test]
    fn header_only_is_empty() {
        assert!(parse_catalog(HEADER).unwrap().is_empty());
        assert!(parse_catalog("").unwrap().is_empty());
    }

    #[test]
    fn missing_catalog_file() {
        let result = read_catalog("./definitely/not/here.csv");
        assert!(matches!(result, Err(SheetError::AssetMissing(_))));
    }

    #[test]
    fn titles_and_menu() {
        assert_eq!(song_title("Amazing_Grace.mid"), "Amazing Grace");
        assert_eq!(song_title("Scale"), "Scale");

        let contents = format!("{}Amazing_Grace.mid, 3/4, 1, Csharp\nOde_To_Joy.mid, 4/4, 0, C\n", HEADER);
        let records = parse_catalog(&contents).unwrap();
        assert_eq!(
            menu_entries(&records),
            vec!["1. Amazing Grace".to_string(), "2. Ode To Joy".to_string()]
        );
    }
}
