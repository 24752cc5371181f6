// Payload encodings as produced from submitted forms

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use qrcode_styler_wasm::payload::{escape_location, EventPayload, GeoPoint, QrPayload};

fn event_at(location: &str) -> EventPayload {
    EventPayload {
        uid: Some("a1b2c3d".to_string()),
        summary: "Tandem flight".to_string(),
        description: "Bring warm clothes".to_string(),
        location: location.to_string(),
        geo: GeoPoint {
            latitude: 45.936562,
            longitude: 6.851181,
        },
        dtstart: Utc.with_ymd_and_hms(2025, 1, 31, 23, 0, 0).unwrap(),
        dtend: Utc.with_ymd_and_hms(2025, 2, 1, 0, 30, 0).unwrap(),
    }
}

fn location_line(encoded: &str) -> &str {
    encoded
        .lines()
        .find_map(|line| line.strip_prefix("LOCATION:"))
        .expect("VEVENT has a LOCATION line")
}

#[test]
fn test_geo_uses_plain_decimals() {
    let geo = QrPayload::Geo(GeoPoint {
        latitude: 45.9,
        longitude: 6.9,
    });
    assert_eq!(geo.encode().unwrap(), "GEO:45.9,6.9");

    let south_west = QrPayload::Geo(GeoPoint {
        latitude: -33.8688,
        longitude: -70.0,
    });
    assert_eq!(south_west.encode().unwrap(), "GEO:-33.8688,-70");
}

#[test]
fn test_event_location_commas_are_escaped() {
    let encoded = QrPayload::Event(event_at("1, Place du Triangle, Chamonix")).encode().unwrap();
    assert_eq!(location_line(&encoded), "1\\, Place du Triangle\\, Chamonix");
}

#[test]
fn test_event_times_are_utc_stamps() {
    let encoded = QrPayload::Event(event_at("Field")).encode().unwrap();
    assert!(encoded.contains("\nDTSTART:20250131T230000Z\n"));
    assert!(encoded.contains("\nDTEND:20250201T003000Z\n"));
    assert!(encoded.contains("\nGEO:45.936562;6.851181\n"));
    assert!(encoded.starts_with("BEGIN:VEVENT\nUID:a1b2c3d\n"));
    assert!(encoded.ends_with("\nEND:VEVENT"));
}

#[test]
fn test_event_from_form_json() {
    let json = r#"{
        "kind": "event",
        "values": {
            "summary": "Briefing",
            "description": "Weather and site check",
            "location": "Hangar, Gate 2",
            "latitude": "45.9",
            "longitude": "6.9",
            "dtstart": "2024-05-01T08:00:00Z",
            "dtend": "2024-05-01T09:00:00Z"
        }
    }"#;
    let payload: QrPayload = serde_json::from_str(json).unwrap();
    let encoded = payload.encode().unwrap();
    assert_eq!(location_line(&encoded), "Hangar\\, Gate 2");
    assert!(encoded.contains("\nGEO:45.9;6.9\n"));
    let uid = encoded.lines().nth(1).unwrap().strip_prefix("UID:").unwrap();
    assert_eq!(uid.len(), 7);
}

proptest! {
    #[test]
    fn location_escaping_only_touches_commas(location in "[ -~]{0,40}") {
        let escaped = escape_location(&location);
        prop_assert_eq!(escaped.replace("\\,", ","), location.clone());
        prop_assert_eq!(escaped.matches("\\,").count(), location.matches(',').count());
    }

    #[test]
    fn geo_round_trips_through_text(latitude in -90.0f64..90.0, longitude in -180.0f64..180.0) {
        let encoded = QrPayload::Geo(GeoPoint { latitude, longitude }).encode().unwrap();
        let body = encoded.strip_prefix("GEO:").unwrap();
        let (lat, lon) = body.split_once(',').unwrap();
        prop_assert_eq!(lat.parse::<f64>().unwrap(), latitude);
        prop_assert_eq!(lon.parse::<f64>().unwrap(), longitude);
    }
}
