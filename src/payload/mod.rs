//! QR payloads
//!
//! One variant per form tab. `encode` turns a filled-in form into the string
//! handed to the engine as `data`. Values are inserted verbatim apart from
//! the VEVENT `LOCATION` comma escaping.

pub mod templates;

pub use templates::{render_payload, PayloadTemplate};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SITE;
use crate::models::serde_helpers::{lenient_bool, lenient_datetime, lenient_f64};
use crate::ui::TabKind;
use templates::EventContext;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PayloadError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Event ends before it starts")]
    EndBeforeStart,

    #[error("Template error: {0}")]
    Template(String),
}

/// `mailto:` form
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct EmailPayload {
    pub email: String,
    pub subject: String,
    pub body: String,
}

/// Decimal coordinates
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    #[serde(deserialize_with = "lenient_f64")]
    pub latitude: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub longitude: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    /// Random 7-character id when absent
    #[serde(default)]
    pub uid: Option<String>,
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(flatten)]
    pub geo: GeoPoint,
    /// RFC 3339, or a `datetime-local` value in browser time
    #[serde(deserialize_with = "lenient_datetime")]
    pub dtstart: DateTime<Utc>,
    #[serde(deserialize_with = "lenient_datetime")]
    pub dtend: DateTime<Utc>,
}

/// `T:` field of the WIFI payload
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WifiEncryption {
    #[default]
    #[serde(rename = "nopass")]
    NoPass,
    #[serde(rename = "WEP")]
    Wep,
    #[serde(rename = "WPA")]
    Wpa,
}

impl WifiEncryption {
    pub fn as_str(&self) -> &'static str {
        match self {
            WifiEncryption::NoPass => "nopass",
            WifiEncryption::Wep => "WEP",
            WifiEncryption::Wpa => "WPA",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct WifiPayload {
    pub ssid: String,
    pub encryption: WifiEncryption,
    pub password: String,
    #[serde(deserialize_with = "lenient_bool")]
    pub hidden: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct VCardPayload {
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub job: String,
    pub mobile: String,
    pub phone: String,
    pub fax: String,
    pub email: String,
    pub street: String,
    pub city: String,
    pub zip: String,
    pub state: String,
    pub country: String,
    pub website: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct SmsPayload {
    pub number: String,
    pub message: String,
}

/// A filled-in payload form, tagged with its kind on the JS side
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", content = "values", rename_all = "camelCase")]
pub enum QrPayload {
    Url(String),
    Text(String),
    Email(EmailPayload),
    Geo(GeoPoint),
    Event(EventPayload),
    Wifi(WifiPayload),
    VCard(VCardPayload),
    Sms(SmsPayload),
    Phone(String),
}

impl QrPayload {
    /// Initial form values for a tab
    pub fn initial(tab: TabKind) -> QrPayload {
        match tab {
            TabKind::Url => QrPayload::Url(SITE.url.to_string()),
            TabKind::Text => QrPayload::Text(String::new()),
            TabKind::Email => QrPayload::Email(EmailPayload::default()),
            TabKind::VCard => QrPayload::VCard(VCardPayload::default()),
            TabKind::Place => QrPayload::Geo(GeoPoint {
                latitude: 45.926436,
                longitude: 6.8676,
            }),
            TabKind::Wifi => QrPayload::Wifi(WifiPayload::default()),
            TabKind::Sms => QrPayload::Sms(SmsPayload {
                number: String::new(),
                message: "Please call me back".to_string(),
            }),
            TabKind::Phone => QrPayload::Phone(String::new()),
            TabKind::Event => {
                let start = Utc::now();
                QrPayload::Event(EventPayload {
                    uid: None,
                    summary: "Tandem flight with McFly Paragliding".to_string(),
                    description: "Tandem flight with an instructor".to_string(),
                    location: "29 Rte Henriette d'Angeville, 74400 Chamonix-Mont-Blanc".to_string(),
                    geo: GeoPoint {
                        latitude: 45.936562,
                        longitude: 6.851181,
                    },
                    dtstart: start,
                    dtend: start + Duration::hours(1),
                })
            }
        }
    }

    /// Tab the payload belongs to
    pub fn tab(&self) -> TabKind {
        match self {
            QrPayload::Url(_) => TabKind::Url,
            QrPayload::Text(_) => TabKind::Text,
            QrPayload::Email(_) => TabKind::Email,
            QrPayload::Geo(_) => TabKind::Place,
            QrPayload::Event(_) => TabKind::Event,
            QrPayload::Wifi(_) => TabKind::Wifi,
            QrPayload::VCard(_) => TabKind::VCard,
            QrPayload::Sms(_) => TabKind::Sms,
            QrPayload::Phone(_) => TabKind::Phone,
        }
    }

    /// Check the fields the form marks as required
    pub fn validate(&self) -> Result<(), PayloadError> {
        let require = |value: &str, name: &'static str| {
            if value.trim().is_empty() {
                Err(PayloadError::MissingField(name))
            } else {
                Ok(())
            }
        };
        match self {
            QrPayload::Url(url) => require(url, "URL"),
            QrPayload::Text(text) => require(text, "Text"),
            QrPayload::Email(email) => require(&email.email, "Email"),
            QrPayload::Geo(_) => Ok(()),
            QrPayload::Event(event) => {
                require(&event.summary, "Summary")?;
                require(&event.description, "Description")?;
                require(&event.location, "Address")?;
                if event.dtend < event.dtstart {
                    return Err(PayloadError::EndBeforeStart);
                }
                Ok(())
            }
            QrPayload::Wifi(wifi) => require(&wifi.ssid, "SSID"),
            QrPayload::VCard(card) => require(&card.first_name, "First Name"),
            QrPayload::Sms(sms) => {
                require(&sms.number, "Destination number")?;
                require(&sms.message, "Message")
            }
            QrPayload::Phone(number) => require(number, "Destination number"),
        }
    }

    /// Validate and encode
    pub fn encode(&self) -> Result<String, PayloadError> {
        self.validate()?;
        match self {
            QrPayload::Url(value) | QrPayload::Text(value) => Ok(value.clone()),
            QrPayload::Email(email) => Ok(format!(
                "mailto:{}?subject={}&body={}",
                email.email, email.subject, email.body
            )),
            QrPayload::Geo(point) => Ok(format!("GEO:{},{}", point.latitude, point.longitude)),
            QrPayload::Event(event) => encode_event(event, &random_uid),
            QrPayload::Wifi(wifi) => Ok(format!(
                "WIFI:S:{};T:{};P:{};H:{};;",
                wifi.ssid,
                wifi.encryption.as_str(),
                wifi.password,
                wifi.hidden
            )),
            QrPayload::VCard(card) => render_payload(PayloadTemplate::VCard, card),
            QrPayload::Sms(sms) => Ok(format!("SMSTO:{}:{}", sms.number, sms.message)),
            QrPayload::Phone(number) => Ok(format!("tel:{}", number)),
        }
    }
}

/// `YYYYMMDDTHHMMSSZ`
pub fn format_utc(time: &DateTime<Utc>) -> String {
    time.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Escape every comma as `\,`
pub fn escape_location(location: &str) -> String {
    location.replace(',', "\\,")
}

/// Seven random base-36 characters
pub fn random_uid() -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut n = uuid::Uuid::new_v4().as_u128();
    let mut uid = String::with_capacity(7);
    for _ in 0..7 {
        uid.push(DIGITS[(n % 36) as usize] as char);
        n /= 36;
    }
    uid
}

fn encode_event(event: &EventPayload, make_uid: &dyn Fn() -> String) -> Result<String, PayloadError> {
    let uid = match &event.uid {
        Some(uid) if !uid.trim().is_empty() => uid.clone(),
        _ => make_uid(),
    };
    let context = EventContext {
        uid,
        summary: event.summary.clone(),
        dtstart: format_utc(&event.dtstart),
        dtend: format_utc(&event.dtend),
        location: escape_location(&event.location),
        latitude: event.geo.latitude.to_string(),
        longitude: event.geo.longitude.to_string(),
        description: event.description.clone(),
    };
    render_payload(PayloadTemplate::Event, &context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_event() -> EventPayload {
        EventPayload {
            uid: Some("k3j9x0a".to_string()),
            summary: "Tandem flight".to_string(),
            description: "With an instructor".to_string(),
            location: "29 Rte Henriette d'Angeville, 74400 Chamonix".to_string(),
            geo: GeoPoint {
                latitude: 45.936562,
                longitude: 6.851181,
            },
            dtstart: Utc.with_ymd_and_hms(2024, 7, 14, 9, 5, 0).unwrap(),
            dtend: Utc.with_ymd_and_hms(2024, 7, 14, 10, 5, 0).unwrap(),
        }
    }

    #[test]
    fn test_event_encoding() {
        let encoded = QrPayload::Event(sample_event()).encode().unwrap();
        assert_eq!(
            encoded,
            "BEGIN:VEVENT\n\
             UID:k3j9x0a\n\
             SUMMARY:Tandem flight\n\
             DTSTART:20240714T090500Z\n\
             DTEND:20240714T100500Z\n\
             LOCATION:29 Rte Henriette d'Angeville\\, 74400 Chamonix\n\
             GEO:45.936562;6.851181\n\
             DESCRIPTION:With an instructor\n\
             END:VEVENT"
        );
    }

    #[test]
    fn test_generated_uid() {
        let mut event = sample_event();
        event.uid = None;
        let encoded = encode_event(&event, &|| "zzzzzzz".to_string()).unwrap();
        assert!(encoded.contains("\nUID:zzzzzzz\n"));

        let uid = random_uid();
        assert_eq!(uid.len(), 7);
        assert!(uid.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_end_before_start() {
        let mut event = sample_event();
        event.dtend = event.dtstart - Duration::minutes(1);
        assert_eq!(QrPayload::Event(event).encode(), Err(PayloadError::EndBeforeStart));
    }

    #[test]
    fn test_simple_encodings() {
        let email = QrPayload::Email(EmailPayload {
            email: "pilot@example.com".to_string(),
            subject: "Hi there".to_string(),
            body: "a&b".to_string(),
        });
        assert_eq!(email.encode().unwrap(), "mailto:pilot@example.com?subject=Hi there&body=a&b");

        let sms = QrPayload::Sms(SmsPayload {
            number: "+33600000000".to_string(),
            message: "Call me".to_string(),
        });
        assert_eq!(sms.encode().unwrap(), "SMSTO:+33600000000:Call me");
        assert_eq!(QrPayload::Phone("+331".to_string()).encode().unwrap(), "tel:+331");
        assert_eq!(
            QrPayload::Url("https://example.com".to_string()).encode().unwrap(),
            "https://example.com"
        );
    }

    #[test]
    fn test_wifi_encoding() {
        let wifi = QrPayload::Wifi(WifiPayload {
            ssid: "Hangar".to_string(),
            encryption: WifiEncryption::Wpa,
            password: "s3cret".to_string(),
            hidden: true,
        });
        assert_eq!(wifi.encode().unwrap(), "WIFI:S:Hangar;T:WPA;P:s3cret;H:true;;");

        let open = QrPayload::Wifi(WifiPayload {
            ssid: "Guest".to_string(),
            ..WifiPayload::default()
        });
        assert_eq!(open.encode().unwrap(), "WIFI:S:Guest;T:nopass;P:;H:false;;");
    }

    #[test]
    fn test_vcard_encoding() {
        let card = QrPayload::VCard(VCardPayload {
            title: "Dr.".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            company: "Engines".to_string(),
            city: "London".to_string(),
            ..VCardPayload::default()
        });
        let encoded = card.encode().unwrap();
        let lines: Vec<&str> = encoded.split('\n').collect();
        assert_eq!(lines[0], "BEGIN:VCARD");
        assert_eq!(lines[1], "VERSION:3.0");
        assert_eq!(lines[2], "N:Lovelace;Ada;;Dr.;");
        assert_eq!(lines[3], "FN:Ada Lovelace");
        assert_eq!(lines[4], "ORG:Engines.");
        assert_eq!(lines[6], "TEL;TYPE#WORK,VOICE:");
        assert_eq!(lines[9], "ADR:;;;London;;;");
        assert_eq!(lines.last(), Some(&"END:VCARD"));
    }

    #[test]
    fn test_required_fields() {
        assert_eq!(
            QrPayload::Wifi(WifiPayload::default()).encode(),
            Err(PayloadError::MissingField("SSID"))
        );
        assert_eq!(
            QrPayload::Url("  ".to_string()).encode(),
            Err(PayloadError::MissingField("URL"))
        );
    }

    #[test]
    fn test_event_requires_description_and_address() {
        let mut event = sample_event();
        event.description = " ".to_string();
        assert_eq!(
            QrPayload::Event(event).encode(),
            Err(PayloadError::MissingField("Description"))
        );

        let mut event = sample_event();
        event.location.clear();
        assert_eq!(QrPayload::Event(event).encode(), Err(PayloadError::MissingField("Address")));
    }

    #[test]
    fn test_initial_event_is_a_tandem_flight() {
        let QrPayload::Event(event) = QrPayload::initial(TabKind::Event) else {
            panic!("event tab should start with an event");
        };
        assert_eq!(event.summary, "Tandem flight with McFly Paragliding");
        assert_eq!(event.description, "Tandem flight with an instructor");
        assert_eq!(event.location, "29 Rte Henriette d'Angeville, 74400 Chamonix-Mont-Blanc");
        assert_eq!(event.dtend - event.dtstart, Duration::hours(1));

        let encoded = QrPayload::Event(event).encode().unwrap();
        assert!(encoded.contains("\nLOCATION:29 Rte Henriette d'Angeville\\, 74400 Chamonix-Mont-Blanc\n"));
    }

    #[test]
    fn test_event_from_datetime_local_inputs() {
        let payload: QrPayload = serde_json::from_str(
            r#"{"kind":"event","values":{"uid":"abc1234","summary":"Flight","description":"Tandem","location":"Plaine Joux","latitude":45.9,"longitude":6.7,"dtstart":"2024-05-01T08:00","dtend":"2024-05-01T09:30"}}"#,
        )
        .unwrap();
        let QrPayload::Event(event) = &payload else {
            panic!("expected an event");
        };
        assert_eq!(event.dtend - event.dtstart, Duration::minutes(90));
        assert!(payload.encode().is_ok());
    }

    #[test]
    fn test_initial_values_match_their_tab() {
        for tab in TabKind::ALL {
            assert_eq!(QrPayload::initial(tab).tab(), tab);
        }
        assert_eq!(QrPayload::initial(TabKind::Url).encode().unwrap(), SITE.url);
    }

    #[test]
    fn test_json_from_form() {
        let payload: QrPayload = serde_json::from_str(
            r#"{"kind":"geo","values":{"latitude":"45.9","longitude":6.9}}"#,
        )
        .unwrap();
        assert_eq!(payload.encode().unwrap(), "GEO:45.9,6.9");

        let payload: QrPayload = serde_json::from_str(
            r#"{"kind":"wifi","values":{"ssid":"Hangar","encryption":"WEP","hidden":"on"}}"#,
        )
        .unwrap();
        assert_eq!(payload.encode().unwrap(), "WIFI:S:Hangar;T:WEP;P:;H:true;;");
    }
}
