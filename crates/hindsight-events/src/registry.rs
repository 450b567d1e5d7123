//! Decoding raw journal text into [`EventRecord`]s.
//!
//! [`decode`] is total: every input yields a record. The kind table is built
//! once from [`EventKind::REGISTERED`] and never changes afterwards.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use hindsight_types::EventKind;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::capability::EventHeader;
use crate::fields::Fields;
use crate::kinds::{
    BackpackTransfer, Booking, BuySuit, Cancellation, Cargo, Died, EjectCargo, EngineerCraft,
    LoadoutActivation, LoadoutCreation, LoadoutDeletion, LoadoutRename, MarketTrade,
    MaterialChange, MaterialsListing, ModuleEquip, ModuleRemoval, Resurrect, SellSuit, TradeSide,
};
use crate::record::{EventRecord, Payload};

/// Document key holding the text of input that did not parse.
pub const BAD_JSON_KEY: &str = "BadJSON";

/// Lower-cased journal spelling to kind.
static KINDS: LazyLock<HashMap<String, EventKind>> = LazyLock::new(|| {
    EventKind::REGISTERED
        .iter()
        .map(|kind| (kind.as_str().to_ascii_lowercase(), *kind))
        .collect()
});

/// Look up a registered kind by journal name, ignoring ASCII case.
pub fn lookup(name: &str) -> Option<EventKind> {
    KINDS.get(&name.to_ascii_lowercase()).copied()
}

/// Build the payload for a registered kind.
fn construct(kind: EventKind, f: Fields<'_>) -> Payload {
    match kind {
        EventKind::Died => Payload::Died(Died::from_fields(f)),
        EventKind::SelfDestruct => Payload::SelfDestruct,
        EventKind::Resurrect => Payload::Resurrect(Resurrect::from_fields(f)),
        EventKind::BookTaxi => Payload::BookTaxi(Booking::from_fields(f)),
        EventKind::CancelTaxi => Payload::CancelTaxi(Cancellation::from_fields(f)),
        EventKind::BookDropship => Payload::BookDropship(Booking::from_fields(f)),
        EventKind::CancelDropship => Payload::CancelDropship(Cancellation::from_fields(f)),
        EventKind::DropshipDeploy => Payload::DropshipDeploy,
        EventKind::MarketBuy => Payload::MarketBuy(MarketTrade::from_fields(f, TradeSide::Buy)),
        EventKind::MarketSell => Payload::MarketSell(MarketTrade::from_fields(f, TradeSide::Sell)),
        EventKind::EjectCargo => Payload::EjectCargo(EjectCargo::from_fields(f)),
        EventKind::Cargo => Payload::Cargo(Cargo::from_fields(f)),
        EventKind::MaterialCollected => {
            Payload::MaterialCollected(MaterialChange::from_fields(f, false))
        }
        EventKind::MaterialDiscarded => {
            Payload::MaterialDiscarded(MaterialChange::from_fields(f, true))
        }
        EventKind::Materials => Payload::Materials(MaterialsListing::from_fields(f)),
        EventKind::EngineerCraft => Payload::EngineerCraft(EngineerCraft::from_fields(f)),
        EventKind::CollectItems => Payload::CollectItems(BackpackTransfer::from_fields(f, false)),
        EventKind::DropItems => Payload::DropItems(BackpackTransfer::from_fields(f, true)),
        EventKind::BuySuit => Payload::BuySuit(BuySuit::from_fields(f)),
        EventKind::SellSuit => Payload::SellSuit(SellSuit::from_fields(f)),
        EventKind::SuitLoadout => Payload::SuitLoadout(LoadoutActivation::from_fields(f)),
        EventKind::CreateSuitLoadout => {
            Payload::CreateSuitLoadout(LoadoutCreation::from_fields(f))
        }
        EventKind::DeleteSuitLoadout => {
            Payload::DeleteSuitLoadout(LoadoutDeletion::from_fields(f))
        }
        EventKind::RenameSuitLoadout => Payload::RenameSuitLoadout(LoadoutRename::from_fields(f)),
        EventKind::LoadoutEquipModule => Payload::LoadoutEquipModule(ModuleEquip::from_fields(f)),
        EventKind::LoadoutRemoveModule => {
            Payload::LoadoutRemoveModule(ModuleRemoval::from_fields(f))
        }
        EventKind::Unknown => Payload::Unknown,
        EventKind::Malformed => Payload::Malformed,
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode one journal line.
///
/// Never fails. Text that is not a JSON object with a string `event` field
/// becomes a [`Payload::Malformed`] record whose document is
/// `{"BadJSON": <text>}`; an unregistered kind becomes [`Payload::Unknown`].
pub fn decode(text: &str) -> EventRecord {
    let map = match parse_document(text) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return malformed(text, "not a JSON object"),
        Err(err) => {
            debug!(%err, "journal line is not valid JSON");
            return malformed(text, "invalid JSON");
        }
    };

    let Some(name) = map.get("event").and_then(Value::as_str) else {
        return malformed(text, "missing event name");
    };

    let fields = Fields::new(&map);
    let timestamp = parse_timestamp(fields.opt_str("timestamp"));
    let (kind, payload) = match lookup(name) {
        Some(kind) => (kind, construct(kind, fields)),
        None => {
            debug!(event = name, "unregistered event kind");
            (EventKind::Unknown, Payload::Unknown)
        }
    };

    EventRecord::new(
        EventHeader { kind, timestamp },
        String::from(text),
        Value::Object(map),
        payload,
    )
}

/// Parse JSON, tolerating a trailing comma before `}` or `]`.
fn parse_document(text: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(text).or_else(|err| match strip_trailing_commas(text) {
        Some(relaxed) => serde_json::from_str(&relaxed),
        None => Err(err),
    })
}

/// Remove commas outside string literals that are followed only by
/// whitespace and a closing bracket. `None` if there were none.
fn strip_trailing_commas(text: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    let mut in_string = false;
    let mut escaped = false;
    let mut stripped = false;

    while let Some(c) = chars.next() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if c == ','
            && matches!(chars.clone().find(|n| !n.is_whitespace()), Some('}' | ']'))
        {
            stripped = true;
            continue;
        }
        out.push(c);
    }
    stripped.then_some(out)
}

/// Decode one journal line, dropping input that is malformed.
pub fn try_decode(text: &str) -> Option<EventRecord> {
    let record = decode(text);
    (record.kind() != EventKind::Malformed).then_some(record)
}

/// Create a minimal record of `kind` at `timestamp`.
///
/// The record goes through [`decode`] like any other input, so it is
/// indistinguishable from a journal line carrying only those two fields.
pub fn synthesize(kind: EventKind, timestamp: DateTime<Utc>) -> EventRecord {
    let document = json!({
        "timestamp": timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        "event": kind.as_str(),
    });
    decode(&document.to_string())
}

fn malformed(text: &str, reason: &'static str) -> EventRecord {
    debug!(reason, len = text.len(), "malformed journal line");
    let mut document = Map::new();
    document.insert(String::from(BAD_JSON_KEY), Value::String(String::from(text)));
    EventRecord::new(
        EventHeader {
            kind: EventKind::Malformed,
            timestamp: DateTime::<Utc>::MIN_UTC,
        },
        String::from(text),
        Value::Object(document),
        Payload::Malformed,
    )
}

/// Parse a journal timestamp, falling back to `DateTime::<Utc>::MIN_UTC`.
///
/// Journals write `2021-05-20T18:00:00Z`; the zone suffix is optional and
/// assumed to be UTC when absent.
pub fn parse_timestamp(text: Option<&str>) -> DateTime<Utc> {
    text.and_then(|s| {
        DateTime::parse_from_rfc3339(s)
            .map(|t| t.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                    .ok()
                    .map(|n| n.and_utc())
            })
    })
    .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use hindsight_types::SuitId;

    use super::*;

    #[test]
    fn every_registered_kind_round_trips_through_lookup() {
        for kind in EventKind::REGISTERED {
            assert_eq!(lookup(kind.as_str()), Some(*kind));
            assert_eq!(lookup(&kind.as_str().to_uppercase()), Some(*kind));
        }
        assert_eq!(lookup("Unknown"), None);
    }

    #[test]
    fn registered_kind_gets_typed_payload() {
        let line = r#"{"timestamp":"2021-05-20T18:00:00Z","event":"BuySuit","Name":"UtilitySuit_Class1","Name_Localised":"Maverick Suit","Price":150000,"SuitID":1700216838981239}"#;
        let record = decode(line);
        assert_eq!(record.kind(), EventKind::BuySuit);
        assert_eq!(
            record.timestamp(),
            Utc.with_ymd_and_hms(2021, 5, 20, 18, 0, 0).unwrap()
        );
        assert!(matches!(
            record.payload(),
            Payload::BuySuit(buy) if buy.suit_id == SuitId(1_700_216_838_981_239) && buy.price == 150_000
        ));
        assert!(record.as_suit().is_some());
        assert!(record.as_ledger().is_some());
        assert!(record.as_commodity().is_none());
    }

    #[test]
    fn kind_lookup_ignores_case() {
        let record = decode(r#"{"timestamp":"2021-05-20T18:00:00Z","event":"marketbuy","Type":"gold","Count":1}"#);
        assert_eq!(record.kind(), EventKind::MarketBuy);
        assert_eq!(record.event_name(), "marketbuy");
    }

    #[test]
    fn unknown_kind_keeps_document() {
        let line = r#"{"event":"FooBarEvent","timestamp":"2021-05-20T18:00:00Z"}"#;
        let record = decode(line);
        assert_eq!(record.kind(), EventKind::Unknown);
        assert_eq!(*record.payload(), Payload::Unknown);
        assert_eq!(record.raw(), line);
        assert_eq!(record.event_name(), "FooBarEvent");
        assert_eq!(
            record.timestamp(),
            Utc.with_ymd_and_hms(2021, 5, 20, 18, 0, 0).unwrap()
        );
        assert!(!record.affects_inventory());
        assert!(record.as_ledger().is_none());
    }

    #[test]
    fn trailing_commas_are_tolerated() {
        let line = r#"{"timestamp":"2021-05-20T18:00:00Z","event":"Died","Killers":[{"Name":"Cmdr Foo","Ship":"viper","Rank":"Elite"},],}"#;
        let record = decode(line);
        assert_eq!(record.kind(), EventKind::Died);
        assert_eq!(record.raw(), line);
        assert!(record.as_commodity().is_some());
    }

    #[test]
    fn commas_inside_strings_are_kept() {
        let record = decode(r#"{"event":"FooBarEvent","Note":"a,} \",]", }"#);
        assert_eq!(record.kind(), EventKind::Unknown);
        assert_eq!(record.document().get("Note").and_then(Value::as_str), Some(r#"a,} ",]"#));
        assert_eq!(strip_trailing_commas(r#"{"a":"x,}"}"#), None);
    }

    #[test]
    fn broken_json_is_malformed() {
        let record = decode("{not json");
        assert_eq!(record.kind(), EventKind::Malformed);
        assert_eq!(record.raw(), "{not json");
        assert_eq!(record.document(), &json!({ "BadJSON": "{not json" }));
        assert_eq!(record.timestamp(), DateTime::<Utc>::MIN_UTC);
        assert!(try_decode("{not json").is_none());
    }

    #[test]
    fn non_object_or_nameless_input_is_malformed() {
        assert_eq!(decode("[1,2]").kind(), EventKind::Malformed);
        assert_eq!(decode(r#"{"timestamp":"2021-05-20T18:00:00Z"}"#).kind(), EventKind::Malformed);
        assert_eq!(decode(r#"{"event":7}"#).kind(), EventKind::Malformed);
        assert_eq!(decode("").kind(), EventKind::Malformed);
    }

    #[test]
    fn bad_timestamp_falls_back_to_minimum() {
        let record = decode(r#"{"event":"Died","timestamp":"yesterday"}"#);
        assert_eq!(record.kind(), EventKind::Died);
        assert_eq!(record.timestamp(), DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn zoneless_timestamp_is_utc() {
        let t = parse_timestamp(Some("2021-05-20T18:00:00"));
        assert_eq!(t, Utc.with_ymd_and_hms(2021, 5, 20, 18, 0, 0).unwrap());
    }

    #[test]
    fn synthesized_record_decodes_like_a_journal_line() {
        let t = Utc.with_ymd_and_hms(2022, 1, 2, 3, 4, 5).unwrap();
        let record = synthesize(EventKind::DropshipDeploy, t);
        assert_eq!(record.kind(), EventKind::DropshipDeploy);
        assert_eq!(record.timestamp(), t);
        assert_eq!(decode(record.raw()), record);
    }
}
