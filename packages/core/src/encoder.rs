//! JSON line encoding of log entries.

use std::panic::Location;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::field::Field;
use crate::level::Level;

/// Source position of a log call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub file: &'static str,
    pub line: u32,
}

impl Caller {
    pub fn new(file: &'static str, line: u32) -> Self {
        Self { file, line }
    }
}

impl From<&'static Location<'static>> for Caller {
    fn from(location: &'static Location<'static>) -> Self {
        Self::new(location.file(), location.line())
    }
}

/// A single log record before encoding.
#[derive(Debug, Clone)]
pub struct Entry {
    pub level: Level,
    pub time: DateTime<Utc>,
    pub logger_name: Option<String>,
    pub caller: Option<Caller>,
    pub message: String,
    pub stack: Option<String>,
}

impl Entry {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            time: Utc::now(),
            logger_name: None,
            caller: None,
            message: message.into(),
            stack: None,
        }
    }
}

/// Key names used by [`JsonEncoder`]. An empty key drops that element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    pub level_key: String,
    pub time_key: String,
    pub name_key: String,
    pub caller_key: String,
    pub message_key: String,
    pub stacktrace_key: String,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            level_key: "level".to_string(),
            time_key: "ts".to_string(),
            name_key: "logger".to_string(),
            caller_key: "caller".to_string(),
            message_key: "msg".to_string(),
            stacktrace_key: "stacktrace".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct JsonEncoder {
    config: EncoderConfig,
}

impl JsonEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    fn is_reserved(&self, key: &str) -> bool {
        let cfg = &self.config;
        !key.is_empty()
            && [
                &cfg.level_key,
                &cfg.time_key,
                &cfg.name_key,
                &cfg.caller_key,
                &cfg.message_key,
                &cfg.stacktrace_key,
            ]
            .iter()
            .any(|reserved| reserved.as_str() == key)
    }

    /// Encodes one entry as a newline-terminated JSON object.
    ///
    /// `context` comes from `with` and precedes the call-site `fields`; a key
    /// repeated later overwrites the earlier value in place. A field named
    /// like one of the entry's own keys is written as `fields.<key>` so it
    /// cannot replace the level, message or any other entry element.
    pub fn encode(&self, entry: &Entry, context: &[Field], fields: &[Field]) -> Vec<u8> {
        let cfg = &self.config;
        let mut object = Map::new();

        insert(&mut object, &cfg.level_key, Value::from(entry.level.as_str()));
        insert(&mut object, &cfg.time_key, epoch_seconds(&entry.time));
        if let Some(name) = &entry.logger_name {
            insert(&mut object, &cfg.name_key, Value::from(name.as_str()));
        }
        if let Some(caller) = &entry.caller {
            insert(&mut object, &cfg.caller_key, Value::from(short_caller(caller)));
        }
        insert(&mut object, &cfg.message_key, Value::from(entry.message.as_str()));
        if let Some(stack) = &entry.stack {
            insert(&mut object, &cfg.stacktrace_key, Value::from(stack.as_str()));
        }

        for field in context.iter().chain(fields) {
            let key = if self.is_reserved(&field.key) {
                format!("fields.{}", field.key)
            } else {
                field.key.clone()
            };
            object.insert(key, field.value.clone());
        }

        let mut line = serde_json::to_vec(&Value::Object(object)).unwrap_or_default();
        line.push(b'\n');
        line
    }
}

fn insert(object: &mut Map<String, Value>, key: &str, value: Value) {
    if !key.is_empty() {
        object.insert(key.to_string(), value);
    }
}

fn epoch_seconds(time: &DateTime<Utc>) -> Value {
    Value::from(time.timestamp_micros() as f64 / 1_000_000.0)
}

/// `dir/file.rs:line`, keeping only the last directory of the path.
pub fn short_caller(caller: &Caller) -> String {
    let file = caller.file.replace('\\', "/");
    let mut parts = file.rsplitn(3, '/');
    let short = match (parts.next(), parts.next()) {
        (Some(name), Some(dir)) => format!("{}/{}", dir, name),
        (Some(name), None) => name.to_string(),
        _ => file.clone(),
    };
    format!("{}:{}", short, caller.line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv;

    fn decode(line: &[u8]) -> Value {
        assert_eq!(line.last(), Some(&b'\n'));
        serde_json::from_slice(line).unwrap()
    }

    #[test]
    fn encodes_production_keys_in_order() {
        let mut entry = Entry::new(Level::Warn, "disk almost full");
        entry.logger_name = Some("storage".to_string());
        entry.caller = Some(Location::caller().into());

        let line = JsonEncoder::default().encode(&entry, &[], &kv!["pct" => 93]);
        let text = String::from_utf8(line.clone()).unwrap();
        let json = decode(&line);

        assert_eq!(json["level"], "warn");
        assert!(json["ts"].as_f64().unwrap() > 1_600_000_000.0);
        assert_eq!(json["logger"], "storage");
        assert!(json["caller"].as_str().unwrap().starts_with("src/encoder.rs:"));
        assert_eq!(json["msg"], "disk almost full");
        assert_eq!(json["pct"], 93);

        let order: Vec<_> = ["\"level\"", "\"ts\"", "\"logger\"", "\"caller\"", "\"msg\"", "\"pct\""]
            .iter()
            .map(|key| text.find(key).unwrap())
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]), "{}", text);
    }

    #[test]
    fn call_site_fields_override_context() {
        let entry = Entry::new(Level::Info, "retry");
        let line = JsonEncoder::default().encode(
            &entry,
            &kv!["attempt" => 1, "job" => "sync"],
            &kv!["attempt" => 2],
        );
        let json = decode(&line);

        assert_eq!(json["attempt"], 2);
        assert_eq!(json["job"], "sync");
    }

    #[test]
    fn empty_key_drops_element() {
        let encoder = JsonEncoder::new(EncoderConfig {
            time_key: String::new(),
            ..EncoderConfig::default()
        });
        let json = decode(&encoder.encode(&Entry::new(Level::Info, "x"), &[], &[]));

        assert!(json.get("ts").is_none());
        assert!(json.get("logger").is_none());
        assert_eq!(json["msg"], "x");
    }

    #[test]
    fn stacktrace_is_written_when_present() {
        let mut entry = Entry::new(Level::Error, "boom");
        entry.stack = Some("frame 0".to_string());
        let json = decode(&JsonEncoder::default().encode(&entry, &[], &[]));

        assert_eq!(json["stacktrace"], "frame 0");
    }

    #[test]
    fn short_caller_keeps_last_directory() {
        let short = short_caller(&Location::caller().into());
        assert!(short.starts_with("src/encoder.rs:"), "{}", short);

        let bare = short_caller(&Caller::new("main.rs", 7));
        assert_eq!(bare, "main.rs:7");
    }

    #[test]
    fn fields_cannot_replace_entry_elements() {
        let mut entry = Entry::new(Level::Error, "real failure");
        entry.caller = Some(Caller::new("src/worker.rs", 12));
        let line = JsonEncoder::default().encode(
            &entry,
            &kv!["logger" => "spoofed"],
            &kv!["level" => "debug", "msg" => "fake", "caller" => "x.rs:1", "ts" => 0],
        );
        let json = decode(&line);

        assert_eq!(json["level"], "error");
        assert_eq!(json["msg"], "real failure");
        assert_eq!(json["caller"], "src/worker.rs:12");
        assert!(json["ts"].as_f64().unwrap() > 0.0);
        assert!(json.get("logger").is_none());
        assert_eq!(json["fields.level"], "debug");
        assert_eq!(json["fields.msg"], "fake");
        assert_eq!(json["fields.logger"], "spoofed");
        assert_eq!(json["fields.caller"], "x.rs:1");
    }

    #[test]
    fn reserved_keys_follow_encoder_config() {
        let encoder = JsonEncoder::new(EncoderConfig {
            message_key: "message".to_string(),
            ..EncoderConfig::default()
        });
        let json = decode(&encoder.encode(
            &Entry::new(Level::Info, "kept"),
            &[],
            &kv!["message" => "spoofed", "msg" => "plain field"],
        ));

        assert_eq!(json["message"], "kept");
        assert_eq!(json["fields.message"], "spoofed");
        assert_eq!(json["msg"], "plain field");
    }
}
