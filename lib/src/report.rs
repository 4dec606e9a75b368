//! The crash report data model.
//!
//! A report is parsed once from JSON and treated as immutable for the whole
//! symbolication pass. The field names follow the Apple-style camelCase crash
//! report format.

use debugid::DebugId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root value for one symbolication run.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrashReport {
    /// Index into `threads` of the thread that caused termination.
    #[serde(alias = "faultingThreadIndex")]
    pub faulting_thread: usize,
    #[serde(default)]
    pub threads: Vec<Thread>,
    #[serde(default)]
    pub used_images: Vec<Image>,
    #[serde(default)]
    pub termination: Termination,
}

/// Platform termination/signal information. A code of 0 means unknown.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Termination {
    #[serde(default)]
    pub code: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    #[serde(default)]
    pub frames: Vec<Frame>,
    #[serde(default, deserialize_with = "thread_state")]
    pub thread_state: HashMap<String, RegisterValue>,
}

/// A single saved register. Reports attach extra per-register metadata; only
/// the numeric `value` field is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterValue {
    pub value: u64,
}

/// Register state entries come in whatever shape the reporter produced.
/// Anything that is not an object with a numeric `value` field is treated as
/// "value unknown" and dropped, never as a parse failure.
fn thread_state<'de, D>(deserializer: D) -> Result<HashMap<String, RegisterValue>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = HashMap::<String, serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(name, entry)| {
            let value = entry.get("value")?.as_u64()?;
            Some((name, RegisterValue { value }))
        })
        .collect())
}

/// A loaded binary image. The `uuid` ties frames on this image to the debug
/// archive entry holding its symbols.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(alias = "debugId")]
    pub uuid: DebugId,
    #[serde(default)]
    pub base: u64,
    #[serde(default)]
    pub name: String,
}

/// One stack frame. Input frames carry only the offset and image index;
/// symbolication fills in `symbol` and `symbol_location`, producing zero or
/// more output frames per input frame (inline expansion).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub image_offset: u64,
    pub image_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol_location: Option<u64>,
}

/// Output of a whole-report walk. Thread identity and frame order are
/// preserved; each input frame's expansion is spliced in place.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolicatedReport {
    pub faulting_thread: usize,
    pub threads: Vec<SymbolicatedThread>,
}

#[derive(Debug, Serialize)]
pub struct SymbolicatedThread {
    pub frames: Vec<Frame>,
}
