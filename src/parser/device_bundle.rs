// CLASSIFICATION: COMMUNITY
// Filename: device_bundle.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Splitting of clang offload bundles into per-target listings.

use std::collections::BTreeMap;

const START_MARKER: &str = "# __CLANG_OFFLOAD_BUNDLE____START__ ";
const END_MARKER: &str = "# __CLANG_OFFLOAD_BUNDLE____END__ ";

/// Target identifier → exact text between that target's markers.
pub type DeviceCodeBundle = BTreeMap<String, String>;

/// Split bundled output by target.
///
/// Returns `None` when the text holds no start marker at all, meaning it is
/// ordinary single-target output. Each interior line keeps its content and is
/// terminated by `\n`. A bundle whose end marker never arrives is dropped.
pub fn split_device_code(text: &str) -> Option<DeviceCodeBundle> {
    let mut bundles = DeviceCodeBundle::new();
    let mut seen_start = false;
    let mut open: Option<(&str, String)> = None;

    for line in text.split('\n') {
        if let Some(target) = line.strip_prefix(START_MARKER) {
            seen_start = true;
            open = Some((target.trim_end(), String::new()));
        } else if let Some(target) = line.strip_prefix(END_MARKER) {
            match open.take() {
                Some((name, body)) if name == target.trim_end() => {
                    bundles.insert(name.to_owned(), body);
                }
                other => open = other,
            }
        } else if let Some((_, body)) = open.as_mut() {
            body.push_str(line);
            body.push('\n');
        }
    }

    seen_start.then_some(bundles)
}

/// Name of the host bundle, if the split produced one.
pub fn host_target(bundle: &DeviceCodeBundle) -> Option<&str> {
    bundle
        .keys()
        .map(String::as_str)
        .find(|name| name.starts_with("host-"))
}
