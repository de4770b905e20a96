use std::collections::BTreeMap;

use once_cell::sync::Lazy;

static EN_MESSAGES: Lazy<BTreeMap<String, String>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../i18n/en.json")).unwrap_or_default()
});

/// The embedded English message table.
pub fn catalog() -> &'static BTreeMap<String, String> {
    &EN_MESSAGES
}

/// Looks up `key`, falling back to the key itself.
pub fn tr(key: &str) -> String {
    EN_MESSAGES
        .get(key)
        .cloned()
        .unwrap_or_else(|| key.to_string())
}

/// Like [`tr`], filling each `{}` in order.
pub fn trf(key: &str, args: &[&str]) -> String {
    let mut msg = tr(key);
    for arg in args {
        msg = msg.replacen("{}", arg, 1);
    }
    msg
}
