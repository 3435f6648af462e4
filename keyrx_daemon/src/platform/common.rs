//! Common types shared across platform backends.

/// Information about a discovered input device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// System path to the device node (Linux: `/dev/input/eventX`).
    pub path: String,
    /// Human-readable device name.
    pub name: String,
    /// Serial number, if the device reports one.
    pub serial: Option<String>,
    /// Physical location identifier, if available.
    pub phys: Option<String>,
}

/// Matches a device against a glob-ish pattern: `*` matches anything, an
/// exact string must match the name, serial, or path case-insensitively, and
/// a trailing `*` matches a prefix.
pub fn match_device(info: &DeviceInfo, pattern: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    let pattern_lower = pattern.to_lowercase();
    if let Some(prefix) = pattern_lower.strip_suffix('*') {
        return info.name.to_lowercase().starts_with(prefix)
            || info.path.to_lowercase().starts_with(prefix);
    }
    info.name.eq_ignore_ascii_case(pattern)
        || info.path.eq_ignore_ascii_case(pattern)
        || info.serial.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(name: &str) -> DeviceInfo {
        DeviceInfo { path: "/dev/input/event0".into(), name: name.into(), serial: None, phys: None }
    }

    #[test]
    fn wildcard_matches_anything() {
        assert!(match_device(&info("whatever"), "*"));
    }

    #[test]
    fn prefix_pattern_matches_case_insensitively() {
        assert!(match_device(&info("Logitech USB Keyboard"), "logitech*"));
        assert!(!match_device(&info("Razer Keyboard"), "logitech*"));
    }

    #[test]
    fn exact_name_matches_case_insensitively() {
        assert!(match_device(&info("USB Keyboard"), "usb keyboard"));
    }
}
