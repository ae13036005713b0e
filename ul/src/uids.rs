//! Process-wide registry of the UIDs
//! that the upper layer machinery needs to know about.
//!
//! The registry is read-only and initialised at compile time.

/// Verification SOP Class: "1.2.840.10008.1.1"
pub const VERIFICATION: &str = "1.2.840.10008.1.1";

/// Implicit VR Little Endian: "1.2.840.10008.1.2"
pub const IMPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2";

/// Explicit VR Little Endian: "1.2.840.10008.1.2.1"
pub const EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1";

/// Explicit VR Big Endian: "1.2.840.10008.1.2.2"
pub const EXPLICIT_VR_BIG_ENDIAN: &str = "1.2.840.10008.1.2.2";

/// DICOM Application Context Name: "1.2.840.10008.3.1.1.1"
pub const APPLICATION_CONTEXT_NAME: &str = "1.2.840.10008.3.1.1.1";

/// The name ↔ UID registry entries.
static REGISTRY: [(&str, &str); 5] = [
    ("Verification SOP Class", VERIFICATION),
    ("Implicit VR Little Endian", IMPLICIT_VR_LITTLE_ENDIAN),
    ("Explicit VR Little Endian", EXPLICIT_VR_LITTLE_ENDIAN),
    ("Explicit VR Big Endian", EXPLICIT_VR_BIG_ENDIAN),
    ("DICOM Application Context Name", APPLICATION_CONTEXT_NAME),
];

/// Look up a registered UID by its name.
pub fn uid_by_name(name: &str) -> Option<&'static str> {
    REGISTRY
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, uid)| *uid)
}

/// Look up the name of a registered UID.
pub fn name_by_uid(uid: &str) -> Option<&'static str> {
    REGISTRY
        .iter()
        .find(|(_, u)| *u == uid)
        .map(|(n, _)| *n)
}

/// Classify a transfer syntax UID
/// into its `(implicit_vr, little_endian)` encoding flags.
///
/// Any UID other than the three uncompressed transfer syntaxes
/// is treated as explicit VR little endian,
/// which holds for all encapsulated transfer syntaxes.
pub fn transfer_syntax_flags(uid: &str) -> (bool, bool) {
    let uid = uid.trim_end_matches(|c: char| c.is_whitespace() || c == '\0');
    match uid {
        IMPLICIT_VR_LITTLE_ENDIAN => (true, true),
        EXPLICIT_VR_BIG_ENDIAN => (false, false),
        _ => (false, true),
    }
}
