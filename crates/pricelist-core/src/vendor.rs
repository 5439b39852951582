//! Vendor identity derivation from filenames.
//!
//! Vendors upload files named like `AcmeSupplies_20250106.pdf`; the label is
//! whatever precedes the first digit, cleaned of separator characters. The
//! derivation is pure and deterministic and, for any non-empty filename,
//! always produces a non-empty label.

/// A vendor identity string derived from a filename.
pub type VendorLabel = String;

/// Separator characters trimmed from the edges of a derived label.
const SEPARATORS: &[char] = &['_', '-', ' '];

/// Derive a vendor label from a filename (no path, extension optional).
///
/// Algorithm: strip the file extension, take the maximal leading run of
/// non-digit characters, and trim separator characters from its edges. A
/// name with no digits maps to its whole stem; if trimming leaves nothing
/// (e.g. the name starts with a digit), the label falls back to the
/// extension-stripped name, then to the full filename.
///
/// ```
/// use pricelist_core::vendor_label;
///
/// assert_eq!(vendor_label("AcmeSupplies_20250106.pdf"), "AcmeSupplies");
/// assert_eq!(vendor_label("PlainVendor.pdf"), "PlainVendor");
/// assert_eq!(vendor_label("2025_winter_list.pdf"), "2025_winter_list");
/// ```
#[must_use]
pub fn vendor_label(filename: &str) -> VendorLabel {
    let stem = match filename.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => filename,
    };

    // Digits are ASCII, so the byte index is a char boundary.
    let leading = match stem.find(|c: char| c.is_ascii_digit()) {
        Some(first_digit) => &stem[..first_digit],
        None => stem,
    };

    let label = leading.trim_matches(SEPARATORS);
    if !label.is_empty() {
        label.to_string()
    } else {
        stem.to_string()
    }
}
