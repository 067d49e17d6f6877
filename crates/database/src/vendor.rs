//! Vendor inference and catalog naming rules

/// Vendor bucket for models no rule recognises
pub const VENDOR_OTHER: &str = "Other";

/// Ordered (pattern, vendor) rules, first case-sensitive substring hit wins
pub const VENDOR_RULES: &[(&str, &str)] = &[("Dell", "Dell"), ("Lenovo", "Lenovo"), ("HP", "HP")];

/// Model names offered as suggestions when adding catalog entries
pub const KNOWN_MODELS: &[&str] = &[
    "Dell Latitude 5420",
    "Dell Latitude 5430",
    "Dell Latitude 7420",
    "HP EliteBook 840 G8",
    "Lenovo ThinkPad T14 Gen 2",
];

/// Infer the vendor of a catalog model name
pub fn infer_vendor(model_name: &str) -> &'static str {
    VENDOR_RULES
        .iter()
        .find(|(pattern, _)| model_name.contains(pattern))
        .map(|(_, vendor)| *vendor)
        .unwrap_or(VENDOR_OTHER)
}

/// Build the full catalog name for a manually entered model.
///
/// The vendor is prepended unless it already appears in the model text or is the "Other" bucket.
pub fn compose_model_name(vendor: &str, model: &str) -> String {
    let vendor = vendor.trim();
    let model = model.trim();

    if vendor.is_empty() || vendor == VENDOR_OTHER || model.contains(vendor) {
        model.to_string()
    } else {
        format!("{} {}", vendor, model)
    }
}
