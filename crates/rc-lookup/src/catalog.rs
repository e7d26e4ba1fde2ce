//! Known field labels probed on every RC page.
//!
//! Synonyms ("Owner Name", "Owner's Name") are separate entries and produce
//! separate keys in the output. They are not unified into one field.

/// Labels probed by [`crate::scan::scan`], in probe order.
pub const FIELD_CATALOG: &[&str] = &[
    // Owner identity
    "Owner Name",
    "Owner",
    "Name",
    "Owner's Name",
    "Father's Name",
    "Father Name",
    "Father",
    // Registration
    "Registration No",
    "Registration Number",
    "Registration",
    // Vehicle
    "Model Name",
    "Model",
    "Vehicle Model",
    "Maker Model",
    "Make",
    "Vehicle Class",
    "Fuel Type",
    "Fuel",
    "Registration Date",
    "Registered On",
    // Validity
    "Insurance Company",
    "Insurance No",
    "Insurance Expiry",
    "Insurance Upto",
    "Fitness Upto",
    "Tax Upto",
    "PUC No",
    "PUC Upto",
    // Office and contact
    "Registered RTO",
    "RTO",
    "Address",
    "City",
    "Phone",
    "Mobile",
    // Identification numbers
    "Engine No",
    "Engine Number",
    "Chassis No",
    "Chassis Number",
];
