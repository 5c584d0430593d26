//! Column layout the classifier was trained on

/// Number of model input columns
pub const SCHEMA_LEN: usize = 19;

/// Training column order. Every normalized row follows exactly this order.
pub const EXPECTED_SCHEMA: [&str; SCHEMA_LEN] = [
    "gender",
    "SeniorCitizen",
    "Partner",
    "Dependents",
    "tenure",
    "PhoneService",
    "MultipleLines",
    "InternetService",
    "OnlineSecurity",
    "OnlineBackup",
    "DeviceProtection",
    "TechSupport",
    "StreamingTV",
    "StreamingMovies",
    "Contract",
    "PaperlessBilling",
    "PaymentMethod",
    "MonthlyCharges",
    "TotalCharges",
];

/// Position of a field in the schema
pub fn column_index(name: &str) -> Option<usize> {
    EXPECTED_SCHEMA.iter().position(|c| *c == name)
}

/// Check that a list of feature names matches the schema exactly
pub fn matches_schema<S: AsRef<str>>(names: &[S]) -> bool {
    names.len() == SCHEMA_LEN
        && names
            .iter()
            .zip(EXPECTED_SCHEMA.iter())
            .all(|(a, b)| a.as_ref() == *b)
}
