//! Feature Schema - the ordered input layout of the classifier
//!
//! **This list is the contract between callers and the trained model.**
//! The order must match the column order the model was trained with.
//! Reordering, adding or removing a name breaks every exported model.

/// Feature names in the exact order they appear in the vector
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    // === Application (0-5) ===
    "maritalStatus",
    "applicationMode",
    "applicationOrder",
    "course",
    "daytimeAttendance",
    "previousQualification",

    // === Background (6-12) ===
    "previousQualificationGrade",
    "nationality",
    "mothersQualification",
    "fathersQualification",
    "mothersOccupation",
    "fathersOccupation",
    "admissionGrade",

    // === Demographic / financial (13-20) ===
    "displaced",
    "educationalSpecialNeeds",
    "debtor",
    "tuitionFeesUpToDate",
    "gender",
    "scholarshipHolder",
    "ageAtEnrollment",
    "international",

    // === 1st semester curricular units (21-26) ===
    "curricularUnits1stSemCredited",
    "curricularUnits1stSemEnrolled",
    "curricularUnits1stSemEvaluations",
    "curricularUnits1stSemApproved",
    "curricularUnits1stSemGrade",
    "curricularUnits1stSemWithoutEvaluations",

    // === 2nd semester curricular units (27-32) ===
    "curricularUnits2ndSemCredited",
    "curricularUnits2ndSemEnrolled",
    "curricularUnits2ndSemEvaluations",
    "curricularUnits2ndSemApproved",
    "curricularUnits2ndSemGrade",
    "curricularUnits2ndSemWithoutEvaluations",

    // === Macroeconomic (33-35) ===
    "unemploymentRate",
    "inflationRate",
    "gdp",
];

/// Total number of features
pub const FEATURE_COUNT: usize = 36;

/// Check a declared layout against the schema, returning the first mismatch
pub fn first_mismatch<S: AsRef<str>>(names: &[S]) -> Option<String> {
    if names.len() != FEATURE_COUNT {
        return Some(format!(
            "expected {} feature names, found {}",
            FEATURE_COUNT,
            names.len()
        ));
    }

    names
        .iter()
        .zip(FEATURE_NAMES.iter())
        .enumerate()
        .find(|(_, (declared, expected))| declared.as_ref() != **expected)
        .map(|(i, (declared, expected))| {
            format!(
                "feature {} is '{}', expected '{}'",
                i,
                declared.as_ref(),
                expected
            )
        })
}

// ============================================================================
// FEATURE VECTOR
// ============================================================================

/// Ordered model input, one value per schema field
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }
}

#[cfg(test)]
impl FeatureVector {
    /// Value of a named feature
    pub fn value_of(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.0[i])
    }
}
