//! Risk factor annotation
//!
//! Heuristic explanation of a prediction from fixed thresholds on a handful
//! of raw request fields. This is not derived from the model: it reads the
//! request independently and never fails, falling back to defaults for any
//! field that is absent or not numeric.

use crate::models::{Outcome, PredictionRequest, RiskFactor};

// ============================================================================
// THRESHOLDS
// ============================================================================

const LOW_GRADE: f64 = 10.0;
const STRONG_GRADE: f64 = 14.0;
const MIN_APPROVAL_RATE: f64 = 0.5;
const MATURE_AGE: f64 = 25.0;
const LOW_ADMISSION_GRADE: f64 = 100.0;
const HIGH_ADMISSION_GRADE: f64 = 150.0;

// ============================================================================
// PROFILE
// ============================================================================

/// Per-semester curricular unit figures
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SemesterRecord {
    pub grade: f64,
    pub enrolled: f64,
    pub approved: f64,
    pub evaluations: f64,
}

impl Default for SemesterRecord {
    fn default() -> Self {
        Self {
            grade: 0.0,
            enrolled: 1.0,
            approved: 0.0,
            evaluations: 0.0,
        }
    }
}

impl SemesterRecord {
    /// Approved / enrolled, `None` when nothing was enrolled
    pub fn approval_rate(&self) -> Option<f64> {
        (self.enrolled > 0.0).then(|| self.approved / self.enrolled)
    }
}

/// The fields the annotator looks at, with their fallback values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskProfile {
    pub first_semester: SemesterRecord,
    pub second_semester: SemesterRecord,
    pub debtor: f64,
    pub tuition_fees_up_to_date: f64,
    pub scholarship_holder: f64,
    pub age_at_enrollment: f64,
    pub admission_grade: f64,
}

impl Default for RiskProfile {
    fn default() -> Self {
        Self {
            first_semester: SemesterRecord::default(),
            second_semester: SemesterRecord::default(),
            debtor: 0.0,
            tuition_fees_up_to_date: 1.0,
            scholarship_holder: 0.0,
            age_at_enrollment: 18.0,
            admission_grade: 0.0,
        }
    }
}

impl RiskProfile {
    /// Read the profile leniently from a raw request
    pub fn from_request(request: &PredictionRequest) -> Self {
        let defaults = Self::default();
        let read = |field: &str, default: f64| request.number(field).unwrap_or(default);

        let semester = |prefix: &str, default: SemesterRecord| SemesterRecord {
            grade: read(&format!("{}Grade", prefix), default.grade),
            enrolled: read(&format!("{}Enrolled", prefix), default.enrolled),
            approved: read(&format!("{}Approved", prefix), default.approved),
            evaluations: read(&format!("{}Evaluations", prefix), default.evaluations),
        };

        Self {
            first_semester: semester("curricularUnits1stSem", defaults.first_semester),
            second_semester: semester("curricularUnits2ndSem", defaults.second_semester),
            debtor: read("debtor", defaults.debtor),
            tuition_fees_up_to_date: read("tuitionFeesUpToDate", defaults.tuition_fees_up_to_date),
            scholarship_holder: read("scholarshipHolder", defaults.scholarship_holder),
            age_at_enrollment: read("ageAtEnrollment", defaults.age_at_enrollment),
            admission_grade: read("admissionGrade", defaults.admission_grade),
        }
    }
}

// ============================================================================
// ANNOTATION
// ============================================================================

/// Annotate a raw request given the predicted outcome
pub fn analyze_risk_factors(request: &PredictionRequest, outcome: Outcome) -> Vec<RiskFactor> {
    annotate(&RiskProfile::from_request(request), outcome)
}

/// Run every check in order. The result is never empty.
pub fn annotate(profile: &RiskProfile, outcome: Outcome) -> Vec<RiskFactor> {
    let mut factors = Vec::new();
    let first = &profile.first_semester;
    let second = &profile.second_semester;

    // Academic performance
    if first.grade < LOW_GRADE || second.grade < LOW_GRADE {
        factors.push(RiskFactor::negative("Low academic grades (below 10)"));
    } else if first.grade > STRONG_GRADE && second.grade > STRONG_GRADE {
        factors.push(RiskFactor::positive("Strong academic performance (grades above 14)"));
    }

    // Approval rates
    for (semester, label) in [(first, "first"), (second, "second")] {
        if let Some(rate) = semester.approval_rate() {
            if rate < MIN_APPROVAL_RATE {
                factors.push(RiskFactor::negative(format!(
                    "Low {} semester approval rate ({:.0}%)",
                    label,
                    rate * 100.0
                )));
            }
        }
    }

    // Financial
    if profile.debtor == 1.0 {
        factors.push(RiskFactor::negative("Student has outstanding debts"));
    }
    if profile.tuition_fees_up_to_date == 0.0 {
        factors.push(RiskFactor::negative("Tuition fees not up to date"));
    }
    if profile.scholarship_holder == 1.0 {
        factors.push(RiskFactor::positive("Scholarship holder (positive factor)"));
    }

    if profile.age_at_enrollment > MATURE_AGE {
        factors.push(RiskFactor::neutral(format!(
            "Mature student (age {})",
            profile.age_at_enrollment
        )));
    }

    if profile.admission_grade < LOW_ADMISSION_GRADE {
        factors.push(RiskFactor::negative("Low admission grade"));
    } else if profile.admission_grade > HIGH_ADMISSION_GRADE {
        factors.push(RiskFactor::positive("High admission grade (positive factor)"));
    }

    // Evaluations without passing
    for (semester, label) in [(first, "first"), (second, "second")] {
        if semester.evaluations > semester.approved {
            factors.push(RiskFactor::negative(format!(
                "Multiple evaluation attempts in {} semester",
                label
            )));
        }
    }

    if factors.is_empty() {
        factors.push(match outcome {
            Outcome::Graduate => RiskFactor::positive("Overall strong academic profile"),
            Outcome::Enrolled => RiskFactor::neutral("Mixed performance indicators"),
            Outcome::Dropout => RiskFactor::negative("Multiple concerning factors detected"),
        });
    }

    factors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Polarity;
    use serde_json::json;

    fn texts(factors: &[RiskFactor]) -> Vec<&str> {
        factors.iter().map(|f| f.text.as_str()).collect()
    }

    /// A profile that triggers no check at all
    fn quiet_request() -> PredictionRequest {
        let mut request = PredictionRequest::default();
        for (field, value) in [
            ("curricularUnits1stSemGrade", 12.0),
            ("curricularUnits2ndSemGrade", 13.0),
            ("curricularUnits1stSemEnrolled", 6.0),
            ("curricularUnits1stSemApproved", 5.0),
            ("curricularUnits1stSemEvaluations", 5.0),
            ("curricularUnits2ndSemEnrolled", 6.0),
            ("curricularUnits2ndSemApproved", 6.0),
            ("curricularUnits2ndSemEvaluations", 6.0),
            ("debtor", 0.0),
            ("tuitionFeesUpToDate", 1.0),
            ("scholarshipHolder", 0.0),
            ("ageAtEnrollment", 20.0),
            ("admissionGrade", 125.0),
        ] {
            request.insert(field, value);
        }
        request
    }

    #[test]
    fn test_low_grades_scenario() {
        let mut request = quiet_request();
        request.insert("curricularUnits1stSemGrade", 8.0);
        request.insert("curricularUnits2ndSemGrade", 7.0);

        let factors = analyze_risk_factors(&request, Outcome::Dropout);
        assert!(texts(&factors).contains(&"Low academic grades (below 10)"));
        assert_eq!(factors[0].polarity, Polarity::Negative);
    }

    #[test]
    fn test_strong_student_scenario() {
        let mut request = quiet_request();
        request.insert("curricularUnits1stSemGrade", 16.0);
        request.insert("curricularUnits2ndSemGrade", 16.0);
        request.insert("admissionGrade", 160.0);

        let factors = analyze_risk_factors(&request, Outcome::Graduate);
        assert_eq!(
            texts(&factors),
            vec![
                "Strong academic performance (grades above 14)",
                "High admission grade (positive factor)",
            ]
        );
        assert!(factors.iter().all(|f| f.polarity == Polarity::Positive));
    }

    #[test]
    fn test_one_low_semester_blocks_strong_branch() {
        let mut request = quiet_request();
        request.insert("curricularUnits1stSemGrade", 18.0);
        request.insert("curricularUnits2ndSemGrade", 9.5);

        let factors = analyze_risk_factors(&request, Outcome::Enrolled);
        assert_eq!(texts(&factors), vec!["Low academic grades (below 10)"]);
    }

    #[test]
    fn test_fallback_is_the_only_factor() {
        let request = quiet_request();

        assert_eq!(
            texts(&analyze_risk_factors(&request, Outcome::Enrolled)),
            vec!["Mixed performance indicators"]
        );
        assert_eq!(
            texts(&analyze_risk_factors(&request, Outcome::Graduate)),
            vec!["Overall strong academic profile"]
        );
        assert_eq!(
            texts(&analyze_risk_factors(&request, Outcome::Dropout)),
            vec!["Multiple concerning factors detected"]
        );
    }

    #[test]
    fn test_approval_rate_formatting() {
        let mut request = quiet_request();
        request.insert("curricularUnits1stSemEnrolled", 6.0);
        request.insert("curricularUnits1stSemApproved", 2.0);
        request.insert("curricularUnits1stSemEvaluations", 2.0);
        request.insert("curricularUnits2ndSemEnrolled", 0.0);
        request.insert("curricularUnits2ndSemApproved", 0.0);
        request.insert("curricularUnits2ndSemEvaluations", 0.0);

        let factors = analyze_risk_factors(&request, Outcome::Enrolled);
        // Zero enrolled units skip the second semester rate entirely
        assert_eq!(texts(&factors), vec!["Low first semester approval rate (33%)"]);
    }

    #[test]
    fn test_financial_and_age_factors_in_order() {
        let mut request = quiet_request();
        request.insert("debtor", 1.0);
        request.insert("tuitionFeesUpToDate", 0.0);
        request.insert("scholarshipHolder", 1.0);
        request.insert("ageAtEnrollment", 31.0);

        let factors = analyze_risk_factors(&request, Outcome::Dropout);
        assert_eq!(
            texts(&factors),
            vec![
                "Student has outstanding debts",
                "Tuition fees not up to date",
                "Scholarship holder (positive factor)",
                "Mature student (age 31)",
            ]
        );
    }

    #[test]
    fn test_fractional_age_is_printed_as_given() {
        let mut request = quiet_request();
        request.insert("ageAtEnrollment", 26.5);

        let factors = analyze_risk_factors(&request, Outcome::Enrolled);
        assert_eq!(texts(&factors), vec!["Mature student (age 26.5)"]);
    }

    #[test]
    fn test_evaluation_attempts() {
        let mut request = quiet_request();
        request.insert("curricularUnits1stSemEvaluations", 9.0);
        request.insert("curricularUnits2ndSemEvaluations", 8.0);

        let factors = analyze_risk_factors(&request, Outcome::Enrolled);
        assert_eq!(
            texts(&factors),
            vec![
                "Multiple evaluation attempts in first semester",
                "Multiple evaluation attempts in second semester",
            ]
        );
    }

    #[test]
    fn test_empty_request_uses_defaults() {
        assert_eq!(RiskProfile::from_request(&PredictionRequest::default()), RiskProfile::default());

        // Defaults: grades 0, approval 0/1, admission 0
        let factors = analyze_risk_factors(&PredictionRequest::default(), Outcome::Dropout);
        assert_eq!(
            texts(&factors),
            vec![
                "Low academic grades (below 10)",
                "Low first semester approval rate (0%)",
                "Low second semester approval rate (0%)",
                "Low admission grade",
            ]
        );
    }

    #[test]
    fn test_unparseable_field_falls_back_to_default() {
        let mut request = quiet_request();
        request.insert("ageAtEnrollment", json!("unknown"));
        request.insert("debtor", json!("1"));

        let profile = RiskProfile::from_request(&request);
        assert_eq!(profile.age_at_enrollment, 18.0);
        assert_eq!(profile.debtor, 1.0);
    }
}
