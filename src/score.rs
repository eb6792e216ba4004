//! Composite security score.
//!
//! A pure function over the security-header set and the SSL assessment:
//! fixed per-header points (max 70) plus a grade-to-points mapping applied
//! to the first SSL endpoint (max 30). Recomputed on demand; undefined when
//! either input is absent.

use serde::Serialize;

use crate::adapters::ssl_grade::SslAssessment;
use crate::config::{
    HEADER_CONTENT_SECURITY_POLICY, HEADER_PERMISSIONS_POLICY, HEADER_REFERRER_POLICY,
    HEADER_STRICT_TRANSPORT_SECURITY, HEADER_X_CONTENT_TYPE_OPTIONS, HEADER_X_FRAME_OPTIONS,
    HEADER_X_XSS_PROTECTION,
};
use crate::probes::headers::SecurityHeaders;

/// Points awarded per present security header.
const HEADER_POINTS: &[(&str, u8)] = &[
    (HEADER_STRICT_TRANSPORT_SECURITY, 15),
    (HEADER_CONTENT_SECURITY_POLICY, 20),
    (HEADER_X_CONTENT_TYPE_OPTIONS, 10),
    (HEADER_X_FRAME_OPTIONS, 10),
    (HEADER_REFERRER_POLICY, 5),
    (HEADER_PERMISSIONS_POLICY, 5),
    (HEADER_X_XSS_PROTECTION, 5),
];

/// A derived 0-100 security score with its discrete letter grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompositeScore {
    pub score: u8,
    pub grade: &'static str,
}

/// Points for an SSL letter grade. Unknown grades score zero.
fn grade_points(grade: &str) -> u8 {
    match grade {
        "A+" => 30,
        "A" => 25,
        "A-" => 20,
        "B+" => 15,
        "B" => 10,
        "B-" => 5,
        "C+" => 3,
        "C" => 2,
        "C-" => 1,
        _ => 0,
    }
}

/// Letter grade for a composite score.
fn letter_grade(score: u8) -> &'static str {
    match score {
        90..=u8::MAX => "A+",
        80..=89 => "A",
        70..=79 => "B+",
        60..=69 => "B",
        50..=59 => "C+",
        40..=49 => "C",
        30..=39 => "D",
        _ => "F",
    }
}

/// Computes the composite score from the header set and SSL assessment.
///
/// Returns `None` when either input is absent (the consumer renders
/// nothing in that case). An assessment with no endpoints or no grade on
/// the first endpoint contributes zero SSL points.
pub fn composite_score(
    headers: Option<&SecurityHeaders>,
    ssl: Option<&SslAssessment>,
) -> Option<CompositeScore> {
    let headers = headers?;
    let ssl = ssl?;

    let header_score: u8 = HEADER_POINTS
        .iter()
        .filter(|(name, _)| headers.get(name).is_some())
        .map(|(_, points)| points)
        .sum();

    let ssl_score = ssl.first_grade().map(grade_points).unwrap_or(0);

    let score = header_score + ssl_score;
    Some(CompositeScore {
        score,
        grade: letter_grade(score),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ssl_grade::SslEndpoint;
    use crate::probes::headers::SecurityHeaders;

    fn headers_with(present: &[(&str, &str)]) -> SecurityHeaders {
        SecurityHeaders::from_pairs(present.iter().map(|(k, v)| (*k, Some(v.to_string()))))
    }

    fn assessment_with_grade(grade: Option<&str>) -> SslAssessment {
        SslAssessment {
            host: "example.com".to_string(),
            port: Some(443),
            protocol: Some("http".to_string()),
            status: Some("READY".to_string()),
            endpoints: vec![SslEndpoint {
                grade: grade.map(str::to_string),
                ..Default::default()
            }],
        }
    }

    #[test]
    fn test_hsts_csp_and_grade_a_scores_60_b() {
        let headers = headers_with(&[
            (HEADER_STRICT_TRANSPORT_SECURITY, "max-age=63072000"),
            (HEADER_CONTENT_SECURITY_POLICY, "default-src 'self'"),
        ]);
        let ssl = assessment_with_grade(Some("A"));
        let result = composite_score(Some(&headers), Some(&ssl)).unwrap();
        assert_eq!(result.score, 60);
        assert_eq!(result.grade, "B");
    }

    #[test]
    fn test_all_headers_and_a_plus_scores_100() {
        let headers = headers_with(&[
            (HEADER_STRICT_TRANSPORT_SECURITY, "max-age=1"),
            (HEADER_CONTENT_SECURITY_POLICY, "default-src 'none'"),
            (HEADER_X_CONTENT_TYPE_OPTIONS, "nosniff"),
            (HEADER_X_FRAME_OPTIONS, "DENY"),
            (HEADER_REFERRER_POLICY, "no-referrer"),
            (HEADER_PERMISSIONS_POLICY, "camera=()"),
            (HEADER_X_XSS_PROTECTION, "1; mode=block"),
        ]);
        let ssl = assessment_with_grade(Some("A+"));
        let result = composite_score(Some(&headers), Some(&ssl)).unwrap();
        assert_eq!(result.score, 100);
        assert_eq!(result.grade, "A+");
    }

    #[test]
    fn test_absent_inputs_yield_none() {
        let headers = headers_with(&[]);
        let ssl = assessment_with_grade(Some("A"));
        assert!(composite_score(None, Some(&ssl)).is_none());
        assert!(composite_score(Some(&headers), None).is_none());
        assert!(composite_score(None, None).is_none());
    }

    #[test]
    fn test_no_headers_no_grade_scores_zero_f() {
        let headers = headers_with(&[]);
        let ssl = SslAssessment {
            host: "example.com".to_string(),
            port: None,
            protocol: None,
            status: None,
            endpoints: Vec::new(),
        };
        let result = composite_score(Some(&headers), Some(&ssl)).unwrap();
        assert_eq!(result.score, 0);
        assert_eq!(result.grade, "F");
    }

    #[test]
    fn test_unknown_grade_scores_zero_ssl_points() {
        let headers = headers_with(&[(HEADER_X_FRAME_OPTIONS, "DENY")]);
        let ssl = assessment_with_grade(Some("T"));
        let result = composite_score(Some(&headers), Some(&ssl)).unwrap();
        assert_eq!(result.score, 10);
        assert_eq!(result.grade, "F");
    }

    #[test]
    fn test_grade_thresholds() {
        assert_eq!(letter_grade(90), "A+");
        assert_eq!(letter_grade(89), "A");
        assert_eq!(letter_grade(80), "A");
        assert_eq!(letter_grade(79), "B+");
        assert_eq!(letter_grade(60), "B");
        assert_eq!(letter_grade(50), "C+");
        assert_eq!(letter_grade(40), "C");
        assert_eq!(letter_grade(30), "D");
        assert_eq!(letter_grade(29), "F");
    }
}
