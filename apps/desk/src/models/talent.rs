use serde::{Deserialize, Deserializer, Serialize};

/// Maximum interview note length, in characters.
pub const MAX_INTERVIEW_RECORD_CHARS: usize = 10_000;

/// A candidate record as served by the talent API. `phone` is the key for
/// every per-talent operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Talent {
    #[serde(deserialize_with = "phone_from_string_or_number")]
    pub phone: String,
    pub name: String,
    pub age: Option<i32>,
    pub email: Option<String>,
    pub job_position: Option<String>,
    pub education: Option<String>,
    pub major: Option<String>,
    pub years: Option<i32>,
    pub native: Option<String>,
    pub blog: Option<String>,
    pub github: Option<String>,
    pub expect_salary: Option<i32>,
    #[serde(deserialize_with = "list_or_null")]
    pub skills: Vec<String>,
    #[serde(deserialize_with = "list_or_null")]
    pub companies: Vec<String>,
    #[serde(deserialize_with = "list_or_null")]
    pub universities: Vec<String>,
    #[serde(deserialize_with = "list_or_null")]
    pub expect_cities: Vec<String>,
    pub experience_score: Option<f32>,
    pub education_score: Option<f32>,
    pub technical_score: Option<f32>,
    pub average_score: Option<f32>,
    pub interview_record: String,
    pub resume_path: Option<String>,
}

impl Talent {
    /// A zero score from the server means "not scored yet".
    pub fn scored(value: Option<f32>) -> Option<f32> {
        value.filter(|v| *v != 0.0 && v.is_finite())
    }

    pub fn average(&self) -> Option<f32> {
        Self::scored(self.average_score)
    }

    /// Resume path with empty strings treated as absent.
    pub fn resume(&self) -> Option<&str> {
        self.resume_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// The server stores phones as integers; older payloads send strings.
fn phone_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Phone {
        Text(String),
        Number(u64),
    }

    Ok(match Option::<Phone>::deserialize(deserializer)? {
        Some(Phone::Text(s)) => s,
        Some(Phone::Number(n)) => n.to_string(),
        None => String::new(),
    })
}

fn list_or_null<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_numeric_phone_and_camel_case_fields() {
        let talent: Talent = serde_json::from_str(
            r#"{
                "phone": 13800138000,
                "name": "Li Lei",
                "jobPosition": "backend",
                "skills": ["rust", "python"],
                "expectCities": ["Shenzhen"],
                "averageScore": 6.5,
                "interviewRecord": "strong systems background",
                "resumePath": "resumes/li.pdf"
            }"#,
        )
        .unwrap();

        assert_eq!(talent.phone, "13800138000");
        assert_eq!(talent.job_position.as_deref(), Some("backend"));
        assert_eq!(talent.skills, vec!["rust", "python"]);
        assert_eq!(talent.average(), Some(6.5));
        assert_eq!(talent.resume(), Some("resumes/li.pdf"));
    }

    #[test]
    fn test_missing_fields_default_and_zero_scores_are_unscored() {
        let talent: Talent =
            serde_json::from_str(r#"{"phone":"123","averageScore":0,"resumePath":""}"#).unwrap();
        assert_eq!(talent.phone, "123");
        assert!(talent.companies.is_empty());
        assert_eq!(talent.average(), None);
        assert_eq!(talent.resume(), None);
        assert_eq!(talent.interview_record, "");
    }

    #[test]
    fn test_negative_numbers_do_not_fail_the_list() {
        let talents: Vec<Talent> = serde_json::from_str(
            r#"[
                {"phone": 1, "age": -1, "years": -3, "expectSalary": -500},
                {"phone": 2, "age": 29, "years": 6, "expectSalary": 30000}
            ]"#,
        )
        .unwrap();

        assert_eq!(talents.len(), 2);
        assert_eq!(talents[0].age, Some(-1));
        assert_eq!(talents[0].years, Some(-3));
        assert_eq!(talents[0].expect_salary, Some(-500));
        assert_eq!(talents[1].years, Some(6));
    }

    #[test]
    fn test_null_phone_becomes_empty() {
        let talent: Talent =
            serde_json::from_str(r#"{"phone":null,"name":"x","skills":null}"#).unwrap();
        assert_eq!(talent.phone, "");
        assert!(talent.skills.is_empty());
    }
}
