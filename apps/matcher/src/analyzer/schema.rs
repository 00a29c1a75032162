//! Wire shapes the model must produce. Unknown keys are ignored; a missing
//! required key fails deserialization, which the analyzer reports as a schema
//! violation. "Required" keys may still be `null`.

use serde::{Deserialize, Deserializer};

/// Present-but-nullable: rejects a missing key, accepts `null`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawResumeFacts {
    #[serde(deserialize_with = "nullable")]
    pub name: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub email: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub phone: Option<String>,
    pub skills: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub years_experience: Option<f64>,
    #[serde(deserialize_with = "nullable")]
    pub education_level: Option<String>,
    pub languages: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub self_reported_score: Option<f64>,
    #[serde(deserialize_with = "nullable")]
    pub summary: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub salary_min: Option<f64>,
    #[serde(default)]
    pub salary_max: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawInterviewQuestions {
    pub questions: Vec<RawInterviewQuestion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawInterviewQuestion {
    pub question: String,
    #[serde(default)]
    pub skill: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
}
