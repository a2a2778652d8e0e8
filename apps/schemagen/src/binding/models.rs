use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Seniority {
    Junior,
    Mid,
    Senior,
    Lead,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkExperience {
    pub company_name: String,
    pub position: String,
    pub duration_years: i64,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resume {
    pub name: String,
    pub title: String,
    pub location: String,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub contact: Option<String>,
    pub email: String,
    pub summary: String,
    pub years_of_experience: i64,
    pub seniority: Seniority,
    pub work_experience: Vec<WorkExperience>,
    pub education: String,
    pub skills: String,
    pub certifications: String,
    pub projects: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub explanation: String,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MathReasoning {
    pub steps: Vec<Step>,
    pub final_answer: String,
}

impl Resume {
    pub fn summary_line(&self) -> String {
        format!(
            "{} ({:?}, {} work experience records)",
            self.name,
            self.seniority,
            self.work_experience.len()
        )
    }
}

impl MathReasoning {
    pub fn summary_line(&self) -> String {
        format!("{} steps, final answer {}", self.steps.len(), self.final_answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::validate;
    use crate::schema::catalog::math_reasoning_schema;

    #[test]
    fn test_math_reasoning_matches_schema() {
        let raw = r#"{"steps":[{"explanation":"isolate x","output":"8x=-30"}],"final_answer":"x=-3.75"}"#;
        let doc = validate(raw, &math_reasoning_schema(), true).unwrap();
        let reasoning: MathReasoning = doc.decode().unwrap();
        assert_eq!(reasoning.steps[0].output, "8x=-30");
        assert_eq!(reasoning.summary_line(), "1 steps, final answer x=-3.75");
    }

    #[test]
    fn test_seniority_uses_schema_spelling() {
        let level: Seniority = serde_json::from_str("\"Lead\"").unwrap();
        assert_eq!(level, Seniority::Lead);
        assert!(serde_json::from_str::<Seniority>("\"lead\"").is_err());
    }
}
