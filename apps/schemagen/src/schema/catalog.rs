//! Built-in schemas for the bundled use cases.

use super::SchemaNode;

pub const SENIORITY_LEVELS: &[&str] = &["Junior", "Mid", "Senior", "Lead"];

/// Resume with optional contact links.
pub fn resume_schema() -> SchemaNode {
    let work_experience = SchemaNode::object(
        "work_experience",
        vec![
            SchemaNode::string("company_name").describe("Name of the company"),
            SchemaNode::string("position").describe("Position or title held at the company"),
            SchemaNode::integer("duration_years").describe("Duration of employment in years"),
            SchemaNode::array("achievements", SchemaNode::string("achievement"))
                .describe("Key achievements in this role"),
        ],
    );

    assert_well_formed(SchemaNode::object(
        "resume_schema",
        vec![
            SchemaNode::string("name").describe("Full name of the individual"),
            SchemaNode::string("title").describe("Title of the individual"),
            SchemaNode::string("location").describe("Current location or address"),
            SchemaNode::string("linkedin")
                .describe("LinkedIn profile URL")
                .optional(),
            SchemaNode::string("github")
                .describe("GitHub profile URL")
                .optional(),
            SchemaNode::string("contact")
                .describe("Phone number or other contact information")
                .optional(),
            SchemaNode::string("email").describe("Email address"),
            SchemaNode::string("summary")
                .describe("Brief professional summary or objective statement"),
            SchemaNode::integer("years_of_experience")
                .describe("Total years of professional experience"),
            SchemaNode::enumeration("seniority", SENIORITY_LEVELS)
                .describe("Seniority level of the individual"),
            SchemaNode::array("work_experience", work_experience)
                .describe("List of work experiences"),
            SchemaNode::string("education").describe("Education summary"),
            SchemaNode::string("skills").describe("Skills summary"),
            SchemaNode::string("certifications").describe("Certifications summary"),
            SchemaNode::string("projects").describe("Projects summary"),
        ],
    ))
}

/// Resume where every field, contact links included, must be present.
pub fn resume_json_mode_schema() -> SchemaNode {
    assert_well_formed(resume_schema().require_all())
}

/// Step-by-step worked solution followed by a final answer.
pub fn math_reasoning_schema() -> SchemaNode {
    let step = SchemaNode::object(
        "step",
        vec![
            SchemaNode::string("explanation"),
            SchemaNode::string("output"),
        ],
    );

    assert_well_formed(SchemaNode::object(
        "math_reasoning",
        vec![
            SchemaNode::array("steps", step),
            SchemaNode::string("final_answer"),
        ],
    ))
}

fn assert_well_formed(node: SchemaNode) -> SchemaNode {
    if let Err(e) = node.check() {
        panic!("built-in schema '{}' is malformed: {e}", node.name);
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Kind;

    #[test]
    fn test_builtin_schemas_are_well_formed() {
        for schema in [
            resume_schema(),
            resume_json_mode_schema(),
            math_reasoning_schema(),
        ] {
            assert!(schema.check().is_ok(), "{} failed check", schema.name);
        }
    }

    #[test]
    fn test_resume_contact_links_optional() {
        let schema = resume_schema();
        for name in ["linkedin", "github", "contact"] {
            assert!(!schema.field(name).unwrap().required, "{name} should be optional");
        }
        assert!(schema.field("email").unwrap().required);
    }

    #[test]
    fn test_resume_json_mode_requires_everything() {
        let schema = resume_json_mode_schema();
        assert!(schema.fields().iter().all(|f| f.required));
        assert_eq!(schema.fields().len(), resume_schema().fields().len());
    }

    #[test]
    fn test_resume_seniority_levels() {
        let schema = resume_schema();
        let Kind::Enum(values) = &schema.field("seniority").unwrap().kind else {
            panic!("seniority should be an enum");
        };
        assert_eq!(values, &["Junior", "Mid", "Senior", "Lead"]);
    }

    #[test]
    fn test_math_reasoning_field_order() {
        let names: Vec<_> = math_reasoning_schema()
            .fields()
            .iter()
            .map(|f| f.name.clone())
            .collect();
        assert_eq!(names, vec!["steps", "final_answer"]);
    }
}
