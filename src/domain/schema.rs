use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const REQUIRED_FIELDS: [&str; 31] = [
    "appointment_date",
    "employee_name",
    "employee_first_name",
    "employee_city",
    "posting_city",
    "joining_date",
    "designation",
    "center_name",
    "date_of_birth",
    "basic_monthly",
    "basic_annual",
    "hra_monthly",
    "hra_annual",
    "special_allowance_monthly",
    "special_allowance_annual",
    "mobile_allowance_monthly",
    "mobile_allowance_annual",
    "gross_monthly",
    "gross_annual",
    "epf_monthly",
    "epf_annual",
    "pt_monthly",
    "pt_annual",
    "total_deduction_monthly",
    "total_deduction_annual",
    "net_salary_monthly",
    "net_salary_annual",
    "employer_pf_monthly",
    "employer_pf_annual",
    "ctc_monthly",
    "ctc_annual",
];

pub const DATE_FIELDS: [&str; 3] = ["appointment_date", "joining_date", "date_of_birth"];

pub const NAME_FIELD: &str = "employee_name";

/// Columns every dataset must carry, and which of them hold dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSchema {
    pub required_fields: Vec<String>,
    pub date_fields: Vec<String>,
}

impl Default for FieldSchema {
    fn default() -> Self {
        Self {
            required_fields: REQUIRED_FIELDS.iter().map(|s| s.to_string()).collect(),
            date_fields: DATE_FIELDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl FieldSchema {
    /// Required names absent from `columns`, in schema order.
    pub fn missing_fields<S: AsRef<str>>(&self, columns: &[S]) -> Vec<String> {
        let present: HashSet<&str> = columns.iter().map(|c| c.as_ref()).collect();
        self.required_fields
            .iter()
            .filter(|field| !present.contains(field.as_str()))
            .cloned()
            .collect()
    }

    pub fn is_date_field(&self, field: &str) -> bool {
        self.date_fields.iter().any(|f| f == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_header_has_nothing_missing() {
        let schema = FieldSchema::default();
        let mut columns: Vec<&str> = REQUIRED_FIELDS.to_vec();
        columns.reverse();
        columns.push("extra_notes");

        assert!(schema.missing_fields(&columns).is_empty());
    }

    #[test]
    fn test_missing_fields_follow_schema_order() {
        let schema = FieldSchema::default();
        let columns: Vec<&str> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|c| !matches!(*c, "ctc_annual" | "employee_name" | "joining_date"))
            .collect();

        assert_eq!(
            schema.missing_fields(&columns),
            vec!["employee_name", "joining_date", "ctc_annual"]
        );
    }

    #[test]
    fn test_empty_header_misses_everything() {
        let schema = FieldSchema::default();
        let columns: Vec<String> = vec![];
        assert_eq!(schema.missing_fields(&columns).len(), REQUIRED_FIELDS.len());
    }

    #[test]
    fn test_date_fields() {
        let schema = FieldSchema::default();
        assert!(schema.is_date_field("joining_date"));
        assert!(!schema.is_date_field("basic_monthly"));
    }
}
