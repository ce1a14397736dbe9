//! Employee roster models and validation.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// One roster entry.
///
/// The CSV roster carries an employee code plus department and position; the
/// Sheets roster keys by name and carries a daily wage instead. Fields a
/// backend does not persist stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: Option<String>,
    pub name: String,
    pub department: Option<String>,
    pub position: Option<String>,
    pub daily_wage: Option<f64>,
}

/// Input for adding a roster entry.
#[derive(Debug, Clone, Default)]
pub struct NewEmployee {
    pub id: Option<String>,
    pub name: String,
    pub department: Option<String>,
    pub position: Option<String>,
    pub daily_wage: Option<f64>,
}

impl NewEmployee {
    /// Validate against the current roster.
    ///
    /// The roster is append-only, so duplicate codes and names are rejected
    /// up front; nothing is written on rejection.
    pub fn validate(&self, roster: &[Employee]) -> Result<Employee> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("employee name is required"));
        }

        let id = match &self.id {
            Some(id) if id.trim().is_empty() => {
                return Err(AppError::validation("employee code cannot be blank"));
            }
            Some(id) => Some(id.trim().to_string()),
            None => None,
        };

        if let Some(id) = &id {
            if roster.iter().any(|e| e.id.as_deref() == Some(id)) {
                return Err(AppError::validation(format!(
                    "employee code {id} already exists"
                )));
            }
        }
        if roster.iter().any(|e| e.name == name) {
            return Err(AppError::validation(format!(
                "employee {name} is already on the roster"
            )));
        }

        Ok(Employee {
            id,
            name: name.to_string(),
            department: self.department.clone().filter(|d| !d.trim().is_empty()),
            position: self.position.clone().filter(|p| !p.trim().is_empty()),
            daily_wage: self.daily_wage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<Employee> {
        vec![Employee {
            id: Some("E001".to_string()),
            name: "An Nguyen".to_string(),
            department: Some("IT".to_string()),
            position: Some("Developer".to_string()),
            daily_wage: None,
        }]
    }

    #[test]
    fn test_valid_employee_accepted() {
        let new = NewEmployee {
            id: Some("E002".to_string()),
            name: "Binh Tran".to_string(),
            department: Some("HR".to_string()),
            position: Some("Manager".to_string()),
            daily_wage: None,
        };
        let employee = new.validate(&roster()).unwrap();
        assert_eq!(employee.id.as_deref(), Some("E002"));
        assert_eq!(employee.name, "Binh Tran");
    }

    #[test]
    fn test_blank_name_rejected() {
        let new = NewEmployee {
            name: "   ".to_string(),
            ..Default::default()
        };
        assert!(new.validate(&roster()).is_err());
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let new = NewEmployee {
            id: Some("E001".to_string()),
            name: "Someone Else".to_string(),
            ..Default::default()
        };
        assert!(new.validate(&roster()).is_err());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let new = NewEmployee {
            name: "An Nguyen".to_string(),
            ..Default::default()
        };
        assert!(new.validate(&roster()).is_err());
    }

    #[test]
    fn test_blank_optional_fields_dropped() {
        let new = NewEmployee {
            name: "Chi Le".to_string(),
            department: Some("".to_string()),
            position: None,
            ..Default::default()
        };
        let employee = new.validate(&[]).unwrap();
        assert_eq!(employee.department, None);
        assert_eq!(employee.position, None);
    }
}
