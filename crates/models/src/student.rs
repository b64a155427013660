use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

pub const NAME_MIN_LEN: usize = 3;
pub const NAME_MAX_LEN: usize = 50;
pub const MARKS_MIN_COUNT: usize = 1;
pub const MARKS_MAX_COUNT: usize = 10;

/// Stored student record. `average` is derived from `marks` and never taken
/// from a request body.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Student {
    pub id: u64,
    pub name: String,
    pub age: u32,
    pub grade: String,
    pub marks: Vec<i64>,
    pub average: f64,
}

/// Create input: all client-supplied fields. Unknown keys in the body
/// (including `average`) are ignored by serde.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewStudent {
    pub id: u64,
    pub name: String,
    pub age: u32,
    pub grade: String,
    pub marks: Vec<i64>,
}

/// Patch input: only fields present in the body are merged. `id` is not part
/// of this shape, so it cannot be changed through a patch.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct StudentUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<Vec<i64>>,
}

/// Mean of `marks` rounded to 2 decimal places.
pub fn average_of(marks: &[i64]) -> f64 {
    let sum: i64 = marks.iter().sum();
    let avg = sum as f64 / marks.len() as f64;
    (avg * 100.0).round() / 100.0
}

impl NewStudent {
    /// Field-level constraints first, then the per-mark bounds check.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.id == 0 {
            return Err(ModelError::Validation("id must be a positive integer".into()));
        }
        let name_len = self.name.chars().count();
        if !(NAME_MIN_LEN..=NAME_MAX_LEN).contains(&name_len) {
            return Err(ModelError::Validation(format!(
                "name length must be between {NAME_MIN_LEN} and {NAME_MAX_LEN} characters"
            )));
        }
        if self.age <= 5 || self.age >= 100 {
            return Err(ModelError::Validation(
                "age must be greater than 5 and less than 100".into(),
            ));
        }
        if !(MARKS_MIN_COUNT..=MARKS_MAX_COUNT).contains(&self.marks.len()) {
            return Err(ModelError::Validation(format!(
                "marks must contain between {MARKS_MIN_COUNT} and {MARKS_MAX_COUNT} entries"
            )));
        }
        if self.marks.iter().any(|m| !(0..=100).contains(m)) {
            return Err(ModelError::Validation("marks must be between 0 and 100".into()));
        }
        Ok(())
    }

    /// Validate, then attach the derived `average`.
    pub fn into_student(self) -> Result<Student, ModelError> {
        self.validate()?;
        let average = average_of(&self.marks);
        Ok(Student {
            id: self.id,
            name: self.name,
            age: self.age,
            grade: self.grade,
            marks: self.marks,
            average,
        })
    }
}

impl Student {
    /// Merge only the supplied fields. Merged values are not re-validated,
    /// matching the documented patch contract. `average` is recomputed
    /// whenever `marks` is among the supplied fields.
    pub fn apply_update(&mut self, update: StudentUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(age) = update.age {
            self.age = age;
        }
        if let Some(grade) = update.grade {
            self.grade = grade;
        }
        if let Some(marks) = update.marks {
            self.average = average_of(&marks);
            self.marks = marks;
        }
    }
}
