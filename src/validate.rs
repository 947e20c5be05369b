use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::roster::{
    same_tag, FamilyRef, Guardian, NextLesson, StudentProfile, StudentRecord, StudentStatus,
};

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"))
}

pub fn is_valid_email(raw: &str) -> bool {
    email_regex().is_match(raw.trim())
}

/// Raw add/edit form as submitted by the UI. Every field is optional so the
/// same shape doubles as an edit patch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<String>,
    pub kind: Option<String>,
    pub birth_date: Option<String>,
    pub family_name: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub guardian_email: Option<String>,
    pub occupation: Option<String>,
    pub tags: Option<Vec<String>>,
    pub credits: Option<i64>,
    pub next_lesson_date: Option<String>,
    pub next_lesson_time: Option<String>,
    pub notes: Option<String>,
}

/// A validated form, ready to hand to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentDraft {
    pub first_name: String,
    pub last_name: String,
    pub status: StudentStatus,
    pub profile: StudentProfile,
    pub tags: Vec<String>,
    pub credits: u32,
    pub next_lesson: Option<NextLesson>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: String,
}

impl StudentDraft {
    pub fn into_record(self, id: String) -> StudentRecord {
        StudentRecord {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            status: self.status,
            profile: self.profile,
            tags: self.tags,
            credits: self.credits,
            next_lesson: self.next_lesson,
            email: self.email,
            phone: self.phone,
            notes: self.notes,
        }
    }
}

/// Inline field messages keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn clean(v: &Option<String>) -> Option<String> {
    v.as_ref()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn family_id_for(name: &str) -> String {
    let slug: String = name
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let slug = slug
        .split('-')
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    format!("fam-{}", slug)
}

fn normalize_tags(raw: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for t in raw {
        let t = t.trim();
        if t.is_empty() || out.iter().any(|x| same_tag(x, t)) {
            continue;
        }
        out.push(t.to_string());
    }
    out
}

pub fn validate_student_form(
    form: &StudentForm,
    today: NaiveDate,
) -> Result<StudentDraft, FieldErrors> {
    let mut errors = FieldErrors::default();

    let first_name = clean(&form.first_name);
    if first_name.is_none() {
        errors.add("firstName", "First name is required");
    }
    let last_name = clean(&form.last_name);
    if last_name.is_none() {
        errors.add("lastName", "Last name is required");
    }

    let email = clean(&form.email);
    if let Some(e) = email.as_deref() {
        if !is_valid_email(e) {
            errors.add("email", "Enter a valid email address");
        }
    }
    let phone = clean(&form.phone);

    let status = match clean(&form.status) {
        None => StudentStatus::Lead,
        Some(raw) => match StudentStatus::parse(&raw) {
            Some(s) => s,
            None => {
                errors.add("status", format!("Unknown status: {}", raw));
                StudentStatus::Lead
            }
        },
    };

    let birth_date = match clean(&form.birth_date) {
        None => None,
        Some(raw) => match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
            Ok(d) if d > today => {
                errors.add("birthDate", "Birth date cannot be in the future");
                None
            }
            Ok(d) => Some(d),
            Err(_) => {
                errors.add("birthDate", "Use the format YYYY-MM-DD");
                None
            }
        },
    };

    let guardian_email = clean(&form.guardian_email);
    if let Some(e) = guardian_email.as_deref() {
        if !is_valid_email(e) {
            errors.add("guardianEmail", "Enter a valid email address");
        }
    }
    let guardian_phone = clean(&form.guardian_phone);

    let kind = clean(&form.kind).map(|k| k.to_ascii_lowercase());
    let profile = match kind.as_deref() {
        Some("child") => {
            let family_name = clean(&form.family_name);
            if family_name.is_none() {
                errors.add("familyName", "Family is required for a child student");
            }
            if birth_date.is_none() && !errors_has(&errors, "birthDate") {
                errors.add("birthDate", "Birth date is required for a child student");
            }
            let guardian = clean(&form.guardian_name).map(|name| Guardian {
                name,
                phone: guardian_phone.clone(),
                email: guardian_email.clone(),
            });
            match (birth_date, family_name) {
                (Some(birth_date), Some(name)) => Some(StudentProfile::Child {
                    birth_date,
                    family: FamilyRef {
                        id: family_id_for(&name),
                        name,
                    },
                    guardian,
                }),
                _ => None,
            }
        }
        None | Some("adult") => Some(StudentProfile::Adult {
            birth_date,
            occupation: clean(&form.occupation),
        }),
        Some(other) => {
            errors.add("kind", format!("Unknown student kind: {}", other));
            None
        }
    };

    let has_contact = email.is_some()
        || phone.is_some()
        || (kind.as_deref() == Some("child")
            && (guardian_email.is_some() || guardian_phone.is_some()));
    if !has_contact {
        errors.add("contact", "Provide at least one contact method");
    }

    let credits = match form.credits {
        None => 0,
        Some(c) => match u32::try_from(c) {
            Ok(v) => v,
            Err(_) => {
                errors.add("credits", "Credits must be zero or more");
                0
            }
        },
    };

    let next_lesson = match (clean(&form.next_lesson_date), clean(&form.next_lesson_time)) {
        (None, None) => None,
        (Some(d), Some(t)) => {
            let date = NaiveDate::parse_from_str(&d, "%Y-%m-%d");
            let time = NaiveTime::parse_from_str(&t, "%H:%M");
            match (date, time) {
                (Ok(date), Ok(time)) => Some(NextLesson { date, time }),
                (Err(_), _) => {
                    errors.add("nextLessonDate", "Use the format YYYY-MM-DD");
                    None
                }
                (_, Err(_)) => {
                    errors.add("nextLessonTime", "Use the format HH:MM");
                    None
                }
            }
        }
        (Some(_), None) => {
            errors.add("nextLessonTime", "Pick a time for the lesson");
            None
        }
        (None, Some(_)) => {
            errors.add("nextLessonDate", "Pick a date for the lesson");
            None
        }
    };

    let tags = form.tags.as_deref().map(normalize_tags).unwrap_or_default();

    if !errors.is_empty() {
        return Err(errors);
    }
    let (Some(first_name), Some(last_name), Some(profile)) = (first_name, last_name, profile)
    else {
        // Every path that leaves one of these unset also records a field error.
        return Err(errors);
    };

    Ok(StudentDraft {
        first_name,
        last_name,
        status,
        profile,
        tags,
        credits,
        next_lesson,
        email,
        phone,
        notes: form
            .notes
            .as_deref()
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    })
}

fn errors_has(errors: &FieldErrors, field: &str) -> bool {
    errors.get(field).is_some()
}

/// Flatten a stored record back into form fields.
pub fn record_to_form(record: &StudentRecord) -> StudentForm {
    let mut form = StudentForm {
        first_name: Some(record.first_name.clone()),
        last_name: Some(record.last_name.clone()),
        email: record.email.clone(),
        phone: record.phone.clone(),
        status: Some(record.status.as_str().to_string()),
        tags: Some(record.tags.clone()),
        credits: Some(i64::from(record.credits)),
        next_lesson_date: record
            .next_lesson
            .map(|l| l.date.format("%Y-%m-%d").to_string()),
        next_lesson_time: record.next_lesson.map(|l| l.time.format("%H:%M").to_string()),
        notes: Some(record.notes.clone()),
        ..StudentForm::default()
    };
    match &record.profile {
        StudentProfile::Child {
            birth_date,
            family,
            guardian,
        } => {
            form.kind = Some("child".into());
            form.birth_date = Some(birth_date.format("%Y-%m-%d").to_string());
            form.family_name = Some(family.name.clone());
            if let Some(g) = guardian {
                form.guardian_name = Some(g.name.clone());
                form.guardian_phone = g.phone.clone();
                form.guardian_email = g.email.clone();
            }
        }
        StudentProfile::Adult {
            birth_date,
            occupation,
        } => {
            form.kind = Some("adult".into());
            form.birth_date = birth_date.map(|d| d.format("%Y-%m-%d").to_string());
            form.occupation = occupation.clone();
        }
    }
    form
}

/// Overlay `patch` onto `record` and re-validate the merged form. A field set
/// to an empty string in the patch clears it.
pub fn apply_patch(
    record: &StudentRecord,
    patch: &StudentForm,
    today: NaiveDate,
) -> Result<StudentRecord, FieldErrors> {
    let mut merged = record_to_form(record);
    macro_rules! overlay {
        ($($field:ident),*) => {
            $(if patch.$field.is_some() {
                merged.$field = patch.$field.clone();
            })*
        };
    }
    overlay!(
        first_name,
        last_name,
        email,
        phone,
        status,
        kind,
        birth_date,
        family_name,
        guardian_name,
        guardian_phone,
        guardian_email,
        occupation,
        tags,
        credits,
        next_lesson_date,
        next_lesson_time,
        notes
    );

    let mut draft = validate_student_form(&merged, today)?;
    // Editing the family name of an existing child keeps its family id.
    if let (
        StudentProfile::Child { family: old, .. },
        StudentProfile::Child { family: new, .. },
    ) = (&record.profile, &mut draft.profile)
    {
        if old.name == new.name {
            new.id = old.id.clone();
        }
    }
    Ok(draft.into_record(record.id.clone()))
}
