use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Student pipeline status. Declaration order is the display order used by
/// the filter chips and by the status sort column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    Active,
    Trial,
    Waiting,
    Lead,
    Inactive,
}

impl StudentStatus {
    pub const ALL: [StudentStatus; 5] = [
        StudentStatus::Active,
        StudentStatus::Trial,
        StudentStatus::Waiting,
        StudentStatus::Lead,
        StudentStatus::Inactive,
    ];

    pub fn rank(self) -> u8 {
        match self {
            StudentStatus::Active => 0,
            StudentStatus::Trial => 1,
            StudentStatus::Waiting => 2,
            StudentStatus::Lead => 3,
            StudentStatus::Inactive => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StudentStatus::Active => "active",
            StudentStatus::Trial => "trial",
            StudentStatus::Waiting => "waiting",
            StudentStatus::Lead => "lead",
            StudentStatus::Inactive => "inactive",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StudentStatus::Active => "Active",
            StudentStatus::Trial => "Trial",
            StudentStatus::Waiting => "Waiting List",
            StudentStatus::Lead => "Lead",
            StudentStatus::Inactive => "Inactive",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let t = raw.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(t))
    }
}

/// Chip color for a tag. The UI only knows these five.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TagColor {
    Blue,
    Green,
    Purple,
    Orange,
    Gray,
}

impl TagColor {
    /// Stable color for a tag label: known subjects get fixed colors, anything
    /// else hashes onto the palette so the same label always gets the same chip.
    pub fn for_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "math" | "science" => TagColor::Blue,
            "reading" | "writing" => TagColor::Green,
            "piano" | "guitar" | "music" => TagColor::Purple,
            "spanish" | "french" => TagColor::Orange,
            other => {
                let sum: u32 = other.bytes().map(u32::from).sum();
                match sum % 5 {
                    0 => TagColor::Blue,
                    1 => TagColor::Green,
                    2 => TagColor::Purple,
                    3 => TagColor::Orange,
                    _ => TagColor::Gray,
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guardian {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Which fields exist depends on whether the student is a child (billed to a
/// family, usually with a guardian) or an adult who is their own contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum StudentProfile {
    Child {
        birth_date: NaiveDate,
        family: FamilyRef,
        guardian: Option<Guardian>,
    },
    Adult {
        birth_date: Option<NaiveDate>,
        occupation: Option<String>,
    },
}

impl StudentProfile {
    pub fn birth_date(&self) -> Option<NaiveDate> {
        match self {
            StudentProfile::Child { birth_date, .. } => Some(*birth_date),
            StudentProfile::Adult { birth_date, .. } => *birth_date,
        }
    }

    pub fn is_child(&self) -> bool {
        matches!(self, StudentProfile::Child { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextLesson {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl NextLesson {
    pub fn is_today(&self, today: NaiveDate) -> bool {
        self.date == today
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub status: StudentStatus,
    pub profile: StudentProfile,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub credits: u32,
    pub next_lesson: Option<NextLesson>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub notes: String,
}

impl StudentRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn family_name(&self) -> Option<&str> {
        match &self.profile {
            StudentProfile::Child { family, .. } => Some(family.name.as_str()),
            StudentProfile::Adult { .. } => None,
        }
    }

    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        self.profile.birth_date().and_then(|b| age_between(b, today))
    }
}

/// Tags compare case-insensitively everywhere: filters, chips and dedupe.
pub fn same_tag(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Whole years from `birth` to `today`; `None` when `birth` is in the future.
pub fn age_between(birth: NaiveDate, today: NaiveDate) -> Option<u32> {
    if birth > today {
        return None;
    }
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default()
}

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn child(
    birth_date: NaiveDate,
    family_id: &str,
    family_name: &str,
    guardian: Option<(&str, &str, &str)>,
) -> StudentProfile {
    StudentProfile::Child {
        birth_date,
        family: FamilyRef {
            id: family_id.to_string(),
            name: family_name.to_string(),
        },
        guardian: guardian.map(|(name, phone, email)| Guardian {
            name: name.to_string(),
            phone: Some(phone.to_string()),
            email: Some(email.to_string()),
        }),
    }
}

/// Demo roster shown on first launch.
pub fn seed_students() -> Vec<StudentRecord> {
    vec![
        StudentRecord {
            id: "stu-001".into(),
            first_name: "Emma".into(),
            last_name: "Chen".into(),
            status: StudentStatus::Active,
            profile: child(
                date(2015, 3, 14),
                "fam-001",
                "Chen Family",
                Some(("Grace Chen", "555-0101", "grace.c@example.com")),
            ),
            tags: tags(&["Math", "Piano"]),
            credits: 8,
            next_lesson: Some(NextLesson {
                date: date(2026, 10, 15),
                time: time(16, 0),
            }),
            email: None,
            phone: None,
            notes: "Working on fractions.".into(),
        },
        StudentRecord {
            id: "stu-002".into(),
            first_name: "Liam".into(),
            last_name: "Chen".into(),
            status: StudentStatus::Active,
            profile: child(
                date(2017, 9, 2),
                "fam-001",
                "Chen Family",
                Some(("Grace Chen", "555-0101", "grace.c@example.com")),
            ),
            tags: tags(&["Math"]),
            credits: 6,
            next_lesson: Some(NextLesson {
                date: date(2026, 10, 17),
                time: time(15, 30),
            }),
            email: None,
            phone: None,
            notes: String::new(),
        },
        StudentRecord {
            id: "stu-003".into(),
            first_name: "Sophia".into(),
            last_name: "Martinez".into(),
            status: StudentStatus::Active,
            profile: StudentProfile::Adult {
                birth_date: Some(date(1994, 6, 21)),
                occupation: Some("Nurse".into()),
            },
            tags: tags(&["Spanish"]),
            credits: 4,
            next_lesson: Some(NextLesson {
                date: date(2026, 10, 15),
                time: time(18, 30),
            }),
            email: Some("sophia.martinez@example.com".into()),
            phone: Some("555-0133".into()),
            notes: "Prefers evening slots.".into(),
        },
        StudentRecord {
            id: "stu-004".into(),
            first_name: "Noah".into(),
            last_name: "Thompson".into(),
            status: StudentStatus::Waiting,
            profile: child(
                date(2014, 11, 30),
                "fam-002",
                "Thompson Family",
                Some(("Rachel Thompson", "555-0144", "r.thompson@example.com")),
            ),
            tags: tags(&["Reading"]),
            credits: 0,
            next_lesson: None,
            email: None,
            phone: None,
            notes: "Waiting for a Saturday opening.".into(),
        },
        StudentRecord {
            id: "stu-005".into(),
            first_name: "Olivia".into(),
            last_name: "Patel".into(),
            status: StudentStatus::Trial,
            profile: child(
                date(2013, 1, 8),
                "fam-003",
                "Patel Family",
                Some(("Anika Patel", "555-0155", "anika.patel@example.com")),
            ),
            tags: tags(&["Science", "Math"]),
            credits: 1,
            next_lesson: Some(NextLesson {
                date: date(2026, 10, 20),
                time: time(17, 0),
            }),
            email: None,
            phone: None,
            notes: String::new(),
        },
        StudentRecord {
            id: "stu-006".into(),
            first_name: "James".into(),
            last_name: "Wilson".into(),
            status: StudentStatus::Lead,
            profile: StudentProfile::Adult {
                birth_date: None,
                occupation: None,
            },
            tags: Vec::new(),
            credits: 0,
            next_lesson: None,
            email: Some("jwilson@example.com".into()),
            phone: None,
            notes: "Enquired via website.".into(),
        },
        StudentRecord {
            id: "stu-007".into(),
            first_name: "Ava".into(),
            last_name: "Johnson".into(),
            status: StudentStatus::Inactive,
            profile: child(date(2012, 5, 19), "fam-004", "Johnson Family", None),
            tags: tags(&["Piano"]),
            credits: 0,
            next_lesson: None,
            email: None,
            phone: Some("555-0177".into()),
            notes: "Paused for the season.".into(),
        },
        StudentRecord {
            id: "stu-008".into(),
            first_name: "Mia".into(),
            last_name: "Rodriguez".into(),
            status: StudentStatus::Active,
            profile: StudentProfile::Adult {
                birth_date: Some(date(1988, 12, 3)),
                occupation: Some("Engineer".into()),
            },
            tags: tags(&["Guitar"]),
            credits: 12,
            next_lesson: Some(NextLesson {
                date: date(2026, 10, 16),
                time: time(19, 0),
            }),
            email: Some("mia.rodriguez@example.com".into()),
            phone: None,
            notes: String::new(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_status_mix_matches_demo_roster() {
        let students = seed_students();
        assert_eq!(students.len(), 8);
        let count = |s: StudentStatus| students.iter().filter(|r| r.status == s).count();
        assert_eq!(count(StudentStatus::Active), 4);
        assert_eq!(count(StudentStatus::Trial), 1);
        assert_eq!(count(StudentStatus::Waiting), 1);
        assert_eq!(count(StudentStatus::Lead), 1);
        assert_eq!(count(StudentStatus::Inactive), 1);
    }

    #[test]
    fn status_parse_is_case_insensitive_and_closed() {
        assert_eq!(StudentStatus::parse("Waiting"), Some(StudentStatus::Waiting));
        assert_eq!(StudentStatus::parse(" LEAD "), Some(StudentStatus::Lead));
        assert_eq!(StudentStatus::parse("archived"), None);
        assert!(StudentStatus::Active.rank() < StudentStatus::Inactive.rank());
    }

    #[test]
    fn age_counts_whole_years() {
        let b = date(2015, 3, 14);
        assert_eq!(age_between(b, date(2026, 3, 13)), Some(10));
        assert_eq!(age_between(b, date(2026, 3, 14)), Some(11));
        assert_eq!(age_between(b, date(2014, 1, 1)), None);
    }

    #[test]
    fn profile_serializes_as_tagged_union() {
        let s = &seed_students()[0];
        let v = serde_json::to_value(s).expect("serialize");
        assert_eq!(v["profile"]["kind"], "child");
        assert_eq!(v["profile"]["family"]["name"], "Chen Family");
        assert_eq!(v["status"], "active");
        assert_eq!(v["nextLesson"]["date"], "2026-10-15");
    }

    #[test]
    fn missing_credits_default_to_zero() {
        let raw = serde_json::json!({
            "id": "x",
            "firstName": "A",
            "lastName": "B",
            "status": "lead",
            "profile": { "kind": "adult", "birthDate": null, "occupation": null },
            "nextLesson": null,
            "email": null,
            "phone": null
        });
        let r: StudentRecord = serde_json::from_value(raw).expect("deserialize");
        assert_eq!(r.credits, 0);
        assert!(r.tags.is_empty());
        assert_eq!(r.family_name(), None);
    }

    #[test]
    fn tag_color_is_stable() {
        assert_eq!(TagColor::for_tag("Math"), TagColor::Blue);
        assert_eq!(TagColor::for_tag("piano"), TagColor::Purple);
        assert_eq!(TagColor::for_tag("Chess"), TagColor::for_tag("Chess"));
    }

    #[test]
    fn tag_identity_ignores_case() {
        assert!(same_tag("Math", "math"));
        assert!(!same_tag("Math", "Maths"));
    }
}
