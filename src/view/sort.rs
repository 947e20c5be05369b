use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveTime};

use crate::roster::StudentRecord;

use super::{SortColumn, SortDirection, SortSpec};

impl SortDirection {
    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

/// Present values in the requested direction; missing values always last.
fn nulls_last<T: Ord>(a: Option<T>, b: Option<T>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => direction.apply(x.cmp(&y)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn lesson_key(record: &StudentRecord, today: NaiveDate) -> Option<(bool, NaiveDate, NaiveTime)> {
    record
        .next_lesson
        .map(|l| (!l.is_today(today), l.date, l.time))
}

/// Column comparison without the positional tie-break.
pub fn compare(a: &StudentRecord, b: &StudentRecord, spec: SortSpec, today: NaiveDate) -> Ordering {
    let dir = spec.direction;
    match spec.column {
        SortColumn::Name => dir.apply(
            a.full_name()
                .to_lowercase()
                .cmp(&b.full_name().to_lowercase()),
        ),
        SortColumn::Status => dir.apply(a.status.rank().cmp(&b.status.rank())),
        SortColumn::Credits => dir.apply(a.credits.cmp(&b.credits)),
        SortColumn::Age => nulls_last(a.age_on(today), b.age_on(today), dir),
        SortColumn::NextLesson => nulls_last(lesson_key(a, today), lesson_key(b, today), dir),
    }
}

/// Sort `(original index, record)` pairs; equal keys keep source order.
pub fn sort_records(rows: &mut [(usize, &StudentRecord)], spec: SortSpec, today: NaiveDate) {
    rows.sort_by(|(ia, a), (ib, b)| compare(a, b, spec, today).then_with(|| ia.cmp(ib)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::seed_students;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 15).expect("date")
    }

    fn sorted_ids(records: &[StudentRecord], column: SortColumn, direction: SortDirection) -> Vec<String> {
        let mut rows: Vec<(usize, &StudentRecord)> = records.iter().enumerate().collect();
        sort_records(&mut rows, SortSpec { column, direction }, today());
        rows.iter().map(|(_, r)| r.id.clone()).collect()
    }

    #[test]
    fn sorting_is_idempotent() {
        let students = seed_students();
        for column in [
            SortColumn::Name,
            SortColumn::Status,
            SortColumn::Age,
            SortColumn::Credits,
            SortColumn::NextLesson,
        ] {
            let mut rows: Vec<(usize, &StudentRecord)> = students.iter().enumerate().collect();
            let spec = SortSpec {
                column,
                direction: SortDirection::Desc,
            };
            sort_records(&mut rows, spec, today());
            let once: Vec<usize> = rows.iter().map(|(i, _)| *i).collect();
            sort_records(&mut rows, spec, today());
            let twice: Vec<usize> = rows.iter().map(|(i, _)| *i).collect();
            assert_eq!(once, twice, "{:?}", column);
        }
    }

    #[test]
    fn name_desc_is_exact_reverse_of_asc() {
        let students = seed_students();
        let asc = sorted_ids(&students, SortColumn::Name, SortDirection::Asc);
        let mut desc = sorted_ids(&students, SortColumn::Name, SortDirection::Desc);
        desc.reverse();
        assert_eq!(asc, desc);
        assert_eq!(asc.first().map(String::as_str), Some("stu-007"));
    }

    #[test]
    fn status_uses_declared_rank_with_stable_ties() {
        let students = seed_students();
        let asc = sorted_ids(&students, SortColumn::Status, SortDirection::Asc);
        assert_eq!(
            asc,
            vec!["stu-001", "stu-002", "stu-003", "stu-008", "stu-005", "stu-004", "stu-006", "stu-007"]
        );
        let desc = sorted_ids(&students, SortColumn::Status, SortDirection::Desc);
        assert_eq!(desc.first().map(String::as_str), Some("stu-007"));
        assert_eq!(&desc[4..], ["stu-001", "stu-002", "stu-003", "stu-008"]);
    }

    #[test]
    fn unscheduled_lessons_sort_last_both_ways() {
        let students = seed_students();
        let asc = sorted_ids(&students, SortColumn::NextLesson, SortDirection::Asc);
        assert_eq!(
            asc,
            vec!["stu-001", "stu-003", "stu-008", "stu-002", "stu-005", "stu-004", "stu-006", "stu-007"]
        );
        let desc = sorted_ids(&students, SortColumn::NextLesson, SortDirection::Desc);
        assert_eq!(
            desc,
            vec!["stu-005", "stu-002", "stu-008", "stu-003", "stu-001", "stu-004", "stu-006", "stu-007"]
        );
    }

    #[test]
    fn missing_age_sorts_last() {
        let students = seed_students();
        let asc = sorted_ids(&students, SortColumn::Age, SortDirection::Asc);
        let desc = sorted_ids(&students, SortColumn::Age, SortDirection::Desc);
        assert_eq!(asc.last().map(String::as_str), Some("stu-006"));
        assert_eq!(desc.last().map(String::as_str), Some("stu-006"));
        assert_eq!(asc.first().map(String::as_str), Some("stu-002"));
    }

    #[test]
    fn credits_are_numeric() {
        let students = seed_students();
        let desc = sorted_ids(&students, SortColumn::Credits, SortDirection::Desc);
        assert_eq!(&desc[..3], ["stu-008", "stu-001", "stu-002"]);
    }
}
