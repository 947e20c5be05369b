use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

fn default_interval() -> u32 {
    1
}

/// Lesson repeat rule as entered in the scheduling form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    #[serde(default = "default_interval")]
    pub interval: u32,
    #[serde(default)]
    pub weekdays: Vec<Weekday>,
    #[serde(default)]
    pub until: Option<NaiveDate>,
    #[serde(default)]
    pub count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("interval must be at least 1")]
    ZeroInterval,

    #[error("count must be at least 1")]
    ZeroCount,

    #[error("weekdays only apply to weekly rules")]
    WeekdaysOnNonWeekly,

    #[error("set either until or count, not both")]
    UntilAndCount,
}

impl RecurrenceRule {
    pub fn validate(&self) -> Result<(), RuleError> {
        if self.interval == 0 {
            return Err(RuleError::ZeroInterval);
        }
        if self.count == Some(0) {
            return Err(RuleError::ZeroCount);
        }
        if self.frequency != Frequency::Weekly && !self.weekdays.is_empty() {
            return Err(RuleError::WeekdaysOnNonWeekly);
        }
        if self.until.is_some() && self.count.is_some() {
            return Err(RuleError::UntilAndCount);
        }
        Ok(())
    }

    /// Distinct weekdays, Monday first.
    fn sorted_weekdays(&self) -> Vec<Weekday> {
        let mut days = self.weekdays.clone();
        days.sort_by_key(|d| d.num_days_from_monday());
        days.dedup();
        days
    }
}

fn weekday_short(d: Weekday) -> &'static str {
    match d {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

/// One-line human summary, e.g. "Every 2 weeks on Tue until 2026-12-01".
pub fn summarize(rule: &RecurrenceRule) -> String {
    let n = rule.interval.max(1);
    let mut out = match (rule.frequency, n) {
        (Frequency::Daily, 1) => "Daily".to_string(),
        (Frequency::Daily, n) => format!("Every {} days", n),
        (Frequency::Weekly, 1) => "Every week".to_string(),
        (Frequency::Weekly, n) => format!("Every {} weeks", n),
        (Frequency::Monthly, 1) => "Every month".to_string(),
        (Frequency::Monthly, n) => format!("Every {} months", n),
    };

    let days = rule.sorted_weekdays();
    if rule.frequency == Frequency::Weekly && !days.is_empty() {
        let names: Vec<&str> = days.into_iter().map(weekday_short).collect();
        out.push_str(" on ");
        out.push_str(&names.join(", "));
    }

    if let Some(until) = rule.until {
        out.push_str(&format!(" until {}", until.format("%Y-%m-%d")));
    } else if let Some(count) = rule.count {
        if count == 1 {
            out.push_str(", once");
        } else {
            out.push_str(&format!(", {} times", count));
        }
    }
    out
}

/// Up to `limit` lesson dates on or after `start`, honoring `until`/`count`.
/// Expansion stops early when the next date would leave chrono's range.
pub fn next_occurrences(rule: &RecurrenceRule, start: NaiveDate, limit: usize) -> Vec<NaiveDate> {
    let interval = rule.interval.max(1);
    let cap = rule
        .count
        .map(|c| c as usize)
        .unwrap_or(usize::MAX)
        .min(limit);
    let mut out: Vec<NaiveDate> = Vec::new();
    let within = |d: NaiveDate| rule.until.map(|u| d <= u).unwrap_or(true);

    match rule.frequency {
        Frequency::Daily => {
            let step = Days::new(u64::from(interval));
            let mut next = Some(start);
            while let Some(d) = next {
                if out.len() >= cap || !within(d) {
                    break;
                }
                out.push(d);
                next = d.checked_add_days(step);
            }
        }
        Frequency::Weekly => {
            let mut days = rule.sorted_weekdays();
            if days.is_empty() {
                days.push(start.weekday());
            }
            let step = Days::new(7 * u64::from(interval));
            let mut week_start =
                start.checked_sub_days(Days::new(u64::from(start.weekday().num_days_from_monday())));
            'weeks: while let Some(monday) = week_start {
                if out.len() >= cap {
                    break;
                }
                for wd in &days {
                    let offset = Days::new(u64::from(wd.num_days_from_monday()));
                    let Some(d) = monday.checked_add_days(offset) else {
                        break 'weeks;
                    };
                    if d < start {
                        continue;
                    }
                    if !within(d) || out.len() >= cap {
                        break 'weeks;
                    }
                    out.push(d);
                }
                week_start = monday.checked_add_days(step);
            }
        }
        Frequency::Monthly => {
            let mut k: u32 = 0;
            while out.len() < cap {
                let Some(d) = k
                    .checked_mul(interval)
                    .and_then(|months| start.checked_add_months(Months::new(months)))
                else {
                    break;
                };
                if !within(d) {
                    break;
                }
                out.push(d);
                k += 1;
            }
        }
    }
    out
}
