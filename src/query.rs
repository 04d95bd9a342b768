use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::models::{Course, CourseQuery};

/// "Sat 12th October 2024": chrono has no ordinal-suffix specifier, so the
/// suffix is stripped before handing the rest to `%d %B %Y`. The weekday
/// abbreviation must be present but is not checked against the date.
static FORMATTED_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<weekday>[A-Za-z]{3}) (?P<day>[0-9]{1,2})(?:st|nd|rd|th) (?P<rest>[A-Za-z]+ [0-9]{4})$")
        .expect("regex compiles")
});

const WORKING_WEEK: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

/// Catalog records that cannot be interpreted. These are server-side defects,
/// never user errors, and fail the whole query.
#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("course #{index}: cannot parse formatted_start_date {value:?}")]
    MalformedStartDate { index: usize, value: String },
    #[error("course #{index}: cannot parse days[{day}].start_date {value:?}")]
    MalformedSessionDate {
        index: usize,
        day: usize,
        value: String,
    },
    #[error("available_spaces overflow merging {venue:?} {start:?} - {end:?}")]
    SpacesOverflow {
        venue: String,
        start: String,
        end: String,
    },
}

/// Weekly layout a course is asked to have via the `type` parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleType {
    MondayToFriday,
    DayRelease,
    Weekend,
    /// Any other label. Matches no course.
    Unrecognized(String),
}

impl From<&str> for ScheduleType {
    fn from(label: &str) -> Self {
        match label {
            "Monday to Friday" => ScheduleType::MondayToFriday,
            "Day Release" => ScheduleType::DayRelease,
            "Weekend" => ScheduleType::Weekend,
            other => ScheduleType::Unrecognized(other.to_string()),
        }
    }
}

impl ScheduleType {
    pub fn label(&self) -> &str {
        match self {
            ScheduleType::MondayToFriday => "Monday to Friday",
            ScheduleType::DayRelease => "Day Release",
            ScheduleType::Weekend => "Weekend",
            ScheduleType::Unrecognized(label) => label,
        }
    }

    /// Classifies the session dates of one course.
    pub fn matches(&self, sessions: &[NaiveDate]) -> bool {
        let weekdays: HashSet<Weekday> = sessions.iter().map(NaiveDate::weekday).collect();
        match self {
            ScheduleType::MondayToFriday => weekdays == HashSet::from(WORKING_WEEK),
            ScheduleType::DayRelease => {
                // week number only, so W41 of 2024 and W41 of 2025 count as one week
                let weeks: HashSet<u32> = sessions.iter().map(|d| d.iso_week().week()).collect();
                weekdays.len() == 1 && weeks.len() == 1
            }
            ScheduleType::Weekend => weekdays
                .iter()
                .all(|day| matches!(day, Weekday::Sat | Weekday::Sun)),
            ScheduleType::Unrecognized(_) => false,
        }
    }
}

/// Parses the human-readable `formatted_start_date` form.
pub fn parse_formatted_date(value: &str) -> Option<NaiveDate> {
    let caps = FORMATTED_DATE.captures(value.trim())?;
    let normalized = format!("{} {}", &caps["day"], &caps["rest"]);
    NaiveDate::parse_from_str(&normalized, "%d %B %Y").ok()
}

/// Parses a session `start_date`: RFC 3339 with offset, a naive timestamp or a bare date.
/// With an offset the calendar date is the one local to that offset.
pub fn parse_session_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Validated query parameters, ready to be evaluated against courses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseFilter {
    pub month: Option<String>,
    pub venue: Option<String>,
    pub schedule: Option<ScheduleType>,
}

impl From<CourseQuery> for CourseFilter {
    fn from(query: CourseQuery) -> Self {
        Self {
            month: query.month,
            venue: query.venue,
            schedule: query.course_type.as_deref().map(ScheduleType::from),
        }
    }
}

impl CourseFilter {
    /// Evaluates month, venue and schedule in that order, stopping at the first miss.
    /// `index` is the position of the course in the catalog, used in errors.
    pub fn matches(&self, index: usize, course: &Course) -> Result<bool, QueryError> {
        if let Some(month) = &self.month {
            let start = parse_formatted_date(&course.formatted_start_date).ok_or_else(|| {
                QueryError::MalformedStartDate {
                    index,
                    value: course.formatted_start_date.clone(),
                }
            })?;
            if start.format("%Y-%m").to_string() != *month {
                return Ok(false);
            }
        }

        if let Some(venue) = &self.venue
            && course.venue.name != *venue
        {
            return Ok(false);
        }

        match &self.schedule {
            None => Ok(true),
            Some(ScheduleType::Unrecognized(_)) => Ok(false),
            Some(schedule) => {
                let sessions = session_dates(index, course)?;
                Ok(schedule.matches(&sessions))
            }
        }
    }

    /// Keeps the courses that pass every active predicate, in catalog order.
    pub fn apply(&self, courses: Vec<Course>) -> Result<Vec<Course>, QueryError> {
        let mut kept = Vec::new();
        for (index, course) in courses.into_iter().enumerate() {
            if self.matches(index, &course)? {
                kept.push(course);
            }
        }
        Ok(kept)
    }
}

fn session_dates(index: usize, course: &Course) -> Result<Vec<NaiveDate>, QueryError> {
    course
        .days
        .iter()
        .enumerate()
        .map(|(day, session)| {
            parse_session_date(&session.start_date).ok_or_else(|| QueryError::MalformedSessionDate {
                index,
                day,
                value: session.start_date.clone(),
            })
        })
        .collect()
}

/// Identity of a logical offering: listings sharing it are capacity pools of the same course.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub venue: String,
    pub formatted_start_date: String,
    pub formatted_end_date: String,
}

impl From<&Course> for GroupKey {
    fn from(course: &Course) -> Self {
        Self {
            venue: course.venue.name.clone(),
            formatted_start_date: course.formatted_start_date.clone(),
            formatted_end_date: course.formatted_end_date.clone(),
        }
    }
}

/// Collapses listings with the same [`GroupKey`] into the first one seen,
/// summing `available_spaces`. Groups come out in order of first appearance.
pub fn merge_courses(courses: Vec<Course>) -> Result<Vec<Course>, QueryError> {
    let mut positions: HashMap<GroupKey, usize> = HashMap::new();
    let mut merged: Vec<Course> = Vec::new();

    for course in courses {
        let key = GroupKey::from(&course);
        match positions.get(&key) {
            Some(&position) => {
                let first = &mut merged[position];
                first.available_spaces = first
                    .available_spaces
                    .checked_add(course.available_spaces)
                    .ok_or_else(|| QueryError::SpacesOverflow {
                        venue: key.venue,
                        start: key.formatted_start_date,
                        end: key.formatted_end_date,
                    })?;
            }
            None => {
                positions.insert(key, merged.len());
                merged.push(course);
            }
        }
    }

    Ok(merged)
}

/// Filter then merge. Either the whole catalog is evaluated or nothing is returned.
pub fn find_courses(courses: Vec<Course>, filter: &CourseFilter) -> Result<Vec<Course>, QueryError> {
    let filtered = filter.apply(courses)?;
    merge_courses(filtered)
}
