use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Day of the school week, ordered monday(1) through sunday(7).
///
/// Serializes as the lowercase English name; the numeric form is used
/// for ordering weekly views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    /// All days in monday-first order, for building day-keyed views.
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    /// ISO-style day number, monday = 1 .. sunday = 7.
    pub fn number(&self) -> u8 {
        match self {
            DayOfWeek::Monday => 1,
            DayOfWeek::Tuesday => 2,
            DayOfWeek::Wednesday => 3,
            DayOfWeek::Thursday => 4,
            DayOfWeek::Friday => 5,
            DayOfWeek::Saturday => 6,
            DayOfWeek::Sunday => 7,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
            DayOfWeek::Sunday => "sunday",
        }
    }

    /// Default teaching days (monday through friday).
    pub fn weekdays() -> Vec<DayOfWeek> {
        vec![
            DayOfWeek::Monday,
            DayOfWeek::Tuesday,
            DayOfWeek::Wednesday,
            DayOfWeek::Thursday,
            DayOfWeek::Friday,
        ]
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DayOfWeek {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monday" => Ok(DayOfWeek::Monday),
            "tuesday" => Ok(DayOfWeek::Tuesday),
            "wednesday" => Ok(DayOfWeek::Wednesday),
            "thursday" => Ok(DayOfWeek::Thursday),
            "friday" => Ok(DayOfWeek::Friday),
            "saturday" => Ok(DayOfWeek::Saturday),
            "sunday" => Ok(DayOfWeek::Sunday),
            other => Err(format!("Unknown day of week: {}", other)),
        }
    }
}

/// Kind of slot in the daily period grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Regular,
    Break,
    Lunch,
    Assembly,
    Sports,
    Library,
    Lab,
    Exam,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Regular => "regular",
            PeriodType::Break => "break",
            PeriodType::Lunch => "lunch",
            PeriodType::Assembly => "assembly",
            PeriodType::Sports => "sports",
            PeriodType::Library => "library",
            PeriodType::Lab => "lab",
            PeriodType::Exam => "exam",
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PeriodType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "regular" => Ok(PeriodType::Regular),
            "break" => Ok(PeriodType::Break),
            "lunch" => Ok(PeriodType::Lunch),
            "assembly" => Ok(PeriodType::Assembly),
            "sports" => Ok(PeriodType::Sports),
            "library" => Ok(PeriodType::Library),
            "lab" => Ok(PeriodType::Lab),
            "exam" => Ok(PeriodType::Exam),
            other => Err(format!("Unknown period type: {}", other)),
        }
    }
}

/// Lifecycle status of a master timetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimetableStatus {
    Draft,
    Active,
    Suspended,
    Archived,
}

impl TimetableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimetableStatus::Draft => "draft",
            TimetableStatus::Active => "active",
            TimetableStatus::Suspended => "suspended",
            TimetableStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for TimetableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TimetableStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(TimetableStatus::Draft),
            "active" => Ok(TimetableStatus::Active),
            "suspended" => Ok(TimetableStatus::Suspended),
            "archived" => Ok(TimetableStatus::Archived),
            other => Err(format!("Unknown timetable status: {}", other)),
        }
    }
}

/// Category of a detected scheduling conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    TeacherDoubleBooking,
    RoomConflict,
}

impl ConflictType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictType::TeacherDoubleBooking => "teacher_double_booking",
            ConflictType::RoomConflict => "room_conflict",
        }
    }
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConflictType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "teacher_double_booking" => Ok(ConflictType::TeacherDoubleBooking),
            "room_conflict" => Ok(ConflictType::RoomConflict),
            other => Err(format!("Unknown conflict type: {}", other)),
        }
    }
}

/// Conflict severity, ordered `Low < Medium < High < Critical` so that
/// sorting by severity is semantic rather than alphabetical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ConflictSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictSeverity::Low => "low",
            ConflictSeverity::Medium => "medium",
            ConflictSeverity::High => "high",
            ConflictSeverity::Critical => "critical",
        }
    }
}

impl fmt::Display for ConflictSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConflictSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(ConflictSeverity::Low),
            "medium" => Ok(ConflictSeverity::Medium),
            "high" => Ok(ConflictSeverity::High),
            "critical" => Ok(ConflictSeverity::Critical),
            other => Err(format!("Unknown conflict severity: {}", other)),
        }
    }
}
