use chrono::NaiveTime;

/// Maximum appointments a doctor may hold on one calendar date.
pub const DEFAULT_MAX_DAILY_PER_DOCTOR: usize = 5;

/// Clinic scheduling parameters.
///
/// The operating window is inclusive at both ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulingRules {
    pub max_daily_per_doctor: usize,
    pub opens_at: NaiveTime,
    pub closes_at: NaiveTime,
}

impl Default for SchedulingRules {
    fn default() -> Self {
        Self {
            max_daily_per_doctor: DEFAULT_MAX_DAILY_PER_DOCTOR,
            opens_at: NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default(),
            closes_at: NaiveTime::from_hms_opt(15, 0, 0).unwrap_or_default(),
        }
    }
}

impl SchedulingRules {
    pub fn within_operating_hours(&self, time: NaiveTime) -> bool {
        time >= self.opens_at && time <= self.closes_at
    }
}

/// A scheduling rule the candidate appointment breaks.
///
/// Violations are data, not errors: the caller receives all of them at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    PatientDoubleBooked,
    DoctorAtCapacity { limit: usize },
    OutsideOperatingHours { opens_at: NaiveTime, closes_at: NaiveTime },
}

impl Violation {
    /// Stable machine-readable tag.
    pub fn code(&self) -> &'static str {
        match self {
            Self::PatientDoubleBooked => "patient_double_booked",
            Self::DoctorAtCapacity { .. } => "doctor_at_capacity",
            Self::OutsideOperatingHours { .. } => "outside_operating_hours",
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PatientDoubleBooked => {
                write!(f, "patient already has an appointment on this date")
            }
            Self::DoctorAtCapacity { limit } => {
                write!(f, "doctor already has {limit} appointments on this date")
            }
            Self::OutsideOperatingHours { opens_at, closes_at } => write!(
                f,
                "appointments can only be scheduled between {} and {}",
                clock_label(*opens_at),
                clock_label(*closes_at)
            ),
        }
    }
}

/// "10am", "3pm", "10:30am".
fn clock_label(time: NaiveTime) -> String {
    use chrono::Timelike;
    if time.minute() == 0 {
        time.format("%-I%P").to_string()
    } else {
        time.format("%-I:%M%P").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn default_window_is_ten_to_three() {
        let rules = SchedulingRules::default();
        assert_eq!(rules.opens_at, at(10, 0, 0));
        assert_eq!(rules.closes_at, at(15, 0, 0));
        assert_eq!(rules.max_daily_per_doctor, 5);
    }

    #[test]
    fn window_is_inclusive() {
        let rules = SchedulingRules::default();
        assert!(rules.within_operating_hours(at(10, 0, 0)));
        assert!(rules.within_operating_hours(at(15, 0, 0)));
        assert!(!rules.within_operating_hours(at(9, 59, 59)));
        assert!(!rules.within_operating_hours(at(15, 0, 1)));
    }

    #[test]
    fn default_messages() {
        let rules = SchedulingRules::default();
        assert_eq!(
            Violation::PatientDoubleBooked.message(),
            "patient already has an appointment on this date"
        );
        assert_eq!(
            Violation::DoctorAtCapacity { limit: rules.max_daily_per_doctor }.message(),
            "doctor already has 5 appointments on this date"
        );
        assert_eq!(
            Violation::OutsideOperatingHours {
                opens_at: rules.opens_at,
                closes_at: rules.closes_at,
            }
            .message(),
            "appointments can only be scheduled between 10am and 3pm"
        );
    }

    #[test]
    fn clock_label_with_minutes() {
        assert_eq!(clock_label(at(9, 30, 0)), "9:30am");
        assert_eq!(clock_label(at(12, 0, 0)), "12pm");
    }

    #[test]
    fn codes_are_distinct() {
        let codes = [
            Violation::PatientDoubleBooked.code(),
            Violation::DoctorAtCapacity { limit: 5 }.code(),
            Violation::OutsideOperatingHours {
                opens_at: at(10, 0, 0),
                closes_at: at(15, 0, 0),
            }
            .code(),
        ];
        assert_ne!(codes[0], codes[1]);
        assert_ne!(codes[1], codes[2]);
        assert_ne!(codes[0], codes[2]);
    }
}
