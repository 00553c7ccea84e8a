use super::Solution;
use crate::utils::text::{contains_any, normalize};
use regex::{Captures, Regex};
use std::sync::LazyLock;

const BOTH_CUES: &[&str] = &[
    "attend both",
    "both meetings",
    "make it to both",
    "make both",
    "go to both",
    "join both",
    "both in full",
];

/// Words that tie a time range to one of the meetings being compared.
const MEETING_CUES: &[&str] = &[
    "meeting",
    "meetings",
    "another",
    "the other",
    "one",
    "first",
    "second",
    "call",
    "calls",
    "sync",
    "standup",
    "appointment",
];

static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?P<h1>\d{1,2})(?::(?P<m1>\d{2}))?\s*(?P<ap1>am|pm|a\.m\.|p\.m\.)?\s*(?:-|to|until|till)\s*(?P<h2>\d{1,2})(?::(?P<m2>\d{2}))?\s*(?P<ap2>am|pm|a\.m\.|p\.m\.)?",
    )
    .expect("time range regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    fn parse(raw: Option<&str>) -> Option<Self> {
        match raw?.replace('.', "").as_str() {
            "am" => Some(Self::Am),
            "pm" => Some(Self::Pm),
            _ => None,
        }
    }

    fn flip(self) -> Self {
        match self {
            Self::Am => Self::Pm,
            Self::Pm => Self::Am,
        }
    }
}

/// Minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Clock(u32);

impl Clock {
    fn from_parts(hour: u32, minute: u32, meridiem: Meridiem) -> Option<Self> {
        if !(1..=12).contains(&hour) || minute >= 60 {
            return None;
        }
        let hour24 = match (meridiem, hour) {
            (Meridiem::Am, 12) => 0,
            (Meridiem::Am, h) => h,
            (Meridiem::Pm, 12) => 12,
            (Meridiem::Pm, h) => h + 12,
        };
        Some(Self(hour24 * 60 + minute))
    }

    /// 12-hour `h:mm` without a meridiem.
    fn display(self) -> String {
        let hour24 = self.0 / 60;
        let minute = self.0 % 60;
        let hour12 = match hour24 % 12 {
            0 => 12,
            h => h,
        };
        format!("{hour12}:{minute:02}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Interval {
    start: Clock,
    end: Clock,
}

fn bare_hour_meridiem(hour: u32) -> Meridiem {
    // Meetings at "2" or "4" are afternoon meetings.
    if (1..=7).contains(&hour) || hour == 12 {
        Meridiem::Pm
    } else {
        Meridiem::Am
    }
}

fn number(caps: &Captures<'_>, name: &str) -> Option<u32> {
    caps.name(name).map_or(Some(0), |m| m.as_str().parse().ok())
}

fn interval(caps: &Captures<'_>) -> Option<Interval> {
    let h1: u32 = caps.name("h1")?.as_str().parse().ok()?;
    let h2: u32 = caps.name("h2")?.as_str().parse().ok()?;
    let m1 = number(caps, "m1")?;
    let m2 = number(caps, "m2")?;
    let own_start = Meridiem::parse(caps.name("ap1").map(|m| m.as_str()));
    let own_end = Meridiem::parse(caps.name("ap2").map(|m| m.as_str()));

    let end_meridiem = own_end
        .or(own_start)
        .unwrap_or_else(|| bare_hour_meridiem(h2));
    let end = Clock::from_parts(h2, m2, end_meridiem)?;

    let start_meridiem = own_start.unwrap_or(end_meridiem);
    let mut start = Clock::from_parts(h1, m1, start_meridiem)?;
    if own_start.is_none() && start >= end {
        // "11-1pm" starts in the morning.
        start = Clock::from_parts(h1, m1, start_meridiem.flip())?;
    }
    (start < end).then_some(Interval { start, end })
}

/// With more than two ranges, only those introduced by a meeting cue count.
fn meeting_ranges(text: &str) -> Vec<Interval> {
    let mut previous_end = 0;
    let mut found = Vec::new();
    for caps in RANGE_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let lead = &text[previous_end..whole.start()];
        previous_end = whole.end();
        if let Some(range) = interval(&caps) {
            found.push((range, contains_any(lead, MEETING_CUES)));
        }
    }
    if found.len() <= 2 {
        return found.into_iter().map(|(range, _)| range).collect();
    }
    found
        .into_iter()
        .filter_map(|(range, tied)| tied.then_some(range))
        .collect()
}

pub fn solve(raw: &str) -> Option<Solution> {
    let text = normalize(raw);
    if !contains_any(&text, BOTH_CUES) {
        return None;
    }
    let ranges = meeting_ranges(&text);
    let [first, second] = ranges.as_slice() else {
        return None;
    };

    let constraint = format!(
        "first meeting {}-{}; second meeting {}-{}",
        first.start.display(),
        first.end.display(),
        second.start.display(),
        second.end.display()
    );
    let overlap_start = first.start.max(second.start);
    let overlap_end = first.end.min(second.end);

    if overlap_start < overlap_end {
        let window = format!("{} to {}", overlap_start.display(), overlap_end.display());
        Some(Solution::new(
            format!("No, you cannot attend both in full. The meetings overlap from {window}."),
            "attend both meetings in full",
            constraint,
            format!("the intervals intersect from {window}"),
        ))
    } else {
        Some(Solution::new(
            "Yes, you can attend both in full. The meetings do not overlap.",
            "attend both meetings in full",
            constraint,
            "the intervals do not intersect",
        ))
    }
}
