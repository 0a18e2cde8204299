// File: src/model/parser.rs
use crate::config::Config;
use crate::model::roster::{FULL_CAST, Roster};
use crate::model::schedule::{Schedule, TimeBlock};
use crate::resolve::NameResolver;
use chrono::{Datelike, NaiveDate, Weekday};

pub const DEFAULT_REFERENCE_YEAR: i32 = 2025;
pub const DEFAULT_FRIDAY_CALL: &str = "5:30pm-9:00pm";
pub const DEFAULT_CALL: &str = "9:30am-2:00pm";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// Year used when a date header leaves it out.
    pub reference_year: i32,
    pub friday_call_time: String,
    pub default_call_time: String,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            reference_year: DEFAULT_REFERENCE_YEAR,
            friday_call_time: DEFAULT_FRIDAY_CALL.to_string(),
            default_call_time: DEFAULT_CALL.to_string(),
        }
    }
}

impl From<&Config> for ParserOptions {
    fn from(config: &Config) -> Self {
        Self {
            reference_year: config.reference_year,
            friday_call_time: config.friday_call_time.clone(),
            default_call_time: config.default_call_time.clone(),
        }
    }
}

/// What a single trimmed line looks like, in precedence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineShape {
    Date(NaiveDate),
    TimeOnly(String),
    TimeWithAttendees(String, String),
    FullCast,
    Blank,
    Text(String),
}

pub fn classify_line(line: &str, reference_year: i32) -> LineShape {
    let line = line.trim();
    if line.is_empty() {
        return LineShape::Blank;
    }
    if let Some(date) = parse_date_header(line, reference_year) {
        return LineShape::Date(date);
    }
    if let Some((time, rest)) = split_time_prefix(line) {
        return if rest.is_empty() {
            LineShape::TimeOnly(time.to_string())
        } else {
            LineShape::TimeWithAttendees(time.to_string(), rest.to_string())
        };
    }
    if is_full_cast_line(line) {
        return LineShape::FullCast;
    }
    LineShape::Text(line.to_string())
}

fn parse_weekday(s: &str) -> Option<Weekday> {
    match s.trim_end_matches('.').to_lowercase().as_str() {
        "mon" | "monday" => Some(Weekday::Mon),
        "tue" | "tues" | "tuesday" => Some(Weekday::Tue),
        "wed" | "wednesday" => Some(Weekday::Wed),
        "thu" | "thur" | "thurs" | "thursday" => Some(Weekday::Thu),
        "fri" | "friday" => Some(Weekday::Fri),
        "sat" | "saturday" => Some(Weekday::Sat),
        "sun" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

fn parse_month(s: &str) -> Option<u32> {
    match s.trim_end_matches('.').to_lowercase().as_str() {
        "jan" | "january" => Some(1),
        "feb" | "february" => Some(2),
        "mar" | "march" => Some(3),
        "apr" | "april" => Some(4),
        "may" => Some(5),
        "jun" | "june" => Some(6),
        "jul" | "july" => Some(7),
        "aug" | "august" => Some(8),
        "sep" | "sept" | "september" => Some(9),
        "oct" | "october" => Some(10),
        "nov" | "november" => Some(11),
        "dec" | "december" => Some(12),
        _ => None,
    }
}

fn parse_day(s: &str) -> Option<u32> {
    let lower = s.to_lowercase();
    let digits = ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| lower.strip_suffix(suffix))
        .unwrap_or(lower.as_str());
    if digits.is_empty() || digits.len() > 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn parse_year(s: &str) -> Option<i32> {
    if s.len() == 4 && s.chars().all(|c| c.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}

/// "Friday, September 5, 2025", "Sat Sept 6th", "Friday September 12:".
pub fn parse_date_header(line: &str, reference_year: i32) -> Option<NaiveDate> {
    let body = line.trim().trim_end_matches(':');
    let words: Vec<&str> = body
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|w| !w.is_empty())
        .collect();
    if !(3..=4).contains(&words.len()) {
        return None;
    }

    let weekday = parse_weekday(words[0])?;
    let month = parse_month(words[1])?;
    let day = parse_day(words[2])?;
    let year = match words.get(3) {
        Some(y) => parse_year(y)?,
        None => reference_year,
    };

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    if date.weekday() != weekday {
        log::warn!(
            "'{}' names a {} but {} is a {}",
            line.trim(),
            weekday,
            date,
            date.weekday()
        );
    }
    Some(date)
}

/// Validates one side of a time range. Returns whether it carried minutes
/// or an am/pm marker.
fn parse_clock(s: &str) -> Option<bool> {
    let lower = s.to_lowercase();
    let (clock, meridiem) = if let Some(stripped) = lower.strip_suffix("am") {
        (stripped, true)
    } else if let Some(stripped) = lower.strip_suffix("pm") {
        (stripped, true)
    } else {
        (lower.as_str(), false)
    };

    let (h_str, m_str) = match clock.split_once(':') {
        Some((h, m)) => (h, Some(m)),
        None => (clock, None),
    };
    if h_str.is_empty() || h_str.len() > 2 || !h_str.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let h = h_str.parse::<u32>().ok()?;
    let max_hour = if meridiem { 12 } else { 23 };
    if h > max_hour || (meridiem && h == 0) {
        return None;
    }
    if let Some(m) = m_str {
        if m.len() != 2 || !m.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        if m.parse::<u32>().ok()? > 59 {
            return None;
        }
    }
    Some(m_str.is_some() || meridiem)
}

/// True for `5:30-9:00`, `9:30am-2:00pm`, `10am-1pm`; false for `2-3`.
pub fn is_time_range(s: &str) -> bool {
    let Some((start, end)) = s.split_once('-') else {
        return false;
    };
    match (parse_clock(start), parse_clock(end)) {
        (Some(a), Some(b)) => a || b,
        _ => false,
    }
}

fn split_time_prefix(line: &str) -> Option<(&str, &str)> {
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    is_time_range(head).then_some((head, rest))
}

/// "Full Cast" with an optional "(optional)" suffix.
pub fn is_full_cast_line(line: &str) -> bool {
    let lower = line.trim().to_lowercase();
    let core = lower.strip_suffix("(optional)").unwrap_or(lower.as_str());
    let words: Vec<&str> = core.split_whitespace().collect();
    words == ["full", "cast"]
}

fn split_attendees(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|t| !t.is_empty())
}

/// Where continuation lines land.
#[derive(Debug)]
enum Collecting {
    /// Opened by a bare time header; only kept if something resolves.
    Pending(TimeBlock),
    /// Inline block already on the schedule; append to it.
    Committed,
}

#[derive(Debug, strum::Display)]
enum ParserState {
    AwaitingDate,
    AwaitingBlock(NaiveDate),
    CollectingContinuation(NaiveDate, Collecting),
}

#[derive(Debug, Clone, Default)]
pub struct ScheduleParser {
    options: ParserOptions,
}

impl ScheduleParser {
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    /// Builds a schedule from the call sheet text. Unknown names go through
    /// `resolver`, which may add roles or groups to `roster`.
    pub fn parse(
        &self,
        text: &str,
        roster: &mut Roster,
        resolver: &mut NameResolver<'_>,
    ) -> Schedule {
        let mut pass = Pass {
            options: &self.options,
            roster,
            resolver,
            schedule: Schedule::new(),
        };
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut state = ParserState::AwaitingDate;
        for line in text.lines() {
            let shape = classify_line(line, self.options.reference_year);
            log::trace!("[{}] {:?}", state, shape);
            state = pass.advance(state, shape);
        }
        if let ParserState::CollectingContinuation(date, collecting) = state {
            pass.finish(date, collecting);
        }
        pass.schedule
    }
}

struct Pass<'a, 'p> {
    options: &'a ParserOptions,
    roster: &'a mut Roster,
    resolver: &'a mut NameResolver<'p>,
    schedule: Schedule,
}

impl Pass<'_, '_> {
    fn advance(&mut self, state: ParserState, shape: LineShape) -> ParserState {
        match (state, shape) {
            (
                ParserState::CollectingContinuation(date, collecting),
                shape @ (LineShape::Date(_)
                | LineShape::TimeOnly(_)
                | LineShape::TimeWithAttendees(_, _)),
            ) => {
                self.finish(date, collecting);
                self.advance(ParserState::AwaitingBlock(date), shape)
            }
            (_, LineShape::Date(date)) => {
                log::debug!("Date header -> {}", date);
                self.schedule.open_date(date);
                ParserState::AwaitingBlock(date)
            }
            (ParserState::AwaitingDate, _) => ParserState::AwaitingDate,
            (ParserState::AwaitingBlock(date), shape) => self.start_block(date, shape),
            (ParserState::CollectingContinuation(date, collecting), LineShape::Blank) => {
                ParserState::CollectingContinuation(date, collecting)
            }
            (ParserState::CollectingContinuation(date, collecting), LineShape::FullCast) => {
                let collecting = self.extend(date, collecting, vec![FULL_CAST.to_string()]);
                ParserState::CollectingContinuation(date, collecting)
            }
            (ParserState::CollectingContinuation(date, collecting), LineShape::Text(list)) => {
                let time = match &collecting {
                    Collecting::Pending(block) => block.time_range.clone(),
                    Collecting::Committed => self
                        .schedule
                        .last_block_mut(date)
                        .map(|b| b.time_range.clone())
                        .unwrap_or_default(),
                };
                let names = self.resolve_list(&list, date, &time);
                let collecting = self.extend(date, collecting, names);
                ParserState::CollectingContinuation(date, collecting)
            }
        }
    }

    fn start_block(&mut self, date: NaiveDate, shape: LineShape) -> ParserState {
        match shape {
            LineShape::TimeOnly(time) => {
                log::debug!("Time header {} on {}", time, date);
                ParserState::CollectingContinuation(
                    date,
                    Collecting::Pending(TimeBlock::new(time, Vec::new())),
                )
            }
            LineShape::TimeWithAttendees(time, list) => {
                let names = self.resolve_list(&list, date, &time);
                if names.is_empty() {
                    log::debug!("No attendees resolved for {} on {}, skipping", time, date);
                    return ParserState::AwaitingBlock(date);
                }
                log::debug!("Block {} on {}: {:?}", time, date, names);
                self.schedule.push_block(date, TimeBlock::new(time, names));
                ParserState::CollectingContinuation(date, Collecting::Committed)
            }
            LineShape::FullCast => {
                self.add_full_cast(date);
                ParserState::AwaitingBlock(date)
            }
            LineShape::Blank | LineShape::Text(_) | LineShape::Date(_) => {
                ParserState::AwaitingBlock(date)
            }
        }
    }

    fn add_full_cast(&mut self, date: NaiveDate) {
        if let Some(last) = self.schedule.last_block_mut(date) {
            last.attendees.push(FULL_CAST.to_string());
            log::debug!("Added FULL CAST to {} on {}", last.time_range, date);
            return;
        }
        let time = if date.weekday() == Weekday::Fri {
            &self.options.friday_call_time
        } else {
            &self.options.default_call_time
        };
        log::debug!("Default FULL CAST call {} on {}", time, date);
        self.schedule.push_block(
            date,
            TimeBlock::new(time.clone(), vec![FULL_CAST.to_string()]),
        );
    }

    fn resolve_list(&mut self, list: &str, date: NaiveDate, time: &str) -> Vec<String> {
        let mut names = Vec::new();
        for token in split_attendees(list) {
            if let Some(name) = self.resolver.resolve(self.roster, token, date, time) {
                names.push(name.to_uppercase());
            }
        }
        names
    }

    fn extend(&mut self, date: NaiveDate, collecting: Collecting, names: Vec<String>) -> Collecting {
        match collecting {
            Collecting::Pending(mut block) => {
                block.attendees.extend(names);
                Collecting::Pending(block)
            }
            Collecting::Committed => {
                if let Some(last) = self.schedule.last_block_mut(date) {
                    last.attendees.extend(names);
                }
                Collecting::Committed
            }
        }
    }

    fn finish(&mut self, date: NaiveDate, collecting: Collecting) {
        if let Collecting::Pending(block) = collecting {
            if block.attendees.is_empty() {
                log::debug!("Dropping empty block {} on {}", block.time_range, date);
            } else {
                log::debug!(
                    "Block {} on {}: {:?}",
                    block.time_range,
                    date,
                    block.attendees
                );
                self.schedule.push_block(date, block);
            }
        }
    }
}
